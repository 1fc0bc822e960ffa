use crate::element::{
    self, DrawSurface, Element, find_mut, render_tree, subtree_needs_layout, subtree_needs_paint,
    update_hover,
};
use crate::geometry::{Point, Rect, Size};

use super::focus::{FocusError, FocusManager};

/// Upper bound on measure/arrange iterations per layout request. The panel
/// algorithms are not guaranteed to reach a fixed point in one pass when
/// auto-sized content depends on cross-axis wrapping; a pass budget turns
/// that into a logged degradation instead of an endless loop.
pub const MAX_LAYOUT_PASSES: usize = 8;

/// Drives a tree from the outside: owns the root, the viewport, the DPI
/// scale, focus and pointer capture. The window layer polls
/// [`LayoutHost::needs_layout`] / [`LayoutHost::needs_paint`] each frame
/// and calls [`LayoutHost::run_layout`] / [`LayoutHost::render`] when set.
pub struct LayoutHost {
    root: Box<dyn Element>,
    viewport: Size,
    scale: f32,
    focus: FocusManager,
    captured: Option<u64>,
}

impl LayoutHost {
    pub fn new(root: Box<dyn Element>) -> Self {
        Self {
            root,
            viewport: Size::ZERO,
            scale: 1.0,
            focus: FocusManager::new(),
            captured: None,
        }
    }

    pub fn root(&self) -> &dyn Element {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> &mut dyn Element {
        self.root.as_mut()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        let viewport = viewport.non_negative();
        if self.viewport != viewport {
            self.viewport = viewport;
            self.root.core_mut().invalidate_measure_local();
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// DPI change broadcast: every node re-snaps against the new grid.
    pub fn set_scale(&mut self, scale: f32) {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        if self.scale != scale {
            self.scale = scale;
            element::set_scale(self.root.as_mut(), scale);
        }
    }

    pub fn needs_layout(&self) -> bool {
        subtree_needs_layout(self.root.as_ref())
    }

    pub fn needs_paint(&self) -> bool {
        subtree_needs_paint(self.root.as_ref())
    }

    /// Runs measure/arrange passes until the tree is clean, giving up after
    /// [`MAX_LAYOUT_PASSES`]. Non-convergence keeps the last pass's result.
    /// Returns the number of passes taken.
    pub fn run_layout(&mut self) -> usize {
        if !self.needs_layout() {
            return 0;
        }

        let mut passes = 0;
        while passes < MAX_LAYOUT_PASSES {
            self.root.measure(self.viewport);
            self.root
                .arrange(Rect::from_origin_size(Point::ZERO, self.viewport));
            passes += 1;
            if !self.needs_layout() {
                break;
            }
        }

        if self.needs_layout() {
            tracing::warn!(passes, "layout did not converge; keeping the last pass");
        } else {
            tracing::trace!(passes, "layout pass complete");
        }
        passes
    }

    /// Applies a mutation to the node with `id` and invalidates the measure
    /// path above it, the standard route for external change ("text
    /// changed", "child added"). Returns false if the id is unknown.
    pub fn update(&mut self, id: u64, f: impl FnOnce(&mut dyn Element)) -> bool {
        let Some(node) = find_mut(self.root.as_mut(), id) else {
            return false;
        };
        f(node);
        element::invalidate_measure(self.root.as_mut(), id);
        self.focus.prune(self.root.as_ref());
        true
    }

    pub fn hit_test(&self, point: Point) -> Option<u64> {
        element::hit_test(self.root.as_ref(), point)
    }

    /// Routes a pointer position: capture wins over hit-testing, and hover
    /// state follows the resolved target.
    pub fn pointer_moved(&mut self, point: Point) -> Option<u64> {
        let target = self.captured.or_else(|| self.hit_test(point));
        update_hover(self.root.as_mut(), target);
        target
    }

    pub fn render(&mut self, surface: &mut dyn DrawSurface) {
        render_tree(self.root.as_mut(), surface);
    }

    pub fn focused(&self) -> Option<u64> {
        self.focus.focused()
    }

    pub fn focus(&mut self, id: u64) -> Result<(), FocusError> {
        self.focus.focus(self.root.as_mut(), id)
    }

    pub fn focus_next(&mut self) -> Option<u64> {
        self.focus.focus_next(self.root.as_mut())
    }

    pub fn focus_prev(&mut self) -> Option<u64> {
        self.focus.focus_prev(self.root.as_mut())
    }

    pub fn clear_focus(&mut self) {
        self.focus.clear(self.root.as_mut());
    }

    pub fn captured(&self) -> Option<u64> {
        self.captured
    }

    /// Directs pointer routing to one node until released. Fails on an
    /// unknown id.
    pub fn capture_pointer(&mut self, id: u64) -> bool {
        if let Some(old) = self.captured.take() {
            if let Some(node) = find_mut(self.root.as_mut(), old) {
                node.core_mut().set_captured(false);
            }
        }
        let Some(node) = find_mut(self.root.as_mut(), id) else {
            return false;
        };
        node.core_mut().set_captured(true);
        self.captured = Some(id);
        true
    }

    pub fn release_pointer(&mut self) {
        if let Some(old) = self.captured.take() {
            if let Some(node) = find_mut(self.root.as_mut(), old) {
                node.core_mut().set_captured(false);
            }
        }
    }

    /// Tears the whole tree down, releasing cached resources.
    pub fn dispose(mut self) {
        element::dispose_tree(self.root.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Container, ElementCore, LayoutStyle, TextBlock};
    use crate::panel::StackPanel;

    struct CountingSurface {
        rendered: usize,
    }

    impl DrawSurface for CountingSurface {
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self.rendered += 1;
            self
        }
    }

    /// Render probe that pokes the surface once per `on_render`.
    struct Painter {
        core: ElementCore,
        style: LayoutStyle,
    }

    impl Painter {
        fn new() -> Self {
            Self {
                core: ElementCore::new(),
                style: LayoutStyle::default(),
            }
        }
    }

    impl Element for Painter {
        fn core(&self) -> &ElementCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ElementCore {
            &mut self.core
        }
        fn style(&self) -> &LayoutStyle {
            &self.style
        }
        fn style_mut(&mut self) -> &mut LayoutStyle {
            &mut self.style
        }
        fn on_render(&self, surface: &mut dyn DrawSurface) {
            surface.as_any_mut();
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    /// Never settles: flips its natural size every measure and re-dirties
    /// itself whenever it gets arranged.
    struct Oscillator {
        core: ElementCore,
        style: LayoutStyle,
        flip: bool,
    }

    impl Element for Oscillator {
        fn core(&self) -> &ElementCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ElementCore {
            &mut self.core
        }
        fn style(&self) -> &LayoutStyle {
            &self.style
        }
        fn style_mut(&mut self) -> &mut LayoutStyle {
            &mut self.style
        }
        fn measure_override(&mut self, _available: Size) -> Size {
            self.flip = !self.flip;
            if self.flip {
                Size::new(10.0, 10.0)
            } else {
                Size::new(20.0, 20.0)
            }
        }
        fn arrange_override(&mut self, _content: Rect) {
            self.core.invalidate_measure_local();
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn simple_tree() -> (LayoutHost, u64) {
        let mut stack = StackPanel::new();
        let text = TextBlock::new("hello");
        let text_id = text.core().id();
        stack.add_child(Box::new(text));
        let mut host = LayoutHost::new(Box::new(stack));
        host.set_viewport(Size::new(200.0, 200.0));
        (host, text_id)
    }

    #[test]
    fn clean_tree_runs_zero_passes() {
        let (mut host, _) = simple_tree();
        assert!(host.needs_layout());
        assert_eq!(host.run_layout(), 1);
        assert!(!host.needs_layout());
        assert_eq!(host.run_layout(), 0);
    }

    #[test]
    fn update_dirties_the_path_and_relayout_settles_it() {
        let (mut host, text_id) = simple_tree();
        host.run_layout();

        let changed = host.update(text_id, |node| {
            node.as_any_mut()
                .downcast_mut::<TextBlock>()
                .unwrap()
                .set_text("a much longer string");
        });
        assert!(changed);
        assert!(host.needs_layout());
        host.run_layout();
        assert!(!host.needs_layout());
    }

    #[test]
    fn update_with_unknown_id_reports_false() {
        let (mut host, _) = simple_tree();
        assert!(!host.update(987_654, |_| {}));
    }

    #[test]
    fn non_convergent_layout_stops_at_the_pass_budget() {
        let mut stack = StackPanel::new();
        stack.add_child(Box::new(Oscillator {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            flip: false,
        }));
        let mut host = LayoutHost::new(Box::new(stack));
        host.set_viewport(Size::new(100.0, 100.0));

        assert_eq!(host.run_layout(), MAX_LAYOUT_PASSES);
        // Last pass's result stands even though the tree is still dirty.
        assert!(host.needs_layout());
    }

    #[test]
    fn scale_change_invalidates_and_resnaps() {
        let (mut host, _) = simple_tree();
        host.run_layout();
        host.set_scale(1.5);
        assert!(host.needs_layout());
        host.run_layout();
        assert_eq!(host.root().core().scale(), 1.5);
    }

    #[test]
    fn render_visits_each_visible_node_once() {
        let mut stack = StackPanel::new();
        stack.add_child(Box::new(Painter::new()));
        let mut hidden = Painter::new();
        hidden.core.set_visible(false);
        stack.add_child(Box::new(hidden));
        stack.add_child(Box::new(Painter::new()));

        let mut host = LayoutHost::new(Box::new(stack));
        host.set_viewport(Size::new(100.0, 100.0));
        host.run_layout();

        let mut surface = CountingSurface { rendered: 0 };
        host.render(&mut surface);
        // Two visible painters; the hidden one is skipped.
        assert_eq!(surface.rendered, 2);
        assert!(!host.needs_paint());
    }

    #[test]
    fn capture_overrides_hit_testing() {
        let mut stack = StackPanel::new();
        let mut a = Container::new();
        a.style_mut().height = Some(50.0);
        let a_id = a.core().id();
        stack.add_child(Box::new(a));
        let mut b = Container::new();
        b.style_mut().height = Some(50.0);
        let b_id = b.core().id();
        stack.add_child(Box::new(b));

        let mut host = LayoutHost::new(Box::new(stack));
        host.set_viewport(Size::new(100.0, 100.0));
        host.run_layout();

        assert_eq!(host.pointer_moved(Point::new(50.0, 75.0)), Some(b_id));

        assert!(host.capture_pointer(a_id));
        assert_eq!(host.pointer_moved(Point::new(50.0, 75.0)), Some(a_id));

        host.release_pointer();
        assert_eq!(host.pointer_moved(Point::new(50.0, 75.0)), Some(b_id));
    }
}
