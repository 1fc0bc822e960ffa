use rustc_hash::FxHashMap;

use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

/// Optional edge offsets of one canvas child. Each axis resolves
/// independently; the near edge (left/top) wins when both are set for
/// positioning, and setting both edges on an axis makes the child's extent
/// the difference, overriding its desired size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasAnchors {
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
}

/// Absolute-positioning panel: children are measured unconstrained and
/// placed from their anchors; an axis with no anchor defaults to the panel
/// origin and the child's desired extent.
pub struct Canvas {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    anchors: FxHashMap<u64, CanvasAnchors>,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            anchors: FxHashMap::default(),
        }
    }

    /// Anchors of a child; an unknown id reads as "no anchors".
    pub fn anchors_of(&self, child_id: u64) -> CanvasAnchors {
        self.anchors.get(&child_id).copied().unwrap_or_default()
    }

    pub fn set_anchors(&mut self, child_id: u64, anchors: CanvasAnchors) {
        self.anchors.insert(child_id, anchors);
        self.core.invalidate_arrange_local();
    }

    pub fn set_left(&mut self, child_id: u64, left: f32) {
        self.anchors.entry(child_id).or_default().left = Some(left);
        self.core.invalidate_arrange_local();
    }

    pub fn set_top(&mut self, child_id: u64, top: f32) {
        self.anchors.entry(child_id).or_default().top = Some(top);
        self.core.invalidate_arrange_local();
    }

    pub fn set_right(&mut self, child_id: u64, right: f32) {
        self.anchors.entry(child_id).or_default().right = Some(right);
        self.core.invalidate_arrange_local();
    }

    pub fn set_bottom(&mut self, child_id: u64, bottom: f32) {
        self.anchors.entry(child_id).or_default().bottom = Some(bottom);
        self.core.invalidate_arrange_local();
    }

    pub fn add_child(&mut self, mut child: Box<dyn Element>) {
        super::adopt(&mut child, self.core.id);
        self.children.push(child);
        self.core.invalidate_measure_local();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Box<dyn Element>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.anchors.remove(&child.core().id());
        self.core.invalidate_measure_local();
        Some(super::release(child))
    }

    pub fn clear_children(&mut self) {
        for child in self.children.drain(..) {
            self.anchors.remove(&child.core().id());
            super::release(child);
        }
        self.core.invalidate_measure_local();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    pub(crate) fn attached_entries(&self) -> usize {
        self.anchors.len()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Canvas {
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

    fn children(&self) -> Option<&[Box<dyn Element>]> {
        Some(&self.children)
    }

    fn children_mut(&mut self) -> Option<&mut [Box<dyn Element>]> {
        Some(&mut self.children)
    }

    fn measure_override(&mut self, _available: Size) -> Size {
        for child in &mut self.children {
            child.measure(Size::UNBOUNDED);
        }
        // A canvas does not size to its content.
        Size::ZERO
    }

    fn arrange_override(&mut self, content: Rect) {
        for index in 0..self.children.len() {
            let id = self.children[index].core().id();
            let anchors = self.anchors_of(id);
            let child = &mut self.children[index];
            let desired = child.core().desired_size();

            let (x, width) = match (anchors.left, anchors.right) {
                (Some(left), Some(right)) => (
                    content.x + left,
                    (content.width - left - right).max(0.0),
                ),
                (Some(left), None) => (content.x + left, desired.width),
                (None, Some(right)) => (
                    content.x + content.width - right - desired.width,
                    desired.width,
                ),
                (None, None) => (content.x, desired.width),
            };
            let (y, height) = match (anchors.top, anchors.bottom) {
                (Some(top), Some(bottom)) => (
                    content.y + top,
                    (content.height - top - bottom).max(0.0),
                ),
                (Some(top), None) => (content.y + top, desired.height),
                (None, Some(bottom)) => (
                    content.y + content.height - bottom - desired.height,
                    desired.height,
                ),
                (None, None) => (content.y, desired.height),
            };

            child.arrange(Rect::new(x, y, width, height));
        }
    }

    fn dispose(&mut self) {
        self.clear_children();
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Container;
    use crate::geometry::Point;

    fn block(width: f32, height: f32) -> Box<dyn Element> {
        let mut c = Container::new();
        c.style_mut().width = Some(width);
        c.style_mut().height = Some(height);
        Box::new(c)
    }

    #[test]
    fn unanchored_child_sits_at_the_origin() {
        let mut canvas = Canvas::new();
        canvas.add_child(block(30.0, 20.0));

        canvas.measure(Size::new(100.0, 100.0));
        canvas.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        let bounds = canvas.children().unwrap()[0].core().bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 30.0, 20.0));
    }

    #[test]
    fn far_edge_anchor_positions_from_the_far_side() {
        let mut canvas = Canvas::new();
        let child = block(30.0, 20.0);
        let id = child.core().id();
        canvas.add_child(child);
        canvas.set_right(id, 10.0);
        canvas.set_bottom(id, 5.0);

        canvas.measure(Size::new(100.0, 100.0));
        canvas.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        let bounds = canvas.children().unwrap()[0].core().bounds();
        assert_eq!(bounds, Rect::new(60.0, 75.0, 30.0, 20.0));
    }

    #[test]
    fn both_anchors_make_the_extent_the_difference() {
        let mut canvas = Canvas::new();
        let child = Container::new();
        let id = child.core().id();
        canvas.add_child(Box::new(child));
        canvas.set_left(id, 10.0);
        canvas.set_right(id, 20.0);
        canvas.set_top(id, 0.0);
        canvas.set_bottom(id, 50.0);

        canvas.measure(Size::new(100.0, 100.0));
        canvas.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        let bounds = canvas.children().unwrap()[0].core().bounds();
        assert_eq!(bounds, Rect::new(10.0, 0.0, 70.0, 50.0));
    }

    #[test]
    fn overlapping_siblings_hit_topmost_last_added() {
        let mut canvas = Canvas::new();
        let a = block(50.0, 50.0);
        let b = block(50.0, 50.0);
        let b_id = b.core().id();
        canvas.add_child(a);
        canvas.add_child(b);

        canvas.measure(Size::new(100.0, 100.0));
        canvas.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        // Both children occupy (0,0)-(50,50); the later sibling wins.
        let hit = crate::element::hit_test(&canvas, Point::new(25.0, 25.0));
        assert_eq!(hit, Some(b_id));
    }

    #[test]
    fn removing_a_child_prunes_its_anchor_entry() {
        let mut canvas = Canvas::new();
        let child = block(10.0, 10.0);
        let id = child.core().id();
        canvas.add_child(child);
        canvas.set_left(id, 5.0);
        assert_eq!(canvas.attached_entries(), 1);
        canvas.remove_child(0);
        assert_eq!(canvas.attached_entries(), 0);
    }

    #[test]
    fn unknown_child_reads_empty_anchors() {
        let canvas = Canvas::new();
        assert_eq!(canvas.anchors_of(7), CanvasAnchors::default());
    }
}
