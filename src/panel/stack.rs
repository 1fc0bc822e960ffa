use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Lays children end-to-end along one axis with uniform spacing between
/// visible children. Each child's slot spans the panel's full cross extent.
pub struct StackPanel {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    orientation: Orientation,
    spacing: f32,
}

impl StackPanel {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            orientation: Orientation::default(),
            spacing: 0.0,
        }
    }

    pub fn horizontal() -> Self {
        let mut panel = Self::new();
        panel.orientation = Orientation::Horizontal;
        panel
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.core.invalidate_measure_local();
        }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        if self.spacing != spacing {
            self.spacing = spacing.max(0.0);
            self.core.invalidate_measure_local();
        }
    }

    pub fn add_child(&mut self, mut child: Box<dyn Element>) {
        super::adopt(&mut child, self.core.id);
        self.children.push(child);
        self.core.invalidate_measure_local();
    }

    pub fn insert_child(&mut self, index: usize, mut child: Box<dyn Element>) {
        super::adopt(&mut child, self.core.id);
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.core.invalidate_measure_local();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Box<dyn Element>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.core.invalidate_measure_local();
        Some(super::release(child))
    }

    pub fn clear_children(&mut self) {
        for child in self.children.drain(..) {
            super::release(child);
        }
        self.core.invalidate_measure_local();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for StackPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for StackPanel {
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

    fn measure_override(&mut self, available: Size) -> Size {
        // Unbounded along the stacking axis so children report natural size.
        let constraint = match self.orientation {
            Orientation::Vertical => Size::new(available.width, f32::INFINITY),
            Orientation::Horizontal => Size::new(f32::INFINITY, available.height),
        };

        let mut main: f32 = 0.0;
        let mut cross: f32 = 0.0;
        let mut visible = 0usize;
        for child in &mut self.children {
            child.measure(constraint);
            if !child.core().is_visible() {
                continue;
            }
            visible += 1;
            let desired = child.core().desired_size();
            match self.orientation {
                Orientation::Vertical => {
                    main += desired.height;
                    cross = cross.max(desired.width);
                }
                Orientation::Horizontal => {
                    main += desired.width;
                    cross = cross.max(desired.height);
                }
            }
        }
        main += self.spacing * visible.saturating_sub(1) as f32;

        match self.orientation {
            Orientation::Vertical => Size::new(cross, main),
            Orientation::Horizontal => Size::new(main, cross),
        }
    }

    fn arrange_override(&mut self, content: Rect) {
        let mut offset = match self.orientation {
            Orientation::Vertical => content.y,
            Orientation::Horizontal => content.x,
        };

        for child in &mut self.children {
            if !child.core().is_visible() {
                child.arrange(Rect::new(content.x, content.y, 0.0, 0.0));
                continue;
            }
            let desired = child.core().desired_size();
            let slot = match self.orientation {
                Orientation::Vertical => {
                    Rect::new(content.x, offset, content.width, desired.height)
                }
                Orientation::Horizontal => {
                    Rect::new(offset, content.y, desired.width, content.height)
                }
            };
            child.arrange(slot);
            offset += match self.orientation {
                Orientation::Vertical => desired.height,
                Orientation::Horizontal => desired.width,
            } + self.spacing;
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
