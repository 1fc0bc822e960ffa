use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

use super::Orientation;

#[derive(Clone, Copy)]
struct Line {
    first: usize,
    count: usize,
    cross: f32,
}

/// Flow layout: children run along the main axis and wrap to a new line
/// when the next child would overflow it. Placement needs a second pass
/// because a line's cross extent is unknown until all its members have
/// been seen. Optional fixed item extents override child desired sizes.
pub struct WrapPanel {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    orientation: Orientation,
    spacing: f32,
    item_width: Option<f32>,
    item_height: Option<f32>,
}

impl WrapPanel {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            orientation: Orientation::Horizontal,
            spacing: 0.0,
            item_width: None,
            item_height: None,
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.core.invalidate_measure_local();
        }
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        if self.spacing != spacing {
            self.spacing = spacing.max(0.0);
            self.core.invalidate_measure_local();
        }
    }

    pub fn set_item_width(&mut self, width: Option<f32>) {
        self.item_width = width.map(|w| w.max(0.0));
        self.core.invalidate_measure_local();
    }

    pub fn set_item_height(&mut self, height: Option<f32>) {
        self.item_height = height.map(|h| h.max(0.0));
        self.core.invalidate_measure_local();
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

    /// Layout extent of one child: fixed item extents win over desired size.
    fn item_extent(&self, desired: Size) -> (f32, f32) {
        let width = self.item_width.unwrap_or(desired.width);
        let height = self.item_height.unwrap_or(desired.height);
        match self.orientation {
            Orientation::Horizontal => (width, height),
            Orientation::Vertical => (height, width),
        }
    }

    /// First pass: break visible children into lines against `main_limit`.
    fn break_lines(&self, main_limit: f32) -> Vec<Line> {
        let mut lines: Vec<Line> = Vec::new();
        let mut first = 0usize;
        let mut count = 0usize;
        let mut main: f32 = 0.0;
        let mut cross: f32 = 0.0;

        for (index, child) in self.children.iter().enumerate() {
            if !child.core().is_visible() {
                continue;
            }
            let (item_main, item_cross) = self.item_extent(child.core().desired_size());
            let next_main = if count == 0 {
                item_main
            } else {
                main + self.spacing + item_main
            };
            if count > 0 && next_main > main_limit {
                lines.push(Line { first, count, cross });
                first = index;
                count = 0;
                main = 0.0;
                cross = 0.0;
            }
            if count == 0 {
                first = index;
                main = item_main;
            } else {
                main += self.spacing + item_main;
            }
            cross = cross.max(item_cross);
            count += 1;
        }
        if count > 0 {
            lines.push(Line { first, count, cross });
        }
        lines
    }

    fn line_main_extent(&self, line: &Line) -> f32 {
        let mut main: f32 = 0.0;
        let mut seen = 0usize;
        for child in self.children[line.first..].iter() {
            if seen == line.count {
                break;
            }
            if !child.core().is_visible() {
                continue;
            }
            let (item_main, _) = self.item_extent(child.core().desired_size());
            if seen > 0 {
                main += self.spacing;
            }
            main += item_main;
            seen += 1;
        }
        main
    }
}

impl Default for WrapPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for WrapPanel {
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
        let constraint = Size::new(
            self.item_width.unwrap_or(available.width),
            self.item_height.unwrap_or(available.height),
        );
        for child in &mut self.children {
            child.measure(constraint);
        }

        let main_limit = match self.orientation {
            Orientation::Horizontal => available.width,
            Orientation::Vertical => available.height,
        };
        let lines = self.break_lines(main_limit);

        let mut main: f32 = 0.0;
        let mut cross: f32 = 0.0;
        for line in &lines {
            main = main.max(self.line_main_extent(line));
            cross += line.cross;
        }
        cross += self.spacing * (lines.len().saturating_sub(1)) as f32;

        match self.orientation {
            Orientation::Horizontal => Size::new(main, cross),
            Orientation::Vertical => Size::new(cross, main),
        }
    }

    fn arrange_override(&mut self, content: Rect) {
        // Invisible children occupy no slot anywhere in the flow.
        for child in &mut self.children {
            if !child.core().is_visible() {
                child.arrange(Rect::new(content.x, content.y, 0.0, 0.0));
            }
        }

        let main_limit = match self.orientation {
            Orientation::Horizontal => content.width,
            Orientation::Vertical => content.height,
        };
        let lines = self.break_lines(main_limit);

        let mut cross_offset: f32 = 0.0;
        for line in &lines {
            let mut main_offset: f32 = 0.0;
            let mut seen = 0usize;
            for index in line.first..self.children.len() {
                if seen == line.count {
                    break;
                }
                if !self.children[index].core().is_visible() {
                    continue;
                }
                let desired = self.children[index].core().desired_size();
                let (item_main, _) = self.item_extent(desired);
                let slot = match self.orientation {
                    Orientation::Horizontal => Rect::new(
                        content.x + main_offset,
                        content.y + cross_offset,
                        item_main,
                        line.cross,
                    ),
                    Orientation::Vertical => Rect::new(
                        content.x + cross_offset,
                        content.y + main_offset,
                        line.cross,
                        item_main,
                    ),
                };
                self.children[index].arrange(slot);
                main_offset += item_main + self.spacing;
                seen += 1;
            }
            cross_offset += line.cross + self.spacing;
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
