use rustc_hash::FxHashMap;

use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dock {
    #[default]
    Left,
    Top,
    Right,
    Bottom,
}

/// Children consume space from one of four edges in declaration order; the
/// shrinking remainder is what later children dock against. With
/// `last_child_fill` (the default) the final child takes whatever rectangle
/// is left.
pub struct DockPanel {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    docks: FxHashMap<u64, Dock>,
    last_child_fill: bool,
}

impl DockPanel {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            docks: FxHashMap::default(),
            last_child_fill: true,
        }
    }

    pub fn last_child_fill(&self) -> bool {
        self.last_child_fill
    }

    pub fn set_last_child_fill(&mut self, fill: bool) {
        if self.last_child_fill != fill {
            self.last_child_fill = fill;
            self.core.invalidate_measure_local();
        }
    }

    /// Dock side of a child; an unknown id reads as the documented default.
    pub fn dock_of(&self, child_id: u64) -> Dock {
        self.docks.get(&child_id).copied().unwrap_or_default()
    }

    pub fn set_dock(&mut self, child_id: u64, dock: Dock) {
        self.docks.insert(child_id, dock);
        self.core.invalidate_measure_local();
    }

    pub fn add_child(&mut self, mut child: Box<dyn Element>) {
        super::adopt(&mut child, self.core.id);
        self.children.push(child);
        self.core.invalidate_measure_local();
    }

    pub fn add_docked(&mut self, child: Box<dyn Element>, dock: Dock) {
        let id = child.core().id();
        self.add_child(child);
        self.docks.insert(id, dock);
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Box<dyn Element>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.docks.remove(&child.core().id());
        self.core.invalidate_measure_local();
        Some(super::release(child))
    }

    pub fn clear_children(&mut self) {
        for child in self.children.drain(..) {
            self.docks.remove(&child.core().id());
            super::release(child);
        }
        self.core.invalidate_measure_local();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    pub(crate) fn attached_entries(&self) -> usize {
        self.docks.len()
    }

    fn fills(&self, index: usize) -> bool {
        self.last_child_fill && index + 1 == self.children.len()
    }
}

impl Default for DockPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for DockPanel {
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
        let count = self.children.len();
        let mut used_x: f32 = 0.0;
        let mut used_y: f32 = 0.0;
        let mut desired_x: f32 = 0.0;
        let mut desired_y: f32 = 0.0;

        for index in 0..count {
            let fills = self.last_child_fill && index + 1 == count;
            let dock = self.docks
                .get(&self.children[index].core().id())
                .copied()
                .unwrap_or_default();
            let remaining = Size::new(
                (available.width - used_x).max(0.0),
                (available.height - used_y).max(0.0),
            );
            let child = &mut self.children[index];

            if fills {
                // Learn the natural size first, then let wrapping content
                // react to the real remainder.
                child.measure(Size::UNBOUNDED);
                child.measure(remaining);
                let d = child.core().desired_size();
                desired_x = desired_x.max(used_x + d.width);
                desired_y = desired_y.max(used_y + d.height);
                continue;
            }

            child.measure(remaining);
            let d = child.core().desired_size();
            match dock {
                Dock::Left | Dock::Right => {
                    desired_y = desired_y.max(used_y + d.height);
                    used_x += d.width;
                }
                Dock::Top | Dock::Bottom => {
                    desired_x = desired_x.max(used_x + d.width);
                    used_y += d.height;
                }
            }
        }

        Size::new(desired_x.max(used_x), desired_y.max(used_y))
    }

    fn arrange_override(&mut self, content: Rect) {
        let count = self.children.len();
        let mut remaining = content;

        for index in 0..count {
            let fills = self.fills(index);
            let dock = self.docks
                .get(&self.children[index].core().id())
                .copied()
                .unwrap_or_default();
            let child = &mut self.children[index];

            if fills {
                child.arrange(remaining);
                continue;
            }

            let d = child.core().desired_size();
            let slot = match dock {
                Dock::Left => {
                    let w = d.width.min(remaining.width);
                    let slot = Rect::new(remaining.x, remaining.y, w, remaining.height);
                    remaining.x += w;
                    remaining.width -= w;
                    slot
                }
                Dock::Right => {
                    let w = d.width.min(remaining.width);
                    let slot =
                        Rect::new(remaining.right() - w, remaining.y, w, remaining.height);
                    remaining.width -= w;
                    slot
                }
                Dock::Top => {
                    let h = d.height.min(remaining.height);
                    let slot = Rect::new(remaining.x, remaining.y, remaining.width, h);
                    remaining.y += h;
                    remaining.height -= h;
                    slot
                }
                Dock::Bottom => {
                    let h = d.height.min(remaining.height);
                    let slot =
                        Rect::new(remaining.x, remaining.bottom() - h, remaining.width, h);
                    remaining.height -= h;
                    slot
                }
            };
            child.arrange(slot);
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
