use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

/// Equal-celled grid. Row/column counts are explicit or derived to be as
/// square as possible from the number of visible children; every cell gets
/// the size of the largest child and trailing cells stay empty.
pub struct UniformGrid {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    rows: usize,
    columns: usize,
}

impl UniformGrid {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            rows: 0,
            columns: 0,
        }
    }

    /// Zero means "derive from the child count".
    pub fn set_rows(&mut self, rows: usize) {
        if self.rows != rows {
            self.rows = rows;
            self.core.invalidate_measure_local();
        }
    }

    pub fn set_columns(&mut self, columns: usize) {
        if self.columns != columns {
            self.columns = columns;
            self.core.invalidate_measure_local();
        }
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

    fn visible_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.core().is_visible())
            .count()
    }

    /// Resolved (columns, rows) for `n` visible children.
    fn resolve_counts(&self, n: usize) -> (usize, usize) {
        let n = n.max(1);
        let columns = if self.columns > 0 {
            self.columns
        } else if self.rows > 0 {
            n.div_ceil(self.rows)
        } else {
            (n as f32).sqrt().ceil() as usize
        };
        let rows = if self.rows > 0 {
            self.rows
        } else {
            n.div_ceil(columns)
        };
        (columns.max(1), rows.max(1))
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for UniformGrid {
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
        let (columns, rows) = self.resolve_counts(self.visible_count());
        let cell = Size::new(
            available.width / columns as f32,
            available.height / rows as f32,
        );

        let mut largest = Size::ZERO;
        for child in &mut self.children {
            child.measure(cell);
            if child.core().is_visible() {
                largest = largest.max(child.core().desired_size());
            }
        }

        Size::new(largest.width * columns as f32, largest.height * rows as f32)
    }

    fn arrange_override(&mut self, content: Rect) {
        let (columns, rows) = self.resolve_counts(self.visible_count());
        let cell_width = content.width / columns as f32;
        let cell_height = content.height / rows as f32;

        let mut slot_index = 0usize;
        for child in &mut self.children {
            if !child.core().is_visible() {
                child.arrange(Rect::new(content.x, content.y, 0.0, 0.0));
                continue;
            }
            let col = slot_index % columns;
            let row = slot_index / columns;
            child.arrange(Rect::new(
                content.x + col as f32 * cell_width,
                content.y + row as f32 * cell_height,
                cell_width,
                cell_height,
            ));
            slot_index += 1;
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

    fn block(width: f32, height: f32) -> Box<dyn Element> {
        let mut c = Container::new();
        c.style_mut().width = Some(width);
        c.style_mut().height = Some(height);
        Box::new(c)
    }

    #[test]
    fn five_children_derive_three_by_two() {
        let grid = {
            let mut g = UniformGrid::new();
            for _ in 0..5 {
                g.add_child(block(10.0, 10.0));
            }
            g
        };
        assert_eq!(grid.resolve_counts(5), (3, 2));
    }

    #[test]
    fn trailing_cells_stay_empty() {
        let mut grid = UniformGrid::new();
        for _ in 0..5 {
            grid.add_child(block(10.0, 10.0));
        }
        grid.measure(Size::new(90.0, 60.0));
        grid.arrange(Rect::new(0.0, 0.0, 90.0, 60.0));

        // Fifth child sits in cell (1, 1); cell (1, 2) has no occupant.
        let children = grid.children().unwrap();
        let fifth = children[4].core().bounds();
        assert_eq!((fifth.x, fifth.y), (40.0, 40.0));
    }

    #[test]
    fn all_cells_share_the_largest_child_size() {
        let mut grid = UniformGrid::new();
        grid.add_child(block(10.0, 10.0));
        grid.add_child(block(40.0, 25.0));

        grid.measure(Size::UNBOUNDED);
        // 2 children -> 2 columns, 1 row; each cell 40x25.
        assert_eq!(grid.core().desired_size(), Size::new(80.0, 25.0));
    }

    #[test]
    fn invisible_children_are_skipped_when_counting_and_placing() {
        let mut grid = UniformGrid::new();
        grid.add_child(block(10.0, 10.0));
        let mut hidden = Container::new();
        hidden.core_mut().set_visible(false);
        grid.add_child(Box::new(hidden));
        grid.add_child(block(10.0, 10.0));

        // Two visible children: 2 columns, 1 row.
        assert_eq!(grid.resolve_counts(grid.visible_count()), (2, 1));

        grid.measure(Size::new(100.0, 50.0));
        grid.arrange(Rect::new(0.0, 0.0, 100.0, 50.0));

        let children = grid.children().unwrap();
        // The third child takes the second slot, not the third.
        assert_eq!(children[2].core().bounds().x, 70.0);
    }

    #[test]
    fn explicit_rows_derive_columns() {
        let mut grid = UniformGrid::new();
        grid.set_rows(2);
        assert_eq!(grid.resolve_counts(5), (3, 2));
    }
}
