use rustc_hash::FxHashMap;

use crate::element::{Element, ElementCore, LayoutStyle};
use crate::geometry::{Rect, Size};

/// Requested length of a grid track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridLength {
    /// Sized to content.
    Auto,
    /// Fixed device-independent pixels.
    Px(f32),
    /// Weighted share of the space remaining after Auto and Px tracks.
    Star(f32),
}

impl GridLength {
    pub fn is_star(self) -> bool {
        matches!(self, GridLength::Star(_))
    }
}

/// One row or column. `actual` and `offset` are transient outputs of the
/// most recent size-resolution step and carry no meaning between passes.
#[derive(Clone, Copy, Debug)]
pub struct TrackDefinition {
    pub length: GridLength,
    pub min: f32,
    pub max: f32,
    actual: f32,
    offset: f32,
}

impl TrackDefinition {
    pub fn new(length: GridLength) -> Self {
        Self {
            length,
            min: 0.0,
            max: f32::INFINITY,
            actual: 0.0,
            offset: 0.0,
        }
    }

    pub fn auto() -> Self {
        Self::new(GridLength::Auto)
    }

    pub fn px(value: f32) -> Self {
        Self::new(GridLength::Px(value))
    }

    pub fn star(weight: f32) -> Self {
        Self::new(GridLength::Star(weight.max(0.0)))
    }

    pub fn with_min(mut self, min: f32) -> Self {
        self.min = min.max(0.0);
        self
    }

    pub fn with_max(mut self, max: f32) -> Self {
        self.max = max.max(0.0);
        self
    }

    pub fn actual(&self) -> f32 {
        self.actual
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    fn clamp(&self, value: f32) -> f32 {
        let min = self.min.max(0.0);
        let max = self.max.max(min);
        value.max(min).min(max)
    }
}

/// Cell assignment of a grid child. Indices outside the defined tracks are
/// clamped into range at layout time; spans are at least one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl GridCell {
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
        }
    }

    pub fn spanning(row: usize, col: usize, row_span: usize, col_span: usize) -> Self {
        Self {
            row,
            col,
            row_span: row_span.max(1),
            col_span: col_span.max(1),
        }
    }
}

#[derive(Clone, Copy)]
struct CellExtent {
    first: usize,
    span: usize,
}

/// Resolves a cell assignment against the real track count.
fn clamp_extent(first: usize, span: usize, track_count: usize) -> CellExtent {
    let first = first.min(track_count - 1);
    let span = span.max(1).min(track_count - first);
    CellExtent { first, span }
}

/// Resolves track sizes for one axis.
///
/// Px tracks take their clamped fixed length; Auto tracks take the largest
/// per-track content requirement collected from children; Star tracks split
/// whatever remains of a bounded `available` in proportion to weight, each
/// clamped to its own min/max without redistributing the clamped excess.
/// Under an unbounded `available` Star tracks size like Auto tracks so the
/// axis reports a finite natural extent. Offsets are cumulative sums,
/// written once all star distribution is final.
fn resolve_tracks(tracks: &mut [TrackDefinition], requirements: &[f32], available: f32) {
    let bounded = available.is_finite();
    let mut fixed: f32 = 0.0;
    let mut star_total: f32 = 0.0;

    for (track, requirement) in tracks.iter_mut().zip(requirements) {
        match track.length {
            GridLength::Px(px) => {
                track.actual = track.clamp(px.max(0.0));
                fixed += track.actual;
            }
            GridLength::Auto => {
                track.actual = track.clamp(*requirement);
                fixed += track.actual;
            }
            GridLength::Star(weight) => {
                if bounded {
                    star_total += weight.max(0.0);
                } else {
                    track.actual = track.clamp(*requirement);
                    fixed += track.actual;
                }
            }
        }
    }

    if bounded {
        let remaining = (available - fixed).max(0.0);
        for track in tracks.iter_mut() {
            if let GridLength::Star(weight) = track.length {
                let share = if star_total > 0.0 {
                    remaining * weight.max(0.0) / star_total
                } else {
                    0.0
                };
                track.actual = track.clamp(share);
            }
        }
    }

    let mut offset: f32 = 0.0;
    for track in tracks.iter_mut() {
        track.offset = offset;
        offset += track.actual;
    }
}

fn span_extent(tracks: &[TrackDefinition], extent: CellExtent) -> f32 {
    tracks[extent.first..extent.first + extent.span]
        .iter()
        .map(|t| t.actual)
        .sum()
}

/// Per-child measurement constraint along one axis: fixed tracks contribute
/// their resolved size, content-sized and star tracks are unbounded.
fn measure_constraint(tracks: &[TrackDefinition], extent: CellExtent) -> f32 {
    let mut total: f32 = 0.0;
    for track in &tracks[extent.first..extent.first + extent.span] {
        match track.length {
            GridLength::Px(_) => total += track.actual,
            GridLength::Auto | GridLength::Star(_) => return f32::INFINITY,
        }
    }
    total
}

/// Panel with rows and columns of mixed fixed, content-sized and
/// star-weighted tracks. Children are assigned cells (with spans) through a
/// side table keyed by child id.
pub struct Grid {
    core: ElementCore,
    style: LayoutStyle,
    children: Vec<Box<dyn Element>>,
    rows: Vec<TrackDefinition>,
    cols: Vec<TrackDefinition>,
    cells: FxHashMap<u64, GridCell>,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            children: Vec::new(),
            rows: Vec::new(),
            cols: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    pub fn add_row(&mut self, row: TrackDefinition) {
        self.rows.push(row);
        self.core.invalidate_measure_local();
    }

    pub fn add_column(&mut self, col: TrackDefinition) {
        self.cols.push(col);
        self.core.invalidate_measure_local();
    }

    pub fn rows(&self) -> &[TrackDefinition] {
        &self.rows
    }

    pub fn columns(&self) -> &[TrackDefinition] {
        &self.cols
    }

    /// Cell of a child; an unknown id reads as cell (0, 0) spanning one.
    pub fn cell_of(&self, child_id: u64) -> GridCell {
        self.cells
            .get(&child_id)
            .copied()
            .map(|c| GridCell {
                row: c.row,
                col: c.col,
                row_span: c.row_span.max(1),
                col_span: c.col_span.max(1),
            })
            .unwrap_or(GridCell::at(0, 0))
    }

    pub fn set_cell(&mut self, child_id: u64, cell: GridCell) {
        self.cells.insert(child_id, cell);
        self.core.invalidate_measure_local();
    }

    pub fn add_child(&mut self, mut child: Box<dyn Element>, cell: GridCell) {
        super::adopt(&mut child, self.core.id);
        self.cells.insert(child.core().id(), cell);
        self.children.push(child);
        self.core.invalidate_measure_local();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Box<dyn Element>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.cells.remove(&child.core().id());
        self.core.invalidate_measure_local();
        Some(super::release(child))
    }

    pub fn clear_children(&mut self) {
        for child in self.children.drain(..) {
            self.cells.remove(&child.core().id());
            super::release(child);
        }
        self.core.invalidate_measure_local();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    pub(crate) fn attached_entries(&self) -> usize {
        self.cells.len()
    }

    fn ensure_tracks(&mut self) {
        if self.rows.is_empty() {
            self.rows.push(TrackDefinition::star(1.0));
        }
        if self.cols.is_empty() {
            self.cols.push(TrackDefinition::star(1.0));
        }
    }

    fn child_extents(&self, child_id: u64) -> (CellExtent, CellExtent) {
        let cell = self.cell_of(child_id);
        (
            clamp_extent(cell.row, cell.row_span, self.rows.len()),
            clamp_extent(cell.col, cell.col_span, self.cols.len()),
        )
    }

    /// Content requirements per track: each child distributes its desired
    /// extent evenly over the tracks it spans. The even division is a known
    /// approximation that under-sizes a track when several spanning
    /// children compete; dependent layouts were tuned against it.
    fn collect_requirements(&self) -> (Vec<f32>, Vec<f32>) {
        let mut row_req = vec![0.0f32; self.rows.len()];
        let mut col_req = vec![0.0f32; self.cols.len()];

        for child in &self.children {
            if !child.core().is_visible() {
                continue;
            }
            let desired = child.core().desired_size();
            let (rows, cols) = self.child_extents(child.core().id());

            let per_row = desired.height / rows.span as f32;
            for req in &mut row_req[rows.first..rows.first + rows.span] {
                *req = req.max(per_row);
            }
            let per_col = desired.width / cols.span as f32;
            for req in &mut col_req[cols.first..cols.first + cols.span] {
                *req = req.max(per_col);
            }
        }

        (row_req, col_req)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Grid {
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
        self.ensure_tracks();

        // Fixed tracks resolve up front so fixed-celled children see a real
        // constraint; everything else measures unbounded first.
        let no_req_rows = vec![0.0; self.rows.len()];
        let no_req_cols = vec![0.0; self.cols.len()];
        resolve_tracks(&mut self.rows, &no_req_rows, f32::INFINITY);
        resolve_tracks(&mut self.cols, &no_req_cols, f32::INFINITY);

        for index in 0..self.children.len() {
            let id = self.children[index].core().id();
            let (rows, cols) = self.child_extents(id);
            let constraint = Size::new(
                measure_constraint(&self.cols, cols),
                measure_constraint(&self.rows, rows),
            );
            self.children[index].measure(constraint);
        }

        let (row_req, col_req) = self.collect_requirements();
        resolve_tracks(&mut self.rows, &row_req, available.height);
        resolve_tracks(&mut self.cols, &col_req, available.width);

        // Children in star cells re-measure against their resolved share so
        // wrapping content reacts before arrange.
        if available.width.is_finite() || available.height.is_finite() {
            for index in 0..self.children.len() {
                let id = self.children[index].core().id();
                let (rows, cols) = self.child_extents(id);
                let spans_star = self.rows[rows.first..rows.first + rows.span]
                    .iter()
                    .any(|t| t.length.is_star())
                    || self.cols[cols.first..cols.first + cols.span]
                        .iter()
                        .any(|t| t.length.is_star());
                if spans_star {
                    let constraint = Size::new(
                        span_extent(&self.cols, cols),
                        span_extent(&self.rows, rows),
                    );
                    self.children[index].measure(constraint);
                }
            }
        }

        Size::new(
            self.cols.iter().map(|t| t.actual).sum(),
            self.rows.iter().map(|t| t.actual).sum(),
        )
    }

    fn arrange_override(&mut self, content: Rect) {
        self.ensure_tracks();

        let (row_req, col_req) = self.collect_requirements();
        resolve_tracks(&mut self.rows, &row_req, content.height);
        resolve_tracks(&mut self.cols, &col_req, content.width);

        for index in 0..self.children.len() {
            let id = self.children[index].core().id();
            let (rows, cols) = self.child_extents(id);
            let slot = Rect::new(
                content.x + self.cols[cols.first].offset,
                content.y + self.rows[rows.first].offset,
                span_extent(&self.cols, cols),
                span_extent(&self.rows, rows),
            );
            self.children[index].arrange(slot);
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

    fn resolved(tracks: &[TrackDefinition]) -> Vec<f32> {
        tracks.iter().map(|t| t.actual()).collect()
    }

    #[test]
    fn star_tracks_split_the_remainder_by_weight() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::auto());
        grid.add_column(TrackDefinition::star(1.0));
        grid.add_column(TrackDefinition::star(2.0));
        grid.add_row(TrackDefinition::star(1.0));
        grid.add_child(block(40.0, 10.0), GridCell::at(0, 0));

        grid.measure(Size::new(190.0, 100.0));
        grid.arrange(Rect::new(0.0, 0.0, 190.0, 100.0));

        assert_eq!(resolved(grid.columns()), vec![40.0, 50.0, 100.0]);
    }

    #[test]
    fn clamped_star_excess_is_not_redistributed() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::star(1.0).with_max(30.0));
        grid.add_column(TrackDefinition::star(1.0));
        grid.add_row(TrackDefinition::star(1.0));

        grid.measure(Size::new(200.0, 100.0));
        grid.arrange(Rect::new(0.0, 0.0, 200.0, 100.0));

        // Each star's share is 100; the clamped track keeps 30 and the
        // excess 70 is lost, not handed to its sibling.
        assert_eq!(resolved(grid.columns()), vec![30.0, 100.0]);
    }

    #[test]
    fn unbounded_measure_sizes_stars_like_auto() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::star(1.0));
        grid.add_column(TrackDefinition::star(3.0));
        grid.add_row(TrackDefinition::auto());
        grid.add_child(block(40.0, 10.0), GridCell::at(0, 0));
        grid.add_child(block(25.0, 10.0), GridCell::at(0, 1));

        grid.measure(Size::UNBOUNDED);
        // Natural size is content-based, not proportional.
        assert_eq!(grid.core().desired_size(), Size::new(65.0, 10.0));
    }

    #[test]
    fn pixel_tracks_clamp_to_min_max() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::px(50.0).with_max(30.0));
        grid.add_column(TrackDefinition::px(5.0).with_min(10.0));
        grid.add_row(TrackDefinition::star(1.0));

        grid.measure(Size::new(100.0, 100.0));
        grid.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        assert_eq!(resolved(grid.columns()), vec![30.0, 10.0]);
    }

    #[test]
    fn spanning_child_requirement_is_divided_by_span() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::auto());
        grid.add_column(TrackDefinition::auto());
        grid.add_row(TrackDefinition::auto());
        grid.add_child(block(80.0, 10.0), GridCell::spanning(0, 0, 1, 2));

        grid.measure(Size::UNBOUNDED);
        // 80 over two auto tracks: 40 each.
        assert_eq!(resolved(grid.columns()), vec![40.0, 40.0]);
    }

    #[test]
    fn out_of_range_cell_is_clamped_into_the_tracks() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::px(30.0));
        grid.add_row(TrackDefinition::px(30.0));
        grid.add_child(block(10.0, 10.0), GridCell::at(7, 9));

        grid.measure(Size::new(30.0, 30.0));
        grid.arrange(Rect::new(0.0, 0.0, 30.0, 30.0));

        let bounds = grid.children().unwrap()[0].core().bounds();
        assert!(bounds.x < 30.0 && bounds.y < 30.0);
    }

    #[test]
    fn offsets_accumulate_resolved_tracks() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::px(20.0));
        grid.add_column(TrackDefinition::px(30.0));
        grid.add_column(TrackDefinition::px(10.0));
        grid.add_row(TrackDefinition::px(10.0));

        grid.measure(Size::new(60.0, 10.0));
        grid.arrange(Rect::new(0.0, 0.0, 60.0, 10.0));

        let offsets: Vec<f32> = grid.columns().iter().map(|t| t.offset()).collect();
        assert_eq!(offsets, vec![0.0, 20.0, 50.0]);
    }

    #[test]
    fn children_land_in_their_cells() {
        let mut grid = Grid::new();
        grid.add_column(TrackDefinition::px(40.0));
        grid.add_column(TrackDefinition::star(1.0));
        grid.add_row(TrackDefinition::px(20.0));
        grid.add_row(TrackDefinition::star(1.0));
        grid.add_child(block(10.0, 10.0), GridCell::at(1, 1));

        grid.measure(Size::new(100.0, 100.0));
        grid.arrange(Rect::new(0.0, 0.0, 100.0, 100.0));

        let bounds = grid.children().unwrap()[0].core().bounds();
        // Cell (1,1) starts at the fixed track extents; a 10x10 block
        // centers in the 60x80 star cell.
        assert_eq!(bounds, Rect::new(65.0, 55.0, 10.0, 10.0));
    }

    #[test]
    fn removing_a_child_prunes_its_cell_entry() {
        let mut grid = Grid::new();
        grid.add_child(block(10.0, 10.0), GridCell::at(0, 0));
        assert_eq!(grid.attached_entries(), 1);
        grid.remove_child(0);
        assert_eq!(grid.attached_entries(), 0);
    }
}
