//! weft: the layout and scene-graph core of a retained-mode UI toolkit.
//!
//! A tree of [`element::Element`] nodes is measured bottom-up
//! (`measure(available)` caches a desired size), arranged top-down
//! (`arrange(slot)` places pixel-snapped bounds), and then rendered and
//! hit-tested by independent traversals. Property changes invalidate the
//! path to the root through dirty flags; a [`ui::LayoutHost`] polls that
//! state and drives bounded re-layout passes.
//!
//! Rendering backends, the window/event pump, data binding and control
//! paint logic live outside this crate, behind [`element::DrawSurface`]
//! and [`element::TextMeasure`].

pub mod element;
pub mod geometry;
pub mod panel;
pub mod ui;

pub use element::{
    Container, DrawSurface, Element, ElementCore, ElementFlags, FixedMeasurer, FontCache,
    FontKey, FontSpec, HorizontalAlignment, LayoutStyle, TextBlock, TextMeasure,
    VerticalAlignment, dispose_tree, hit_test, invalidate_arrange, invalidate_measure,
    render_tree, update_hover,
};
pub use geometry::{Point, Rect, Size, Thickness, Vector};
pub use panel::{
    Canvas, CanvasAnchors, Dock, DockPanel, Grid, GridCell, GridLength, Orientation, StackPanel,
    TrackDefinition, UniformGrid, WrapPanel,
};
pub use ui::{FocusError, FocusManager, LayoutHost, MAX_LAYOUT_PASSES, collect_focus_order};
