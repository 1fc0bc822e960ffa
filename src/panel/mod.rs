//! Panels: container elements that position collections of children.
//!
//! Every panel measures its children in a first pass (with panel-specific
//! constraints, often unbounded to discover natural sizes) and derives final
//! placement from the real arranged rectangle in an independent second pass.
//! Panels that annotate children they don't own the type of (dock side, grid
//! cell, canvas anchors) keep that metadata in a side table keyed by child
//! id and prune it when the child is removed.

mod canvas;
mod dock;
mod grid;
mod stack;
mod uniform;
mod wrap;

pub use canvas::*;
pub use dock::*;
pub use grid::*;
pub use stack::*;
pub use uniform::*;
pub use wrap::*;

use crate::element::Element;

pub(crate) fn adopt(child: &mut Box<dyn Element>, parent_id: u64) {
    child.core_mut().parent_id = Some(parent_id);
}

pub(crate) fn release(mut child: Box<dyn Element>) -> Box<dyn Element> {
    child.core_mut().parent_id = None;
    child
}
