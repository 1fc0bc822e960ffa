use smol_str::SmolStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::{Rect, Size};

pub(crate) fn next_element_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ElementFlags: u16 {
        /// The cached desired size is stale.
        const MEASURE_DIRTY = 1 << 0;
        /// The cached bounds are stale.
        const ARRANGE_DIRTY = 1 << 1;
        const NEEDS_PAINT = 1 << 2;
        const VISIBLE = 1 << 3;
        const ENABLED = 1 << 4;
        const FOCUSABLE = 1 << 5;
        const HIT_TEST_VISIBLE = 1 << 6;
        const HOVERED = 1 << 7;
        const FOCUSED = 1 << 8;
        const CAPTURED = 1 << 9;
    }
}

impl ElementFlags {
    /// Flags of a freshly created node: dirty on both axes, paintable,
    /// visible, enabled and hit-testable, not focusable.
    pub fn initial() -> Self {
        ElementFlags::MEASURE_DIRTY
            | ElementFlags::ARRANGE_DIRTY
            | ElementFlags::NEEDS_PAINT
            | ElementFlags::VISIBLE
            | ElementFlags::ENABLED
            | ElementFlags::HIT_TEST_VISIBLE
    }
}

/// Per-node layout state shared by every element kind.
///
/// `desired_size` is only valid to read while `MEASURE_DIRTY` is clear,
/// `bounds` only while `ARRANGE_DIRTY` is clear.
pub struct ElementCore {
    pub(crate) id: u64,
    pub(crate) parent_id: Option<u64>,
    pub(crate) desired_size: Size,
    pub(crate) bounds: Rect,
    pub(crate) last_constraint: Option<Size>,
    pub(crate) scale: f32,
    pub(crate) flags: ElementFlags,
    pub(crate) name: SmolStr,
}

impl ElementCore {
    pub fn new() -> Self {
        Self {
            id: next_element_id(),
            parent_id: None,
            desired_size: Size::ZERO,
            bounds: Rect::ZERO,
            last_constraint: None,
            scale: 1.0,
            flags: ElementFlags::initial(),
            name: SmolStr::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn parent_id(&self) -> Option<u64> {
        self.parent_id
    }

    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = if scale > 0.0 { scale } else { 1.0 };
            self.invalidate_measure_local();
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<SmolStr>) {
        self.name = name.into();
    }

    pub fn flags(&self) -> ElementFlags {
        self.flags
    }

    pub fn needs_measure(&self) -> bool {
        self.flags.contains(ElementFlags::MEASURE_DIRTY)
    }

    pub fn needs_arrange(&self) -> bool {
        self.flags.contains(ElementFlags::ARRANGE_DIRTY)
    }

    pub fn needs_paint(&self) -> bool {
        self.flags.contains(ElementFlags::NEEDS_PAINT)
    }

    /// Marks this node's own measure and arrange results stale. Upward
    /// propagation happens in the tree walks of `element::invalidate_measure`.
    pub fn invalidate_measure_local(&mut self) {
        self.flags |= ElementFlags::MEASURE_DIRTY
            | ElementFlags::ARRANGE_DIRTY
            | ElementFlags::NEEDS_PAINT;
    }

    pub fn invalidate_arrange_local(&mut self) {
        self.flags |= ElementFlags::ARRANGE_DIRTY | ElementFlags::NEEDS_PAINT;
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.is_visible() == visible {
            return false;
        }
        self.flags.set(ElementFlags::VISIBLE, visible);
        self.invalidate_measure_local();
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ElementFlags::ENABLED)
    }

    /// Enablement affects rendering and pointer dispatch, never layout.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.is_enabled() == enabled {
            return false;
        }
        self.flags.set(ElementFlags::ENABLED, enabled);
        self.flags |= ElementFlags::NEEDS_PAINT;
        true
    }

    pub fn is_focusable(&self) -> bool {
        self.flags.contains(ElementFlags::FOCUSABLE)
    }

    pub fn set_focusable(&mut self, focusable: bool) {
        self.flags.set(ElementFlags::FOCUSABLE, focusable);
    }

    pub fn is_hit_test_visible(&self) -> bool {
        self.flags.contains(ElementFlags::HIT_TEST_VISIBLE)
    }

    pub fn set_hit_test_visible(&mut self, value: bool) {
        self.flags.set(ElementFlags::HIT_TEST_VISIBLE, value);
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.contains(ElementFlags::HOVERED)
    }

    /// Returns whether the hover state actually changed, so callers can fire
    /// enter/leave notifications only on transitions.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        if self.is_hovered() == hovered {
            return false;
        }
        self.flags.set(ElementFlags::HOVERED, hovered);
        self.flags |= ElementFlags::NEEDS_PAINT;
        true
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(ElementFlags::FOCUSED)
    }

    pub fn set_focused(&mut self, focused: bool) -> bool {
        if self.is_focused() == focused {
            return false;
        }
        self.flags.set(ElementFlags::FOCUSED, focused);
        self.flags |= ElementFlags::NEEDS_PAINT;
        true
    }

    pub fn is_captured(&self) -> bool {
        self.flags.contains(ElementFlags::CAPTURED)
    }

    pub fn set_captured(&mut self, captured: bool) -> bool {
        if self.is_captured() == captured {
            return false;
        }
        self.flags.set(ElementFlags::CAPTURED, captured);
        true
    }
}

impl Default for ElementCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_core_is_dirty_on_both_axes() {
        let core = ElementCore::new();
        assert!(core.needs_measure());
        assert!(core.needs_arrange());
        assert!(core.needs_paint());
    }

    #[test]
    fn ids_are_unique() {
        let a = ElementCore::new();
        let b = ElementCore::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn state_setters_report_transitions_only() {
        let mut core = ElementCore::new();
        assert!(core.set_hovered(true));
        assert!(!core.set_hovered(true));
        assert!(core.set_hovered(false));

        assert!(core.set_focused(true));
        assert!(!core.set_focused(true));

        assert!(core.set_enabled(false));
        assert!(!core.set_enabled(false));
    }

    #[test]
    fn visibility_change_invalidates_measure() {
        let mut core = ElementCore::new();
        core.flags.remove(ElementFlags::MEASURE_DIRTY | ElementFlags::ARRANGE_DIRTY);
        assert!(core.set_visible(false));
        assert!(core.needs_measure());
        assert!(core.needs_arrange());
    }
}
