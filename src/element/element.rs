use std::any::Any;

use super::core::ElementCore;
use super::style::{HorizontalAlignment, LayoutStyle, VerticalAlignment};
use crate::geometry::{Point, Rect, Size};

/// Opaque drawing surface owned by the rendering backend. The core never
/// interprets it; concrete node types downcast to the backend they were
/// built for.
pub trait DrawSurface {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A node of the visual tree.
///
/// Concrete kinds (panels, leaf controls) implement the `*_override` hooks;
/// the provided `measure`/`arrange` wrappers own the caching, margin,
/// clamping, alignment and pixel-snapping contract and must be the only way
/// layout enters a node.
pub trait Element: Any {
    fn core(&self) -> &ElementCore;
    fn core_mut(&mut self) -> &mut ElementCore;
    fn style(&self) -> &LayoutStyle;
    fn style_mut(&mut self) -> &mut LayoutStyle;

    fn children(&self) -> Option<&[Box<dyn Element>]> {
        None
    }

    fn children_mut(&mut self) -> Option<&mut [Box<dyn Element>]> {
        None
    }

    /// Content measurement hook: returns the natural size of the content
    /// given an already margin/padding/constraint-adjusted available size.
    fn measure_override(&mut self, available: Size) -> Size {
        let _ = available;
        Size::ZERO
    }

    /// Content arrangement hook: places children within the final content
    /// rectangle (bounds deflated by padding, in root coordinates).
    fn arrange_override(&mut self, content: Rect) {
        let _ = content;
    }

    /// Per-node point containment. The default tests the arranged bounds;
    /// non-rectangular controls override this.
    fn hit_test_self(&self, point: Point) -> bool {
        self.core().bounds().contains(point)
    }

    fn on_render(&self, surface: &mut dyn DrawSurface) {
        let _ = surface;
    }

    /// Kind-specific teardown. Called leaf-first by
    /// [`super::dispose_tree`]; implementations release cached resources
    /// and drop child links.
    fn dispose(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Computes and caches the desired size under `available`.
    ///
    /// Invisible nodes measure to zero without entering the content hook.
    /// A clean node re-measured with an identical constraint is a no-op.
    fn measure(&mut self, available: Size) {
        let available = available.non_negative();

        if !self.core().is_visible() {
            let core = self.core_mut();
            core.desired_size = Size::ZERO;
            core.last_constraint = Some(available);
            core.flags.remove(super::core::ElementFlags::MEASURE_DIRTY);
            return;
        }

        if !self.core().needs_measure() && self.core().last_constraint == Some(available) {
            return;
        }

        let style = self.style().clone();
        let inner = available.deflate(style.margin);
        let constrained = style.clamp_size(inner);
        let content_available = constrained.deflate(style.padding);

        let content = self.measure_override(content_available).non_negative();

        let desired = style
            .clamp_size(content.inflate(style.padding))
            .inflate(style.margin);

        let core = self.core_mut();
        core.desired_size = desired;
        core.last_constraint = Some(available);
        core.flags.remove(super::core::ElementFlags::MEASURE_DIRTY);
    }

    /// Places the node into `slot` (root coordinates).
    ///
    /// The placed rectangle is derived from the slot via margin subtraction,
    /// explicit/min/max clamping and per-axis alignment, then snapped to the
    /// device pixel grid. If the result equals the cached bounds and the node
    /// is not arrange-dirty, nothing happens: re-arranging with an unchanged
    /// rectangle must never ripple through a clean subtree.
    fn arrange(&mut self, slot: Rect) {
        let slot = Rect {
            x: slot.x,
            y: slot.y,
            width: slot.width.max(0.0),
            height: slot.height.max(0.0),
        };

        if !self.core().is_visible() {
            let core = self.core_mut();
            core.bounds = Rect::new(slot.x, slot.y, 0.0, 0.0);
            core.flags.remove(super::core::ElementFlags::ARRANGE_DIRTY);
            return;
        }

        let style = self.style().clone();
        let inner = slot.deflate(style.margin);
        let desired = self.core().desired_size();
        let bounds_x = style.bounds_x();
        let bounds_y = style.bounds_y();

        let mut width = bounds_x.clamp((desired.width - style.margin.horizontal()).max(0.0));
        let mut height = bounds_y.clamp((desired.height - style.margin.vertical()).max(0.0));

        match style.horizontal_alignment {
            HorizontalAlignment::Stretch => width = bounds_x.clamp(inner.width),
            _ => width = width.min(inner.width),
        }
        match style.vertical_alignment {
            VerticalAlignment::Stretch => height = bounds_y.clamp(inner.height),
            _ => height = height.min(inner.height),
        }

        let x = match style.horizontal_alignment {
            HorizontalAlignment::Left => inner.x,
            HorizontalAlignment::Right => inner.x + inner.width - width,
            // A stretched node clamped below the slot centers, same as Center.
            HorizontalAlignment::Center | HorizontalAlignment::Stretch => {
                inner.x + (inner.width - width) / 2.0
            }
        };
        let y = match style.vertical_alignment {
            VerticalAlignment::Top => inner.y,
            VerticalAlignment::Bottom => inner.y + inner.height - height,
            VerticalAlignment::Center | VerticalAlignment::Stretch => {
                inner.y + (inner.height - height) / 2.0
            }
        };

        let placed = Rect::new(x, y, width, height).snap_to_device_pixels(self.core().scale());

        if !self.core().needs_arrange() && placed == self.core().bounds() {
            return;
        }

        let content = placed.deflate(style.padding);
        self.arrange_override(content);

        let core = self.core_mut();
        core.bounds = placed;
        core.flags.remove(super::core::ElementFlags::ARRANGE_DIRTY);
        core.flags |= super::core::ElementFlags::NEEDS_PAINT;
    }
}
