use super::core::ElementCore;
use super::element::Element;
use super::style::LayoutStyle;
use crate::geometry::{Rect, Size};

/// Single-content container: owns at most one child and lays it out inside
/// its own padding. The minimal building block for decorating or wrapping
/// one element.
pub struct Container {
    core: ElementCore,
    style: LayoutStyle,
    child: Option<Box<dyn Element>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            child: None,
        }
    }

    pub fn child(&self) -> Option<&dyn Element> {
        self.child.as_deref()
    }

    /// Replaces the content. The old child (if any) is returned with its
    /// parent link severed; the new child is re-parented to this container.
    pub fn set_child(&mut self, mut child: Box<dyn Element>) -> Option<Box<dyn Element>> {
        child.core_mut().parent_id = Some(self.core.id);
        let old = self.child.replace(child);
        self.core.invalidate_measure_local();
        old.map(|mut old| {
            old.core_mut().parent_id = None;
            old
        })
    }

    pub fn take_child(&mut self) -> Option<Box<dyn Element>> {
        let old = self.child.take();
        self.core.invalidate_measure_local();
        old.map(|mut old| {
            old.core_mut().parent_id = None;
            old
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Container {
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
        self.child.as_ref().map(std::slice::from_ref)
    }

    fn children_mut(&mut self) -> Option<&mut [Box<dyn Element>]> {
        self.child.as_mut().map(std::slice::from_mut)
    }

    fn measure_override(&mut self, available: Size) -> Size {
        match &mut self.child {
            Some(child) => {
                child.measure(available);
                child.core().desired_size()
            }
            None => Size::ZERO,
        }
    }

    fn arrange_override(&mut self, content: Rect) {
        if let Some(child) = &mut self.child {
            child.arrange(content);
        }
    }

    fn dispose(&mut self) {
        self.child = None;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
