use crate::geometry::{Size, Thickness};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Stretch,
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    #[default]
    Stretch,
    Top,
    Center,
    Bottom,
}

/// Effective [min, max] bounds for one axis with any explicit length folded
/// in. An explicit length is authoritative within min/max: it tightens both
/// bounds, so measure results and arrange sizes land on it even when content
/// wants something else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBounds {
    pub min: f32,
    pub max: f32,
}

impl AxisBounds {
    fn resolve(explicit: Option<f32>, min: f32, max: f32) -> Self {
        let min = min.max(0.0);
        let max = max.max(min);
        let upper = explicit.unwrap_or(f32::INFINITY).min(max).max(min);
        let lower = explicit.unwrap_or(0.0).min(upper).max(min);
        Self {
            min: lower,
            max: upper,
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

/// Size, spacing and alignment constraints of a node: the inputs of the
/// shared measure/arrange wrappers.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStyle {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
    pub margin: Thickness,
    pub padding: Thickness,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            min_width: 0.0,
            min_height: 0.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
            margin: Thickness::ZERO,
            padding: Thickness::ZERO,
            horizontal_alignment: HorizontalAlignment::Stretch,
            vertical_alignment: VerticalAlignment::Stretch,
        }
    }
}

impl LayoutStyle {
    pub fn bounds_x(&self) -> AxisBounds {
        AxisBounds::resolve(self.width, self.min_width, self.max_width)
    }

    pub fn bounds_y(&self) -> AxisBounds {
        AxisBounds::resolve(self.height, self.min_height, self.max_height)
    }

    /// Clamps a proposed size to the effective bounds of both axes.
    pub fn clamp_size(&self, size: Size) -> Size {
        Size {
            width: self.bounds_x().clamp(size.width),
            height: self.bounds_y().clamp(size.height),
        }
    }
}
