use crate::foundation::color::Color;

/// Fully resolved visual parameters for one draw.
///
/// Built from a shape's base attributes and folded through its decorator chain before
/// every render. Never stored between renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    pub fill: Color,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    /// Whole-drawable opacity in `[0, 1]`.
    pub opacity: f64,
}

impl RenderContext {
    /// Filled, unstroked, fully opaque.
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    /// Stroke color to paint, if the stroke is visible at all.
    pub fn visible_stroke(&self) -> Option<Color> {
        self.stroke.filter(|_| self.stroke_width > 0.0)
    }

    /// `true` when a stroke color is set and the width is positive.
    pub fn has_stroke(&self) -> bool {
        self.visible_stroke().is_some()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::filled(Color::WHITE)
    }
}
