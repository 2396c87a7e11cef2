use crate::foundation::color::Color;
use crate::shape::context::RenderContext;

/// Decorator family, used for lookup and removal by type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    Border,
    Fill,
    Opacity,
    Glow,
}

/// Multiplicative opacity factor, always in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityScale {
    alpha: f64,
}

impl OpacityScale {
    /// Out-of-range input is clamped.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}

/// Stroke-based highlight, optionally fading out linearly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: Color,
    /// Stroke width at full strength.
    pub intensity: f64,
    created_ms: f64,
    fade_ms: Option<f64>,
}

impl Glow {
    /// Persistent glow.
    pub fn new(color: Color, intensity: f64) -> Self {
        Self {
            color,
            intensity,
            created_ms: 0.0,
            fade_ms: None,
        }
    }

    /// Glow created at `created_ms` that decays to nothing over `fade_ms`.
    pub fn fading(color: Color, intensity: f64, fade_ms: f64, created_ms: f64) -> Self {
        Self {
            color,
            intensity,
            created_ms,
            fade_ms: Some(fade_ms),
        }
    }

    pub fn created_ms(&self) -> f64 {
        self.created_ms
    }

    pub fn fade_ms(&self) -> Option<f64> {
        self.fade_ms
    }

    /// `true` once the fade window has fully elapsed. Persistent glows never expire.
    pub fn is_expired(&self, now_ms: f64) -> bool {
        match self.fade_ms {
            Some(fade) => now_ms - self.created_ms >= fade,
            None => false,
        }
    }

    /// Stroke width contributed at `now_ms`.
    pub fn width_at(&self, now_ms: f64) -> f64 {
        let Some(fade) = self.fade_ms else {
            return self.intensity;
        };
        if self.is_expired(now_ms) {
            return 0.0;
        }
        let elapsed = (now_ms - self.created_ms).max(0.0);
        self.intensity * (1.0 - elapsed / fade)
    }
}

/// One step of a shape's decorator chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decorator {
    /// Overwrites stroke color and width.
    Border { color: Color, width: f64 },
    /// Overwrites the fill color.
    Fill { color: Color },
    /// Multiplies the running opacity.
    Opacity(OpacityScale),
    Glow(Glow),
}

impl Decorator {
    pub fn border(color: Color, width: f64) -> Self {
        Self::Border { color, width }
    }

    pub fn fill(color: Color) -> Self {
        Self::Fill { color }
    }

    pub fn opacity(alpha: f64) -> Self {
        Self::Opacity(OpacityScale::new(alpha))
    }

    pub fn glow(color: Color, intensity: f64) -> Self {
        Self::Glow(Glow::new(color, intensity))
    }

    pub fn fading_glow(color: Color, intensity: f64, fade_ms: f64, now_ms: f64) -> Self {
        Self::Glow(Glow::fading(color, intensity, fade_ms, now_ms))
    }

    pub fn kind(&self) -> DecoratorKind {
        match self {
            Self::Border { .. } => DecoratorKind::Border,
            Self::Fill { .. } => DecoratorKind::Fill,
            Self::Opacity(_) => DecoratorKind::Opacity,
            Self::Glow(_) => DecoratorKind::Glow,
        }
    }

    /// `true` for a glow whose fade window has elapsed.
    pub fn is_expired(&self, now_ms: f64) -> bool {
        matches!(self, Self::Glow(g) if g.is_expired(now_ms))
    }

    /// Transform `ctx`; glows read `now_ms` to compute their fade.
    pub fn apply(&self, mut ctx: RenderContext, now_ms: f64) -> RenderContext {
        match *self {
            Self::Border { color, width } => {
                ctx.stroke = Some(color);
                ctx.stroke_width = width;
            }
            Self::Fill { color } => ctx.fill = color,
            Self::Opacity(scale) => ctx.opacity *= scale.alpha(),
            Self::Glow(glow) => {
                if !glow.is_expired(now_ms) {
                    ctx.stroke = Some(glow.color);
                    ctx.stroke_width = glow.width_at(now_ms);
                }
            }
        }
        ctx
    }
}

/// Fold `base` through `chain` left to right.
pub fn fold<'a>(
    base: RenderContext,
    chain: impl IntoIterator<Item = &'a Decorator>,
    now_ms: f64,
) -> RenderContext {
    chain
        .into_iter()
        .fold(base, |ctx, decorator| decorator.apply(ctx, now_ms))
}

#[cfg(test)]
#[path = "../../tests/unit/shape/decorator.rs"]
mod tests;
