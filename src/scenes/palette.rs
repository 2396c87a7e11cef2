use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::shape::decorator::Decorator;

/// Viridis-like palette shared by every scene.
pub const PALETTE: [Color; 5] = [
    Color(0x440154),
    Color(0x3b528b),
    Color(0x21918c),
    Color(0x5ec962),
    Color(0xfde725),
];

pub const GLOW_WHITE: Color = Color(0xffffff);
pub const GLOW_TEAL: Color = Color(0x21918c);
pub const GLOW_PURPLE: Color = Color(0x440154);

/// Palette entry `i`, wrapping.
pub fn cycle(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}

pub fn random_color(rng: &mut impl Rng) -> Color {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Parameters of a fading glow effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlowSpec {
    pub color: Color,
    pub intensity: f64,
    pub fade_ms: f64,
}

impl GlowSpec {
    pub const fn new(color: Color, intensity: f64, fade_ms: f64) -> Self {
        Self {
            color,
            intensity,
            fade_ms,
        }
    }

    /// Glow decorator starting at `now_ms`.
    pub fn at(&self, now_ms: f64) -> Decorator {
        Decorator::fading_glow(self.color, self.intensity, self.fade_ms, now_ms)
    }
}
