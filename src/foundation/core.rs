use crate::foundation::error::{KineticaError, KineticaResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Absolute 0-based frame index since playback started.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> KineticaResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Check that both parts are non-zero.
    pub fn validate(self) -> KineticaResult<()> {
        if self.den == 0 {
            return Err(KineticaError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(KineticaError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp (ms) at which frame `frame` starts.
    pub fn frame_start_ms(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * self.frame_duration_ms()
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width as `f64`, for simulation-space math.
    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as `f64`, for simulation-space math.
    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    /// Reject empty canvases and sizes the rasterizer cannot address.
    pub fn validate(self) -> KineticaResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(KineticaError::validation("canvas width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(KineticaError::validation(
                "canvas width/height must be <= 65535",
            ));
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
