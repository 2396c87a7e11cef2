use crate::foundation::color::Color;
use crate::foundation::error::{KineticaError, KineticaResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames coming out of [`CpuRenderer`](crate::CpuRenderer) are premultiplied; the flag keeps
/// that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of this frame.
    pub fn to_straight(&self) -> FrameRGBA {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// Renderer settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// If set, overrides the surface background when clearing.
    pub clear_color: Option<Color>,
}

pub(crate) fn dims_u16(width: u32, height: u32) -> KineticaResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| KineticaError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| KineticaError::render("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(KineticaError::render("surface width/height must be non-zero"));
    }
    Ok((w, h))
}
