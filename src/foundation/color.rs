use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque sRGB color packed as `0xRRGGBB`.
///
/// Transparency is never part of a color: it is carried separately as shape opacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Pure white.
    pub const WHITE: Color = Color(0xffffff);
    /// Pure black.
    pub const BLACK: Color = Color(0x000000);

    /// Build from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Red channel.
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green channel.
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue channel.
    pub const fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Per-channel linear interpolation, rounded to the nearest 8-bit value.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let mix = |a: u8, b: u8| -> u8 {
            let af = f64::from(a);
            let bf = f64::from(b);
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        Color::rgb(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
        )
    }

    /// Straight-alpha RGBA8 with `alpha` in `[0, 1]`.
    pub fn to_rgba8(self, alpha: f64) -> [u8; 4] {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r(), self.g(), self.b(), a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Packed(u32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Packed(v) => {
                if v > 0x00ff_ffff {
                    return Err(serde::de::Error::custom(
                        "packed color must fit in 0xRRGGBB",
                    ));
                }
                Ok(Color(v))
            }
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        6 => Ok(Color::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        3 => {
            let expand = |c: &str| hex_byte(&format!("{c}{c}"));
            Ok(Color::rgb(
                expand(&s[0..1])?,
                expand(&s[1..2])?,
                expand(&s[2..3])?,
            ))
        }
        _ => Err("hex color must be #RRGGBB or #RGB (case-insensitive)".to_owned()),
    }
}
