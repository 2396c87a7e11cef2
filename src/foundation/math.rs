pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Composite one premultiplied RGBA8 pixel over an opaque background.
pub(crate) fn flatten_over(px: [u8; 4], bg: [u8; 3]) -> [u8; 3] {
    let inv = 255 - u16::from(px[3]);
    [
        px[0].saturating_add(mul_div255_u8(u16::from(bg[0]), inv)),
        px[1].saturating_add(mul_div255_u8(u16::from(bg[1]), inv)),
        px[2].saturating_add(mul_div255_u8(u16::from(bg[2]), inv)),
    ]
}

/// Euclidean remainder for floats, always in `[0, m)` for `m > 0`.
pub(crate) fn wrap(v: f64, m: f64) -> f64 {
    v.rem_euclid(m)
}
