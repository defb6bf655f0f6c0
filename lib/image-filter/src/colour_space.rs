//! RGB <-> HSV conversion.
//!
//! Hue is a fraction of the full circle in `[0, 1)`, not degrees. Saturation
//! and value are in `[0, 1]` when produced by [`rgb_to_hsv`]; callers may scale
//! saturation past 1.0 before converting back, the overshoot is absorbed by the
//! final byte clamp in [`hsv_to_rgb`].

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        rgb_to_hsv(r, g, b)
    }

    pub fn to_rgb(self) -> [u8; 3] {
        hsv_to_rgb(self.h, self.s, self.v)
    }

    pub fn scale_saturation(self, factor: f64) -> Self {
        Self {
            s: self.s * factor,
            ..self
        }
    }
}

pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };

    // Achromatic pixels have no hue.
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv::new(h / 6.0, s, max)
}

/// Six-sector HSV decomposition. The sector is `floor(h * 6) mod 6`, so
/// `h = 1.0` lands back in sector 0.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let scaled = h * 6.0;
    let i = scaled.floor();
    let f = scaled - i;

    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Scales a unit channel to a byte, rounding to nearest and clamping.
pub fn to_byte(unit: f64) -> u8 {
    clamp_channel(unit * 255.0)
}

pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }

    value.round().clamp(0.0, 255.0) as u8
}
