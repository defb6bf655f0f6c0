use crate::{
    Effect,
    colour_space::{Hsv, clamp_channel},
    filter::FilterKind,
};
use derivative::Derivative;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

pub const ADJUSTMENT_MIN: i32 = -100;
pub const ADJUSTMENT_MAX: i32 = 100;

/// Brightness and saturation sliders.
///
/// Both values live in `[-100, 100]`; anything outside is clamped on the way
/// in, so an `Adjustment` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(from = "RawAdjustment")]
pub struct Adjustment {
    /// Additive per-channel offset
    brightness: i32,

    /// Percent change of HSV saturation, `s * (1 + saturation / 100)`
    saturation: i32,
}

#[derive(Deserialize)]
struct RawAdjustment {
    #[serde(default)]
    brightness: i32,
    #[serde(default)]
    saturation: i32,
}

impl From<RawAdjustment> for Adjustment {
    fn from(raw: RawAdjustment) -> Self {
        Adjustment::new(raw.brightness, raw.saturation)
    }
}

impl Adjustment {
    pub fn new(brightness: i32, saturation: i32) -> Self {
        Self {
            brightness: clamp_slider("brightness", brightness),
            saturation: clamp_slider("saturation", saturation),
        }
    }

    pub fn with_brightness(mut self, brightness: i32) -> Self {
        self.brightness = clamp_slider("brightness", brightness);
        self
    }

    pub fn with_saturation(mut self, saturation: i32) -> Self {
        self.saturation = clamp_slider("saturation", saturation);
        self
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    pub fn saturation(&self) -> i32 {
        self.saturation
    }

    pub fn saturation_factor(&self) -> f64 {
        1.0 + self.saturation as f64 / 100.0
    }

    /// True when applying this adjustment changes nothing.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0 && self.saturation == 0
    }
}

/// Saturation is scaled in HSV first, brightness is added in RGB after.
/// Swapping the stages gives different results on clipped channels.
impl Effect for Adjustment {
    fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let [r, g, b] = if self.saturation == 0 {
            rgb
        } else {
            Hsv::from_rgb(rgb[0], rgb[1], rgb[2])
                .scale_saturation(self.saturation_factor())
                .to_rgb()
        };

        if self.brightness == 0 {
            return [r, g, b];
        }

        let offset = self.brightness as f64;
        [r, g, b].map(|c| clamp_channel(c as f64 + offset))
    }
}

fn clamp_slider(name: &str, value: i32) -> i32 {
    let clamped = value.clamp(ADJUSTMENT_MIN, ADJUSTMENT_MAX);
    if clamped != value {
        log::warn!("{name} {value} out of range, clamped to {clamped}");
    }
    clamped
}

/// The full edit state of one image: a filter plus the sliders on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EditPreset {
    #[serde(default)]
    pub filter: FilterKind,

    #[serde(flatten)]
    pub adjustment: Adjustment,
}

impl EditPreset {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let adjustment = Adjustment::default();
        assert!(adjustment.is_identity());
        assert_eq!(adjustment.apply_pixel([12, 34, 56]), [12, 34, 56]);
    }

    #[test]
    fn test_clamping() {
        let adjustment = Adjustment::new(150, -200);
        assert_eq!(adjustment.brightness(), 100);
        assert_eq!(adjustment.saturation(), -100);

        let adjustment = Adjustment::default()
            .with_brightness(-101)
            .with_saturation(101);
        assert_eq!(adjustment.brightness(), -100);
        assert_eq!(adjustment.saturation(), 100);
    }

    #[test]
    fn test_brightness_clamps_without_wrapping() {
        let adjustment = Adjustment::new(100, 0);
        assert_eq!(adjustment.apply_pixel([250, 250, 250]), [255, 255, 255]);

        let adjustment = Adjustment::new(-100, 0);
        assert_eq!(adjustment.apply_pixel([30, 120, 5]), [0, 20, 0]);
    }

    #[test]
    fn test_full_desaturation() {
        let adjustment = Adjustment::new(0, -100);
        for rgb in [[200, 30, 90], [0, 255, 0], [17, 18, 250]] {
            let [r, g, b] = adjustment.apply_pixel(rgb);
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "{rgb:?} -> {r},{g},{b}");
        }
    }

    #[test]
    fn test_saturation_before_brightness() {
        let adjustment = Adjustment::new(20, 100);
        assert_eq!(adjustment.apply_pixel([250, 150, 150]), [255, 70, 70]);
    }

    #[test]
    fn test_saturation_factor() {
        assert_eq!(Adjustment::new(0, -100).saturation_factor(), 0.0);
        assert_eq!(Adjustment::new(0, 0).saturation_factor(), 1.0);
        assert_eq!(Adjustment::new(0, 100).saturation_factor(), 2.0);
    }

    #[test]
    fn test_deserialize_clamps() {
        let adjustment: Adjustment = toml::from_str("brightness = 300").unwrap();
        assert_eq!(adjustment, Adjustment::new(100, 0));
    }

    #[test]
    fn test_edit_preset_from_toml() {
        let preset: EditPreset =
            toml::from_str("filter = \"sepia\"\nbrightness = 10\nsaturation = -20").unwrap();

        assert_eq!(
            preset,
            EditPreset::new()
                .with_filter(FilterKind::Sepia)
                .with_adjustment(Adjustment::new(10, -20))
        );

        let preset: EditPreset = toml::from_str("").unwrap();
        assert_eq!(preset, EditPreset::default());
    }
}
