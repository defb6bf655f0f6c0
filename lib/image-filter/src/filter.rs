use crate::{
    Effect, ImageFilterError, ImageFilterResult,
    colour_space::{Hsv, clamp_channel},
};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const VIVID_SATURATION: f64 = 1.45;
pub const MUTED_SATURATION: f64 = 0.55;

const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// The closed filter catalogue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    #[serde(alias = "original")]
    Identity = 0,
    #[serde(alias = "blackNWhite")]
    Grayscale,
    Sepia,
    Vivid,
    #[serde(alias = "london")]
    Muted,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Identity => "Original",
            FilterKind::Grayscale => "Black & White",
            FilterKind::Sepia => "Sepia",
            FilterKind::Vivid => "Vivid",
            FilterKind::Muted => "Muted",
        }
    }

    /// Stable lowercase identifier, also used in exported file names.
    pub fn key(&self) -> &'static str {
        match self {
            FilterKind::Identity => "identity",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Vivid => "vivid",
            FilterKind::Muted => "muted",
        }
    }

    pub fn all() -> &'static [FilterKind] {
        &[
            FilterKind::Identity,
            FilterKind::Grayscale,
            FilterKind::Sepia,
            FilterKind::Vivid,
            FilterKind::Muted,
        ]
    }

    pub fn from_id(id: u8) -> ImageFilterResult<Self> {
        FilterKind::try_from(id).map_err(|e| {
            log::warn!("rejected filter id {id}");
            ImageFilterError::UnknownFilterKind(e.number.to_string())
        })
    }

    pub fn id(&self) -> u8 {
        (*self).into()
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterKind {
    type Err = ImageFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "original" | "none" => FilterKind::Identity,
            "grayscale" | "greyscale" | "blacknwhite" => FilterKind::Grayscale,
            "sepia" => FilterKind::Sepia,
            "vivid" => FilterKind::Vivid,
            "muted" | "desaturated" | "london" => FilterKind::Muted,
            _ => {
                log::warn!("rejected filter name `{s}`");
                return Err(ImageFilterError::UnknownFilterKind(s.to_string()));
            }
        };

        Ok(kind)
    }
}

impl Effect for FilterKind {
    fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        match self {
            FilterKind::Identity => rgb,
            FilterKind::Grayscale => grayscale(rgb),
            FilterKind::Sepia => sepia(rgb),
            FilterKind::Vivid => scale_saturation(rgb, VIVID_SATURATION),
            FilterKind::Muted => scale_saturation(rgb, MUTED_SATURATION),
        }
    }
}

/// Plain channel average, not weighted luma.
pub fn grayscale([r, g, b]: [u8; 3]) -> [u8; 3] {
    let gray = ((r as u32 + g as u32 + b as u32) / 3) as u8;
    [gray, gray, gray]
}

pub fn sepia([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    SEPIA_MATRIX.map(|[kr, kg, kb]| clamp_channel(r * kr + g * kg + b * kb))
}

/// Multiplies HSV saturation by `factor`. The intermediate saturation is left
/// unclamped; only the resulting bytes are clamped.
pub fn scale_saturation([r, g, b]: [u8; 3], factor: f64) -> [u8; 3] {
    Hsv::from_rgb(r, g, b).scale_saturation(factor).to_rgb()
}
