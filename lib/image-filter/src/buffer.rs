use crate::{ImageFilterError, ImageFilterResult};
use image::RgbaImage;

pub const CHANNELS: usize = 4;

/// Flat 8-bit RGBA pixel storage, row-major.
///
/// The length is always `width * height * 4`; a buffer that violates this
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> ImageFilterResult<Self> {
        if Some(data.len()) != expected_len(width, height) {
            return Err(ImageFilterError::InvalidDimension {
                width,
                height,
                len: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(Some(data.len()), expected_len(width, height));
        Self {
            width,
            height,
            data,
        }
    }

    /// Transparent black buffer of the given size.
    pub fn blank(width: u32, height: u32) -> ImageFilterResult<Self> {
        let len = expected_len(width, height).ok_or(ImageFilterError::InvalidDimension {
            width,
            height,
            len: 0,
        })?;

        Self::new(width, height, vec![0; len])
    }

    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 4]]) -> ImageFilterResult<Self> {
        Self::new(width, height, pixels.concat())
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn into_rgba_image(self) -> ImageFilterResult<RgbaImage> {
        let (width, height, len) = (self.width, self.height, self.data.len());
        RgbaImage::from_raw(width, height, self.data).ok_or(ImageFilterError::InvalidDimension {
            width,
            height,
            len,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns `None` when `(x, y)` lies outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let pos = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let p = &self.data[pos..pos + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}
