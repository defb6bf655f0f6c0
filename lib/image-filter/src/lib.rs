pub mod adjustment;
pub mod buffer;
pub mod colour_space;
pub mod compositor;
pub mod filter;

pub use adjustment::{Adjustment, EditPreset};
pub use buffer::PixelBuffer;
pub use colour_space::{Hsv, hsv_to_rgb, rgb_to_hsv};
pub use compositor::{Compositor, CompositorState, SharedCompositor, composite};
pub use filter::FilterKind;

pub type ImageFilterResult<T> = Result<T, ImageFilterError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageFilterError {
    #[error("Invalid dimension: {len} bytes is not a {width}x{height} RGBA buffer")]
    InvalidDimension { width: u32, height: u32, len: usize },
    #[error("Unknown filter kind: {0}")]
    UnknownFilterKind(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A per-pixel colour transform. Alpha never reaches an effect.
pub trait Effect {
    fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3];

    /// Maps every pixel of `source` into a freshly allocated buffer.
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer
    where
        Self: Sync,
    {
        compositor::render_with(source, |rgb| self.apply_pixel(rgb))
    }
}
