use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use image_filter::{EditPreset, FilterKind, PixelBuffer};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let image = ImageReader::open(path)
        .with_context(|| format!("open {} failed", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("decode {} failed", path.display()))?;

    Ok(PixelBuffer::from_rgba_image(image.to_rgba8()))
}

/// Encodes by extension. Formats without alpha get the RGB channels only.
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let image = buffer.clone().into_rgba_image()?;

    if is_jpeg(path) {
        DynamicImage::ImageRgba8(image).to_rgb8().save(path)?;
    } else {
        image.save(path)?;
    }

    log::debug!("wrote {}", path.display());
    Ok(())
}

pub fn load_preset(path: &Path) -> Result<EditPreset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read preset {} failed", path.display()))?;

    toml::from_str(&text).with_context(|| format!("parse preset {} failed", path.display()))
}

/// `photo.png` + sepia -> `photo-sepia.png`, next to the input.
pub fn default_output_path(input: &Path, filter: FilterKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let name = match input.extension() {
        Some(ext) => format!("{stem}-{}.{}", filter.key(), ext.to_string_lossy()),
        None => format!("{stem}-{}.png", filter.key()),
    };

    input.with_file_name(name)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/cat.png"), FilterKind::Sepia),
            PathBuf::from("/tmp/cat-sepia.png")
        );
        assert_eq!(
            default_output_path(Path::new("shots/dog.final.JPG"), FilterKind::Muted),
            PathBuf::from("shots/dog.final-muted.JPG")
        );
        assert_eq!(
            default_output_path(Path::new("raw"), FilterKind::Identity),
            PathBuf::from("raw-identity.png")
        );
    }

    #[test]
    fn test_png_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixels.png");

        let buffer = PixelBuffer::from_pixels(2, 1, &[[10, 20, 30, 40], [250, 0, 128, 255]])?;
        save_image(&buffer, &path)?;

        assert_eq!(load_image(&path)?, buffer);
        Ok(())
    }

    #[test]
    fn test_jpeg_export_drops_alpha() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixels.jpg");

        let buffer = PixelBuffer::blank(4, 4)?;
        save_image(&buffer, &path)?;

        let loaded = load_image(&path)?;
        assert_eq!((loaded.width(), loaded.height()), (4, 4));
        assert!(loaded.pixels().all(|p| p[3] == 255));
        Ok(())
    }

    #[test]
    fn test_load_preset_missing_file() {
        assert!(load_preset(Path::new("/nonexistent/preset.toml")).is_err());
    }
}
