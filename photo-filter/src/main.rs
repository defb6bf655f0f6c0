mod export;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image_filter::{Adjustment, Compositor, EditPreset, FilterKind};
use std::path::PathBuf;

/// Apply a photo filter plus brightness/saturation sliders to an image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image to edit
    #[arg(required_unless_present = "list_filters")]
    input: Option<PathBuf>,

    /// Where to write the result [default: <input>-<filter>.<ext>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Filter: identity, grayscale, sepia, vivid or muted
    #[arg(short, long)]
    filter: Option<FilterKind>,

    /// Brightness offset, -100..=100
    #[arg(short, long, allow_negative_numbers = true)]
    brightness: Option<i32>,

    /// Saturation change in percent, -100..=100
    #[arg(short, long, allow_negative_numbers = true)]
    saturation: Option<i32>,

    /// TOML file with `filter`, `brightness` and `saturation`; flags override it
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Print the available filters and exit
    #[arg(long)]
    list_filters: bool,
}

impl Args {
    fn edit_preset(&self) -> Result<EditPreset> {
        let mut preset = match &self.preset {
            Some(path) => export::load_preset(path)?,
            None => EditPreset::default(),
        };

        if let Some(filter) = self.filter {
            preset = preset.with_filter(filter);
        }

        let adjustment = Adjustment::new(
            self.brightness.unwrap_or(preset.adjustment.brightness()),
            self.saturation.unwrap_or(preset.adjustment.saturation()),
        );

        Ok(preset.with_adjustment(adjustment))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    if args.list_filters {
        for kind in FilterKind::all() {
            println!("{:<10} {}", kind.key(), kind.name());
        }
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        bail!("no input image given");
    };

    let preset = args.edit_preset()?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| export::default_output_path(input, preset.filter));

    let source = export::load_image(input)?;
    log::info!(
        "{} ({}x{}) -> {}",
        input.display(),
        source.width(),
        source.height(),
        output.display()
    );

    let mut compositor = Compositor::new(source);
    compositor.apply_preset(preset);

    export::save_image(&compositor.export_buffer(), &output)
        .with_context(|| format!("export {} failed", output.display()))?;

    println!(
        "Saved {} (filter={}, brightness={}, saturation={})",
        output.display(),
        preset.filter,
        preset.adjustment.brightness(),
        preset.adjustment.saturation()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "photo-filter",
            "in.png",
            "-f",
            "blackNWhite",
            "-b",
            "-20",
            "--saturation",
            "150",
        ])
        .unwrap();

        let preset = args.edit_preset().unwrap();
        assert_eq!(preset.filter, FilterKind::Grayscale);
        assert_eq!(preset.adjustment, Adjustment::new(-20, 100));
    }

    #[test]
    fn test_unknown_filter_rejected() {
        assert!(Args::try_parse_from(["photo-filter", "in.png", "-f", "lomo"]).is_err());
    }

    #[test]
    fn test_input_required_unless_listing() {
        assert!(Args::try_parse_from(["photo-filter"]).is_err());
        assert!(Args::try_parse_from(["photo-filter", "--list-filters"]).is_ok());
    }

    #[test]
    fn test_flags_override_preset() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("warm.toml");
        fs::write(&path, "filter = \"sepia\"\nbrightness = 15\nsaturation = 30\n")?;

        let args = Args::try_parse_from([
            "photo-filter",
            "in.png",
            "--preset",
            path.to_str().unwrap(),
            "-s",
            "-5",
        ])?;

        let preset = args.edit_preset()?;
        assert_eq!(preset.filter, FilterKind::Sepia);
        assert_eq!(preset.adjustment, Adjustment::new(15, -5));

        Ok(())
    }
}
