use image::ImageReader;
use image_filter::{Compositor, FilterKind, PixelBuffer};
use std::{fs, path::Path, time::Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp/filters");
    fs::create_dir_all(output_dir)?;

    let img_path = Path::new("data/test.png");
    let source = if img_path.exists() {
        PixelBuffer::from_rgba_image(ImageReader::open(img_path)?.decode()?.to_rgba8())
    } else {
        gradient(512, 512)?
    };

    println!("Source size: {}x{}", source.width(), source.height());
    println!("{}", "=".repeat(60));
    println!("{:<16} {:>12} {:>24}", "Filter", "Time (ms)", "Output");
    println!("{}", "-".repeat(60));

    let mut compositor = Compositor::new(source);

    for kind in FilterKind::all() {
        let start = Instant::now();
        let output = compositor.set_filter(*kind);
        let elapsed = start.elapsed();

        let filename = format!("{}.png", kind.key());
        output.as_ref().clone().into_rgba_image()?.save(output_dir.join(&filename))?;

        println!(
            "{:<16} {:>12.3} {:>24}",
            kind.name(),
            elapsed.as_secs_f64() * 1000.0,
            filename
        );
    }

    for (brightness, saturation) in [(-40, 0), (40, 0), (0, -100), (0, 80), (25, 50)] {
        let output = compositor.set_adjustment(brightness, saturation);
        let filename = format!("{}_b{brightness}_s{saturation}.png", compositor.filter().key());
        output.as_ref().clone().into_rgba_image()?.save(output_dir.join(&filename))?;
        println!("✓ Generated {filename}");
    }

    println!("\nImages saved to: {}", output_dir.display());

    Ok(())
}

fn gradient(width: u32, height: u32) -> Result<PixelBuffer, Box<dyn std::error::Error>> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((x + y) * 255 / (width + height)) as u8,
                255,
            ]);
        }
    }
    Ok(PixelBuffer::new(width, height, data)?)
}
