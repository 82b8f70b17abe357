//! Output naming and PNG encoding.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::error::Result;

const OUTPUT_SUFFIX: &str = "_birdseye.png";

/// `<out_dir>/<input stem>_birdseye.png`.
pub fn output_path_for(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pointcloud".to_string());
    out_dir.join(format!("{}{}", stem, OUTPUT_SUFFIX))
}

/// Writes an RGB raster as an 8-bit PNG.
///
/// The raster is already in the encoder's RGB channel order, so no swap
/// happens here.
pub fn write_png(path: &Path, image: &RgbImage) -> Result<()> {
    let file = File::create(path)?;
    PngEncoder::new(BufWriter::new(file)).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    log::info!("wrote {}", path.display());
    Ok(())
}
