//! Occupancy map and image file I/O.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};

use crate::error::Result;

/// Loads an occupancy map as 8-bit gray.
pub fn load_map(path: &Path) -> Result<GrayImage> {
    let map = image::open(path)?.to_luma8();
    log::debug!("map {} is {}x{}", path.display(), map.width(), map.height());
    Ok(map)
}

pub fn load_bev(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Writes a binary (P5) 8-bit graymap.
pub fn save_pgm(path: &Path, map: &GrayImage) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    PnmEncoder::new(writer)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(map.as_raw(), map.width(), map.height(), ExtendedColorType::L8)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    PngEncoder::new(writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn stem_of(map: &Path) -> String {
    map.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string())
}

/// `<out_dir>/<map stem>_keepout.pgm`.
pub fn keepout_path_for(map: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join(format!("{}_keepout.pgm", stem_of(map)))
}

pub fn preview_path_for(map: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join(format!("{}_keepout_preview.png", stem_of(map)))
}
