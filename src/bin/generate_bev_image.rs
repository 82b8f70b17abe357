//! Renders a point-cloud map as a bird's-eye-view PNG.
//!
//! Usage:
//!   generate_bev_image --input map.pcd --min_z -0.5 --max_z 1.5 --vis

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use bevmap::bev::{output_path_for, write_png, CanvasBasis, OutOfRangePolicy};
use bevmap::{generate_birdseye, read_point_cloud, BevConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Point cloud to render (.pcd, .ply, .las, .laz)
    #[arg(long)]
    input: PathBuf,

    /// Lower edge of the height band in meters
    #[arg(long = "min_z", default_value_t = -2.0, allow_negative_numbers = true)]
    min_z: f32,

    /// Upper edge of the height band in meters
    #[arg(long = "max_z", default_value_t = 2.0, allow_negative_numbers = true)]
    max_z: f32,

    /// Meters per pixel
    #[arg(long, default_value_t = 0.05)]
    resolution: f64,

    /// How the canvas size is derived
    #[arg(long, value_enum, default_value_t = Canvas::Nominal)]
    canvas: Canvas,

    /// Fail instead of skipping points that fall outside the canvas
    #[arg(long)]
    strict: bool,

    /// Directory for the output image
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Open the result in the default image viewer
    #[arg(long)]
    vis: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Canvas {
    /// Sized from the cloud's extent
    Nominal,
    /// Sized from the projected points
    Observed,
}

impl Args {
    fn config(&self) -> BevConfig {
        BevConfig {
            resolution: self.resolution,
            min_z: self.min_z,
            max_z: self.max_z,
            canvas_basis: match self.canvas {
                Canvas::Nominal => CanvasBasis::Nominal,
                Canvas::Observed => CanvasBasis::Observed,
            },
            out_of_range: if self.strict {
                OutOfRangePolicy::Fail
            } else {
                OutOfRangePolicy::Clip
            },
            ..Default::default()
        }
    }
}

fn open_in_viewer(path: &Path) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    command.arg(path).spawn().map(|_| ())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config();

    let cloud = read_point_cloud(&args.input)
        .with_context(|| format!("failed to read point cloud {}", args.input.display()))?;
    log::info!("{} points from {}", cloud.len(), args.input.display());

    let bev = generate_birdseye(&cloud, &config).context("failed to generate bird's-eye view")?;

    let output = output_path_for(&args.input, &args.output_dir);
    write_png(&output, &bev.image)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{}", output.display());

    if args.vis {
        if let Err(err) = open_in_viewer(&output) {
            log::warn!("could not open {} in a viewer: {}", output.display(), err);
        }
    }

    Ok(())
}
