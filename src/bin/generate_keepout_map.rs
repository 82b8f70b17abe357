//! Bakes keepout zones from a YAML plan into an occupancy map.
//!
//! Usage:
//!   generate_keepout_map --map office.pgm --bev office_birdseye.png --plan zones.yaml

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bevmap::keepout::{keepout_path_for, load_bev, load_map, preview_path_for, save_pgm, save_png};
use bevmap::{EditSession, KeepoutPlan};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Occupancy grid map (PGM)
    #[arg(long)]
    map: PathBuf,

    /// Bird's-eye-view image of the same area
    #[arg(long)]
    bev: PathBuf,

    /// Keepout plan (YAML)
    #[arg(long)]
    plan: PathBuf,

    /// Directory for the output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write the composited preview as PNG
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let map = load_map(&args.map)
        .with_context(|| format!("failed to load map {}", args.map.display()))?;
    let bev = load_bev(&args.bev)
        .with_context(|| format!("failed to load BEV image {}", args.bev.display()))?;
    let plan = KeepoutPlan::load(&args.plan)
        .with_context(|| format!("failed to load plan {}", args.plan.display()))?;

    let session = EditSession::new(map, &bev).replay(plan.events());
    log::info!("{} keepout zones baked", session.zones());

    if args.preview {
        let path = preview_path_for(&args.map, &args.output_dir);
        let preview = session.render_preview()?;
        save_png(&path, &preview)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let output = keepout_path_for(&args.map, &args.output_dir);
    save_pgm(&output, session.keepout())
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("{}", output.display());

    Ok(())
}
