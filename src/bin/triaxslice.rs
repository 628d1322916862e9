//! Commandline utility to turn 3D image/mask volumes into 2D training slices.
//!
//! Every image in the input directory is paired with its `<stem>_seg.npz`
//! label archive and cut along all three axes (XY, XZ and YZ planes). Slices
//! holding at least `--min-masks` distinct labeled objects are written to the
//! output directory as `<stem>_XY_Z003.tif` / `<stem>_XY_Z003_cp_masks.tif`
//! pairs, ready for 2D segmentation training.

use clap::Parser;
use env_logger::{Builder, Env};
use log::warn;
use std::path::PathBuf;

use triaxslice::pipeline;
use triaxslice::report::verify_outputs;
use triaxslice::SliceConfig;

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// the directory holding image volumes and their `_seg.npz` label files
    #[arg(short, long)]
    input: PathBuf,

    /// the directory receiving slice pairs. Created if missing.
    #[arg(short, long)]
    output: PathBuf,

    /// minimum number of distinct labeled objects a slice needs to be saved
    #[arg(short, long, default_value_t = 1)]
    min_masks: usize,

    /// extension of the image volumes (tif, tiff, nii or nii.gz)
    #[arg(short, long, default_value = "tif")]
    extension: String,

    /// name of the label volume inside the `_seg.npz` archive
    #[arg(short, long, default_value = "masks")]
    label_key: String,

    /// Z spacing relative to X/Y. Recorded only: no resampling is done.
    #[arg(short, long)]
    anisotropy: Option<f64>,

    /// recount written mask files on disk after the run and compare
    #[arg(long)]
    verify: bool,
}

fn main() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let cli = Args::parse();
    let config = SliceConfig::new(&cli.input, &cli.output)
        .with_min_masks(cli.min_masks)
        .with_extension(&cli.extension)
        .with_label_key(&cli.label_key)
        .with_anisotropy(cli.anisotropy);

    let report = pipeline::run(&config).unwrap_or_else(|e| {
        eprintln!("Error! {}", e);
        std::process::exit(-2);
    });
    println!("{report}");

    if cli.verify {
        let on_disk = verify_outputs(&config.output_dir, &config.naming, &config.extension)
            .unwrap_or_else(|e| {
                eprintln!("Error! {}", e);
                std::process::exit(-2);
            });
        let written = report.totals();
        println!(
            "On disk: {} XY, {} XZ, {} YZ ({} total) mask slices",
            on_disk.xy,
            on_disk.xz,
            on_disk.yz,
            on_disk.total()
        );
        if on_disk != written {
            warn!(
                "On-disk mask count differs from this run's count: {} holds other outputs",
                config.output_dir.display()
            );
        }
    }

    if !report.is_clean() {
        std::process::exit(-2);
    }
}
