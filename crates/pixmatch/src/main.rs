mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use image::{ImageReader, RgbaImage};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pixmatch::{DiffOptions, diff_images};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixmatch=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let code = run(cli)?;
    std::process::exit(code);
}

/// Compare the two images; exit code 0 = match, 1 = differences found.
fn run(cli: cli::Cli) -> Result<i32> {
    let left = load_rgba(&cli.left)?;
    let right = load_rgba(&cli.right)?;

    let (width, height) = left.dimensions();
    debug!(width, height, threshold = cli.threshold, "comparing");

    let options = DiffOptions {
        threshold: cli.threshold,
        include_aa: cli.include_aa,
        alpha: cli.alpha,
        diff_mask: cli.diff_mask,
        render_output: cli.output.is_some(),
        ..DiffOptions::default()
    };

    let result = diff_images(&left, &right, &options)?;

    let total_pixels = u64::from(width) * u64::from(height);
    let match_ratio = 1.0 - result.diff_pixels as f64 / total_pixels as f64;

    let mut diff_image = None;
    if let Some(path) = &cli.output {
        let buf = result
            .output
            .context("rendering was requested but produced no buffer")?;
        let img = RgbaImage::from_raw(width, height, buf)
            .context("rendered diff has an unexpected size")?;
        img.save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        diff_image = Some(path.display().to_string());
    }

    let report = report::Report {
        width,
        height,
        diff_pixels: result.diff_pixels,
        total_pixels,
        match_ratio,
        diff_image,
    };

    if cli.json {
        report::print_json(&report)?;
    } else {
        report::print_line(&cli.left, &cli.right, &report);
    }

    Ok(i32::from(report.diff_pixels > 0))
}

fn load_rgba(path: &std::path::Path) -> Result<RgbaImage> {
    Ok(ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8())
}
