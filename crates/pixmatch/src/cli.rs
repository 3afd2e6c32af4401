use std::path::PathBuf;

use clap::Parser;

use pixmatch::options;

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    options::validate_threshold(v)
}

#[derive(Parser)]
#[command(
    name = "pixmatch",
    about = "Perceptual image comparison for visual regression testing"
)]
pub struct Cli {
    /// Reference image (PNG)
    pub left: PathBuf,

    /// Candidate image (PNG)
    pub right: PathBuf,

    /// Write the rendered diff image to this path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Matching threshold (0.0-1.0); smaller is more sensitive
    #[arg(long, short = 't', default_value_t = 0.1, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Count anti-aliased pixels as differences
    #[arg(long)]
    pub include_aa: bool,

    /// Opacity of the dimmed original under the diff overlay
    #[arg(long, default_value_t = 0.1)]
    pub alpha: f64,

    /// Draw differences over a transparent background instead of the dimmed original
    #[arg(long)]
    pub diff_mask: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
