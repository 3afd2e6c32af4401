use std::path::Path;

use serde::Serialize;

/// Comparison summary printed by the CLI.
#[derive(Serialize)]
pub struct Report {
    pub width: u32,
    pub height: u32,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    pub match_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_image: Option<String>,
}

pub fn print_json(report: &Report) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print a single PASS/FAIL result line.
pub fn print_line(left: &Path, right: &Path, report: &Report) {
    let pair = format!("{} vs {}", left.display(), right.display());
    if report.diff_pixels == 0 {
        println!(
            "  \x1b[32mPASS\x1b[0m  {pair}  ({}x{}, ratio {:.4})",
            report.width, report.height, report.match_ratio
        );
    } else {
        println!(
            "  \x1b[31mFAIL\x1b[0m  {pair}  ({} of {} pixels, ratio {:.4})",
            report.diff_pixels, report.total_pixels, report.match_ratio
        );
    }
    if let Some(path) = &report.diff_image {
        println!("        diff written to {path}");
    }
}
