//! Scan command implementation

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use reposync_fs::scan_local_repository;

use crate::error::Result;

/// Run the scan command
///
/// Prints the coordinates found under `dir`, sorted, followed by the files
/// that were skipped.
pub fn run_scan(dir: &Path, strict: bool, json: bool) -> Result<()> {
    let report = scan_local_repository(dir, strict)?;

    let mut coordinates: Vec<String> = report.artifacts.iter().map(ToString::to_string).collect();
    coordinates.sort();
    let errors: Vec<String> = report.errors.iter().map(ToString::to_string).collect();

    if json {
        let output = json!({
            "root": dir.display().to_string(),
            "artifacts": coordinates,
            "errors": errors,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for coordinate in &coordinates {
        println!("{}", coordinate);
    }
    for error in &errors {
        eprintln!("{} {}", "SKIPPED".yellow().bold(), error);
    }
    println!();
    println!(
        "{} {} artifacts, {} files skipped",
        "=>".blue().bold(),
        coordinates.len(),
        errors.len()
    );
    Ok(())
}
