use chrono::Utc;
use console::style;
use homesweep_lib::{load_snapshot, render, HomesweepError, Platform, ReportFormat, Result};
use std::fs;
use std::path::PathBuf;

pub fn handle_report_command(
    from_scan: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = ReportFormat::from_str(format).map_err(HomesweepError::Config)?;

    let from_scan = match from_scan {
        Some(path) => path,
        None => {
            println!(
                "{} Run a scan first to generate a report",
                style("⚠").yellow()
            );
            println!("  Use: homesweep scan --all --save-results results.json");
            return Ok(());
        }
    };

    let results = load_snapshot(&from_scan)?;
    let content = render(&results, format, Platform::detect().display_name(), Utc::now())?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&path, content)?;
            println!("{} Report saved to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}
