pub mod health;
pub mod report;
pub mod scan;

use clap::{Parser, Subcommand};
use homesweep_lib::{PathCatalog, Platform, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "homesweep")]
#[command(about = "Audit caches, leftovers, build artifacts and key permissions in your home directory", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Audit this directory instead of $HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Scan the system and print a summary")]
    Scan {
        #[arg(long, help = "Run every scan")]
        all: bool,

        #[arg(long, help = "Scan caches, application data, logs and trash")]
        caches: bool,

        #[arg(long, help = "Check SSH and sensitive file permissions")]
        security: bool,

        #[arg(long, help = "Scan project build artifacts")]
        projects: bool,

        #[arg(long, help = "Analyze Python project dependencies")]
        dependencies: bool,

        #[arg(long = "ml-cache", help = "Analyze ML model caches")]
        ml_cache: bool,

        #[arg(long, help = "Path to configuration file")]
        config: Option<PathBuf>,

        #[arg(long = "save-results", help = "Save results to a JSON file")]
        save_results: Option<PathBuf>,
    },

    #[command(about = "Generate a report from saved scan results")]
    Report {
        #[arg(long = "from-scan", help = "Path to a results file written by scan --save-results")]
        from_scan: Option<PathBuf>,

        #[arg(long, short = 'f', default_value = "markdown", help = "Report format (markdown, json)")]
        format: String,

        #[arg(long, short = 'o', help = "Output file path")]
        output: Option<PathBuf>,
    },

    #[command(about = "Check platform, paths and configuration")]
    Health {
        #[arg(long, help = "Path to configuration file")]
        config: Option<PathBuf>,
    },
}

pub fn init_catalog(home: Option<PathBuf>) -> Result<PathCatalog> {
    let platform = Platform::detect();
    match home {
        Some(home) => Ok(PathCatalog::new(home, platform)),
        None => PathCatalog::from_env(platform),
    }
}
