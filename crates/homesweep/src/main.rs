mod cli;

use anyhow::Context;
use clap::Parser;
use homesweep_lib::AuditRequest;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        cli::Commands::Scan {
            all,
            caches,
            security,
            projects,
            dependencies,
            ml_cache,
            config,
            save_results,
        } => {
            let catalog = cli::init_catalog(cli.home).context("Cannot locate home directory")?;
            let request = AuditRequest {
                all,
                caches,
                security,
                projects,
                dependencies,
                ml_cache,
            };
            cli::scan::handle_scan_command(catalog, request, config, save_results, cli.verbose)
                .context("Scan failed")
        }

        cli::Commands::Report {
            from_scan,
            format,
            output,
        } => cli::report::handle_report_command(from_scan, &format, output)
            .context("Report generation failed"),

        cli::Commands::Health { config } => {
            let catalog = cli::init_catalog(cli.home).context("Cannot locate home directory")?;
            cli::health::handle_health_command(&catalog, config).context("Health check failed")
        }
    }
}
