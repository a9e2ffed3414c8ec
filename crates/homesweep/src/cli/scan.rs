use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use console::style;
use homesweep_lib::util::{create_spinner, format_duration};
use homesweep_lib::{
    save_snapshot, AuditRequest, AuditResults, Auditor, PathCatalog, Result, Settings,
    SystemInventory,
};
use std::path::PathBuf;
use std::time::Instant;

pub fn handle_scan_command(
    catalog: PathCatalog,
    request: AuditRequest,
    config: Option<PathBuf>,
    save_results: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let settings = Settings::load(config.as_deref())?;
    let mut inventory = SystemInventory::new(catalog.platform());
    if let Some(dir) = catalog.applications_dir() {
        inventory = inventory.with_applications_dir(dir);
    }

    if request.tasks(&settings).is_empty() {
        println!(
            "{} Nothing selected. Use --all or pick categories such as --caches",
            style("!").yellow()
        );
        return Ok(());
    }

    println!(
        "{} Auditing {} ({})",
        style(">>>").cyan(),
        style(catalog.home().display()).bold(),
        catalog.platform().display_name()
    );

    let auditor = Auditor::new(catalog, settings, &inventory);
    let started = Instant::now();

    let spinner = if verbose {
        None
    } else {
        Some(create_spinner("Scanning..."))
    };
    let outcome = auditor.run(&request);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let results = outcome?;

    println!(
        "\n{} Scan completed in {}\n",
        style("✓").green(),
        format_duration(started.elapsed())
    );

    print_summary_table(&results);

    if results.security_results.high_severity_issues > 0 {
        println!(
            "\n{} Found {} high severity security issues",
            style("⚠").red(),
            style(results.security_results.high_severity_issues).red().bold()
        );
        println!("  See the security section of the report.\n");
    }

    if let Some(path) = save_results {
        save_snapshot(&results, &path)?;
        println!("{} Results saved to {}", style("✓").green(), path.display());
    }

    Ok(())
}

fn print_summary_table(results: &AuditResults) {
    let scan = &results.scan_results;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);

    let counted_mb: f64 = scan
        .caches
        .iter()
        .chain(&scan.orphaned_apps)
        .chain(&scan.hidden_files)
        .map(|e| e.size_mb())
        .sum();

    table.add_row(vec![Cell::new("Total data size"), Cell::new(format!("{:.2} MB", counted_mb))]);
    table.add_row(vec![Cell::new("Caches found"), Cell::new(scan.caches.len())]);
    table.add_row(vec![
        Cell::new("Possible application leftovers"),
        Cell::new(scan.orphaned_apps.iter().filter(|e| e.possibly_orphaned()).count()),
    ]);
    table.add_row(vec![Cell::new("Large hidden files"), Cell::new(scan.hidden_files.len())]);
    table.add_row(vec![
        Cell::new("Project artifact types"),
        Cell::new(scan.project_artifacts.len()),
    ]);

    if let Some(ml) = &results.ml_cache_results {
        table.add_row(vec![
            Cell::new("ML models in cache"),
            Cell::new(format!("{} ({:.2} GB)", ml.total_models, ml.total_size_gb())),
        ]);
        if ml.unused_models_count > 0 {
            table.add_row(vec![
                Cell::new("Unused ML models"),
                Cell::new(format!(
                    "{} ({:.2} GB)",
                    ml.unused_models_count,
                    ml.unused_size_mb() / 1024.0
                ))
                .fg(Color::Yellow),
            ]);
        }
    }

    if let Some(deps) = &results.dependency_results {
        table.add_row(vec![Cell::new("Projects checked"), Cell::new(deps.total_projects)]);
        if !deps.conflicts.is_empty() {
            table.add_row(vec![
                Cell::new("Dependency conflicts"),
                Cell::new(deps.conflicts.len()).fg(Color::Red),
            ]);
        }
        if !deps.unused_dependencies.is_empty() {
            table.add_row(vec![
                Cell::new("Unused dependencies"),
                Cell::new(deps.unused_dependencies.len()).fg(Color::Yellow),
            ]);
        }
        if !deps.outdated_dependencies.is_empty() {
            table.add_row(vec![
                Cell::new("Outdated dependencies"),
                Cell::new(deps.outdated_dependencies.len()).fg(Color::Yellow),
            ]);
        }
    }

    let security = &results.security_results;
    table.add_row(vec![Cell::new("Security issues"), Cell::new(security.total_issues)]);
    if security.high_severity_issues > 0 {
        table.add_row(vec![
            Cell::new("High severity issues"),
            Cell::new(security.high_severity_issues).fg(Color::Red),
        ]);
    }

    table.add_row(vec![
        Cell::new("Potentially reclaimable"),
        Cell::new(format!("{:.2} GB", results.cleanup_analysis.total_reclaimable_gb()))
            .fg(Color::Green),
    ]);

    println!("{}", table);
}
