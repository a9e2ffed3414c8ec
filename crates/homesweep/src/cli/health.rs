use console::style;
use homesweep_lib::util::format_bytes;
use homesweep_lib::{get_disk_space, PathCatalog, Platform, Result, Settings};
use std::path::PathBuf;

pub fn handle_health_command(catalog: &PathCatalog, config: Option<PathBuf>) -> Result<()> {
    println!("\n{}", style("Homesweep Health Check").bold().cyan());
    println!("{}\n", style("═".repeat(60)).dim());

    show_platform(catalog);
    show_paths(catalog);
    show_space(catalog);
    show_config(config);

    println!(
        "\n{}",
        style(format!("homesweep v{}", env!("CARGO_PKG_VERSION"))).bold()
    );

    Ok(())
}

fn show_platform(catalog: &PathCatalog) {
    println!("{}", style("Platform").bold());
    match catalog.platform() {
        Platform::Unknown => println!(
            "  {} Unsupported platform ({}), using Linux locations",
            style("⚠").yellow(),
            std::env::consts::OS
        ),
        platform => println!("  {} {}", style("✓").green(), platform.display_name()),
    }
    println!();
}

fn show_paths(catalog: &PathCatalog) {
    let mut paths = vec![
        ("Home", catalog.home().to_path_buf()),
        ("Caches", catalog.cache_root()),
        ("Application data", catalog.app_support_root()),
        ("Logs", catalog.logs_root()),
        ("Trash", catalog.trash_root()),
        (".ssh", catalog.ssh_dir()),
    ];
    paths.extend(catalog.config_roots().into_iter().map(|p| ("Configuration", p)));
    paths.extend(catalog.applications_dir().map(|p| ("Applications", p)));

    println!("{}", style("Paths").bold());
    for (name, path) in paths {
        if path.exists() {
            println!("  {} {}: {}", style("✓").green(), name, path.display());
        } else {
            println!(
                "  {} {}: {} {}",
                style("⚠").yellow(),
                name,
                path.display(),
                style("(not found)").dim()
            );
        }
    }
    println!();
}

fn show_space(catalog: &PathCatalog) {
    println!("{}", style("Disk Space").bold());
    match get_disk_space(catalog.home()) {
        Ok(space) => {
            println!("  Total: {}", style(format_bytes(space.total_bytes)).cyan());
            println!(
                "  Used: {} ({:.1}%)",
                style(format_bytes(space.used_bytes())).cyan(),
                space.used_percent()
            );
            println!("  Available: {}", style(format_bytes(space.available_bytes)).green());
        }
        Err(e) => {
            log::debug!("Disk space query failed: {}", e);
            println!("  {} Unable to read disk space: {}", style("⚠").yellow(), e);
        }
    }
    println!();
}

fn show_config(config: Option<PathBuf>) {
    println!("{}", style("Configuration").bold());
    match Settings::load(config.as_deref()) {
        Ok(settings) => {
            println!("  {} Configuration loaded", style("✓").green());
            println!("  Minimum report size: {} MB", settings.scan.min_size_mb);
            println!("  Security checks: {}", settings.scan.check_security);
            println!("  Project artifact checks: {}", settings.scan.check_project_artifacts);
            println!("  Dependency checks: {}", settings.scan.check_dependencies);
            println!("  ML cache checks: {}", settings.scan.check_ml_cache);
        }
        Err(e) => println!("  {} Failed to load configuration: {}", style("✗").red(), e),
    }
}
