use crate::config;
use colored::Colorize;
use std::path::Path;

pub fn run_init(force: bool) -> anyhow::Result<()> {
    let hostsentry_dir = config::hostsentry_dir();
    let config_path = config::config_path();

    eprintln!("{}", "Initializing hostsentry configuration...".bold());

    create_dir_if_needed(&hostsentry_dir)?;
    write_file_if_needed(&config_path, &config::default_config_toml(), force)?;

    eprintln!();
    eprintln!("{}", "Hostsentry initialized.".green().bold());
    eprintln!("  Config: {}", config_path.display());
    eprintln!();
    eprintln!("Edit {} to set:", config_path.display());
    eprintln!("  - watch_paths (monitoring refuses to start while empty)");
    eprintln!("  - ignore_patterns");
    eprintln!("  - detector threshold / window");

    Ok(())
}

fn create_dir_if_needed(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        eprintln!("  {} {}/", "created".green(), path.display());
    } else {
        eprintln!("  {} {}/", "exists".dimmed(), path.display());
    }
    Ok(())
}

fn write_file_if_needed(path: &Path, content: &str, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        eprintln!(
            "  {} {} (use --force to overwrite)",
            "skipped".yellow(),
            path.display()
        );
    } else {
        let label = if path.exists() { "overwrote" } else { "created" };
        std::fs::write(path, content)?;
        eprintln!("  {} {}", label.green(), path.display());
    }
    Ok(())
}
