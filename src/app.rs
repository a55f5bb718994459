// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod models;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use self::cli::Cli;
use self::config::resolve_config;
use self::formatter::StructureFormatter;
use self::scanner::Scanner;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Resolve Configuration (unsupported formats fail here, before scanning)
    let config = resolve_config(args)?;
    log::info!(
        "Documenting {} as {}",
        config.root.display(),
        config.structure.format
    );

    // 3. Collect the tree
    let scanner = Scanner::new(config.root.clone(), &config)?;
    let tree = scanner.collect()?;

    log::debug!(
        "Collected {} nodes ({} files)",
        tree.count_nodes(),
        tree.count_files()
    );

    if tree.children.is_empty() {
        log::warn!("⚠️ No entries found under {}", config.root.display());
    }

    // 4. Format
    let output = StructureFormatter::new(&config.structure)
        .format_structure(&tree)
        .context("Failed to format directory structure")?;

    // 5. Write or print
    match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory {:?}", parent))?;
            }
            fs::write(path, format!("{}\n", output))
                .context(format!("Failed to write output to {:?}", path))?;
            log::info!("Wrote structure to {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}
