//! CLI commands for project extraction and injection

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use console::style;

use crate::cli::progress::{DISK, LOOKING_GLASS, print_done, print_step};
use crate::project::{self, ProjectOptions};

pub fn extract(root: &Path, options: &ProjectOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", root.display()));

    let summary = project::extract(root, options)
        .with_context(|| format!("Failed to extract {}", root.display()))?;

    print_step(
        2,
        2,
        DISK,
        &format!(
            "Wrote {} tables ({} strings) for RPG Maker {}",
            summary.tables.len(),
            summary.entries,
            summary.engine.name()
        ),
    );
    for name in &summary.skipped {
        println!(
            "      {} {name} (translation exists, use --force or --append)",
            style("skipped").yellow()
        );
    }

    print_done(start.elapsed());
    Ok(())
}

pub fn inject(root: &Path, options: &ProjectOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    print_step(1, 2, LOOKING_GLASS, &format!("Reading translations of {}...", root.display()));

    let summary = project::inject(root, options)
        .with_context(|| format!("Failed to inject {}", root.display()))?;

    print_step(
        2,
        2,
        DISK,
        &format!(
            "Wrote {} files ({} strings replaced)",
            summary.written.len(),
            summary.replaced
        ),
    );

    print_done(start.elapsed());
    Ok(())
}
