//! Build output formatting

use colored::Colorize;
use codelist_core::BatchOutput;
use codelist_core::config::CodelistConfig;
use std::time::Duration;

/// Print build header with configuration info
pub fn print_build_header(config: &CodelistConfig, sheets: usize) {
    println!();
    println!("{}", "codelist build".bright_cyan().bold());
    println!();
    println!("  {} {}", "Base URL:".bold(), config.base_url());
    let version = config.version();
    println!(
        "  {} {}",
        "Version:".bold(),
        if version.is_empty() { "-" } else { version.as_str() }
    );
    println!("  {} {}", "Status:".bold(), config.status());
    println!("  {} {}", "Sheets:".bold(), sheets);
    println!(
        "  {} {}",
        "Output:".bold(),
        config.output_directory().display()
    );
    if config.clean_output() {
        println!("  {} Enabled", "Clean Output:".bold());
    }
    if !config.audit_enabled() {
        println!("  {} Disabled", "Audit:".bold());
    }
    println!();
}

/// Print per-sheet lines and totals
pub fn print_build_results(output: &BatchOutput, files_written: usize, elapsed: Duration) {
    for sheet in &output.compiled {
        let summary = &sheet.summary;
        let code_system = if summary.code_system_url.is_some() {
            "1 CodeSystem"
        } else {
            "no CodeSystem"
        };
        println!(
            "  {} {:<24} {} concepts, {} references, {} external systems, {}",
            "✓".green(),
            sheet.name,
            summary.concepts,
            summary.references,
            summary.includes,
            code_system
        );
    }
    for sheet in &output.failed {
        println!("  {} {:<24} {}", "✗".red(), sheet.name, sheet.error);
    }

    println!();
    let totals = format!(
        "{} ValueSets, {} CodeSystems, {} concepts, {} references ({} files) in {:.2}s",
        output.compiled.len(),
        output.registry.len(),
        output.total_concepts(),
        output.total_references(),
        files_written,
        elapsed.as_secs_f64()
    );

    if output.is_success() {
        println!("{}", totals.green());
        println!("{}", "Build completed successfully!".green().bold());
    } else {
        println!("{}", totals.yellow());
        println!(
            "{}",
            format!("Build completed with {} failed sheets.", output.failed.len())
                .yellow()
                .bold()
        );
    }
    println!();
}
