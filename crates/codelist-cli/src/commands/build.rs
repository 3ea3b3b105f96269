//! Build command implementation
//!
//! Loads sheets, compiles them against one shared CodeSystem registry and
//! writes the resulting resources and audit mirrors.

use crate::output;
use anyhow::{Context, bail};
use codelist_core::config::{
    CanonicalConfiguration, CodelistConfig, ConfigLoader, OutputConfiguration,
    ValueSetConfiguration,
};
use codelist_core::{BatchCompiler, BatchOptions, OutputWriter, SheetLoader, SheetLoaderOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Sheet file extensions picked up from directories
const SHEET_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Command-line arguments of `codelist build`
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub status: Option<String>,
    pub keep_going: bool,
    pub no_audit: bool,
    pub clean: bool,
}

/// Compile code list sheets into FHIR resources
pub fn build_command(args: BuildArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let mut config = ConfigLoader::load(config_path, None)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let files = collect_sheet_files(&args.inputs)?;
    if files.is_empty() {
        bail!("No sheet files found (expected .csv, .tsv or .txt)");
    }
    info!("Found {} sheet files", files.len());

    let options = BatchOptions {
        keep_going: args.keep_going,
        ..BatchOptions::from_config(&config)
    };
    output::print_build_header(&config, files.len());

    let loader = SheetLoader::new(SheetLoaderOptions {
        delimiter: config.delimiter()?,
        name: None,
    });
    let mut batch = BatchCompiler::new(options);
    batch
        .compile_files(&loader, &files)
        .context("Build aborted")?;
    let result = batch.finish();

    let writer = OutputWriter::new(config.output_directory())
        .with_clean(config.clean_output())
        .with_audit(config.audit_enabled());
    let written = writer.write_batch(&result).with_context(|| {
        format!(
            "Failed to write output to {}",
            config.output_directory().display()
        )
    })?;
    debug!("Wrote {} files", written.len());

    output::print_build_results(&result, written.len(), start_time.elapsed());

    if !result.is_success() {
        bail!("{} of {} sheets failed", result.failed.len(), files.len());
    }
    Ok(())
}

/// Command-line flags take precedence over the config file
fn apply_overrides(config: &mut CodelistConfig, args: &BuildArgs) {
    if let Some(base_url) = &args.base_url {
        config
            .canonical
            .get_or_insert_with(CanonicalConfiguration::default)
            .base_url = Some(base_url.clone());
    }

    let value_set = config
        .value_set
        .get_or_insert_with(ValueSetConfiguration::default);
    if let Some(version) = &args.version {
        value_set.version = Some(version.clone());
    }
    if let Some(status) = &args.status {
        value_set.status = Some(status.clone());
    }

    let output = config
        .output
        .get_or_insert_with(OutputConfiguration::default);
    if let Some(directory) = &args.output {
        output.directory = Some(directory.clone());
    }
    if args.no_audit {
        output.audit = Some(false);
    }
    if args.clean {
        output.clean = Some(true);
    }
}

/// Expand directories into their sheet files, walking subdirectories
///
/// Files found under each directory are sorted by path; explicit file
/// inputs keep their command-line order.
fn collect_sheet_files(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_sheet_file(path) {
                    found.push(path.to_path_buf());
                }
            }
            found.sort();
            debug!("Found {} sheets under {}", found.len(), input.display());
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    Ok(files)
}

fn is_sheet_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SHEET_EXTENSIONS.contains(&ext.as_str()))
}
