//! Batch compilation
//!
//! Compiles several sheets against one [`CodeSystemRegistry`]. Each sheet gets
//! its own value set at `<base>/ValueSet/<sheet>` and its own audit mirror.

use crate::audit::TabDelimitedSheet;
use crate::compiler::{CompileOptions, CompileSummary, DEFAULT_BASE_URL, compile_sheet};
use crate::config::CodelistConfig;
use crate::error::CodelistError;
use crate::fhir_types::{ValueSetResource, non_empty};
use crate::naming::pascal_case;
use crate::registry::CodeSystemRegistry;
use crate::result::Result;
use crate::sheet::{Sheet, SheetLoader};
use std::path::Path;
use tracing::{info, warn};

/// Batch options
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// URL prefix for value sets and inline code systems
    pub base_url: String,
    /// Version stamped on every generated resource
    pub version: String,
    /// Value set publication status
    pub status: String,
    /// Publisher copied to every value set
    pub publisher: Option<String>,
    /// Skip sheets that fail to compile instead of aborting
    pub keep_going: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: String::new(),
            status: "draft".to_string(),
            publisher: None,
            keep_going: false,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &CodelistConfig) -> Self {
        Self {
            base_url: config.base_url(),
            version: config.version(),
            status: config.status(),
            publisher: config.publisher(),
            keep_going: false,
        }
    }

    fn compile_options(&self) -> CompileOptions {
        CompileOptions::new(self.version.clone()).with_base_url(self.base_url.clone())
    }
}

/// A sheet that compiled
#[derive(Debug)]
pub struct CompiledSheet {
    pub name: String,
    pub value_set: ValueSetResource,
    pub summary: CompileSummary,
    pub audit: TabDelimitedSheet,
}

/// A sheet skipped in keep-going mode
#[derive(Debug)]
pub struct FailedSheet {
    pub name: String,
    pub error: CodelistError,
    /// Audit mirror, when the sheet was loaded far enough to produce one
    pub audit: Option<TabDelimitedSheet>,
}

/// Everything a batch produced
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub registry: CodeSystemRegistry,
    pub compiled: Vec<CompiledSheet>,
    pub failed: Vec<FailedSheet>,
}

impl BatchOutput {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_concepts(&self) -> usize {
        self.compiled.iter().map(|s| s.summary.concepts).sum()
    }

    pub fn total_references(&self) -> usize {
        self.compiled.iter().map(|s| s.summary.references).sum()
    }
}

/// Compiles sheets into value sets sharing one code system registry
#[derive(Debug, Default)]
pub struct BatchCompiler {
    options: BatchOptions,
    output: BatchOutput,
}

impl BatchCompiler {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            output: BatchOutput::default(),
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Value set shell for a sheet, before compilation
    pub fn new_value_set(&self, sheet_name: &str) -> ValueSetResource {
        let mut value_set = ValueSetResource::new(
            format!(
                "{}/ValueSet/{}",
                self.options.base_url.trim_end_matches('/'),
                sheet_name
            ),
            pascal_case(sheet_name),
            self.options.status.clone(),
        );
        value_set.id = Some(sheet_name.to_string());
        value_set.version = non_empty(&self.options.version);
        value_set.publisher = self.options.publisher.clone();
        value_set
    }

    /// Compile one sheet
    ///
    /// In keep-going mode a compile or sheet error is recorded and `Ok` is
    /// returned; any other error is returned as is.
    pub fn compile(&mut self, sheet: &Sheet) -> Result<()> {
        let name = sheet.name().to_string();
        let mut value_set = self.new_value_set(&name);
        let mut audit = TabDelimitedSheet::new();

        let outcome = compile_sheet(
            sheet,
            self.options.compile_options(),
            &mut value_set,
            &mut self.output.registry,
            &mut audit,
        );

        match outcome {
            Ok(summary) => {
                info!(
                    "Compiled '{}': {} concepts, {} references",
                    name, summary.concepts, summary.references
                );
                self.output.compiled.push(CompiledSheet {
                    name,
                    value_set,
                    summary,
                    audit,
                });
                Ok(())
            }
            Err(error) => self.record_failure(name, error, Some(audit)),
        }
    }

    /// Load and compile sheet files in order
    pub fn compile_files<P: AsRef<Path>>(
        &mut self,
        loader: &SheetLoader,
        paths: &[P],
    ) -> Result<()> {
        for path in paths {
            let path = path.as_ref();
            match loader.load_file(path) {
                Ok(sheet) => self.compile(&sheet)?,
                Err(error) => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    self.record_failure(name, error, None)?;
                }
            }
        }
        Ok(())
    }

    fn record_failure(
        &mut self,
        name: String,
        error: CodelistError,
        audit: Option<TabDelimitedSheet>,
    ) -> Result<()> {
        if !(self.options.keep_going && error.is_recoverable()) {
            return Err(error);
        }

        warn!("Skipping sheet '{}': {}", name, error);
        self.output.failed.push(FailedSheet { name, error, audit });
        Ok(())
    }

    pub fn finish(self) -> BatchOutput {
        self.output
    }
}
