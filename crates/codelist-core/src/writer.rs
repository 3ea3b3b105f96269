//! Output writer
//!
//! ## Directory Structure
//!
//! ```text
//! codelist-generated/
//! ├── ValueSet-<sheet>.json
//! ├── CodeSystem-<sheet>.json    # one per inline code system
//! └── audit/
//!     └── <sheet>.tsv            # tab-delimited row mirror
//! ```

use crate::audit::TabDelimitedSheet;
use crate::batch::BatchOutput;
use crate::error::CodelistError;
use crate::fhir_types::{CodeSystemResource, ValueSetResource};
use crate::result::{Result, ResultExt};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Audit subdirectory
pub const AUDIT_DIR: &str = "audit";

/// Writes compiled resources and audit mirrors to disk
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    clean_output: bool,
    write_audit: bool,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clean_output: false,
            write_audit: true,
        }
    }

    /// Remove the output directory before writing
    pub fn with_clean(mut self, clean_output: bool) -> Self {
        self.clean_output = clean_output;
        self
    }

    pub fn with_audit(mut self, write_audit: bool) -> Self {
        self.write_audit = write_audit;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.output_dir.join(AUDIT_DIR)
    }

    /// Create the directory structure, cleaning first when requested
    pub fn initialize(&self) -> Result<()> {
        if self.clean_output && self.output_dir.exists() {
            fs::remove_dir_all(&self.output_dir)
                .map_err(|e| CodelistError::io_error(&self.output_dir, e))?;
        }

        create_directory(&self.output_dir)?;
        if self.write_audit {
            create_directory(&self.audit_dir())?;
        }
        Ok(())
    }

    pub fn write_value_set(&self, value_set: &ValueSetResource) -> Result<PathBuf> {
        let stem = value_set.id.as_deref().unwrap_or(&value_set.name);
        let path = self.output_dir.join(format!("ValueSet-{stem}.json"));
        write_json(&path, value_set)?;
        Ok(path)
    }

    pub fn write_code_system(&self, code_system: &CodeSystemResource) -> Result<PathBuf> {
        let stem = code_system.id.as_deref().unwrap_or(&code_system.name);
        let path = self.output_dir.join(format!("CodeSystem-{stem}.json"));
        write_json(&path, code_system)?;
        Ok(path)
    }

    pub fn write_audit(&self, sheet_name: &str, audit: &TabDelimitedSheet) -> Result<PathBuf> {
        let path = self.audit_dir().join(format!("{sheet_name}.tsv"));
        audit.write_to_file(&path)?;
        Ok(path)
    }

    /// Write everything a batch produced; returns the written paths
    ///
    /// Audit mirrors of failed sheets are written too, on a best-effort basis.
    pub fn write_batch(&self, output: &BatchOutput) -> Result<Vec<PathBuf>> {
        self.initialize()?;
        let mut written = Vec::new();

        for sheet in &output.compiled {
            written.push(self.write_value_set(&sheet.value_set)?);
            if self.write_audit {
                written.push(self.write_audit(&sheet.name, &sheet.audit)?);
            }
        }

        for code_system in output.registry.values() {
            written.push(self.write_code_system(code_system)?);
        }

        if self.write_audit {
            for sheet in &output.failed {
                if let Some(audit) = &sheet.audit
                    && let Some(path) = self.write_audit(&sheet.name, audit).log_and_continue()
                {
                    written.push(path);
                }
            }
        }

        debug!(
            "Wrote {} files to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| CodelistError::io_error(path, e))
}

/// Write pretty-printed JSON
fn write_json<T: Serialize + ?Sized>(path: &Path, content: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(content).map_err(|e| CodelistError::json_error(path, e))?;
    fs::write(path, json).map_err(|e| CodelistError::io_error(path, e))
}
