//! Configuration for codelist builds
//!
//! Settings are grouped into sections:
//! - `canonical`: where inline code systems and value sets live
//! - `valueSet`: metadata stamped on generated value sets
//! - `output`: where and what to write
//! - `files`: how input sheets are read
//!
//! ## Configuration Files
//!
//! Supported formats are JSON, TOML and YAML. Without an explicit path the
//! loader searches the start directory and its parents for, in order,
//! `.codelistrc.json`, `.codelistrc.toml`, `codelist.yaml`, `codelist.yml`
//! and `codelist.json`.
//!
//! ## Example Configuration (codelist.yaml)
//!
//! ```yaml
//! canonical:
//!   baseUrl: http://example.org/fhir
//! valueSet:
//!   status: active
//!   publisher: Example Publisher
//!   version: 1.2.0
//! output:
//!   directory: codelist-generated
//!   audit: true
//! files:
//!   delimiter: ";"
//! ```

mod codelist_config;
mod loader;

pub use codelist_config::{
    CanonicalConfiguration, CodelistConfig, DEFAULT_STATUS, FilesConfiguration,
    OutputConfiguration, ValueSetConfiguration,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
