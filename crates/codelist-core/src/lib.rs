//! Codelist Core
//!
//! Compiles code list sheets into FHIR terminology resources.
//! A sheet is a table of coded rows; each compile yields a ValueSet compose
//! and, when the sheet defines its own codes, an inline CodeSystem with a
//! concept hierarchy. Every row is also mirrored into a tab-delimited audit
//! sheet.

pub mod audit;
pub mod batch;
pub mod compiler;
pub mod config;
pub mod error;
pub mod extensions;
pub mod fhir_types;
pub mod naming;
pub mod registry;
pub mod result;
pub mod sheet;
pub mod writer;

// Re-export commonly used types
pub use audit::{AuditSink, NullAuditSink, TabDelimitedSheet};
pub use batch::{BatchCompiler, BatchOptions, BatchOutput, CompiledSheet, FailedSheet};
pub use compiler::{CodeListCompiler, CompileOptions, CompileSummary, compile_sheet};
pub use config::{CodelistConfig, ConfigLoader};
pub use error::{CodelistError, ErrorKind};
pub use fhir_types::{
    CodeSystemConcept, CodeSystemResource, ConceptDesignation, ConceptMappings, ValueSetConcept,
    ValueSetInclude, ValueSetResource,
};
pub use registry::CodeSystemRegistry;
pub use result::{Result, ResultExt};
pub use sheet::{CodeListRow, Sheet, SheetLoader, SheetLoaderOptions};
pub use writer::OutputWriter;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codelist=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
