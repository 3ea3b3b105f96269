//! Shared code system registry
//!
//! Maps canonical URL to the code systems created while compiling a batch of
//! sheets. Insertion order is preserved so output is deterministic.

use crate::fhir_types::CodeSystemResource;
use indexmap::IndexMap;
use tracing::warn;

/// Code systems by canonical URL
#[derive(Debug, Default, Clone)]
pub struct CodeSystemRegistry {
    code_systems: IndexMap<String, CodeSystemResource>,
}

impl CodeSystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code system under its URL
    ///
    /// A code system already registered under the same URL is replaced and
    /// returned; callers are expected to use distinct sheet names.
    pub fn insert(&mut self, code_system: CodeSystemResource) -> Option<CodeSystemResource> {
        let url = code_system.url.clone();
        let previous = self.code_systems.insert(url.clone(), code_system);
        if previous.is_some() {
            warn!("CodeSystem {} registered twice; keeping the latest", url);
        }
        previous
    }

    pub fn get(&self, url: &str) -> Option<&CodeSystemResource> {
        self.code_systems.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.code_systems.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.code_systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_systems.is_empty()
    }

    /// Code systems in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeSystemResource)> {
        self.code_systems.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &CodeSystemResource> {
        self.code_systems.values()
    }
}
