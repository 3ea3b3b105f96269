//! Code list compiler
//!
//! Compiles a [`Sheet`] into a ValueSet compose and, when the sheet defines
//! its own codes, an inline CodeSystem registered in a shared
//! [`CodeSystemRegistry`].
//!
//! # Overview
//!
//! Rows with an empty `System` define concepts in the inline code system;
//! rows with a `System` enumerate codes from that external system.
//!
//! 1. Every row is mirrored to the audit sink, and the pass notes whether any
//!    row defines a concept.
//! 2. Defining rows are built into a concept tree in row order. `Parent` is
//!    either empty (root), `#id` (lookup by Id) or a code seen earlier.
//! 3. Referencing rows are grouped into one include per system, in order of
//!    first appearance.
//!
//! Codes are unique across both kinds of row. Any duplicate code or
//! unresolved parent aborts the compile and leaves the value set and the
//! registry untouched. Rows already mirrored to the audit sink stay there.
//!
//! # Example
//!
//! ```
//! use codelist_core::audit::TabDelimitedSheet;
//! use codelist_core::compiler::{CodeListCompiler, CompileOptions};
//! use codelist_core::fhir_types::ValueSetResource;
//! use codelist_core::registry::CodeSystemRegistry;
//! use codelist_core::sheet::Sheet;
//!
//! let mut sheet = Sheet::with_standard_columns("example");
//! sheet.push_record(&[("Id", "a"), ("Code", "c1")]);
//! sheet.push_record(&[("Id", "b"), ("Code", "c2"), ("Parent", "#a")]);
//!
//! let mut audit = TabDelimitedSheet::new();
//! let mut registry = CodeSystemRegistry::new();
//! let mut value_set =
//!     ValueSetResource::new("http://hl7.org/fhir/ValueSet/example", "Example", "draft");
//!
//! let compiler = CodeListCompiler::new(&sheet, CompileOptions::new("1.0"), &mut audit);
//! let summary = compiler.compile(&mut value_set, &mut registry).unwrap();
//!
//! assert_eq!(summary.concepts, 2);
//! let cs = registry.get("http://hl7.org/fhir/example").unwrap();
//! assert_eq!(cs.concepts()[0].children()[0].code, "c2");
//! ```

use crate::audit::AuditSink;
use crate::error::CodelistError;
use crate::extensions;
use crate::fhir_types::{
    CodeSystemConcept, CodeSystemResource, ConceptDesignation, ConceptMappings, ValueSetConcept,
    ValueSetInclude, ValueSetResource, non_empty,
};
use crate::config::DEFAULT_STATUS;
use crate::naming::humanize;
use crate::registry::CodeSystemRegistry;
use crate::result::Result;
use crate::sheet::{CodeListRow, DisplayColumn, Sheet, columns};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Default prefix for inline code system URLs
pub const DEFAULT_BASE_URL: &str = "http://hl7.org/fhir";

/// Marker that makes a `Parent` value an Id reference
pub const ID_REFERENCE_MARKER: char = '#';

/// Options for one compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Prefix for the inline code system URL (`<base_url>/<sheet name>`)
    pub base_url: String,
    /// Version stamped on the inline code system
    pub version: String,
}

impl CompileOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: version.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new("")
    }
}

/// What a successful compile produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSummary {
    /// URL of the inline code system, when one was created
    pub code_system_url: Option<String>,
    /// Concepts defined in the inline code system
    pub concepts: usize,
    /// Codes enumerated from external systems
    pub references: usize,
    /// Distinct external systems included
    pub includes: usize,
}

/// Compiles one sheet
///
/// Binding a compiler to a sheet registers the audit columns: the ten fixed
/// columns followed by every `Display:<lang>` column of the sheet header.
pub struct CodeListCompiler<'a> {
    sheet: &'a Sheet,
    options: CompileOptions,
    display_columns: Vec<DisplayColumn>,
    audit: &'a mut dyn AuditSink,
}

impl<'a> CodeListCompiler<'a> {
    pub fn new(sheet: &'a Sheet, options: CompileOptions, audit: &'a mut dyn AuditSink) -> Self {
        let display_columns = sheet.display_columns();

        for column in columns::STANDARD {
            audit.column(column);
        }
        for column in &display_columns {
            audit.column(&column.header);
        }

        Self {
            sheet,
            options,
            display_columns,
            audit,
        }
    }

    /// URL the inline code system gets for this sheet
    pub fn code_system_url(&self) -> String {
        format!(
            "{}/{}",
            self.options.base_url.trim_end_matches('/'),
            self.sheet.name()
        )
    }

    /// Compile the sheet into `value_set`, registering any inline code system
    pub fn compile(
        mut self,
        value_set: &mut ValueSetResource,
        registry: &mut CodeSystemRegistry,
    ) -> Result<CompileSummary> {
        let sheet_name = self.sheet.name();
        debug!("Compiling code list '{}' ({} rows)", sheet_name, self.sheet.len());

        let has_define = self.mirror_rows();
        let mut seen = SeenCodes::default();
        let mut summary = CompileSummary::default();

        let code_system = if has_define {
            let mut code_system = self.new_code_system(value_set);
            let arena = self.build_concept_tree(&mut code_system, &mut seen)?;
            summary.concepts = arena.len();
            for concept in arena.into_tree() {
                code_system.add_concept(concept);
            }
            code_system.update_count();
            Some(code_system)
        } else {
            trace!("No defining rows in '{}'; no inline CodeSystem", sheet_name);
            None
        };

        let includes = self.collect_external_includes(&mut seen)?;
        summary.includes = includes.len();
        summary.references = includes.values().map(|inc| inc.concepts().len()).sum();

        // Nothing is committed until every row compiled
        let compose = value_set.compose_mut();
        if let Some(code_system) = code_system {
            compose.add_include(ValueSetInclude::from_system(code_system.url.clone()));
            summary.code_system_url = Some(code_system.url.clone());
            registry.insert(code_system);
        }
        for include in includes.into_values() {
            compose.add_include(include);
        }

        debug!(
            "Compiled '{}': {} concepts, {} references across {} external systems",
            sheet_name, summary.concepts, summary.references, summary.includes
        );
        Ok(summary)
    }

    /// Echo every row to the audit sink; returns whether any row defines a concept
    fn mirror_rows(&mut self) -> bool {
        let mut has_define = false;
        for row in self.sheet.code_list_rows() {
            self.audit.row();
            for column in columns::STANDARD {
                self.audit.cell(row.get(column));
            }
            for column in &self.display_columns {
                self.audit.cell(row.get(&column.header));
            }
            has_define |= row.defines_concept();
        }
        has_define
    }

    /// Create the inline code system, inheriting descriptive metadata from the value set
    fn new_code_system(&self, value_set: &ValueSetResource) -> CodeSystemResource {
        let status = if value_set.status.is_empty() {
            DEFAULT_STATUS
        } else {
            value_set.status.as_str()
        };
        let mut cs = CodeSystemResource::new(self.code_system_url(), value_set.name.clone(), status);
        cs.id = Some(self.sheet.name().to_string());
        cs.title = value_set.title.clone();
        cs.experimental = value_set.experimental;
        cs.date = value_set.date.clone();
        cs.publisher = value_set.publisher.clone();
        cs.description = value_set.description.clone();
        cs.use_context = value_set.use_context.clone();
        cs.jurisdiction = value_set.jurisdiction.clone();
        cs.purpose = value_set.purpose.clone();
        cs.copyright = value_set.copyright.clone();
        cs.value_set = Some(value_set.url.clone());

        cs.version = non_empty(&self.options.version);
        cs.case_sensitive = Some(true);
        cs.content = "complete".to_string();
        cs
    }

    /// Phase 1: build the concept tree from defining rows
    fn build_concept_tree(
        &self,
        code_system: &mut CodeSystemResource,
        seen: &mut SeenCodes,
    ) -> Result<ConceptArena> {
        let mut arena = ConceptArena::default();
        let mut ids: HashMap<&str, usize> = HashMap::new();

        for row in self
            .sheet
            .code_list_rows()
            .filter(CodeListRow::defines_concept)
        {
            let code = row.code();
            seen.check(code)?;

            let mut concept = self.concept_from_row(&row);
            if row.is_abstract() {
                extensions::mark_not_selectable(&mut concept);
                extensions::declare_not_selectable(code_system);
            }

            // Resolve before registering so a row cannot be its own parent
            let parent = self.resolve_parent(row.parent(), &ids, seen)?;

            let index = arena.push(concept);
            seen.register(code, Some(index));
            // An empty Id is registered too, so `#` names the latest row without one
            let id = row.id();
            if ids.insert(id, index).is_some() && !id.is_empty() {
                warn!("Id '{}' reused in '{}'; later rows win", id, self.sheet.name());
            }

            match parent {
                Some(parent) => arena.attach(parent, index),
                None => arena.roots.push(index),
            }
            trace!("Row {}: concept '{}' (parent {:?})", row.index(), code, parent);
        }

        Ok(arena)
    }

    fn concept_from_row(&self, row: &CodeListRow<'_>) -> CodeSystemConcept {
        let code = row.code();
        let mut concept = CodeSystemConcept::new(code);

        concept.display = non_empty(row.display());
        if concept.display.is_none() && !code.is_empty() {
            concept.display = Some(humanize(code));
        }
        concept.definition = non_empty(row.definition());
        if !row.comment().is_empty() {
            extensions::add_concept_comment(&mut concept, row.comment());
        }
        concept.mappings = ConceptMappings::from_cells(row.v2(), row.v3());
        for (language, text) in row.designations(&self.display_columns) {
            concept.add_designation(ConceptDesignation::with_language(text, language));
        }

        concept
    }

    /// Arena index of the parent concept, `None` for a root concept
    fn resolve_parent(
        &self,
        parent: &str,
        ids: &HashMap<&str, usize>,
        seen: &SeenCodes,
    ) -> Result<Option<usize>> {
        if parent.is_empty() {
            return Ok(None);
        }

        let resolved = match parent.strip_prefix(ID_REFERENCE_MARKER) {
            Some(id) => ids.get(id).copied(),
            None => seen.concept_index(parent),
        };

        resolved
            .map(Some)
            .ok_or_else(|| CodelistError::unresolved_parent(parent, self.sheet.name()))
    }

    /// Phase 2: group referencing rows into one include per external system
    fn collect_external_includes(
        &self,
        seen: &mut SeenCodes,
    ) -> Result<IndexMap<String, ValueSetInclude>> {
        let mut includes: IndexMap<String, ValueSetInclude> = IndexMap::new();

        for row in self.sheet.code_list_rows().filter(|r| !r.defines_concept()) {
            let system = row.system();
            let code = row.code();
            seen.check(code)?;
            seen.register(code, None);

            let mut reference = ValueSetConcept::new(code);
            reference.display = non_empty(row.display());
            if !row.definition().is_empty() {
                extensions::add_reference_definition(&mut reference, row.definition());
            }
            if !row.comment().is_empty() {
                extensions::add_reference_comment(&mut reference, row.comment());
            }
            reference.mappings.set_if_absent(row.v2(), row.v3());
            for (language, text) in row.designations(&self.display_columns) {
                reference.add_designation(ConceptDesignation::with_language(text, language));
            }

            includes
                .entry(system.to_string())
                .or_insert_with(|| {
                    trace!("Including external system {}", system);
                    ValueSetInclude::from_system(system)
                })
                .add_concept(reference);
        }

        Ok(includes)
    }
}

/// Convenience wrapper: bind a compiler and run it
pub fn compile_sheet(
    sheet: &Sheet,
    options: CompileOptions,
    value_set: &mut ValueSetResource,
    registry: &mut CodeSystemRegistry,
    audit: &mut dyn AuditSink,
) -> Result<CompileSummary> {
    CodeListCompiler::new(sheet, options, audit).compile(value_set, registry)
}

/// Codes seen so far in one compile, shared by both phases
///
/// Inline concepts keep their arena index so unprefixed parents can resolve;
/// external references only record presence.
#[derive(Debug, Default)]
struct SeenCodes {
    codes: HashMap<String, Option<usize>>,
}

impl SeenCodes {
    fn check(&self, code: &str) -> Result<()> {
        if self.codes.contains_key(code) {
            return Err(CodelistError::duplicate_code(code));
        }
        Ok(())
    }

    fn register(&mut self, code: &str, index: Option<usize>) {
        self.codes.insert(code.to_string(), index);
    }

    fn concept_index(&self, code: &str) -> Option<usize> {
        self.codes.get(code).copied().flatten()
    }
}

/// Concepts under construction; children are arena indices
#[derive(Debug, Default)]
struct ConceptArena {
    nodes: Vec<ConceptNode>,
    roots: Vec<usize>,
}

#[derive(Debug)]
struct ConceptNode {
    concept: CodeSystemConcept,
    children: Vec<usize>,
}

impl ConceptArena {
    fn push(&mut self, concept: CodeSystemConcept) -> usize {
        self.nodes.push(ConceptNode {
            concept,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: usize, child: usize) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Hand ownership of every concept to its parent
    fn into_tree(self) -> Vec<CodeSystemConcept> {
        let ConceptArena { nodes, roots } = self;
        let mut slots: Vec<Option<ConceptNode>> = nodes.into_iter().map(Some).collect();
        roots
            .into_iter()
            .filter_map(|root| Self::take_subtree(&mut slots, root))
            .collect()
    }

    fn take_subtree(slots: &mut [Option<ConceptNode>], index: usize) -> Option<CodeSystemConcept> {
        let node = slots.get_mut(index)?.take()?;
        let mut concept = node.concept;
        for child in node.children {
            if let Some(child) = Self::take_subtree(slots, child) {
                concept.add_child(child);
            }
        }
        Some(concept)
    }
}
