//! FHIR terminology resource types
//!
//! Simplified FHIR terminology resources produced by the code list compiler.
//! Only the fields the compiler and writer touch are modelled; anything else a
//! caller wants on the ValueSet can be set before compiling.

use serde::{Deserialize, Serialize};

// ============================================================================
// Shared elements
// ============================================================================

/// FHIR extension carrying a string annotation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Identifies the meaning of the extension
    pub url: String,

    pub value_string: String,
}

impl Extension {
    /// Create a string-valued extension
    pub fn string(url: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            value_string: value.into(),
        }
    }
}

/// Additional representation for a concept (display in another language)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDesignation {
    /// Human language of the designation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// The text value for this designation
    pub value: String,
}

impl ConceptDesignation {
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            value: value.into(),
        }
    }
}

/// v2/v3 mapping tags carried alongside a concept
///
/// Never serialized; downstream mapping generators read them from the
/// in-memory resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptMappings {
    pub v2: Option<String>,
    pub v3: Option<String>,
}

impl ConceptMappings {
    /// Build mappings from raw cells; empty cells are treated as absent
    pub fn from_cells(v2: &str, v3: &str) -> Self {
        Self {
            v2: non_empty(v2),
            v3: non_empty(v3),
        }
    }

    /// Set each tag from a non-empty cell only when no value is present yet
    pub fn set_if_absent(&mut self, v2: &str, v3: &str) {
        if self.v2.is_none() {
            self.v2 = non_empty(v2);
        }
        if self.v3.is_none() {
            self.v3 = non_empty(v3);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.v2.is_none() && self.v3.is_none()
    }
}

/// Empty cells are equivalent to absent values
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn push_or_init<T>(target: &mut Option<Vec<T>>, item: T) {
    if let Some(items) = target {
        items.push(item);
    } else {
        *target = Some(vec![item]);
    }
}

// ============================================================================
// ValueSet
// ============================================================================

/// FHIR ValueSet resource
///
/// Represents a set of codes drawn from one or more code systems.
/// See: <https://www.hl7.org/fhir/valueset.html>
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetResource {
    /// Resource type (always "ValueSet")
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier for this value set
    pub url: String,

    /// Business version of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name for this value set (computer friendly)
    pub name: String,

    /// Name for this value set (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// draft | active | retired | unknown
    pub status: String,

    /// For testing purposes, not real usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    /// Date last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Name of the publisher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Natural language description of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The context that the content is intended to support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_context: Option<Vec<serde_json::Value>>,

    /// Intended jurisdiction for value set (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Vec<serde_json::Value>>,

    /// Indicates whether or not any change to the content logical definition may occur
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

    /// Purpose and use of the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Use and/or publishing restrictions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// Content logical definition of the value set (CLD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose: Option<ValueSetCompose>,
}

impl ValueSetResource {
    /// Create a new ValueSet resource
    pub fn new(url: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            resource_type: "ValueSet".to_string(),
            id: None,
            url: url.into(),
            version: None,
            name: name.into(),
            title: None,
            status: status.into(),
            experimental: None,
            date: None,
            publisher: None,
            description: None,
            use_context: None,
            jurisdiction: None,
            immutable: None,
            purpose: None,
            copyright: None,
            compose: None,
        }
    }

    /// Compose, created on first use
    pub fn compose_mut(&mut self) -> &mut ValueSetCompose {
        self.compose.get_or_insert_with(ValueSetCompose::new)
    }

    /// Include entries in order (empty when there is no compose)
    pub fn includes(&self) -> &[ValueSetInclude] {
        self.compose
            .as_ref()
            .and_then(|c| c.include.as_deref())
            .unwrap_or(&[])
    }
}

/// Content logical definition of the value set (CLD)
///
/// Defines what codes are in the value set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCompose {
    /// Whether inactive codes are in the value set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,

    /// Include one or more codes from a code system or other value set(s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<ValueSetInclude>>,
}

impl ValueSetCompose {
    /// Create a new empty compose
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include entry
    pub fn add_include(&mut self, include: ValueSetInclude) {
        push_or_init(&mut self.include, include);
    }
}

/// Include codes from a code system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetInclude {
    /// The system the codes come from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Specific version of the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// A concept defined in the system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<ValueSetConcept>>,
}

impl ValueSetInclude {
    /// Create a new include for a specific system
    pub fn from_system(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            version: None,
            concept: None,
        }
    }

    /// Add a concept
    pub fn add_concept(&mut self, concept: ValueSetConcept) {
        push_or_init(&mut self.concept, concept);
    }

    /// Concepts in order (empty when none were enumerated)
    pub fn concepts(&self) -> &[ValueSetConcept] {
        self.concept.as_deref().unwrap_or(&[])
    }
}

/// A concept from an external code system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetConcept {
    /// Additional content defined by implementations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Code or expression from system
    pub code: String,

    /// Text to display for this code for this value set in this valueset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Additional representations for this concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Vec<ConceptDesignation>>,

    /// v2/v3 mapping tags
    #[serde(skip)]
    pub mappings: ConceptMappings,
}

impl ValueSetConcept {
    /// Create a new concept with just a code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            extension: None,
            code: code.into(),
            display: None,
            designation: None,
            mappings: ConceptMappings::default(),
        }
    }

    pub fn add_extension(&mut self, extension: Extension) {
        push_or_init(&mut self.extension, extension);
    }

    pub fn add_designation(&mut self, designation: ConceptDesignation) {
        push_or_init(&mut self.designation, designation);
    }
}

// ============================================================================
// CodeSystem
// ============================================================================

/// FHIR CodeSystem resource
///
/// Represents a set of codes with definitions and relationships.
/// See: <https://www.hl7.org/fhir/codesystem.html>
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemResource {
    /// Resource type (always "CodeSystem")
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical identifier for this code system
    pub url: String,

    /// Business version of the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name for this code system (computer friendly)
    pub name: String,

    /// Name for this code system (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// draft | active | retired | unknown
    pub status: String,

    /// If definitions are not stable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    /// Date last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Name of the publisher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Natural language description of the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The context that the content is intended to support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_context: Option<Vec<serde_json::Value>>,

    /// Intended jurisdiction for code system (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Vec<serde_json::Value>>,

    /// Why this code system is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Use and/or publishing restrictions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// If code comparison is case sensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    /// Canonical reference to the value set with entire code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    /// not-present | example | fragment | complete | supplement
    pub content: String,

    /// Total concepts in the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Additional information supplied about each concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<CodeSystemProperty>>,

    /// Concepts in the code system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<CodeSystemConcept>>,
}

impl CodeSystemResource {
    /// Create a new CodeSystem resource
    pub fn new(url: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            resource_type: "CodeSystem".to_string(),
            id: None,
            url: url.into(),
            version: None,
            name: name.into(),
            title: None,
            status: status.into(),
            experimental: None,
            date: None,
            publisher: None,
            description: None,
            use_context: None,
            jurisdiction: None,
            purpose: None,
            copyright: None,
            case_sensitive: None,
            value_set: None,
            content: "complete".to_string(),
            count: None,
            property: None,
            concept: None,
        }
    }

    /// Add a top-level concept to the code system
    pub fn add_concept(&mut self, concept: CodeSystemConcept) {
        push_or_init(&mut self.concept, concept);
    }

    /// Add a property definition
    pub fn add_property(&mut self, property: CodeSystemProperty) {
        push_or_init(&mut self.property, property);
    }

    /// Whether a property with this code is already declared
    pub fn has_property(&self, code: &str) -> bool {
        self.property
            .as_ref()
            .is_some_and(|props| props.iter().any(|p| p.code == code))
    }

    /// Top-level concepts in order (empty when none)
    pub fn concepts(&self) -> &[CodeSystemConcept] {
        self.concept.as_deref().unwrap_or(&[])
    }

    /// Update the count of concepts
    pub fn update_count(&mut self) {
        if let Some(ref concepts) = self.concept {
            self.count = Some(Self::count_concepts_recursive(concepts));
        }
    }

    /// Recursively count all concepts including children
    fn count_concepts_recursive(concepts: &[CodeSystemConcept]) -> u32 {
        concepts
            .iter()
            .map(|c| 1 + c.concept.as_deref().map_or(0, Self::count_concepts_recursive))
            .sum()
    }
}

/// A concept defined in the code system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConcept {
    /// Additional content defined by implementations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,

    /// Code that identifies concept
    pub code: String,

    /// Text to display to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Formal definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Additional representations for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Vec<ConceptDesignation>>,

    /// Property value for the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<Vec<CodeSystemConceptProperty>>,

    /// Child Concepts (is-a/contains/categorizes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Vec<CodeSystemConcept>>,

    /// v2/v3 mapping tags
    #[serde(skip)]
    pub mappings: ConceptMappings,
}

impl CodeSystemConcept {
    /// Create a new concept with just a code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            extension: None,
            code: code.into(),
            display: None,
            definition: None,
            designation: None,
            property: None,
            concept: None,
            mappings: ConceptMappings::default(),
        }
    }

    /// Add a child concept
    pub fn add_child(&mut self, child: CodeSystemConcept) {
        push_or_init(&mut self.concept, child);
    }

    /// Child concepts in order (empty when none)
    pub fn children(&self) -> &[CodeSystemConcept] {
        self.concept.as_deref().unwrap_or(&[])
    }

    /// Add a property value
    pub fn add_property(&mut self, property: CodeSystemConceptProperty) {
        push_or_init(&mut self.property, property);
    }

    pub fn add_extension(&mut self, extension: Extension) {
        push_or_init(&mut self.extension, extension);
    }

    pub fn add_designation(&mut self, designation: ConceptDesignation) {
        push_or_init(&mut self.designation, designation);
    }
}

/// A boolean property value for a concept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemConceptProperty {
    /// Reference to CodeSystem.property.code
    pub code: String,

    /// Value of the property for this concept
    pub value_boolean: bool,
}

impl CodeSystemConceptProperty {
    pub fn boolean(code: impl Into<String>, value: bool) -> Self {
        Self {
            code: code.into(),
            value_boolean: value,
        }
    }
}

/// Additional information about a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemProperty {
    /// Identifies the property on the concepts
    pub code: String,

    /// Formal identifier for the property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Why the property is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// code | Coding | string | integer | boolean | dateTime | decimal
    #[serde(rename = "type")]
    pub type_: String,
}

impl CodeSystemProperty {
    /// Create a new property definition
    pub fn new(code: impl Into<String>, type_: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            uri: None,
            description: None,
            type_: type_.into(),
        }
    }
}
