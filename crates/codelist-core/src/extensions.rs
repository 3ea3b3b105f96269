//! Tooling extensions and well-known concept properties
//!
//! Comment and definition annotations are carried as FHIR extensions; the
//! not-selectable flag is the standard `notSelectable` concept property, which
//! the owning code system must also declare.

use crate::fhir_types::{
    CodeSystemConcept, CodeSystemConceptProperty, CodeSystemProperty, CodeSystemResource,
    Extension, ValueSetConcept,
};

/// Comment on a concept defined in a CodeSystem
pub const EXT_CS_CONCEPT_COMMENT: &str =
    "http://hl7.org/fhir/StructureDefinition/codesystem-concept-comments";

/// Comment on a concept enumerated in a ValueSet
pub const EXT_VS_CONCEPT_COMMENT: &str =
    "http://hl7.org/fhir/StructureDefinition/valueset-concept-comments";

/// Definition of a concept enumerated in a ValueSet
pub const EXT_VS_CONCEPT_DEFINITION: &str =
    "http://hl7.org/fhir/StructureDefinition/valueset-concept-definition";

/// Concept property code for abstract concepts
pub const PROP_NOT_SELECTABLE: &str = "notSelectable";

/// Formal URI of the `notSelectable` property
pub const PROP_NOT_SELECTABLE_URI: &str = "http://hl7.org/fhir/concept-properties#notSelectable";

/// Attach a comment annotation to a code system concept
pub fn add_concept_comment(concept: &mut CodeSystemConcept, comment: &str) {
    concept.add_extension(Extension::string(EXT_CS_CONCEPT_COMMENT, comment));
}

/// Attach a comment annotation to a value set concept reference
pub fn add_reference_comment(concept: &mut ValueSetConcept, comment: &str) {
    concept.add_extension(Extension::string(EXT_VS_CONCEPT_COMMENT, comment));
}

/// Attach a definition annotation to a value set concept reference
pub fn add_reference_definition(concept: &mut ValueSetConcept, definition: &str) {
    concept.add_extension(Extension::string(EXT_VS_CONCEPT_DEFINITION, definition));
}

/// Declare the `notSelectable` property on a code system (once)
pub fn declare_not_selectable(code_system: &mut CodeSystemResource) {
    if code_system.has_property(PROP_NOT_SELECTABLE) {
        return;
    }
    let mut property = CodeSystemProperty::new(PROP_NOT_SELECTABLE, "boolean");
    property.uri = Some(PROP_NOT_SELECTABLE_URI.to_string());
    property.description = Some(
        "Indicates that the code is abstract - only intended to be used as a selector for other concepts"
            .to_string(),
    );
    code_system.add_property(property);
}

/// Mark a concept as not selectable
pub fn mark_not_selectable(concept: &mut CodeSystemConcept) {
    concept.add_property(CodeSystemConceptProperty::boolean(PROP_NOT_SELECTABLE, true));
}

/// Whether a concept carries `notSelectable = true`
#[cfg(test)]
pub(crate) fn is_not_selectable(concept: &CodeSystemConcept) -> bool {
    concept.property.as_ref().is_some_and(|props| {
        props
            .iter()
            .any(|p| p.code == PROP_NOT_SELECTABLE && p.value_boolean)
    })
}

/// First string value of an extension with the given URL
#[cfg(test)]
pub(crate) fn extension_string<'a>(
    extensions: Option<&'a [Extension]>,
    url: &str,
) -> Option<&'a str> {
    extensions?
        .iter()
        .find(|ext| ext.url == url)
        .map(|ext| ext.value_string.as_str())
}
