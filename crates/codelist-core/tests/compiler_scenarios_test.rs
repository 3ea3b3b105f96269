//! End-to-end compiler scenarios over in-memory sheets

use codelist_core::{
    CodeSystemRegistry, CodelistError, CompileOptions, NullAuditSink, Sheet, ValueSetResource,
    compile_sheet,
};

#[derive(Debug)]
struct Compiled {
    value_set: ValueSetResource,
    registry: CodeSystemRegistry,
}

fn compile(sheet: &Sheet) -> Result<Compiled, CodelistError> {
    let mut value_set = ValueSetResource::new(
        format!("http://hl7.org/fhir/ValueSet/{}", sheet.name()),
        "Test",
        "draft",
    );
    let mut registry = CodeSystemRegistry::new();
    compile_sheet(
        sheet,
        CompileOptions::new("1.0"),
        &mut value_set,
        &mut registry,
        &mut NullAuditSink,
    )?;
    Ok(Compiled {
        value_set,
        registry,
    })
}

fn sheet(name: &str, records: &[&[(&str, &str)]]) -> Sheet {
    let mut sheet = Sheet::with_standard_columns(name);
    for record in records {
        sheet.push_record(record);
    }
    sheet
}

#[test]
fn test_id_reference_builds_hierarchy() {
    let sheet = sheet(
        "example",
        &[
            &[("System", ""), ("Id", "a"), ("Code", "c1"), ("Parent", "")],
            &[("System", ""), ("Id", "b"), ("Code", "c2"), ("Parent", "#a")],
        ],
    );

    let compiled = compile(&sheet).unwrap();
    assert_eq!(compiled.registry.len(), 1);

    let (url, cs) = compiled.registry.iter().next().unwrap();
    assert!(url.ends_with("/example"));
    assert_eq!(cs.version.as_deref(), Some("1.0"));
    assert_eq!(cs.concepts().len(), 1);
    assert_eq!(cs.concepts()[0].code, "c1");
    assert_eq!(cs.concepts()[0].children().len(), 1);
    assert_eq!(cs.concepts()[0].children()[0].code, "c2");
}

#[test]
fn test_external_only_sheet_creates_no_code_system() {
    let sheet = sheet(
        "external",
        &[
            &[("System", "http://x"), ("Code", "k1"), ("Display", "K One")],
            &[("System", "http://x"), ("Code", "k2")],
        ],
    );

    let compiled = compile(&sheet).unwrap();
    assert!(compiled.registry.is_empty());

    let includes = compiled.value_set.includes();
    assert_eq!(includes.len(), 1);
    assert_eq!(includes[0].system.as_deref(), Some("http://x"));

    let codes: Vec<&str> = includes[0]
        .concepts()
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(codes, vec!["k1", "k2"]);
    assert_eq!(includes[0].concepts()[0].display.as_deref(), Some("K One"));
    assert!(includes[0].concepts()[1].display.is_none());
}

#[test]
fn test_duplicate_inline_code() {
    let sheet = sheet(
        "dups",
        &[
            &[("System", ""), ("Code", "dup"), ("Parent", "")],
            &[("System", ""), ("Code", "dup"), ("Parent", "")],
        ],
    );

    match compile(&sheet) {
        Err(CodelistError::DuplicateCode { code }) => assert_eq!(code, "dup"),
        other => panic!("expected DuplicateCode, got {other:?}"),
    }
}

#[test]
fn test_unresolved_parent_names_parent_and_table() {
    let sheet = sheet(
        "orphans",
        &[&[("System", ""), ("Code", "orphan"), ("Parent", "missing")]],
    );

    let err = compile(&sheet).err().unwrap();
    assert_eq!(err.to_string(), "Parent missing not resolved in orphans");
}

#[test]
fn test_duplicate_between_external_systems() {
    let sheet = sheet(
        "mixed",
        &[
            &[("System", "http://a"), ("Code", "x")],
            &[("System", "http://b"), ("Code", "x")],
        ],
    );

    assert!(matches!(
        compile(&sheet),
        Err(CodelistError::DuplicateCode { .. })
    ));
}

#[test]
fn test_includes_in_first_seen_order() {
    let sheet = sheet(
        "order",
        &[
            &[("System", "http://b"), ("Code", "b1")],
            &[("System", "http://a"), ("Code", "a1")],
            &[("System", "http://b"), ("Code", "b2")],
            &[("Code", "local")],
        ],
    );

    let compiled = compile(&sheet).unwrap();
    let systems: Vec<&str> = compiled
        .value_set
        .includes()
        .iter()
        .filter_map(|i| i.system.as_deref())
        .collect();
    assert_eq!(
        systems,
        vec!["http://hl7.org/fhir/order", "http://b", "http://a"]
    );

    let b_codes: Vec<&str> = compiled.value_set.includes()[1]
        .concepts()
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(b_codes, vec!["b1", "b2"]);
}

#[test]
fn test_batch_of_sheets_accumulates_registry() {
    let mut registry = CodeSystemRegistry::new();

    for name in ["first", "second"] {
        let sheet = sheet(name, &[&[("Code", "shared-looking-code")]]);
        let mut value_set =
            ValueSetResource::new(format!("http://hl7.org/fhir/ValueSet/{name}"), name, "draft");
        compile_sheet(
            &sheet,
            CompileOptions::new("2.0"),
            &mut value_set,
            &mut registry,
            &mut NullAuditSink,
        )
        .unwrap();
    }

    // Codes are unique per sheet, not across a batch
    assert_eq!(registry.len(), 2);
    assert!(registry.contains("http://hl7.org/fhir/first"));
    assert!(registry.contains("http://hl7.org/fhir/second"));
}

#[test]
fn test_compiled_value_set_json_shape() {
    let sheet = sheet(
        "shape",
        &[
            &[("Code", "parent"), ("Abstract", "y")],
            &[("Code", "child"), ("Parent", "parent"), ("Comment", "note")],
            &[
                ("System", "http://loinc.org"),
                ("Code", "1234-5"),
                ("Definition", "Defined"),
            ],
        ],
    );

    let compiled = compile(&sheet).unwrap();
    let cs = compiled.registry.get("http://hl7.org/fhir/shape").unwrap();
    let cs_json = serde_json::to_value(cs).unwrap();

    assert_eq!(cs_json["resourceType"], "CodeSystem");
    assert_eq!(cs_json["caseSensitive"], true);
    assert_eq!(cs_json["content"], "complete");
    assert_eq!(cs_json["count"], 2);
    assert_eq!(cs_json["property"][0]["code"], "notSelectable");
    assert_eq!(cs_json["concept"][0]["display"], "Parent");
    assert_eq!(cs_json["concept"][0]["property"][0]["valueBoolean"], true);
    assert_eq!(
        cs_json["concept"][0]["concept"][0]["extension"][0]["valueString"],
        "note"
    );

    let vs_json = serde_json::to_value(&compiled.value_set).unwrap();
    let loinc = &vs_json["compose"]["include"][1];
    assert_eq!(loinc["system"], "http://loinc.org");
    assert_eq!(
        loinc["concept"][0]["extension"][0]["url"],
        "http://hl7.org/fhir/StructureDefinition/valueset-concept-definition"
    );
    assert!(loinc["concept"][0].get("display").is_none());
}
