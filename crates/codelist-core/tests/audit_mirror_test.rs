//! Audit mirror output for compiled sheets

use codelist_core::{
    CodeSystemRegistry, CompileOptions, Sheet, SheetLoader, TabDelimitedSheet, ValueSetResource,
    compile_sheet,
};
use insta::assert_snapshot;

fn mirror(sheet: &Sheet) -> (TabDelimitedSheet, bool) {
    let mut audit = TabDelimitedSheet::new();
    let mut value_set = ValueSetResource::new("http://hl7.org/fhir/ValueSet/vitals", "Vitals", "draft");
    let mut registry = CodeSystemRegistry::new();
    let ok = compile_sheet(
        sheet,
        CompileOptions::new("1.0"),
        &mut value_set,
        &mut registry,
        &mut audit,
    )
    .is_ok();
    (audit, ok)
}

#[test]
fn test_mirror_layout_with_designation_columns() {
    let mut sheet = Sheet::with_languages("vitals", &["fr"]);
    sheet.push_record(&[("Id", "a"), ("Abstract", "Y"), ("Code", "group")]);
    sheet.push_record(&[
        ("Code", "member"),
        ("Display", "Member"),
        ("Parent", "#a"),
        ("Display:fr", "Membre"),
    ]);
    sheet.push_record(&[
        ("System", "http://loinc.org"),
        ("Code", "8480-6"),
        ("Display", "Systolic"),
    ]);

    let (audit, ok) = mirror(&sheet);
    assert!(ok);
    assert_eq!(audit.columns().len(), 11);

    let rendered = audit.render().unwrap().replace('\t', "|");
    assert_snapshot!(rendered, @r"
    System|Id|Abstract|Code|Display|Definition|Comment|v2|v3|Parent|Display:fr
    |a|Y|group|||||||
    |||member|Member|||||#a|Membre
    http://loinc.org|||8480-6|Systolic||||||
    ");
}

#[test]
fn test_mirror_keeps_rows_of_failed_compile() {
    let mut sheet = Sheet::with_standard_columns("vitals");
    sheet.push_record(&[("Code", "a")]);
    sheet.push_record(&[("Code", "a")]);
    sheet.push_record(&[("Code", "after-the-error")]);

    let (audit, ok) = mirror(&sheet);
    assert!(!ok);
    assert_eq!(audit.rows().len(), 3);
    assert_eq!(audit.rows()[2][3], "after-the-error");
}

#[test]
fn test_mirror_of_loaded_tab_file() {
    let content = "System\tCode\tDisplay\tDisplay:nl\n\tok\tOkay\tGoed\n";
    let sheet = SheetLoader::load_str("status", content, b'\t').unwrap();

    let (audit, ok) = mirror(&sheet);
    assert!(ok);
    assert_eq!(audit.columns().last().map(String::as_str), Some("Display:nl"));
    assert_eq!(
        audit.rows()[0],
        vec!["", "", "", "ok", "Okay", "", "", "", "", "", "Goed"]
    );
}
