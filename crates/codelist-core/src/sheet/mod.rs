//! Code list sheets
//!
//! A [`Sheet`] is an already-materialized table: a name, the header columns
//! captured when the table was opened, and the data rows in source order.
//! [`CodeListRow`] is a typed view over one row using the fixed code list
//! column names.
//!
//! ## Columns
//!
//! | Column | Meaning |
//! |---|---|
//! | `System` | Empty: the row defines a concept in the inline code system. Otherwise the external system URI |
//! | `Id` | Local alias used by `#id` parent references |
//! | `Abstract` | `Y` marks the concept not selectable |
//! | `Code` | Concept code |
//! | `Display` | Display text |
//! | `Definition` | Formal definition |
//! | `Comment` | Comment annotation |
//! | `v2`, `v3` | Mapping tags |
//! | `Parent` | `#id` or a code seen in an earlier row |
//! | `Display:<lang>` | Any number of additional designation columns |
//!
//! Designation columns are part of the header schema. A cell stored under a
//! `Display:<lang>` name that is not in the header is never looked at.

mod loader;

pub use loader::{SheetLoader, SheetLoaderOptions};

use indexmap::IndexSet;
use std::collections::HashMap;

/// Prefix identifying designation columns (`Display:fr`, `Display:nl`, ...)
pub const DISPLAY_COLUMN_PREFIX: &str = "Display:";

/// Fixed code list column names
pub mod columns {
    pub const SYSTEM: &str = "System";
    pub const ID: &str = "Id";
    pub const ABSTRACT: &str = "Abstract";
    pub const CODE: &str = "Code";
    pub const DISPLAY: &str = "Display";
    pub const DEFINITION: &str = "Definition";
    pub const COMMENT: &str = "Comment";
    pub const V2: &str = "v2";
    pub const V3: &str = "v3";
    pub const PARENT: &str = "Parent";

    /// The fixed columns in audit order
    pub const STANDARD: [&str; 10] = [
        SYSTEM, ID, ABSTRACT, CODE, DISPLAY, DEFINITION, COMMENT, V2, V3, PARENT,
    ];
}

/// A designation column discovered in the sheet header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayColumn {
    /// Full header text, e.g. `Display:fr`
    pub header: String,
    /// Language tag after the prefix, e.g. `fr`
    pub language: String,
}

/// An in-memory code list table
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Create an empty sheet with the given header columns
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            // First occurrence wins for repeated headers
            index.entry(column.clone()).or_insert(i);
        }

        Self {
            name: name.into(),
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Create an empty sheet with the ten fixed code list columns
    pub fn with_standard_columns(name: impl Into<String>) -> Self {
        Self::new(name, columns::STANDARD)
    }

    /// Create an empty sheet with the fixed columns followed by one
    /// `Display:<lang>` column per language
    pub fn with_languages(name: impl Into<String>, languages: &[&str]) -> Self {
        let columns = columns::STANDARD
            .iter()
            .map(|c| c.to_string())
            .chain(
                languages
                    .iter()
                    .map(|lang| format!("{DISPLAY_COLUMN_PREFIX}{lang}")),
            );
        Self::new(name, columns)
    }

    /// Append a row given as positional cells
    ///
    /// Missing trailing cells read as empty; extra cells are kept but have no
    /// header and are never read.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Append a row given as `(column, value)` pairs
    ///
    /// Pairs naming a column that is not in the header are dropped.
    pub fn push_record(&mut self, fields: &[(&str, &str)]) {
        let mut cells = vec![String::new(); self.columns.len()];
        for (column, value) in fields {
            if let Some(&i) = self.index.get(*column) {
                cells[i] = value.to_string();
            }
        }
        self.rows.push(cells);
    }

    /// Sheet name (the naming seed for the inline code system)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header columns in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the header contains the given column
    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value for a row and column name; empty when either is absent
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.index
            .get(column)
            .and_then(|&i| self.rows.get(row).and_then(|r| r.get(i)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Designation columns, detected by prefix over the header
    ///
    /// A repeated header yields a single column, read from its first
    /// occurrence.
    pub fn display_columns(&self) -> Vec<DisplayColumn> {
        let distinct: IndexSet<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|header| header.starts_with(DISPLAY_COLUMN_PREFIX))
            .collect();

        distinct
            .into_iter()
            .filter_map(|header| {
                header
                    .strip_prefix(DISPLAY_COLUMN_PREFIX)
                    .map(|language| DisplayColumn {
                        header: header.to_string(),
                        language: language.to_string(),
                    })
            })
            .collect()
    }

    /// Typed views over every row, in source order
    pub fn code_list_rows(&self) -> impl Iterator<Item = CodeListRow<'_>> {
        (0..self.rows.len()).map(move |index| CodeListRow { sheet: self, index })
    }

    /// Typed view over a single row
    pub fn row(&self, index: usize) -> Option<CodeListRow<'_>> {
        (index < self.rows.len()).then_some(CodeListRow { sheet: self, index })
    }
}

/// Typed view over one code list row
#[derive(Debug, Clone, Copy)]
pub struct CodeListRow<'a> {
    sheet: &'a Sheet,
    index: usize,
}

impl<'a> CodeListRow<'a> {
    /// Zero-based row index within the sheet
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> &'a str {
        self.sheet.cell(self.index, column)
    }

    pub fn system(&self) -> &'a str {
        self.get(columns::SYSTEM)
    }

    pub fn id(&self) -> &'a str {
        self.get(columns::ID)
    }

    pub fn code(&self) -> &'a str {
        self.get(columns::CODE)
    }

    pub fn display(&self) -> &'a str {
        self.get(columns::DISPLAY)
    }

    pub fn definition(&self) -> &'a str {
        self.get(columns::DEFINITION)
    }

    pub fn comment(&self) -> &'a str {
        self.get(columns::COMMENT)
    }

    pub fn v2(&self) -> &'a str {
        self.get(columns::V2)
    }

    pub fn v3(&self) -> &'a str {
        self.get(columns::V3)
    }

    pub fn parent(&self) -> &'a str {
        self.get(columns::PARENT)
    }

    /// Whether this row defines a concept in the inline code system
    pub fn defines_concept(&self) -> bool {
        self.system().is_empty()
    }

    /// `Abstract` is `Y` (case-insensitive)
    pub fn is_abstract(&self) -> bool {
        self.get(columns::ABSTRACT).eq_ignore_ascii_case("y")
    }

    /// Non-empty designations as `(language, text)` in header order
    pub fn designations<'c>(
        &self,
        display_columns: &'c [DisplayColumn],
    ) -> Vec<(&'c str, &'a str)> {
        display_columns
            .iter()
            .filter_map(|column| {
                let value = self.get(&column.header);
                (!value.is_empty()).then_some((column.language.as_str(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_lookup_defaults_to_empty() {
        let mut sheet = Sheet::with_standard_columns("conditions");
        sheet.push_row(["", "a", "", "c1"]);

        assert_eq!(sheet.cell(0, "Id"), "a");
        assert_eq!(sheet.cell(0, "Code"), "c1");
        // Short row
        assert_eq!(sheet.cell(0, "Parent"), "");
        // Unknown column
        assert_eq!(sheet.cell(0, "Nope"), "");
        // Out of range row
        assert_eq!(sheet.cell(3, "Code"), "");
    }

    #[test]
    fn test_push_record_maps_by_name() {
        let mut sheet = Sheet::with_standard_columns("conditions");
        sheet.push_record(&[("Code", "c1"), ("Parent", "#a"), ("Unknown", "x")]);

        let row = sheet.row(0).unwrap();
        assert_eq!(row.code(), "c1");
        assert_eq!(row.parent(), "#a");
        assert!(row.defines_concept());
        assert_eq!(sheet.columns().len(), 10);
    }

    #[test]
    fn test_display_columns_detected_from_header() {
        let sheet = Sheet::new(
            "s",
            ["Code", "Display", "Display:fr", "Comment", "Display:nl"],
        );
        let columns = sheet.display_columns();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header, "Display:fr");
        assert_eq!(columns[0].language, "fr");
        assert_eq!(columns[1].language, "nl");
    }

    #[test]
    fn test_repeated_display_header_counts_once() {
        let mut sheet = Sheet::new("s", ["Code", "Display:fr", "Display:nl", "Display:fr"]);
        sheet.push_row(["a", "Un", "Een", "Une"]);
        let columns = sheet.display_columns();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header, "Display:fr");
        assert_eq!(columns[1].header, "Display:nl");
        let designations = sheet.row(0).unwrap().designations(&columns);
        assert_eq!(designations, vec![("fr", "Un"), ("nl", "Een")]);
    }

    #[test]
    fn test_designations_skip_empty_cells() {
        let mut sheet = Sheet::with_languages("s", &["fr", "nl"]);
        sheet.push_record(&[("Code", "a"), ("Display:nl", "Een")]);
        let columns = sheet.display_columns();

        let designations = sheet.row(0).unwrap().designations(&columns);
        assert_eq!(designations, vec![("nl", "Een")]);
    }

    #[test]
    fn test_designations_ignore_columns_missing_from_header() {
        let mut sheet = Sheet::with_standard_columns("s");
        sheet.push_record(&[("Code", "a"), ("Display:de", "Eins")]);

        let columns = sheet.display_columns();
        let designations = sheet.row(0).unwrap().designations(&columns);
        assert!(designations.is_empty());
    }

    #[test]
    fn test_abstract_flag_is_case_insensitive() {
        let mut sheet = Sheet::with_standard_columns("s");
        sheet.push_record(&[("Code", "a"), ("Abstract", "y")]);
        sheet.push_record(&[("Code", "b"), ("Abstract", "Y")]);
        sheet.push_record(&[("Code", "c"), ("Abstract", "yes")]);

        let flags: Vec<bool> = sheet.code_list_rows().map(|r| r.is_abstract()).collect();
        assert_eq!(flags, vec![true, true, false]);
    }
}
