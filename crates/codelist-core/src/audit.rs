//! Audit mirror
//!
//! Every input row is echoed into an append-only tabular sink for
//! traceability. The mirror never feeds back into compilation and is not
//! rolled back when a compile fails.

use crate::error::CodelistError;
use crate::result::Result;
use std::path::Path;

/// Append-only tabular writer
pub trait AuditSink {
    /// Register an output column
    fn column(&mut self, name: &str);

    /// Start a new row
    fn row(&mut self);

    /// Append a cell to the current row
    fn cell(&mut self, value: &str);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn column(&mut self, _name: &str) {}
    fn row(&mut self) {}
    fn cell(&mut self, _value: &str) {}
}

/// In-memory tab-delimited sheet
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TabDelimitedSheet {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabDelimitedSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Render as tab-separated text: a header line, then one line per row
    pub fn render(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(Vec::new());

        let to_internal = |e: csv::Error| CodelistError::internal_error(e.to_string());
        writer.write_record(&self.columns).map_err(to_internal)?;
        for row in &self.rows {
            writer.write_record(row).map_err(to_internal)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CodelistError::internal_error(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CodelistError::internal_error(e.to_string()))
    }

    /// Render and write to a file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let text = self.render()?;
        std::fs::write(path, text).map_err(|e| CodelistError::io_error(path, e))
    }
}

impl AuditSink for TabDelimitedSheet {
    fn column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    fn row(&mut self) {
        self.rows.push(Vec::with_capacity(self.columns.len()));
    }

    fn cell(&mut self, value: &str) {
        if self.rows.is_empty() {
            self.row();
        }
        if let Some(current) = self.rows.last_mut() {
            current.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_columns_registered_once() {
        let mut sheet = TabDelimitedSheet::new();
        sheet.column("Code");
        sheet.column("Display");
        sheet.column("Code");

        assert_eq!(sheet.columns(), &["Code".to_string(), "Display".to_string()]);
    }

    #[test]
    fn test_cells_append_to_current_row() {
        let mut sheet = TabDelimitedSheet::new();
        sheet.column("Code");
        sheet.row();
        sheet.cell("a");
        sheet.row();
        sheet.cell("b");

        assert_eq!(sheet.rows(), &[vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn test_cell_before_row_starts_one() {
        let mut sheet = TabDelimitedSheet::new();
        sheet.cell("orphan");
        assert_eq!(sheet.rows().len(), 1);
    }

    #[test]
    fn test_render_tab_separated() {
        let mut sheet = TabDelimitedSheet::new();
        sheet.column("Code");
        sheet.column("Display");
        sheet.row();
        sheet.cell("c1");
        sheet.cell("Code One");

        assert_eq!(sheet.render().unwrap(), "Code\tDisplay\nc1\tCode One\n");
    }

    #[test]
    fn test_render_keeps_empty_trailing_cell() {
        let mut sheet = TabDelimitedSheet::new();
        sheet.column("Code");
        sheet.column("Comment");
        sheet.row();
        sheet.cell("a");
        sheet.cell("");

        assert_eq!(sheet.render().unwrap(), "Code\tComment\na\t\n");
    }

    #[test]
    fn test_write_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("audit.tsv");
        let mut sheet = TabDelimitedSheet::new();
        sheet.column("Code");
        sheet.row();
        sheet.cell("x");

        sheet.write_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Code\nx\n");
    }
}
