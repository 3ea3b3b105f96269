//! Delimited text loading for code list sheets

use super::{Sheet, columns};
use crate::error::CodelistError;
use crate::result::Result;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Options controlling how sheet files are read
#[derive(Debug, Clone, Default)]
pub struct SheetLoaderOptions {
    /// Field delimiter override. When unset, `.tsv` and `.txt` files are read
    /// tab-delimited and everything else comma-delimited.
    pub delimiter: Option<u8>,

    /// Sheet name override. Defaults to the file stem.
    pub name: Option<String>,
}

/// Reads CSV/TSV files into [`Sheet`]s
///
/// The first record is the header. Cells are trimmed, short rows read as empty
/// trailing cells, and rows whose cells are all empty are skipped.
#[derive(Debug, Clone, Default)]
pub struct SheetLoader {
    options: SheetLoaderOptions,
}

impl SheetLoader {
    pub fn new(options: SheetLoaderOptions) -> Self {
        Self { options }
    }

    /// Load a sheet from a file
    pub fn load_file(&self, path: &Path) -> Result<Sheet> {
        let name = match &self.options.name {
            Some(name) => name.clone(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    CodelistError::sheet_error(
                        path.display().to_string(),
                        "cannot derive a sheet name from the file name",
                    )
                })?,
        };

        let content =
            std::fs::read_to_string(path).map_err(|e| CodelistError::io_error(path, e))?;
        let delimiter = self
            .options
            .delimiter
            .unwrap_or_else(|| Self::delimiter_for(path));

        debug!(
            "Loading sheet '{}' from {} (delimiter {:?})",
            name,
            path.display(),
            delimiter as char
        );
        Self::load_str(&name, &content, delimiter)
    }

    /// Parse delimited text into a sheet
    pub fn load_str(name: &str, content: &str, delimiter: u8) -> Result<Sheet> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CodelistError::sheet_error(name, e.to_string()))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        let mut sheet = Sheet::new(name, headers);
        if !sheet.has_column(columns::CODE) {
            warn!("Sheet '{}' has no {} column; every code reads as empty", name, columns::CODE);
        }
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                CodelistError::sheet_error(name, format!("row {}: {}", line + 2, e))
            })?;
            if record.iter().all(str::is_empty) {
                trace!("Skipping blank row {} in sheet '{}'", line + 2, name);
                continue;
            }
            sheet.push_row(record.iter());
        }

        debug!("Loaded {} rows from sheet '{}'", sheet.len(), name);
        Ok(sheet)
    }

    /// Default delimiter for a file extension
    pub fn delimiter_for(path: &Path) -> u8 {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("tsv") | Some("txt") | Some("tab") => b'\t',
            _ => b',',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv() {
        let content = "System,Id,Abstract,Code,Display,Definition,Comment,v2,v3,Parent\n\
                       ,a,,c1,Code One,,,,,\n\
                       ,b,,c2,,,,,,#a\n";
        let sheet = SheetLoader::load_str("example", content, b',').unwrap();

        assert_eq!(sheet.name(), "example");
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.cell(0, "Display"), "Code One");
        assert_eq!(sheet.cell(1, "Parent"), "#a");
    }

    #[test]
    fn test_trims_cells_and_pads_short_rows() {
        let content = "Code,Display,Parent\n  c1 ,  One  \n";
        let sheet = SheetLoader::load_str("s", content, b',').unwrap();

        assert_eq!(sheet.cell(0, "Code"), "c1");
        assert_eq!(sheet.cell(0, "Display"), "One");
        assert_eq!(sheet.cell(0, "Parent"), "");
    }

    #[test]
    fn test_skips_blank_rows() {
        let content = "Code,Display\nc1,One\n,\nc2,Two\n";
        let sheet = SheetLoader::load_str("s", content, b',').unwrap();

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.cell(1, "Code"), "c2");
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let content = "\u{feff}System,Code\n,c1\n";
        let sheet = SheetLoader::load_str("s", content, b',').unwrap();

        assert!(sheet.has_column("System"));
        assert_eq!(sheet.cell(0, "Code"), "c1");
    }

    #[test]
    fn test_load_tab_delimited_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("observation-status.tsv");
        fs::write(&path, "Code\tDisplay\tDisplay:fr\nfinal\tFinal\tFinal(e)\n").unwrap();

        let sheet = SheetLoader::default().load_file(&path).unwrap();

        assert_eq!(sheet.name(), "observation-status");
        assert_eq!(sheet.cell(0, "Display:fr"), "Final(e)");
        assert_eq!(sheet.display_columns().len(), 1);
    }

    #[test]
    fn test_name_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.csv");
        fs::write(&path, "Code\nc1\n").unwrap();

        let loader = SheetLoader::new(SheetLoaderOptions {
            delimiter: None,
            name: Some("renamed".to_string()),
        });
        assert_eq!(loader.load_file(&path).unwrap().name(), "renamed");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SheetLoader::default().load_file(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(CodelistError::IoError { .. })));
    }

    #[test]
    fn test_delimiter_for_extension() {
        assert_eq!(SheetLoader::delimiter_for(Path::new("a.csv")), b',');
        assert_eq!(SheetLoader::delimiter_for(Path::new("a.TSV")), b'\t');
        assert_eq!(SheetLoader::delimiter_for(Path::new("a.txt")), b'\t');
    }
}
