//! Configuration types
//!
//! Every section and field is optional in the file; accessors on
//! [`CodelistConfig`] fall back to the built-in defaults.

use crate::compiler::DEFAULT_BASE_URL;
use crate::error::CodelistError;
use crate::result::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default output directory
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "codelist-generated";

/// Default value set status
pub const DEFAULT_STATUS: &str = "draft";

/// FHIR publication status codes
const PUBLICATION_STATUSES: [&str; 4] = ["draft", "active", "retired", "unknown"];

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodelistConfig {
    /// Canonical URL configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Where generated resources are published")]
    pub canonical: Option<CanonicalConfiguration>,

    /// Value set metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Metadata stamped on generated value sets")]
    pub value_set: Option<ValueSetConfiguration>,

    /// Output configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Output directory and audit settings")]
    pub output: Option<OutputConfiguration>,

    /// Input file configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "How input sheets are read")]
    pub files: Option<FilesConfiguration>,
}

/// Canonical URL configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalConfiguration {
    /// Prefix for inline code system and value set URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "URL prefix; code systems get <baseUrl>/<sheet>")]
    pub base_url: Option<String>,
}

/// Value set metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetConfiguration {
    /// Publication status
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Publication status: draft, active, retired or unknown")]
    pub status: Option<String>,

    /// Publisher name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Publisher copied to value sets and code systems")]
    pub publisher: Option<String>,

    /// Version tag
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Version stamped on generated resources")]
    pub version: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfiguration {
    /// Output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Directory receiving generated resources")]
    pub directory: Option<PathBuf>,

    /// Write tab-delimited audit mirrors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Write audit/<sheet>.tsv next to the resources")]
    pub audit: Option<bool>,

    /// Empty the output directory first
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Remove previous output before writing")]
    pub clean: Option<bool>,
}

/// Input file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    /// Field delimiter override
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Single-character field delimiter, or \"tab\"; defaults by file extension"
    )]
    pub delimiter: Option<String>,
}

impl Default for CodelistConfig {
    fn default() -> Self {
        Self {
            canonical: Some(CanonicalConfiguration {
                base_url: Some(DEFAULT_BASE_URL.to_string()),
            }),
            value_set: Some(ValueSetConfiguration {
                status: Some(DEFAULT_STATUS.to_string()),
                publisher: None,
                version: None,
            }),
            output: Some(OutputConfiguration {
                directory: Some(PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
                audit: Some(true),
                clean: Some(false),
            }),
            files: Some(FilesConfiguration::default()),
        }
    }
}

impl CodelistConfig {
    /// Load configuration from file
    ///
    /// The format follows the extension: `.json`, `.toml`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CodelistError::io_error(path, e))?;
        let invalid = |e: &dyn std::fmt::Display| {
            CodelistError::config_error(format!("Invalid config '{}': {}", path.display(), e))
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| invalid(&e)),
            Some("toml") => toml::from_str(&content).map_err(|e| invalid(&e)),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| invalid(&e)),
            _ => Err(CodelistError::config_error(format!(
                "Unsupported config file '{}' (expected .json, .toml, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CodelistError::config_error(format!(
                "canonical.baseUrl must be an http(s) URL, got '{base_url}'"
            )));
        }

        let status = self.status();
        if !PUBLICATION_STATUSES.contains(&status.as_str()) {
            return Err(CodelistError::config_error(format!(
                "valueSet.status must be one of {}, got '{status}'",
                PUBLICATION_STATUSES.join(", ")
            )));
        }

        self.delimiter()?;
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.canonical
            .as_ref()
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn status(&self) -> String {
        self.value_set
            .as_ref()
            .and_then(|v| v.status.clone())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string())
    }

    pub fn publisher(&self) -> Option<String> {
        self.value_set.as_ref().and_then(|v| v.publisher.clone())
    }

    /// Version tag, empty when unset
    pub fn version(&self) -> String {
        self.value_set
            .as_ref()
            .and_then(|v| v.version.clone())
            .unwrap_or_default()
    }

    pub fn output_directory(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.directory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY))
    }

    pub fn audit_enabled(&self) -> bool {
        self.output.as_ref().and_then(|o| o.audit).unwrap_or(true)
    }

    pub fn clean_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.clean).unwrap_or(false)
    }

    /// Delimiter override as a byte
    ///
    /// Accepts a single ASCII character, `\t`, or the word `tab`.
    pub fn delimiter(&self) -> Result<Option<u8>> {
        let Some(raw) = self.files.as_ref().and_then(|f| f.delimiter.as_deref()) else {
            return Ok(None);
        };

        match raw {
            "tab" | "\\t" | "\t" => Ok(Some(b'\t')),
            s if s.len() == 1 && s.is_ascii() => Ok(s.bytes().next()),
            other => Err(CodelistError::config_error(format!(
                "files.delimiter must be a single ASCII character or \"tab\", got '{other}'"
            ))),
        }
    }

    /// Sections with every default filled in
    pub fn resolved(&self) -> Self {
        Self {
            canonical: Some(CanonicalConfiguration {
                base_url: Some(self.base_url()),
            }),
            value_set: Some(ValueSetConfiguration {
                status: Some(self.status()),
                publisher: self.publisher(),
                version: self.value_set.as_ref().and_then(|v| v.version.clone()),
            }),
            output: Some(OutputConfiguration {
                directory: Some(self.output_directory()),
                audit: Some(self.audit_enabled()),
                clean: Some(self.clean_output()),
            }),
            files: Some(self.files.clone().unwrap_or_default()),
        }
    }

    /// JSON Schema for the configuration file
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(CodelistConfig);
        serde_json::to_value(&schema).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sections() {
        let config: CodelistConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.base_url(), "http://hl7.org/fhir");
        assert_eq!(config.status(), "draft");
        assert_eq!(config.version(), "");
        assert!(config.publisher().is_none());
        assert_eq!(config.output_directory(), PathBuf::from("codelist-generated"));
        assert!(config.audit_enabled());
        assert!(!config.clean_output());
        assert_eq!(config.delimiter().unwrap(), None);
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "codelist.yaml",
            r#"
canonical:
  baseUrl: http://example.org/fhir
valueSet:
  status: active
  publisher: Example
  version: 1.2.0
output:
  audit: false
"#,
        );

        let config = CodelistConfig::load(&path).unwrap();
        assert_eq!(config.base_url(), "http://example.org/fhir");
        assert_eq!(config.status(), "active");
        assert_eq!(config.publisher().as_deref(), Some("Example"));
        assert_eq!(config.version(), "1.2.0");
        assert!(!config.audit_enabled());
    }

    #[test]
    fn test_load_toml() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            ".codelistrc.toml",
            r#"
[output]
directory = "out"
clean = true

[files]
delimiter = "tab"
"#,
        );

        let config = CodelistConfig::load(&path).unwrap();
        assert_eq!(config.output_directory(), PathBuf::from("out"));
        assert!(config.clean_output());
        assert_eq!(config.delimiter().unwrap(), Some(b'\t'));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "codelist.ini", "x=1");

        let err = CodelistConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported config file"));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "codelist.json", "{ not json");

        let err = CodelistConfig::load(&path).unwrap_err();
        assert!(matches!(err, CodelistError::ConfigError { .. }));
    }

    #[test]
    fn test_validate() {
        assert!(CodelistConfig::default().validate().is_ok());

        let bad_status = CodelistConfig {
            value_set: Some(ValueSetConfiguration {
                status: Some("final".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(bad_status.validate().is_err());

        let bad_url = CodelistConfig {
            canonical: Some(CanonicalConfiguration {
                base_url: Some("example.org".to_string()),
            }),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_delimiter = CodelistConfig {
            files: Some(FilesConfiguration {
                delimiter: Some(";;".to_string()),
            }),
            ..Default::default()
        };
        assert!(bad_delimiter.validate().is_err());
    }

    #[test]
    fn test_resolved_fills_every_section() {
        let config: CodelistConfig = serde_json::from_str(r#"{"valueSet": {"version": "2"}}"#)
            .unwrap();
        let resolved = config.resolved();

        assert_eq!(
            resolved.canonical.unwrap().base_url.as_deref(),
            Some("http://hl7.org/fhir")
        );
        assert_eq!(resolved.value_set.unwrap().version.as_deref(), Some("2"));
        assert_eq!(resolved.output.unwrap().audit, Some(true));
    }

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = CodelistConfig::json_schema();
        let properties = schema.get("properties").unwrap();

        for section in ["canonical", "valueSet", "output", "files"] {
            assert!(properties.get(section).is_some(), "missing {section}");
        }
    }

    #[test]
    fn test_default_serializes_to_toml_and_json() {
        let config = CodelistConfig::default();

        let toml_text = toml::to_string_pretty(&config).unwrap();
        assert!(toml_text.contains("baseUrl"));
        let back: CodelistConfig = toml::from_str(&toml_text).unwrap();
        assert_eq!(back.base_url(), config.base_url());
        assert_eq!(back.output, config.output);

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"valueSet\""));
    }
}
