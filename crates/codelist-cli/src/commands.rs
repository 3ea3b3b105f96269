//! Command implementations

pub mod build;

use crate::{ConfigFormat, ShowFormat};
use anyhow::{Context, bail};
use codelist_core::config::{CodelistConfig, ConfigLoader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config init command implementation
pub fn config_init_command(format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let filename = match format {
        ConfigFormat::Json => ".codelistrc.json",
        ConfigFormat::Toml => ".codelistrc.toml",
    };
    let config_path = PathBuf::from(filename);

    if config_path.exists() && !force {
        bail!("Configuration file '{filename}' already exists. Use --force to overwrite.");
    }

    let default_config = CodelistConfig::default();
    let config_content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&default_config)
            .context("Failed to serialize JSON")?,
        ConfigFormat::Toml => {
            toml::to_string_pretty(&default_config).context("Failed to serialize TOML")?
        }
    };

    std::fs::write(&config_path, config_content)
        .with_context(|| format!("Failed to write {filename}"))?;

    println!("✅ Created configuration file: {filename}");
    println!("   Edit the file to set your canonical base URL and publisher.");

    Ok(())
}

/// Config validate command implementation
pub fn config_validate_command(path: Option<PathBuf>) -> anyhow::Result<()> {
    debug!("Validating configuration file: {:?}", path);

    let config = match &path {
        Some(p) => ConfigLoader::load_from_file(p)?,
        None => ConfigLoader::load(None, None)?,
    };

    println!("✅ Configuration is valid");
    println!("   Base URL: {}", config.base_url());
    println!("   Status: {}", config.status());
    println!("   Output: {}", config.output_directory().display());

    Ok(())
}

/// Config show command implementation
pub fn config_show_command(format: ShowFormat, config_path: Option<&Path>) -> anyhow::Result<()> {
    debug!("Showing configuration ({:?})", format);

    let config = ConfigLoader::load(config_path, None)?.resolved();
    let rendered = match format {
        ShowFormat::Json => {
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?
        }
        ShowFormat::Toml => toml::to_string_pretty(&config).context("Failed to serialize config")?,
        ShowFormat::Yaml => serde_yaml::to_string(&config).context("Failed to serialize config")?,
    };
    println!("{rendered}");

    Ok(())
}

/// Config schema command implementation
pub fn config_schema_command() -> anyhow::Result<()> {
    let schema = serde_json::to_string_pretty(&CodelistConfig::json_schema())
        .context("Failed to serialize schema")?;
    println!("{schema}");
    Ok(())
}
