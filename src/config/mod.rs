mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub store_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON file backing the durable store.
    pub store_file: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let store_file = file
            .store_file
            .map(PathBuf::from)
            .or_else(|| cli.store_file.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("store_file must be specified via --store-file or in config file")
            })?;

        if store_file.exists() && store_file.is_dir() {
            bail!("store_file is a directory: {:?}", store_file);
        }

        Ok(Self { store_file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_store_file() {
        let cli = CliConfig::default();
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_cli_value_used_without_file_config() {
        let cli = CliConfig {
            store_file: Some(PathBuf::from("/tmp/sheets.json")),
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.store_file, PathBuf::from("/tmp/sheets.json"));
    }

    #[test]
    fn test_file_config_overrides_cli() {
        let cli = CliConfig {
            store_file: Some(PathBuf::from("/tmp/from-cli.json")),
        };
        let file: FileConfig = toml::from_str("store_file = \"/tmp/from-file.json\"").unwrap();
        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.store_file, PathBuf::from("/tmp/from-file.json"));
    }
}
