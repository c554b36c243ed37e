use anyhow::{Context, Result};
use codememo_graph_parsers::DotParserOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CODEMEMO_CONFIG";

/// Command-line configuration, read from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// How call graphs are turned into snippet nodes
    pub import: DotParserOptions,

    /// How documents are written
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Indent JSON output
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl CliConfig {
    /// Resolve and load the config file
    ///
    /// Lookup order: `explicit`, then `$CODEMEMO_CONFIG`, then
    /// `~/.codememo/config.toml` when it exists. Without any file the
    /// defaults apply. Returns the path that was read, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(|| default_config_path().filter(|p| p.is_file())),
        };

        let Some(path) = path else {
            return Ok((Self::default(), None));
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok((config, Some(path)))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.import
            .validate()
            .map_err(|msg| anyhow::anyhow!("[import] {msg}"))
    }
}

/// `~/.codememo/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".codememo").join("config.toml"))
}
