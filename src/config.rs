//! Tool configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via RSCP_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller)

use rscp_protocol::ParserOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Codec configuration.
    pub codec: CodecConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Loads configuration from `path` (or RSCP_CONFIG), then applies
    /// environment variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("RSCP_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    fn apply_env_overrides(&mut self) {
        self.codec.apply_env_overrides();
        self.output.apply_env_overrides();
    }

    /// Rejects combinations that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.indent > 16 {
            return Err(ConfigError::ValidationError(format!(
                "output.indent must be at most 16, got {}",
                self.output.indent
            )));
        }
        Ok(())
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Reject frames with unexpected magic bytes.
    pub strict_magic: bool,
    /// Verify CRC32 trailers when decoding.
    pub verify_checksum: bool,
    /// Append a CRC32 trailer when encoding.
    pub checksum: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict_magic: true,
            verify_checksum: true,
            checksum: true,
        }
    }
}

impl CodecConfig {
    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_flag("RSCP_STRICT_MAGIC") {
            self.strict_magic = v;
        }
        if let Some(v) = env_flag("RSCP_VERIFY_CHECKSUM") {
            self.verify_checksum = v;
        }
        if let Some(v) = env_flag("RSCP_CHECKSUM") {
            self.checksum = v;
        }
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            strict_magic: self.strict_magic,
            verify_checksum: self.verify_checksum,
        }
    }
}

/// Output format for decoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Decode container children when printing.
    pub expand_containers: bool,
    /// Spaces per nesting level in text output.
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            expand_containers: true,
            indent: 2,
        }
    }
}

impl OutputConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(format) = std::env::var("RSCP_OUTPUT") {
            match format.to_lowercase().as_str() {
                "text" => self.format = OutputFormat::Text,
                "json" => self.format = OutputFormat::Json,
                other => tracing::warn!("ignoring unknown RSCP_OUTPUT value '{}'", other),
            }
        }
        if let Some(v) = env_flag("RSCP_EXPAND_CONTAINERS") {
            self.expand_containers = v;
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.to_lowercase() == "true")
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.codec.strict_magic);
        assert!(config.codec.verify_checksum);
        assert!(config.codec.checksum);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.expand_containers);
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml(
            r#"
codec:
  verify_checksum: false
output:
  format: json
"#,
        )
        .unwrap();
        assert!(!config.codec.verify_checksum);
        assert!(config.codec.strict_magic);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.indent, 2);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml("codec: [1, 2").is_err());
    }

    #[test]
    fn test_parser_options() {
        let codec = CodecConfig {
            strict_magic: false,
            verify_checksum: true,
            checksum: false,
        };
        let options = codec.parser_options();
        assert!(!options.strict_magic);
        assert!(options.verify_checksum);
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.output.indent = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/rscp.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_, _))));
    }

    #[test]
    fn test_yaml_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rscp.yaml");
        let mut config = Config::default();
        config.codec.checksum = false;
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(!loaded.codec.checksum);
    }
}
