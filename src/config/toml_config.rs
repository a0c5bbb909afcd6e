use crate::config::OutputFormat;
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub model: Option<ModelConfig>,
    pub data: Option<DataConfig>,
    pub server: Option<ServerConfig>,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: String,
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub export_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PredictorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PredictorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| PredictorError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn model_path(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.path.as_str())
    }

    pub fn data_path(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.path.as_str())
    }

    pub fn delimiter(&self) -> Option<u8> {
        self.data
            .as_ref()
            .and_then(|d| d.delimiter.as_deref())
            .and_then(parse_delimiter)
    }

    pub fn host(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.host.as_deref())
    }

    pub fn port(&self) -> Option<u16> {
        self.server.as_ref().and_then(|s| s.port)
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.output.as_ref().and_then(|o| o.format)
    }

    pub fn export_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.export_path.as_deref())
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

/// `tab` or `\\t` for tabs, otherwise exactly one ASCII character.
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" => Some(b'\t'),
        other if other.len() == 1 && other.is_ascii() => Some(other.as_bytes()[0]),
        _ => None,
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = self.model_path() {
            validation::validate_path("model.path", path)?;
        }
        if let Some(path) = self.data_path() {
            validation::validate_path("data.path", path)?;
        }
        if let Some(delimiter) = self.data.as_ref().and_then(|d| d.delimiter.as_deref()) {
            if parse_delimiter(delimiter).is_none() {
                return Err(PredictorError::InvalidConfigValueError {
                    field: "data.delimiter".to_string(),
                    value: delimiter.to_string(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                });
            }
        }
        if let Some(port) = self.port() {
            validation::validate_range("server.port", port, 1, u16::MAX)?;
        }
        Ok(())
    }
}
