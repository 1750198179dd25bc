//! Configuration module for result emission

use crate::error::{ScanError, ScanResult};
use crate::output::{OutputConfig, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Main configuration structure, usually read from `~/.portscribe.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format for discovered ports
    pub format: OutputFormat,

    /// Write results here instead of stdout
    pub output: Option<String>,

    /// Emit the CSV header row before the first host
    pub csv_header: bool,

    /// Nameservers to query instead of the system configuration
    pub resolvers: Vec<IpAddr>,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            output: None,
            csv_header: true,
            resolvers: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Settings consumed by [`crate::output::OutputManager`]
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            format: self.format,
            csv_header: self.csv_header,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ScanError::ConfigError(format!("Invalid config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ScanResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::ConfigError(format!("Config serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
    config: ReportConfig,
}

impl ConfigManager {
    /// Load from `config_path`, or `~/.portscribe.toml` when none is given.
    ///
    /// A missing file yields the defaults.
    pub fn new(config_path: Option<PathBuf>) -> ScanResult<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_path);

        let config = if config_path.exists() {
            log::debug!("Loading configuration from {}", config_path.display());
            ReportConfig::from_file(&config_path)?
        } else {
            ReportConfig::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn default_path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(".portscribe.toml"),
            None => PathBuf::from("portscribe.toml"),
        }
    }

    /// Get current configuration
    pub fn get_config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn into_config(self) -> ReportConfig {
        self.config
    }

    /// Update configuration and persist it
    pub fn update_config(&mut self, config: ReportConfig) -> ScanResult<()> {
        self.config = config;
        self.config.save_to_file(&self.config_path)
    }
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a report configuration, returning one message per problem
    pub fn validate(config: &ReportConfig) -> Vec<String> {
        let mut errors = Vec::new();

        if config.logging.level.parse::<log::LevelFilter>().is_err() {
            errors.push(format!("Unknown log level: {}", config.logging.level));
        }

        if let Some(output) = &config.output {
            if output.trim().is_empty() {
                errors.push("Output file path is empty".to_string());
            }
        }

        if config.csv_header && config.format != OutputFormat::Csv {
            log::debug!("csv_header has no effect with {} output", config.format);
        }

        errors
    }
}
