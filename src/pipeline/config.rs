//! Configuration for the notes pipeline.
//!
//! This module defines the aggregate pipeline configuration plus utilities
//! for loading and saving it in TOML and JSON formats.

use crate::core::{NotesError, NotesResult};
use crate::domain::color_class::{ColorClass, ColorClassSet};
use crate::processors::aggregate::AggregatorConfig;
use crate::processors::assemble::AssemblerConfig;
use crate::processors::color_detect::DetectorConfig;
use crate::processors::fuse::FuserConfig;
use crate::processors::scoring::ScorerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full pipeline configuration.
///
/// Every field has a default, so a minimal config file (or none at all)
/// yields the standard plan-sheet palette and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesPipelineConfig {
    /// Color classes in precedence order. Earlier classes win ties during
    /// pixel classification.
    #[serde(default = "default_color_classes")]
    pub color_classes: Vec<ColorClass>,
    /// Region detection parameters.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Layout assembly policy.
    #[serde(default)]
    pub assembler: AssemblerConfig,
    /// Text fusion parameters.
    #[serde(default)]
    pub fuser: FuserConfig,
    /// Confidence scoring parameters.
    #[serde(default)]
    pub scorer: ScorerConfig,
    /// Repeated-note aggregation thresholds.
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

fn default_color_classes() -> Vec<ColorClass> {
    ColorClassSet::default_palette().into_classes()
}

impl Default for NotesPipelineConfig {
    fn default() -> Self {
        Self {
            color_classes: default_color_classes(),
            detector: DetectorConfig::default(),
            assembler: AssemblerConfig::default(),
            fuser: FuserConfig::default(),
            scorer: ScorerConfig::default(),
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl NotesPipelineConfig {
    /// Validates the whole configuration, including the color class set.
    pub fn validate(&self) -> NotesResult<()> {
        ColorClassSet::new(self.color_classes.clone())?;
        self.detector.validate()?;
        self.fuser.validate()?;
        self.scorer.validate()?;
        self.aggregator.validate()?;
        Ok(())
    }

    /// Builds the validated color class set from this configuration.
    pub fn color_class_set(&self) -> NotesResult<ColorClassSet> {
        ColorClassSet::new(self.color_classes.clone())
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration loader for the notes pipeline
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from the extension
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// A Result containing the loaded NotesPipelineConfig or a NotesError
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use plannotes::pipeline::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load_from_file(Path::new("config.toml"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_from_file(path: &Path) -> Result<NotesPipelineConfig, NotesError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| NotesError::ConfigError {
            message: format!("Unsupported config file extension: {:?}", path.extension()),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with specified format
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content as string
    /// * `format` - Configuration format
    ///
    /// # Returns
    ///
    /// A Result containing the loaded NotesPipelineConfig or a NotesError
    pub fn load_from_string(
        content: &str,
        format: ConfigFormat,
    ) -> Result<NotesPipelineConfig, NotesError> {
        match format {
            ConfigFormat::Toml => Self::load_from_toml(content),
            ConfigFormat::Json => Self::load_from_json(content),
        }
    }

    /// Load configuration from TOML string
    pub fn load_from_toml(content: &str) -> Result<NotesPipelineConfig, NotesError> {
        toml::from_str(content).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to parse TOML config: {e}"),
        })
    }

    /// Load configuration from JSON string
    pub fn load_from_json(content: &str) -> Result<NotesPipelineConfig, NotesError> {
        serde_json::from_str(content).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to parse JSON config: {e}"),
        })
    }

    /// Save configuration to a file, auto-detecting the format from the extension
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration to save
    /// * `path` - Path to save the configuration file
    ///
    /// # Returns
    ///
    /// A Result indicating success or a NotesError
    pub fn save_to_file(config: &NotesPipelineConfig, path: &Path) -> Result<(), NotesError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| NotesError::ConfigError {
            message: format!("Unsupported config file extension: {:?}", path.extension()),
        })?;

        let content = Self::save_to_string(config, format)?;

        std::fs::write(path, content).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to string with specified format
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration to save
    /// * `format` - Configuration format
    ///
    /// # Returns
    ///
    /// A Result containing the configuration string or a NotesError
    pub fn save_to_string(
        config: &NotesPipelineConfig,
        format: ConfigFormat,
    ) -> Result<String, NotesError> {
        match format {
            ConfigFormat::Toml => Self::save_to_toml(config),
            ConfigFormat::Json => Self::save_to_json(config),
        }
    }

    /// Save configuration to TOML string
    pub fn save_to_toml(config: &NotesPipelineConfig) -> Result<String, NotesError> {
        toml::to_string_pretty(config).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to serialize config to TOML: {e}"),
        })
    }

    /// Save configuration to JSON string
    pub fn save_to_json(config: &NotesPipelineConfig) -> Result<String, NotesError> {
        serde_json::to_string_pretty(config).map_err(|e| NotesError::ConfigError {
            message: format!("Failed to serialize config to JSON: {e}"),
        })
    }
}
