use crate::core::{MAX_OBSERVATION_RECORDS, MIN_OBSERVERS, PARALLEL_DETERMINANT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Engine and dataset parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ray pairs with `|det|` below this are treated as parallel
    pub parallel_threshold: f64,
    /// Observers with a usable yaw needed before an estimate is attempted
    pub min_observers: usize,
    /// Object record holding the ground truth, or `auto`
    pub object_id: String,
    /// Highest observation record index scanned per case
    pub max_observation_records: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: PARALLEL_DETERMINANT_THRESHOLD,
            min_observers: MIN_OBSERVERS,
            object_id: "1".to_string(),
            max_observation_records: MAX_OBSERVATION_RECORDS,
        }
    }
}

impl EngineConfig {
    pub fn with_parallel_threshold(mut self, threshold: f64) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_min_observers(mut self, min_observers: usize) -> Self {
        self.min_observers = min_observers;
        self
    }

    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = object_id.into();
        self
    }

    pub fn with_max_observation_records(mut self, max: u32) -> Self {
        self.max_observation_records = max;
        self
    }

    /// Check every parameter against its valid range
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !self.parallel_threshold.is_finite() || self.parallel_threshold < 0.0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "parallel_threshold".to_string(),
                value: self.parallel_threshold.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        } else if self.parallel_threshold > 0.1 {
            // sin of the angle between two unit bearings; 0.1 is about 5.7 degrees
            warnings.push("large parallel threshold discards pairs crossing at shallow angles".to_string());
        }

        if self.min_observers < MIN_OBSERVERS {
            errors.push(ConfigError::InvalidParameter {
                parameter: "min_observers".to_string(),
                value: self.min_observers.to_string(),
                reason: format!("at least {} observers are needed to intersect bearings", MIN_OBSERVERS),
            });
        }

        if self.object_id.trim().is_empty() {
            errors.push(ConfigError::InvalidParameter {
                parameter: "object_id".to_string(),
                value: self.object_id.clone(),
                reason: "must be a record id or 'auto'".to_string(),
            });
        }

        if self.max_observation_records == 0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "max_observation_records".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },

    #[error("I/O error: {message}")]
    IoError { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Outcome of validating a configuration
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// First error, if any
    pub fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Owns the active configuration and its backing file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: EngineConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load the file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        self.validate_config(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    pub fn set_parallel_threshold(&mut self, threshold: f64) -> Result<f64, ConfigError> {
        let previous = self.config.parallel_threshold;
        self.update_config(self.config.clone().with_parallel_threshold(threshold))?;
        Ok(previous)
    }

    pub fn set_min_observers(&mut self, min_observers: usize) -> Result<usize, ConfigError> {
        let previous = self.config.min_observers;
        self.update_config(self.config.clone().with_min_observers(min_observers))?;
        Ok(previous)
    }

    pub fn set_object_id(&mut self, object_id: &str) -> Result<String, ConfigError> {
        let previous = self.config.object_id.clone();
        self.update_config(self.config.clone().with_object_id(object_id))?;
        Ok(previous)
    }

    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("failed to parse config file '{}': {}", path_str, e),
        })?;

        self.validate_config(&config).into_result()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::SerializationError {
            message: format!("failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was loaded from
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "no file path set for saving configuration".to_string(),
            }),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn validate_config(&self, config: &EngineConfig) -> ValidationResult {
        config.validate()
    }
}
