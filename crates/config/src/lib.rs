//! Configuration loading, validation, and management for MedAlign prompt
//! preparation.
//!
//! Loads configuration from `~/.medalign/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the instruction table inside the data root.
pub const INSTRUCTIONS_FILE: &str = "clinician-reviewed-model-responses.tsv";
/// Directory name of the per-patient EHR timelines inside the data root.
pub const EHR_DIR: &str = "medalign_ehr_xml";
/// File name of the gold reference table inside the data root.
pub const REFERENCES_FILE: &str = "clinician-instruction-responses.tsv";

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "Instruction: Answer the following question based on the EHR:\n\nEHR: {ehr}\n\nQuestion: {question}\n\nAnswer:";

/// The root configuration structure.
///
/// Maps directly to `~/.medalign/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Maximum token budget for model input
    #[serde(default = "default_context_length")]
    pub context_length: usize,

    /// Tokens reserved for the model's answer
    #[serde(default = "default_generation_length")]
    pub generation_length: usize,

    /// Target tokenizer: a tiktoken alias, a tokenizer.json path, or a hub model id
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    /// Whether EHR timelines are included in prompts at all
    #[serde(default = "default_true")]
    pub include_ehr: bool,

    /// What to do with instructions whose patient has no timeline
    #[serde(default)]
    pub missing_ehr: MissingEhrPolicy,

    /// Prompt template with `{question}` and `{ehr}` placeholders
    #[serde(default = "default_template")]
    pub template: String,

    /// Input locations
    #[serde(default)]
    pub data: DataConfig,

    /// Reference response selection
    #[serde(default)]
    pub references: ReferencesConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_context_length() -> usize {
    4096
}
fn default_generation_length() -> usize {
    256
}
fn default_tokenizer() -> String {
    "tiktoken".into()
}
fn default_template() -> String {
    DEFAULT_TEMPLATE.into()
}
fn default_true() -> bool {
    true
}

/// Policy for instructions that reference a patient with no EHR timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingEhrPolicy {
    /// Abort the run with an error.
    #[default]
    Fail,
    /// Leave the instruction out and keep going.
    Skip,
}

impl std::str::FromStr for MissingEhrPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(ConfigError::ValidationError(format!(
                "missing_ehr must be 'fail' or 'skip', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the benchmark files
    #[serde(default = "default_data_root")]
    pub root: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ehr_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<PathBuf>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
            instructions: None,
            ehr_dir: None,
            references: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Only rows with this `annotator_num` are kept
    #[serde(default = "default_annotator")]
    pub annotator: String,
}

fn default_annotator() -> String {
    "Annotator_1".into()
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            annotator: default_annotator(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Tab-separated values with a header row
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(Self::Jsonl),
            "tsv" => Ok(Self::Tsv),
            other => Err(ConfigError::ValidationError(format!(
                "output format must be 'jsonl' or 'tsv', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Resolved locations of the three benchmark inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub instructions: PathBuf,
    pub ehr_dir: PathBuf,
    pub references: PathBuf,
}

impl DataLayout {
    /// Standard layout under a data root.
    pub fn from_root(root: &Path) -> Self {
        Self {
            instructions: root.join(INSTRUCTIONS_FILE),
            ehr_dir: root.join(EHR_DIR),
            references: root.join(REFERENCES_FILE),
        }
    }
}

impl PrepConfig {
    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file path, then apply
    /// environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

            toml::from_str::<Self>(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MEDALIGN_*` overrides using the given variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("MEDALIGN_DATA_DIR") {
            self.data.root = PathBuf::from(root);
        }

        if let Some(tokenizer) = lookup("MEDALIGN_TOKENIZER") {
            self.tokenizer = tokenizer;
        }

        if let Some(length) = lookup("MEDALIGN_CONTEXT_LENGTH") {
            self.context_length = length.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "MEDALIGN_CONTEXT_LENGTH must be a positive integer, got '{length}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".medalign")
    }

    /// Resolve input locations: explicit overrides win over the standard
    /// layout under `data.root`.
    pub fn layout(&self) -> DataLayout {
        let standard = DataLayout::from_root(&self.data.root);
        DataLayout {
            instructions: self
                .data
                .instructions
                .clone()
                .unwrap_or(standard.instructions),
            ehr_dir: self.data.ehr_dir.clone().unwrap_or(standard.ehr_dir),
            references: self.data.references.clone().unwrap_or(standard.references),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_length == 0 {
            return Err(ConfigError::ValidationError(
                "context_length must be greater than 0".into(),
            ));
        }

        for placeholder in ["{question}", "{ehr}"] {
            if !self.template.contains(placeholder) {
                return Err(ConfigError::ValidationError(format!(
                    "template must contain the {placeholder} placeholder"
                )));
            }
        }

        if self.references.annotator.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "references.annotator must not be empty".into(),
            ));
        }

        if self.generation_length >= self.context_length {
            tracing::warn!(
                context_length = self.context_length,
                generation_length = self.generation_length,
                "generation_length leaves no room for input; every EHR will be omitted"
            );
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            context_length: default_context_length(),
            generation_length: default_generation_length(),
            tokenizer: default_tokenizer(),
            include_ehr: true,
            missing_ehr: MissingEhrPolicy::default(),
            template: default_template(),
            data: DataConfig::default(),
            references: ReferencesConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
