//! Layered configuration loader.
//!
//! Discovers the user, cwd and runtime layers, validates each against the
//! schema, merges them in precedence order and produces an `AgendaConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;


use crate::{AgendaConfig, ConfigError};
use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "agenda.json5";
/// Default config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".agenda";

/// Model providers this build knows how to construct.
const SUPPORTED_LLM_PROVIDERS: &[&str] = &["openai"];
/// Memory backends this build knows how to construct.
const SUPPORTED_MEMORY_PROVIDERS: &[&str] = &["file"];

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: AgendaConfig,
    /// Layers that contributed, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// `~/.agenda/agenda.json5`.
    User,
    /// `./agenda.json5` in the working directory.
    Cwd,
    /// Explicit `--config` paths (highest precedence).
    Runtime,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.agenda/agenda.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Override or disable the user layer.
    pub fn with_user_path(mut self, path: Option<PathBuf>) -> Self {
        self.user_config_path = path;
        self
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl AgendaConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime overrides. Missing
    /// user and cwd files are skipped; a missing runtime file is an error.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        let mut loaded = Vec::new();
        let mut seen_paths = HashSet::new();

        let discovered = [
            (ConfigLayerSource::User, options.user_config_path.clone()),
            (ConfigLayerSource::Cwd, Some(cwd.join(DEFAULT_CONFIG_FILE))),
        ];
        for (source, path) in discovered {
            let Some(path) = path else {
                continue;
            };
            if !seen_paths.insert(utils::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if let Some(layer) = layer_io::load_optional_layer(source, &path)? {
                loaded.push(layer);
            }
        }

        for runtime_path in &options.runtime_paths {
            loaded.push(layer_io::load_required_layer(
                ConfigLayerSource::Runtime,
                runtime_path,
            )?);
        }

        let mut merged = Value::Object(serde_json::Map::new());
        for layer in &loaded {
            merge::merge_json_values(&mut merged, &layer.value);
        }

        let config = config_from_value(merged, "effective")?;
        let layers: Vec<ConfigLayer> = loaded.into_iter().map(|layer| layer.meta).collect();
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::UnsupportedProvider {
                field: "llm",
                value: self.llm.provider.clone(),
            });
        }
        if !SUPPORTED_MEMORY_PROVIDERS.contains(&self.memory.provider.as_str()) {
            return Err(ConfigError::UnsupportedProvider {
                field: "memory",
                value: self.memory.provider.clone(),
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.model must not be empty".to_string(),
            ));
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.api_key_env must not be empty".to_string(),
            ));
        }
        let recall = &self.memory.recall;
        if recall.text_weight < 0.0 || recall.vector_weight < 0.0 {
            return Err(ConfigError::Invalid(
                "memory.recall weights must be non-negative".to_string(),
            ));
        }
        let capture = &self.memory.capture;
        check_patterns("memory.capture.deny_patterns", &capture.deny_patterns)?;
        check_patterns("memory.capture.redact_patterns", &capture.redact_patterns)?;
        Ok(())
    }
}

fn check_patterns(field: &str, patterns: &[String]) -> Result<(), ConfigError> {
    for (index, pattern) in patterns.iter().enumerate() {
        if let Err(err) = Regex::new(pattern) {
            return Err(ConfigError::Invalid(format!("{field}[{index}]: {err}")));
        }
    }
    Ok(())
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<AgendaConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: AgendaConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
