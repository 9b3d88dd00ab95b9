use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{
    expand_home, home_dir, MissingFieldPolicy, PipelineConfig, CONFIG_KEYS, ENRICHED_FILE_NAME,
    ENV_PREFIX,
};
use crate::error::{ErrorCode, PipelineError, Result};

/// One layer of partially specified configuration
///
/// Every source (file, environment, run overrides) produces a layer; layers
/// are merged so that a set value in a later layer wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub csv_path: Option<String>,
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub enriched_csv_path: Option<String>,
    #[serde(default)]
    pub plots_dir: Option<String>,
    #[serde(default)]
    pub state_dir: Option<String>,
    #[serde(default)]
    pub channel_metric: Option<String>,
    #[serde(default)]
    pub missing_field_policy: Option<String>,
}

impl ConfigLayer {
    /// Set a value by key name
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = self.slot_mut(key).ok_or_else(|| {
            PipelineError::invalid_argument(
                ErrorCode::ARGUMENT_UNKNOWN_KEY,
                format!(
                    "unknown configuration key (expected one of {})",
                    CONFIG_KEYS.join(", ")
                ),
                key,
            )
        })?;
        *slot = Some(value.into());
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "csv_path" => Some(&mut self.csv_path),
            "json_path" => Some(&mut self.json_path),
            "enriched_csv_path" => Some(&mut self.enriched_csv_path),
            "plots_dir" => Some(&mut self.plots_dir),
            "state_dir" => Some(&mut self.state_dir),
            "channel_metric" => Some(&mut self.channel_metric),
            "missing_field_policy" => Some(&mut self.missing_field_policy),
            _ => None,
        }
    }

    /// Parse a YAML configuration document
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Collect `TUBEFLOW_*` variables into a layer; unrelated variables are ignored
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        let mut layer = Self::default();
        for key in CONFIG_KEYS {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let (Some(value), Some(slot)) = (env.get(&var), layer.slot_mut(key)) {
                *slot = Some(value.clone());
            }
        }
        layer
    }

    /// Overlay `other` on top of this layer
    pub fn merge(mut self, other: ConfigLayer) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            csv_path,
            json_path,
            enriched_csv_path,
            plots_dir,
            state_dir,
            channel_metric,
            missing_field_policy
        );
        self
    }

    /// Resolve against built-in defaults
    pub fn resolve(self, home: &Path) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::defaults_in(home);
        let path = |raw: String| expand_home(&raw, home);

        if let Some(v) = self.csv_path {
            config.csv_path = path(v);
        }
        if let Some(v) = self.json_path {
            config.json_path = path(v);
        }
        if let Some(v) = self.plots_dir {
            config.plots_dir = path(v);
        }
        // The enriched table follows the plots directory unless set explicitly
        config.enriched_csv_path = match self.enriched_csv_path {
            Some(v) => path(v),
            None => config.plots_dir.join(ENRICHED_FILE_NAME),
        };
        if let Some(v) = self.state_dir {
            config.state_dir = path(v);
        }
        if let Some(v) = self.channel_metric {
            config.channel_metric = v.trim().to_string();
        }
        if let Some(v) = self.missing_field_policy {
            config.missing_field_policy = v.parse::<MissingFieldPolicy>()?;
        }
        Ok(config)
    }
}

/// Resolves [`PipelineConfig`] from defaults, file, environment and overrides
pub struct ConfigLoader {
    home: PathBuf,
    config_file: Option<PathBuf>,
    env: HashMap<String, String>,
    overrides: ConfigLayer,
}

impl ConfigLoader {
    /// Loader reading the real home directory and process environment
    pub fn new() -> Self {
        Self {
            home: home_dir(),
            config_file: None,
            env: std::env::vars().collect(),
            overrides: ConfigLayer::default(),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    /// Replace the environment consulted for `TUBEFLOW_*` variables
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Use an explicit configuration file; it must exist
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Add a run-scoped override
    pub fn with_override(mut self, key: &str, value: impl Into<String>) -> Result<Self> {
        self.overrides.set(key, value)?;
        Ok(self)
    }

    /// Location of the persisted configuration store when none is given
    pub fn default_config_file(&self) -> PathBuf {
        self.home.join(".tubeflow").join("config.yml")
    }

    pub async fn load(&self) -> Result<PipelineConfig> {
        let file_layer = self.load_file_layer().await?;
        let env_layer = ConfigLayer::from_env(&self.env);

        let layer = file_layer.merge(env_layer).merge(self.overrides.clone());
        let config = layer.resolve(&self.home)?;
        debug!(?config, "Resolved pipeline configuration");
        Ok(config)
    }

    async fn load_file_layer(&self) -> Result<ConfigLayer> {
        let (path, required) = match &self.config_file {
            Some(path) => (expand_home(&path.to_string_lossy(), &self.home), true),
            None => (self.default_config_file(), false),
        };

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!("No configuration file at {}, using defaults", path.display());
                return Ok(ConfigLayer::default());
            }
            Err(e) => {
                let code = if e.kind() == std::io::ErrorKind::NotFound {
                    ErrorCode::CONFIG_NOT_FOUND
                } else {
                    ErrorCode::CONFIG_GENERIC
                };
                return Err(PipelineError::config_with_code(
                    code,
                    format!("Cannot read configuration file {}", path.display()),
                )
                .with_path(&path)
                .with_source(e));
            }
        };

        debug!("Loaded configuration file {}", path.display());
        ConfigLayer::from_yaml(&content).map_err(|e| e.with_path(&path))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
