//! Pipeline configuration
//!
//! [`PipelineConfig`] is passed explicitly into every stage. Values are
//! resolved by [`ConfigLoader`] from layered sources, lowest priority first:
//!
//! 1. Built-in defaults (paths relative to the home directory)
//! 2. Persisted configuration file (`~/.tubeflow/config.yml` or `--config`)
//! 3. Environment variables (`TUBEFLOW_*` prefix)
//! 4. Run-scoped overrides (`--set key=value` and CLI flags)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ErrorCode, PipelineError};

pub mod loader;

pub use loader::{ConfigLayer, ConfigLoader};

/// File name of the enriched table inside the plots directory
pub const ENRICHED_FILE_NAME: &str = "enriched_videos.csv";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TUBEFLOW_";

/// Configuration keys accepted by every layer
pub const CONFIG_KEYS: &[&str] = &[
    "csv_path",
    "json_path",
    "enriched_csv_path",
    "plots_dir",
    "state_dir",
    "channel_metric",
    "missing_field_policy",
];

/// What the lookup loader does with an item lacking `id` or `snippet.title`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Fail the stage on the first incomplete item
    #[default]
    Abort,
    /// Log and skip incomplete items
    Skip,
}

impl FromStr for MissingFieldPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(PipelineError::invalid_argument(
                ErrorCode::ARGUMENT_UNSUPPORTED_POLICY,
                format!("'{}' is not one of 'abort', 'skip'", other),
                "missing_field_policy",
            )),
        }
    }
}

impl fmt::Display for MissingFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Fully resolved configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw trending-videos table
    pub csv_path: PathBuf,
    /// Category lookup document
    pub json_path: PathBuf,
    /// Destination of the enriched table
    pub enriched_csv_path: PathBuf,
    /// Directory receiving the charts
    pub plots_dir: PathBuf,
    /// Root of the file-backed hand-off store
    pub state_dir: PathBuf,
    /// Metric used by the channel ranking (`likes` or `views`)
    pub channel_metric: String,
    pub missing_field_policy: MissingFieldPolicy,
}

impl PipelineConfig {
    /// Defaults rooted at the given home directory
    pub fn defaults_in(home: &Path) -> Self {
        let data_dir = home.join("tubeflow").join("data");
        let plots_dir = home.join("tubeflow").join("plots");
        Self {
            csv_path: data_dir.join("GBvideos.csv"),
            json_path: data_dir.join("GB_category_id.json"),
            enriched_csv_path: plots_dir.join(ENRICHED_FILE_NAME),
            plots_dir,
            state_dir: home.join(".tubeflow"),
            channel_metric: "likes".to_string(),
            missing_field_policy: MissingFieldPolicy::Abort,
        }
    }

    /// Configuration with every path under one directory, used by tests and demos
    pub fn rooted_at(root: &Path) -> Self {
        let plots_dir = root.join("plots");
        Self {
            csv_path: root.join("videos.csv"),
            json_path: root.join("categories.json"),
            enriched_csv_path: plots_dir.join(ENRICHED_FILE_NAME),
            plots_dir,
            state_dir: root.join("state"),
            channel_metric: "likes".to_string(),
            missing_field_policy: MissingFieldPolicy::Abort,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::defaults_in(&home_dir())
    }
}

/// Home directory, or the working directory when none can be determined
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/` against the given home directory
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}
