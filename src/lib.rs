//! # Tubeflow
//!
//! A four-stage ETL pipeline over trending-video data: load the video table
//! and the category lookup, join category names onto the videos, then rank
//! categories and channels and render bar charts.
//!
//! ## Usage
//!
//! ```bash
//! tubeflow run [--set plots_dir=./plots] [--run-id ID]
//! tubeflow --run-id ID load-videos
//! ```
//!
//! ## Modules
//!
//! - `config` - Layered configuration (defaults, YAML file, environment, overrides)
//! - `error` - Coded error taxonomy shared by every stage
//! - `handoff` - Run-scoped key-value store the stages communicate through
//! - `model` - Video, enriched and category records
//! - `stages` - Loaders, enricher and reporter
//! - `ranking` - Category and channel aggregations
//! - `chart` - Bar chart descriptions and the PNG renderer
//! - `pipeline` - Runs the stages in dependency order
//! - `preview` - Grid formatting for logged previews
//! - `storage` - Atomic file replacement
pub mod chart;
pub mod config;
pub mod error;
pub mod handoff;
pub mod model;
pub mod pipeline;
pub mod preview;
pub mod ranking;
pub mod stages;
pub mod storage;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary};
