//! Runs the stages in dependency order over one hand-off store
//!
//! ```text
//! load_videos ──┐
//!               ├──> enrich ──> report
//! load_categories
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::chart::{ChartRenderer, PngChartRenderer};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::handoff::HandOff;
use crate::stages::{self, ReportOutcome};

/// Counts and artifacts of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub videos: usize,
    pub categories: usize,
    pub enriched_path: PathBuf,
    pub report: ReportOutcome,
}

pub struct Pipeline {
    config: PipelineConfig,
    handoff: Arc<dyn HandOff>,
    renderer: Arc<dyn ChartRenderer>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, handoff: Arc<dyn HandOff>) -> Self {
        Self {
            config,
            handoff,
            renderer: Arc::new(PngChartRenderer::new()),
        }
    }

    /// Replace the PNG renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Both loaders run concurrently; the first failure aborts the run
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let handoff = self.handoff.as_ref();

        let (videos, categories) = tokio::try_join!(
            stages::load_videos(&self.config, handoff),
            stages::load_categories(&self.config, handoff)
        )?;
        let enriched_path = stages::enrich(&self.config, handoff).await?;
        let report = stages::report(&self.config, handoff, self.renderer.as_ref()).await?;

        info!(
            "Pipeline finished in {:.2?}: {} videos, {} categories",
            started.elapsed(),
            videos.len(),
            categories.len()
        );
        Ok(RunSummary {
            videos: videos.len(),
            categories: categories.len(),
            enriched_path,
            report,
        })
    }
}
