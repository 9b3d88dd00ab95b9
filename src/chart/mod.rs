//! Bar chart descriptions and the renderers that turn them into files

use std::path::Path;

use crate::error::Result;
use crate::ranking::{RankedGroup, RankingMetric};

pub mod png;
mod text;

pub use png::PngChartRenderer;

/// Direction the bars grow in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// One column per group along the x axis
    Vertical,
    /// One row per group along the y axis, first group on top
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

/// Everything needed to draw one bar chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub bars: Vec<Bar>,
    pub width: u32,
    pub height: u32,
}

impl BarChart {
    /// Vertical chart of total views per category
    pub fn categories(ranked: &[RankedGroup]) -> Self {
        Self {
            title: "Top Categories by Total Views".to_string(),
            x_label: "Category".to_string(),
            y_label: "Total Views".to_string(),
            orientation: Orientation::Vertical,
            bars: bars(ranked),
            width: 1200,
            height: 600,
        }
    }

    /// Horizontal chart of the top channels by `metric`
    pub fn channels(ranked: &[RankedGroup], metric: RankingMetric) -> Self {
        Self {
            title: format!("Top 10 Channels by Total {}", metric.label()),
            x_label: format!("Total {}", metric.label()),
            y_label: "Channel Title".to_string(),
            orientation: Orientation::Horizontal,
            bars: bars(ranked),
            width: 1200,
            height: 700,
        }
    }

    /// Largest bar value, zero for an empty chart
    pub fn max_value(&self) -> u64 {
        self.bars.iter().map(|bar| bar.value).max().unwrap_or(0)
    }
}

fn bars(ranked: &[RankedGroup]) -> Vec<Bar> {
    ranked
        .iter()
        .map(|group| Bar {
            label: group.name.clone(),
            value: group.total,
        })
        .collect()
}

/// Writes a [`BarChart`] to a file
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &BarChart, path: &Path) -> Result<()>;
}
