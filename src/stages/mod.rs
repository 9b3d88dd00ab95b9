//! The four pipeline stages
//!
//! Each stage takes the resolved [`PipelineConfig`](crate::config::PipelineConfig)
//! and the run's [`HandOff`](crate::handoff::HandOff) store:
//!
//! - [`load_videos`] and [`load_categories`] read the raw sources
//! - [`enrich`] joins their hand-off values and persists the enriched table
//! - [`report`] ranks the table and renders the charts

pub mod categories;
pub mod enrich;
pub mod report;
pub mod videos;

pub use categories::load_categories;
pub use enrich::enrich;
pub use report::{report, ReportOutcome};
pub use videos::load_videos;
