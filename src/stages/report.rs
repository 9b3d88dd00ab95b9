//! Reporter: rank the enriched table and render the two charts

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

use super::enrich::read_enriched_csv;
use crate::chart::{BarChart, ChartRenderer};
use crate::config::PipelineConfig;
use crate::error::{common, ErrorCode, ErrorExt, PipelineError, Result};
use crate::handoff::{HandOff, SAVED_CSV_PATH};
use crate::model::{EnrichedRecord, CATEGORY_NAME_COLUMN};
use crate::preview::preview;
use crate::ranking::{rank_categories, rank_channels, RankedGroup, RankingMetric, TOP_CHANNELS};

/// File name of the category chart inside the plots directory
pub const CATEGORY_CHART_FILE: &str = "top_categories_views.png";
/// File name of the channel chart inside the plots directory
pub const CHANNEL_CHART_FILE: &str = "top10_channels.png";

/// What a reporter invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The enriched table was absent; nothing was written
    Skipped { path: PathBuf },
    /// Both charts were rendered from `source`
    Rendered {
        source: PathBuf,
        charts: Vec<PathBuf>,
    },
}

/// Render the category and channel charts from the enriched table
///
/// A missing table is logged and reported as [`ReportOutcome::Skipped`]
/// rather than failing the run.
pub async fn report(
    config: &PipelineConfig,
    handoff: &dyn HandOff,
    renderer: &dyn ChartRenderer,
) -> Result<ReportOutcome> {
    let source = resolve_source(config, handoff).await?;
    if !fs::try_exists(&source).await.unwrap_or(false) {
        error!("Enriched CSV file not found at: {}", source.display());
        return Ok(ReportOutcome::Skipped { path: source });
    }

    let metric: RankingMetric = config.channel_metric.parse()?;
    let records = load_enriched(&source).await?;
    info!(
        "Loaded enriched video data preview from {}:\n{}",
        source.display(),
        preview(&records)
    );

    fs::create_dir_all(&config.plots_dir).await.to_io_error(
        ErrorCode::IO_CREATE_DIR_FAILED,
        "Failed to create plots directory",
        &config.plots_dir,
    )?;

    let categories = rank_categories(&records);
    log_ranking("category", &categories);
    let category_chart = config.plots_dir.join(CATEGORY_CHART_FILE);
    render(renderer, &BarChart::categories(&categories), &category_chart)?;

    let channels = rank_channels(&records, metric, TOP_CHANNELS);
    log_ranking("channel", &channels);
    let channel_chart = config.plots_dir.join(CHANNEL_CHART_FILE);
    render(renderer, &BarChart::channels(&channels, metric), &channel_chart)?;

    Ok(ReportOutcome::Rendered {
        source,
        charts: vec![category_chart, channel_chart],
    })
}

/// Hand-off path when present and non-empty, the configured path otherwise
async fn resolve_source(config: &PipelineConfig, handoff: &dyn HandOff) -> Result<PathBuf> {
    match handoff.get(SAVED_CSV_PATH).await? {
        Some(Value::String(path)) if !path.is_empty() => Ok(PathBuf::from(path)),
        Some(Value::Null) | Some(Value::String(_)) | None => {
            debug!("No handed-off table path, using configured enriched_csv_path");
            Ok(config.enriched_csv_path.clone())
        }
        Some(_) => Err(PipelineError::parse_with_code(
            ErrorCode::PARSE_HANDOFF_PAYLOAD,
            format!("'{}' must be a string path", SAVED_CSV_PATH),
        )),
    }
}

async fn load_enriched(path: &Path) -> Result<Vec<EnrichedRecord>> {
    let data = fs::read(path)
        .await
        .map_err(|e| common::source_read_failed(e, path, ErrorCode::NOT_FOUND_ENRICHED_TABLE))?;
    check_ranking_columns(&data).map_err(|e| e.with_context(path.display()))?;
    read_enriched_csv(&data).map_err(|e| e.with_path(path))
}

/// The rankings need these columns whatever metric is chosen
fn check_ranking_columns(data: &[u8]) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);
    let headers = reader.headers()?;
    for column in [CATEGORY_NAME_COLUMN, "views", "channel_title", "likes"] {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::schema(
                ErrorCode::SCHEMA_MISSING_COLUMN,
                format!("enriched table has no '{}' column", column),
                Some(column.to_string()),
            ));
        }
    }
    Ok(())
}

fn render(renderer: &dyn ChartRenderer, chart: &BarChart, path: &Path) -> Result<()> {
    debug!(
        title = %chart.title,
        x_label = %chart.x_label,
        y_label = %chart.y_label,
        "Rendering chart"
    );
    renderer.render(chart, path)?;
    info!("Plot saved to {}", path.display());
    Ok(())
}

fn log_ranking(kind: &str, ranked: &[RankedGroup]) {
    for (position, group) in ranked.iter().enumerate() {
        info!("{} #{}: {} ({})", kind, position + 1, group.name, group.total);
    }
}
