//! Tabular loader: raw trending-videos table to projected records

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{common, ErrorCode, ErrorExt, PipelineError, Result};
use crate::handoff::{HandOff, VIDEOS_DATA};
use crate::model::{VideoRecord, VIDEO_COLUMNS};
use crate::preview::preview;

/// Load the video table named by `config.csv_path` and hand off its records
pub async fn load_videos(
    config: &PipelineConfig,
    handoff: &dyn HandOff,
) -> Result<Vec<VideoRecord>> {
    let path = &config.csv_path;
    info!("Loading video table from {}", path.display());

    let content = fs::read(path)
        .await
        .map_err(|e| common::source_read_failed(e, path, ErrorCode::NOT_FOUND_VIDEO_TABLE))?;
    let videos = parse_videos(&content).map_err(|e| e.with_path(path))?;
    debug!("Parsed {} video records", videos.len());

    info!("\n{}", preview(&videos));
    info!("\n ----columns---");
    info!("\n{}", VIDEO_COLUMNS.join(", "));

    handoff
        .put(VIDEOS_DATA, Value::String(serialize_videos(&videos)?))
        .await?;
    Ok(videos)
}

/// Parse a delimited table, keeping only the video columns
///
/// Columns outside [`VIDEO_COLUMNS`] are dropped; a missing video column is
/// a parse error naming the column.
pub fn parse_videos(data: &[u8]) -> Result<Vec<VideoRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    for column in VIDEO_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(common::missing_column(column));
        }
    }
    if headers.iter().any(|h| h != h.trim()) {
        let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        reader.set_headers(csv::StringRecord::from(trimmed));
    }

    reader
        .deserialize::<VideoRecord>()
        .map(|row| row.map_err(PipelineError::from))
        .collect()
}

/// Serialize records for the hand-off as a JSON array
pub fn serialize_videos(videos: &[VideoRecord]) -> Result<String> {
    serde_json::to_string(videos).to_handoff_error("Failed to serialize video records")
}

/// Decode the `videos_data` hand-off value
///
/// The value is normally a JSON string holding an array; an inline array is
/// accepted as well.
pub fn decode_videos(value: &Value) -> Result<Vec<VideoRecord>> {
    let decoded: std::result::Result<Vec<VideoRecord>, serde_json::Error> = match value {
        Value::String(json) => serde_json::from_str(json),
        Value::Array(_) => serde_json::from_value(value.clone()),
        other => {
            return Err(PipelineError::parse_with_code(
                ErrorCode::PARSE_HANDOFF_PAYLOAD,
                format!(
                    "'{}' must hold a JSON array of records, got {}",
                    VIDEOS_DATA,
                    kind(other)
                ),
            ))
        }
    };
    decoded.to_parse_error(
        ErrorCode::PARSE_HANDOFF_PAYLOAD,
        format!("'{}' does not hold valid video records", VIDEOS_DATA),
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
