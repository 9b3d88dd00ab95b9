//! Enricher: left-join category names onto video records and persist the table

use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use super::categories::decode_categories;
use super::videos::decode_videos;
use crate::config::PipelineConfig;
use crate::error::{ErrorCode, ErrorExt, PipelineError, Result};
use crate::handoff::{self, HandOff, CATEGORY_MAP, SAVED_CSV_PATH, VIDEOS_DATA};
use crate::model::{CategoryMap, EnrichedRecord, VideoRecord, ENRICHED_COLUMNS};
use crate::preview::preview;
use crate::storage;

/// Category names keyed by numeric category id
pub type JoinMap = HashMap<i64, String>;

/// Join the handed-off videos and categories, write the enriched table and
/// hand off its path
pub async fn enrich(config: &PipelineConfig, handoff: &dyn HandOff) -> Result<PathBuf> {
    let videos = decode_videos(&handoff::require(handoff, VIDEOS_DATA).await?)?;
    let categories = decode_categories(&handoff::require(handoff, CATEGORY_MAP).await?)?;

    let join_map = build_join_map(&categories);
    debug!(
        "Join map has {} of {} category ids",
        join_map.len(),
        categories.len()
    );

    let enriched = join_categories(videos, &join_map);
    let unmatched = enriched.iter().filter(|r| r.category_name.is_none()).count();
    debug!("{} of {} records have no category name", unmatched, enriched.len());

    let save_path = config.enriched_csv_path.clone();
    save_enriched(&save_path, &enriched).await?;
    info!("Saved enriched video data to {}", save_path.display());

    handoff
        .put(
            SAVED_CSV_PATH,
            Value::String(save_path.to_string_lossy().into_owned()),
        )
        .await?;

    info!("\n{}", preview(&enriched));
    Ok(save_path)
}

/// Keep only the entries whose id is a plain non-negative integer string
///
/// Ids such as `"abc"`, `"-1"` or `" 7"` never take part in the join.
pub fn build_join_map(categories: &CategoryMap) -> JoinMap {
    categories
        .iter()
        .filter(|(id, _)| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|(id, name)| id.parse::<i64>().ok().map(|id| (id, name.to_string())))
        .collect()
}

/// Attach `category_name` to every record; unmatched ids get `None`
pub fn join_categories(videos: Vec<VideoRecord>, join_map: &JoinMap) -> Vec<EnrichedRecord> {
    videos
        .into_iter()
        .map(|video| {
            let name = join_map.get(&video.category_id).cloned();
            EnrichedRecord::from_video(video, name)
        })
        .collect()
}

/// Write the enriched table, header first, to any writer
pub fn write_enriched_csv<W: io::Write>(writer: W, records: &[EnrichedRecord]) -> Result<()> {
    let write_failed = |e: csv::Error| {
        PipelineError::io(ErrorCode::IO_WRITE_FAILED, "Failed to write enriched table")
            .with_source(e)
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(ENRICHED_COLUMNS).map_err(write_failed)?;
    for record in records {
        writer.serialize(record).map_err(write_failed)?;
    }
    writer.flush().map_err(|e| {
        PipelineError::io(ErrorCode::IO_WRITE_FAILED, "Failed to flush enriched table")
            .with_source(e)
    })?;
    Ok(())
}

/// Read an enriched table back into records
pub fn read_enriched_csv(data: &[u8]) -> Result<Vec<EnrichedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);
    reader
        .deserialize::<EnrichedRecord>()
        .map(|row| row.map_err(PipelineError::from))
        .collect()
}

async fn save_enriched(path: &std::path::Path, records: &[EnrichedRecord]) -> Result<()> {
    // Serialize fully before touching the destination
    let mut buffer = Vec::new();
    write_enriched_csv(&mut buffer, records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.to_io_error(
            ErrorCode::IO_CREATE_DIR_FAILED,
            "Failed to create output directory",
            parent,
        )?;
    }

    storage::write_atomic(path, buffer)
        .await
        .map_err(|e| e.with_context("enriched table"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, category_id: i64, views: u64) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            trending_date: "17.14.11".to_string(),
            title: format!("title {id}"),
            channel_title: "channel".to_string(),
            category_id,
            publish_time: "2017-11-10T07:38:29.000Z".to_string(),
            views,
            likes: 1,
            dislikes: 0,
            comment_count: 0,
        }
    }

    #[test]
    fn test_join_map_drops_non_numeric_keys() {
        let categories: CategoryMap = [
            ("1", "Film & Animation"),
            ("abc", "Letters"),
            ("-2", "Negative"),
            (" 3", "Padded"),
            ("", "Empty"),
            ("10", "Music"),
            ("99999999999999999999999", "Overflow"),
        ]
        .into_iter()
        .collect();

        let join_map = build_join_map(&categories);
        assert_eq!(join_map.len(), 2);
        assert_eq!(join_map.get(&1).map(String::as_str), Some("Film & Animation"));
        assert_eq!(join_map.get(&10).map(String::as_str), Some("Music"));
    }

    #[test]
    fn test_join_map_len_matches_numeric_key_count() {
        let categories: CategoryMap = [("1", "a"), ("x1", "b"), ("2", "c"), ("2.5", "d")]
            .into_iter()
            .collect();
        let numeric = categories
            .iter()
            .filter(|(k, _)| !k.is_empty() && k.chars().all(|c| c.is_ascii_digit()))
            .count();
        assert_eq!(build_join_map(&categories).len(), numeric);
    }

    #[test]
    fn test_left_join_keeps_every_record() {
        let join_map: JoinMap = [(1, "Music".to_string())].into_iter().collect();
        let videos = vec![video("a", 1, 10), video("b", 2, 20), video("c", 1, 30)];

        let enriched = join_categories(videos.clone(), &join_map);
        assert_eq!(enriched.len(), videos.len());
        for (record, source) in enriched.iter().zip(&videos) {
            assert_eq!(record.video_id, source.video_id);
            assert_eq!(
                record.category_name.as_deref(),
                join_map.get(&source.category_id).map(String::as_str)
            );
        }
        assert_eq!(enriched[1].category_name, None);
    }

    #[test]
    fn test_written_table_has_enriched_columns_and_empty_missing_names() {
        let join_map: JoinMap = [(1, "Music".to_string())].into_iter().collect();
        let enriched = join_categories(vec![video("a", 1, 10), video("b", 7, 20)], &join_map);

        let mut buffer = Vec::new();
        write_enriched_csv(&mut buffer, &enriched).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), ENRICHED_COLUMNS.join(","));
        assert!(lines.next().unwrap().ends_with(",Music"));
        assert!(lines.next().unwrap().ends_with(",0,0,"));

        assert_eq!(read_enriched_csv(&buffer).unwrap(), enriched);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let mut buffer = Vec::new();
        write_enriched_csv(&mut buffer, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap().trim_end(),
            ENRICHED_COLUMNS.join(",")
        );
    }
}
