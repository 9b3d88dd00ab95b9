//! Records flowing through the pipeline
//!
//! [`VideoRecord`] is the projected row of the raw trending-videos table,
//! [`CategoryMap`] the flattened lookup document and [`EnrichedRecord`] the
//! joined row persisted by the enricher.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Columns kept from the raw video table, in output order
pub const VIDEO_COLUMNS: [&str; 10] = [
    "video_id",
    "trending_date",
    "title",
    "channel_title",
    "category_id",
    "publish_time",
    "views",
    "likes",
    "dislikes",
    "comment_count",
];

/// Column holding the joined category name
pub const CATEGORY_NAME_COLUMN: &str = "category_name";

/// Columns of the enriched table, in output order
pub const ENRICHED_COLUMNS: [&str; 11] = [
    "video_id",
    "trending_date",
    "title",
    "channel_title",
    "category_id",
    "publish_time",
    "views",
    "likes",
    "dislikes",
    "comment_count",
    CATEGORY_NAME_COLUMN,
];

/// A single trending-video row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub trending_date: String,
    pub title: String,
    pub channel_title: String,
    pub category_id: i64,
    pub publish_time: String,
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub comment_count: u64,
}

/// A video row with its category name attached
///
/// `category_name` is `None` when the category id had no match in the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub video_id: String,
    pub trending_date: String,
    pub title: String,
    pub channel_title: String,
    pub category_id: i64,
    pub publish_time: String,
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub comment_count: u64,
    pub category_name: Option<String>,
}

impl EnrichedRecord {
    pub fn from_video(video: VideoRecord, category_name: Option<String>) -> Self {
        Self {
            video_id: video.video_id,
            trending_date: video.trending_date,
            title: video.title,
            channel_title: video.channel_title,
            category_id: video.category_id,
            publish_time: video.publish_time,
            views: video.views,
            likes: video.likes,
            dislikes: video.dislikes,
            comment_count: video.comment_count,
            category_name,
        }
    }
}

/// Category id to category name, in document order
///
/// Ids stay strings here; only the enricher decides which ones are numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap(IndexMap<String, String>);

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; a repeated id keeps its position and takes the new name
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.0.insert(id.into(), name.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enriched_columns_extend_video_columns() {
        assert_eq!(&ENRICHED_COLUMNS[..10], &VIDEO_COLUMNS[..]);
        assert_eq!(ENRICHED_COLUMNS[10], CATEGORY_NAME_COLUMN);
    }

    #[test]
    fn test_category_map_keeps_document_order() {
        let map: CategoryMap = [("10", "Music"), ("1", "Film"), ("abc", "Odd")]
            .into_iter()
            .collect();
        let ids: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["10", "1", "abc"]);
    }

    #[test]
    fn test_category_map_serializes_as_object() {
        let map: CategoryMap = [("1", "Film & Animation")].into_iter().collect();
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value, serde_json::json!({"1": "Film & Animation"}));
    }
}
