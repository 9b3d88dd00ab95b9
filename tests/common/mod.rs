//! Common test utilities and helpers
#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use tubeflow::chart::{BarChart, ChartRenderer};
use tubeflow::config::PipelineConfig;

/// Header of the raw trending table, including columns the loader drops
pub const VIDEO_HEADER: &str = "video_id,trending_date,title,channel_title,category_id,publish_time,tags,views,likes,dislikes,comment_count,thumbnail_link,comments_disabled,ratings_disabled,video_error_or_removed,description";

/// One raw row for the trending table
pub struct VideoRow {
    pub video_id: &'static str,
    pub channel_title: &'static str,
    pub category_id: i64,
    pub views: u64,
    pub likes: u64,
}

impl VideoRow {
    fn to_csv(&self) -> String {
        format!(
            "{id},17.14.11,Video {id},{channel},{category},2017-11-10T07:38:29.000Z,tag,{views},{likes},3,4,https://i.ytimg.com/vi/{id}/default.jpg,False,False,False,\"desc, with comma\"",
            id = self.video_id,
            channel = self.channel_title,
            category = self.category_id,
            views = self.views,
            likes = self.likes,
        )
    }
}

/// Render rows as a raw trending table
pub fn video_table(rows: &[VideoRow]) -> String {
    let mut table = String::from(VIDEO_HEADER);
    table.push('\n');
    for row in rows {
        table.push_str(&row.to_csv());
        table.push('\n');
    }
    table
}

/// Render `(id, title)` pairs as a category lookup document
pub fn category_document(items: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, title)| {
            serde_json::json!({
                "kind": "youtube#videoCategory",
                "id": id,
                "snippet": {"channelId": "UCBR8-60-B28hp2BmDPdntcQ", "title": title, "assignable": true}
            })
        })
        .collect();
    serde_json::json!({"kind": "youtube#videoCategoryListResponse", "items": items}).to_string()
}

/// The two-video scenario: `a` is Music with 100 views, `b` is Gaming with 150
pub fn music_and_gaming() -> (Vec<VideoRow>, Vec<(&'static str, &'static str)>) {
    (
        vec![
            VideoRow {
                video_id: "a",
                channel_title: "Chan A",
                category_id: 10,
                views: 100,
                likes: 5,
            },
            VideoRow {
                video_id: "b",
                channel_title: "Chan B",
                category_id: 20,
                views: 150,
                likes: 7,
            },
        ],
        vec![("10", "Music"), ("20", "Gaming")],
    )
}

/// Test context builder for setting up pipeline inputs
pub struct TestContextBuilder {
    temp_dir: TempDir,
    videos: Option<String>,
    categories: Option<String>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            videos: None,
            categories: None,
        })
    }

    pub fn with_videos(mut self, rows: &[VideoRow]) -> Self {
        self.videos = Some(video_table(rows));
        self
    }

    pub fn with_raw_videos(mut self, content: &str) -> Self {
        self.videos = Some(content.to_string());
        self
    }

    pub fn with_categories(mut self, items: &[(&str, &str)]) -> Self {
        self.categories = Some(category_document(items));
        self
    }

    pub fn with_raw_categories(mut self, content: &str) -> Self {
        self.categories = Some(content.to_string());
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let config = PipelineConfig::rooted_at(self.temp_dir.path());
        if let Some(videos) = self.videos {
            fs::write(&config.csv_path, videos)?;
        }
        if let Some(categories) = self.categories {
            fs::write(&config.json_path, categories)?;
        }
        Ok(TestContext {
            temp_dir: self.temp_dir,
            config,
        })
    }
}

/// Test context that owns the temporary directory and its configuration
pub struct TestContext {
    temp_dir: TempDir,
    pub config: PipelineConfig,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn plot(&self, name: &str) -> PathBuf {
        self.config.plots_dir.join(name)
    }
}

/// Chart renderer that records what it was asked to draw
#[derive(Default)]
pub struct RecordingRenderer {
    rendered: Mutex<Vec<(BarChart, PathBuf)>>,
}

impl RecordingRenderer {
    pub fn charts(&self) -> Vec<(BarChart, PathBuf)> {
        self.rendered.lock().unwrap().clone()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, chart: &BarChart, path: &Path) -> tubeflow::Result<()> {
        self.rendered
            .lock()
            .unwrap()
            .push((chart.clone(), path.to_path_buf()));
        Ok(())
    }
}
