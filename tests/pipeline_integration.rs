//! End-to-end tests of the stages over a shared hand-off store

mod common;

use common::{music_and_gaming, RecordingRenderer, TestContextBuilder, VideoRow};
use std::sync::Arc;
use tubeflow::chart::{Orientation, PngChartRenderer};
use tubeflow::error::ErrorCode;
use tubeflow::handoff::{FileHandOff, HandOff, MemoryHandOff, SAVED_CSV_PATH};
use tubeflow::stages::enrich::read_enriched_csv;
use tubeflow::stages::report::{CATEGORY_CHART_FILE, CHANNEL_CHART_FILE};
use tubeflow::stages::{self, ReportOutcome};
use tubeflow::Pipeline;

#[tokio::test]
async fn test_music_and_gaming_scenario() {
    let (videos, categories) = music_and_gaming();
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();

    let renderer = Arc::new(RecordingRenderer::default());
    let summary = Pipeline::new(ctx.config.clone(), Arc::new(MemoryHandOff::new()))
        .with_renderer(renderer.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.videos, 2);
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.enriched_path, ctx.config.enriched_csv_path);

    let enriched = read_enriched_csv(&std::fs::read(&summary.enriched_path).unwrap()).unwrap();
    assert_eq!(enriched.len(), 2);
    assert_eq!(enriched[0].video_id, "a");
    assert_eq!(enriched[0].category_name.as_deref(), Some("Music"));
    assert_eq!(enriched[1].video_id, "b");
    assert_eq!(enriched[1].category_name.as_deref(), Some("Gaming"));

    let charts = renderer.charts();
    assert_eq!(charts.len(), 2);

    let (category_chart, category_path) = &charts[0];
    assert_eq!(category_path, &ctx.plot(CATEGORY_CHART_FILE));
    assert_eq!(category_chart.orientation, Orientation::Vertical);
    let ranked: Vec<(&str, u64)> = category_chart
        .bars
        .iter()
        .map(|bar| (bar.label.as_str(), bar.value))
        .collect();
    assert_eq!(ranked, vec![("Gaming", 150), ("Music", 100)]);

    let (channel_chart, channel_path) = &charts[1];
    assert_eq!(channel_path, &ctx.plot(CHANNEL_CHART_FILE));
    assert_eq!(channel_chart.title, "Top 10 Channels by Total Likes");
    assert_eq!(channel_chart.bars[0].label, "Chan B");
    assert_eq!(channel_chart.bars[0].value, 7);

    assert_eq!(
        summary.report,
        ReportOutcome::Rendered {
            source: ctx.config.enriched_csv_path.clone(),
            charts: vec![ctx.plot(CATEGORY_CHART_FILE), ctx.plot(CHANNEL_CHART_FILE)],
        }
    );
}

#[tokio::test]
async fn test_png_renderer_writes_both_charts() {
    let (videos, categories) = music_and_gaming();
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();

    Pipeline::new(ctx.config.clone(), Arc::new(MemoryHandOff::new()))
        .with_renderer(Arc::new(PngChartRenderer::new()))
        .run()
        .await
        .unwrap();

    for name in [CATEGORY_CHART_FILE, CHANNEL_CHART_FILE] {
        let bytes = std::fs::read(ctx.plot(name)).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{name} is not a PNG");
    }
}

#[tokio::test]
async fn test_enrich_is_idempotent() {
    let (videos, categories) = music_and_gaming();
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();
    let handoff = MemoryHandOff::new();
    stages::load_videos(&ctx.config, &handoff).await.unwrap();
    stages::load_categories(&ctx.config, &handoff).await.unwrap();

    let path = stages::enrich(&ctx.config, &handoff).await.unwrap();
    let first = std::fs::read(&path).unwrap();
    let path = stages::enrich(&ctx.config, &handoff).await.unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        handoff.get(SAVED_CSV_PATH).await.unwrap(),
        Some(serde_json::Value::String(path.to_string_lossy().into_owned()))
    );
}

#[tokio::test]
async fn test_unmatched_and_non_numeric_categories() {
    let videos = vec![
        VideoRow {
            video_id: "a",
            channel_title: "Chan A",
            category_id: 10,
            views: 100,
            likes: 1,
        },
        VideoRow {
            video_id: "z",
            channel_title: "Chan Z",
            category_id: 99,
            views: 5_000,
            likes: 1,
        },
    ];
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&[("10", "Music"), ("abc", "Letters")])
        .build()
        .unwrap();

    let renderer = Arc::new(RecordingRenderer::default());
    let summary = Pipeline::new(ctx.config.clone(), Arc::new(MemoryHandOff::new()))
        .with_renderer(renderer.clone())
        .run()
        .await
        .unwrap();

    let enriched = read_enriched_csv(&std::fs::read(&summary.enriched_path).unwrap()).unwrap();
    assert_eq!(enriched[1].category_name, None);

    // The unnamed video is the most viewed but forms no category group
    let charts = renderer.charts();
    let labels: Vec<&str> = charts[0].0.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Music"]);
}

#[tokio::test]
async fn test_report_without_enriched_table_is_skipped() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let renderer = RecordingRenderer::default();

    let outcome = stages::report(&ctx.config, &MemoryHandOff::new(), &renderer)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReportOutcome::Skipped {
            path: ctx.config.enriched_csv_path.clone()
        }
    );
    assert!(renderer.charts().is_empty());
    assert!(!ctx.config.plots_dir.exists());
}

#[tokio::test]
async fn test_unsupported_metric_is_invalid_argument() {
    let (videos, categories) = music_and_gaming();
    let mut ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();
    ctx.config.channel_metric = "dislikes".to_string();

    let err = Pipeline::new(ctx.config.clone(), Arc::new(MemoryHandOff::new()))
        .with_renderer(Arc::new(RecordingRenderer::default()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::ARGUMENT_UNSUPPORTED_METRIC);
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn test_enrich_requires_upstream_hand_off() {
    let ctx = TestContextBuilder::new().unwrap().build().unwrap();
    let err = stages::enrich(&ctx.config, &MemoryHandOff::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::HANDOFF_KEY_MISSING);
    assert!(!ctx.config.enriched_csv_path.exists());
}

#[tokio::test]
async fn test_unwritable_destination_fails_enrich_without_handing_off() {
    let (videos, categories) = music_and_gaming();
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();
    // A directory sits where the table should go
    std::fs::create_dir_all(&ctx.config.enriched_csv_path).unwrap();

    let handoff = MemoryHandOff::new();
    stages::load_videos(&ctx.config, &handoff).await.unwrap();
    stages::load_categories(&ctx.config, &handoff).await.unwrap();
    let err = stages::enrich(&ctx.config, &handoff).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::IO_WRITE_FAILED);
    assert_eq!(err.exit_code(), 6);
    assert!(err.user_message().contains("enriched table"));
    assert_eq!(handoff.get(SAVED_CSV_PATH).await.unwrap(), None);
    assert!(ctx.config.enriched_csv_path.is_dir());
}

#[tokio::test]
async fn test_missing_sources_abort_the_run() {
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_categories(&[("10", "Music")])
        .build()
        .unwrap();

    let err = Pipeline::new(ctx.config.clone(), Arc::new(MemoryHandOff::new()))
        .run()
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.code(), ErrorCode::NOT_FOUND_VIDEO_TABLE);
    assert!(!ctx.config.enriched_csv_path.exists());
}

#[tokio::test]
async fn test_stages_share_a_file_hand_off_across_instances() {
    let (videos, categories) = music_and_gaming();
    let ctx = TestContextBuilder::new()
        .unwrap()
        .with_videos(&videos)
        .with_categories(&categories)
        .build()
        .unwrap();
    let store = || FileHandOff::new(&ctx.config.state_dir, "nightly-1").unwrap();

    stages::load_videos(&ctx.config, &store()).await.unwrap();
    stages::load_categories(&ctx.config, &store()).await.unwrap();
    let path = stages::enrich(&ctx.config, &store()).await.unwrap();

    let renderer = RecordingRenderer::default();
    let outcome = stages::report(&ctx.config, &store(), &renderer).await.unwrap();

    assert!(matches!(outcome, ReportOutcome::Rendered { ref source, .. } if *source == path));
    assert_eq!(renderer.charts().len(), 2);
    assert!(ctx
        .config
        .state_dir
        .join("runs/nightly-1/handoff.json")
        .exists());
}
