//! Integration-level checks that don't require model weights

use ovis_vision::{VisionConfig, VisionError};
use std::path::PathBuf;

#[test]
fn test_public_api_surface() {
    // The server crate builds against exactly these items; this fails
    // to compile if the surface regresses.
    use ovis_vision::engine::VisionEngine;
    use ovis_vision::models::{ClipSegModel, ModelManager, OwlVitDetector, PromptEncoder};
    use ovis_vision::processing::{SegmentPipeline, TrackPipeline};
    use ovis_vision::video::{VideoReader, VideoWriter};

    let _: Option<VisionEngine> = None;
    let _: Option<OwlVitDetector> = None;
    let _: Option<ClipSegModel> = None;
    let _: Option<ModelManager> = None;
    let _: Option<PromptEncoder> = None;
    let _: Option<TrackPipeline> = None;
    let _: Option<SegmentPipeline> = None;
    let _: Option<VideoReader> = None;
    let _: Option<VideoWriter> = None;
}

#[tokio::test]
async fn test_engine_rejects_invalid_config() {
    let mut config = VisionConfig::default();
    config.detect_threshold = 2.0;

    let err = ovis_vision::VisionEngine::load(config).await.unwrap_err();
    match err {
        VisionError::Config(msg) => assert!(msg.contains("threshold")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_video_reader_reports_missing_input() {
    let err = ovis_vision::video::VideoReader::open(&PathBuf::from("/no/such/clip.mp4"))
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
