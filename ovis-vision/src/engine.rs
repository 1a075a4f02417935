//! The vision engine: both models loaded once, reused per request

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::models::{ClipSegModel, ModelManager, OwlVitDetector};
use crate::processing::{SegmentPipeline, TrackPipeline};
use ovis_core::{Mode, ProcessedVideo};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Owns the two ONNX sessions and the pipelines built on top of them.
/// Loaded once at process start; the sessions are the only state the
/// service shares across requests.
pub struct VisionEngine {
    track: TrackPipeline,
    segment: SegmentPipeline,
}

impl VisionEngine {
    /// Validate the config, download any missing model artifacts and
    /// bring both sessions up.
    pub async fn load(config: VisionConfig) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;
        let config = Arc::new(config);

        let manager = ModelManager::new(config.clone());
        let artifacts = manager.ensure_all().await?;

        let detector = Arc::new(OwlVitDetector::new(
            &artifacts.detector,
            &artifacts.tokenizer,
            &config,
        )?);
        let segmenter = Arc::new(ClipSegModel::new(
            &artifacts.segmenter,
            &artifacts.tokenizer,
            &config,
        )?);

        info!("Vision engine ready (detector + segmenter loaded)");

        Ok(Self {
            track: TrackPipeline::new(detector, config.clone()),
            segment: SegmentPipeline::new(segmenter, config),
        })
    }

    /// Run a whole video through the pipeline for `mode`.
    pub fn process(
        &self,
        mode: Mode,
        input: &Path,
        classes: &[String],
    ) -> Result<ProcessedVideo, VisionError> {
        match mode {
            Mode::Track => self.track.process(input, classes),
            Mode::Segment => self.segment.process(input, classes),
        }
    }

    pub fn track(&self, input: &Path, classes: &[String]) -> Result<ProcessedVideo, VisionError> {
        self.track.process(input, classes)
    }

    pub fn segment(&self, input: &Path, classes: &[String]) -> Result<ProcessedVideo, VisionError> {
        self.segment.process(input, classes)
    }
}
