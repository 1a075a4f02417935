//! Track pipeline: detect and draw, frame by frame

use crate::annotate;
use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::models::OwlVitDetector;
use crate::processing::{output_path, PROGRESS_EVERY};
use crate::video::{VideoReader, VideoWriter};
use ovis_core::ProcessedVideo;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs open-vocabulary detection over every frame of a video and
/// re-encodes the stream with boxes and captions drawn in.
pub struct TrackPipeline {
    detector: Arc<OwlVitDetector>,
    config: Arc<VisionConfig>,
}

impl TrackPipeline {
    pub fn new(detector: Arc<OwlVitDetector>, config: Arc<VisionConfig>) -> Self {
        Self { detector, config }
    }

    pub fn process(
        &self,
        input: &Path,
        classes: &[String],
    ) -> Result<ProcessedVideo, VisionError> {
        if classes.is_empty() {
            return Err(VisionError::Processing(
                "at least one class name is required".to_string(),
            ));
        }

        let prompts = self.detector.encode_prompts(classes)?;
        let mut reader = VideoReader::open(input)?;
        let (width, height, fps) = (reader.width(), reader.height(), reader.fps());

        let out_path = output_path(&self.config.output_dir, "tracking", input, "tracked")?;
        let mut writer = VideoWriter::create(&out_path, fps, width, height)?;

        info!(
            "Tracking {:?} ({}x{} @ {:.1} fps) for classes {:?}",
            input, width, height, fps, classes
        );

        let mut total_detections = 0u64;
        while let Some(mut frame) = reader.read_frame()? {
            let detections = self.detector.detect(&frame, &prompts)?;
            total_detections += detections.len() as u64;
            annotate::draw_detections(&mut frame, &detections)?;
            writer.write(&frame)?;

            if writer.frames() % PROGRESS_EVERY == 0 {
                debug!("Frame: {}", writer.frames());
            }
        }

        let (path, frames) = writer.finish()?;
        info!(
            "Tracked {} frames ({} detections) into {:?}",
            frames, total_detections, path
        );

        Ok(ProcessedVideo {
            path,
            frames,
            width,
            height,
            fps,
        })
    }
}
