//! Segment pipeline: mask each frame to the prompted regions

use crate::annotate;
use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::models::ClipSegModel;
use crate::processing::{output_path, PROGRESS_EVERY};
use crate::video::{VideoReader, VideoWriter};
use opencv::core::Mat;
use opencv::prelude::MatTraitConst;
use ovis_core::ProcessedVideo;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs open-vocabulary segmentation over every frame of a video and
/// re-encodes the stream blacked out everywhere the prompts did not
/// match.
pub struct SegmentPipeline {
    segmenter: Arc<ClipSegModel>,
    config: Arc<VisionConfig>,
}

impl SegmentPipeline {
    pub fn new(segmenter: Arc<ClipSegModel>, config: Arc<VisionConfig>) -> Self {
        Self { segmenter, config }
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

        let prompts = self.segmenter.encode_prompts(classes)?;
        let mut reader = VideoReader::open(input)?;
        let (width, height, fps) = (reader.width(), reader.height(), reader.fps());

        let out_path = output_path(&self.config.output_dir, "segmentation", input, "segmented")?;
        let mut writer = VideoWriter::create(&out_path, fps, width, height)?;

        info!(
            "Segmenting {:?} ({}x{} @ {:.1} fps) for classes {:?}",
            input, width, height, fps, classes
        );

        while let Some(frame) = reader.read_frame()? {
            let heatmaps = self.segmenter.segment(&frame, &prompts)?;

            let mut masks = Vec::with_capacity(heatmaps.len());
            for heatmap in &heatmaps {
                masks.push(annotate::heatmap_to_mask(
                    heatmap,
                    frame.cols(),
                    frame.rows(),
                    self.config.mask_threshold,
                )?);
            }
            let merged = annotate::merge_masks(&masks)?;
            let masked: Mat = annotate::mask_frame(&frame, &merged)?;
            writer.write(&masked)?;

            if writer.frames() % PROGRESS_EVERY == 0 {
                debug!("Frame: {}", writer.frames());
            }
        }

        let (path, frames) = writer.finish()?;
        info!("Segmented {} frames into {:?}", frames, path);

        Ok(ProcessedVideo {
            path,
            frames,
            width,
            height,
            fps,
        })
    }
}
