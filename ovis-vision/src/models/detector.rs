//! Open-vocabulary object detector (OWL-ViT)
//!
//! The detector scores a fixed set of image queries against every
//! supplied class name, so any free-text label works at inference
//! time. This wrapper owns the ONNX session and the text encoder and
//! turns raw model output into pixel-space detections.

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::models::text::{EncodedPrompts, PromptEncoder};
use crate::utils::{mat_to_clip_tensor, sigmoid};
use ndarray::Ix3;
use opencv::core::Mat;
use opencv::prelude::MatTraitConst;
use ort::{GraphOptimizationLevel, Session};
use ovis_core::{BoundingBox, Detection};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

/// OWL-ViT runs on 768x768 inputs and pads class prompts to 16 tokens.
const INPUT_SIZE: i32 = 768;
const PROMPT_TOKENS: usize = 16;

pub struct OwlVitDetector {
    session: Session,
    encoder: PromptEncoder,
    score_threshold: f32,
    iou_threshold: f32,
}

impl OwlVitDetector {
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
        config: &VisionConfig,
    ) -> Result<Self, VisionError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(model_path)
            .map_err(|e| VisionError::Model(format!("failed to load detector: {}", e)))?;

        let encoder = PromptEncoder::from_file(tokenizer_path, PROMPT_TOKENS)?;

        info!("Detector model loaded from {:?}", model_path);

        Ok(Self {
            session,
            encoder,
            score_threshold: config.detect_threshold,
            iou_threshold: config.iou_threshold,
        })
    }

    /// Encode the class list once per request; the result is reused
    /// for every frame of the video.
    pub fn encode_prompts(&self, classes: &[String]) -> Result<EncodedPrompts, VisionError> {
        self.encoder.encode(classes)
    }

    /// Detect the prompted classes in one BGR frame.
    pub fn detect(
        &self,
        frame: &Mat,
        prompts: &EncodedPrompts,
    ) -> Result<Vec<Detection>, VisionError> {
        let frame_width = frame.cols() as f32;
        let frame_height = frame.rows() as f32;
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return Err(VisionError::Processing("empty frame".to_string()));
        }

        let pixels = mat_to_clip_tensor(frame, INPUT_SIZE, INPUT_SIZE)?;

        let outputs = self.session.run(ort::inputs![
            "input_ids" => prompts.input_ids().view(),
            "pixel_values" => pixels.view(),
            "attention_mask" => prompts.attention_mask().view(),
        ]?)?;

        let logits = outputs["logits"]
            .try_extract_tensor::<f32>()?
            .into_dimensionality::<Ix3>()
            .map_err(|e| VisionError::Ort(format!("unexpected logits shape: {}", e)))?;
        let boxes = outputs["pred_boxes"]
            .try_extract_tensor::<f32>()?
            .into_dimensionality::<Ix3>()
            .map_err(|e| VisionError::Ort(format!("unexpected pred_boxes shape: {}", e)))?;

        let (_, num_queries, num_prompts) = logits.dim();
        if num_prompts != prompts.len() {
            return Err(VisionError::Ort(format!(
                "detector returned {} prompt columns for {} prompts",
                num_prompts,
                prompts.len()
            )));
        }

        let mut detections = Vec::new();
        for query in 0..num_queries {
            let mut best_class = 0usize;
            let mut best_logit = f32::NEG_INFINITY;
            for class in 0..num_prompts {
                let logit = logits[[0, query, class]];
                if logit.is_finite() && logit > best_logit {
                    best_logit = logit;
                    best_class = class;
                }
            }
            if !best_logit.is_finite() {
                continue;
            }

            let score = sigmoid(best_logit);
            if score < self.score_threshold {
                continue;
            }

            // Boxes come back as cxcywh normalized to the input image.
            let cx = boxes[[0, query, 0]];
            let cy = boxes[[0, query, 1]];
            let w = boxes[[0, query, 2]];
            let h = boxes[[0, query, 3]];

            let bbox = BoundingBox::new(
                (cx - w / 2.0) * frame_width,
                (cy - h / 2.0) * frame_height,
                w * frame_width,
                h * frame_height,
            );
            let bbox = match bbox.clamp_to_frame(frame_width, frame_height) {
                Some(bbox) => bbox,
                None => continue,
            };

            detections.push(Detection {
                label: prompts.labels()[best_class].clone(),
                score,
                bbox,
            });
        }

        let detections = non_max_suppression(detections, self.iou_threshold);
        debug!("Detector kept {} boxes", detections.len());
        Ok(detections)
    }
}

/// Class-agnostic non-maximum suppression: keep the highest-scoring
/// box of every overlapping cluster.
pub(crate) fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
) -> Vec<Detection> {
    detections.retain(|d| d.score.is_finite());
    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut keep: Vec<Detection> = Vec::new();
    for candidate in detections {
        if keep
            .iter()
            .all(|kept| kept.bbox.iou(&candidate.bbox) <= iou_threshold)
        {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(label: &str, score: f32, x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection {
            label: label.to_string(),
            score,
            bbox: BoundingBox::new(x, y, w, h),
        }
    }

    #[test]
    fn test_nms_keeps_highest_of_overlapping_pair() {
        let detections = vec![
            detection("ball", 0.6, 0.0, 0.0, 10.0, 10.0),
            detection("ball", 0.9, 1.0, 1.0, 10.0, 10.0),
        ];
        let kept = non_max_suppression(detections, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_disjoint_boxes() {
        let detections = vec![
            detection("ball", 0.6, 0.0, 0.0, 10.0, 10.0),
            detection("car", 0.9, 100.0, 100.0, 10.0, 10.0),
        ];
        let kept = non_max_suppression(detections, 0.5);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_drops_non_finite_scores() {
        let detections = vec![
            detection("ball", f32::NAN, 0.0, 0.0, 10.0, 10.0),
            detection("ball", 0.5, 50.0, 50.0, 10.0, 10.0),
        ];
        let kept = non_max_suppression(detections, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.5);
    }

    #[test]
    fn test_nms_result_sorted_by_score() {
        let detections = vec![
            detection("a", 0.3, 0.0, 0.0, 5.0, 5.0),
            detection("b", 0.8, 100.0, 0.0, 5.0, 5.0),
            detection("c", 0.5, 0.0, 100.0, 5.0, 5.0),
        ];
        let kept = non_max_suppression(detections, 0.5);
        let scores: Vec<f32> = kept.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.8, 0.5, 0.3]);
    }
}
