//! Configuration for the vision engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vision engine configuration. Thresholds default to the values the
/// pretrained models are usually run with; both output directories are
/// created on demand by the pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Where downloaded model artifacts live.
    pub model_dir: PathBuf,
    /// Root directory for processed videos (per-mode subdirectories
    /// are created underneath).
    pub output_dir: PathBuf,
    /// Minimum detector score for a box to be kept.
    pub detect_threshold: f32,
    /// Heatmap cutoff for a pixel to count as part of a mask.
    pub mask_threshold: f32,
    /// IoU above which overlapping detections are suppressed.
    pub iou_threshold: f32,
    /// Intra-op thread count for the ONNX sessions.
    pub intra_threads: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        let model_dir = dirs::home_dir()
            .map(|mut p| {
                p.push(".ovis");
                p.push("models");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models"));

        Self {
            model_dir,
            output_dir: PathBuf::from("./output"),
            detect_threshold: 0.1,
            mask_threshold: 0.30,
            iou_threshold: 0.5,
            intra_threads: 4,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.detect_threshold) {
            return Err("Detection threshold must be in [0, 1)".to_string());
        }

        if !(0.0..1.0).contains(&self.mask_threshold) {
            return Err("Mask threshold must be in [0, 1)".to_string());
        }

        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err("IoU threshold must be in [0, 1]".to_string());
        }

        if self.intra_threads == 0 || self.intra_threads > 256 {
            return Err("Intra-op thread count must be between 1 and 256".to_string());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err("Model directory must not be empty".to_string());
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory must not be empty".to_string());
        }

        Ok(())
    }
}
