//! Open-vocabulary segmentation model (CLIPSeg)
//!
//! CLIPSeg produces one low-resolution relevance heatmap per text
//! prompt. The image is repeated once per prompt, matching how the
//! model was exported; upscaling and thresholding happen downstream
//! where the frame dimensions are known.

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::models::text::{EncodedPrompts, PromptEncoder};
use crate::utils::{mat_to_clip_tensor, repeat_batch, sigmoid};
use opencv::core::Mat;
use opencv::prelude::MatTraitConst;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{debug, info};

/// CLIPSeg runs on 352x352 inputs with the full 77-token CLIP context
/// (the upstream processor pads prompts to max length).
const INPUT_SIZE: i32 = 352;
const PROMPT_TOKENS: usize = 77;

/// One prompt's relevance heatmap, sigmoid already applied, values in
/// [0, 1] at the model's native resolution.
#[derive(Debug, Clone)]
pub struct PromptHeatmap {
    pub label: String,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

pub struct ClipSegModel {
    session: Session,
    encoder: PromptEncoder,
}

impl ClipSegModel {
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
        config: &VisionConfig,
    ) -> Result<Self, VisionError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(model_path)
            .map_err(|e| VisionError::Model(format!("failed to load segmenter: {}", e)))?;

        let encoder = PromptEncoder::from_file(tokenizer_path, PROMPT_TOKENS)?;

        info!("Segmenter model loaded from {:?}", model_path);

        Ok(Self { session, encoder })
    }

    pub fn encode_prompts(&self, classes: &[String]) -> Result<EncodedPrompts, VisionError> {
        self.encoder.encode(classes)
    }

    /// Produce one heatmap per prompt for a BGR frame.
    pub fn segment(
        &self,
        frame: &Mat,
        prompts: &EncodedPrompts,
    ) -> Result<Vec<PromptHeatmap>, VisionError> {
        if frame.cols() <= 0 || frame.rows() <= 0 {
            return Err(VisionError::Processing("empty frame".to_string()));
        }

        let single = mat_to_clip_tensor(frame, INPUT_SIZE, INPUT_SIZE)?;
        let pixels = repeat_batch(&single, prompts.len());

        let outputs = self.session.run(ort::inputs![
            "input_ids" => prompts.input_ids().view(),
            "pixel_values" => pixels.view(),
            "attention_mask" => prompts.attention_mask().view(),
        ]?)?;

        let logits = outputs["logits"].try_extract_tensor::<f32>()?;
        let shape = logits.shape().to_vec();

        // The exported graph yields [n, h, w]; a single prompt may come
        // back squeezed to [h, w], and some exports keep a channel axis
        // as [n, 1, h, w].
        let (count, height, width) = match shape.as_slice() {
            [h, w] if prompts.len() == 1 => (1usize, *h, *w),
            [n, h, w] => (*n, *h, *w),
            [n, 1, h, w] => (*n, *h, *w),
            other => {
                return Err(VisionError::Ort(format!(
                    "unexpected segmenter output shape: {:?}",
                    other
                )))
            }
        };
        if count != prompts.len() {
            return Err(VisionError::Ort(format!(
                "segmenter returned {} heatmaps for {} prompts",
                count,
                prompts.len()
            )));
        }

        let flat: Vec<f32> = logits.iter().copied().collect();
        let plane = height * width;
        if flat.len() != count * plane {
            return Err(VisionError::Ort(format!(
                "segmenter output size mismatch: got {}, want {}",
                flat.len(),
                count * plane
            )));
        }

        let mut heatmaps = Vec::with_capacity(count);
        for (index, label) in prompts.labels().iter().enumerate() {
            let data = flat[index * plane..(index + 1) * plane]
                .iter()
                .map(|&logit| {
                    if logit.is_finite() {
                        sigmoid(logit)
                    } else {
                        0.0
                    }
                })
                .collect();
            heatmaps.push(PromptHeatmap {
                label: label.clone(),
                width,
                height,
                data,
            });
        }

        debug!("Segmenter produced {} heatmaps", heatmaps.len());
        Ok(heatmaps)
    }
}
