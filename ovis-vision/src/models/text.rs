//! Text prompt encoding
//!
//! Both pretrained models condition on free-text class names through
//! the same CLIP byte-pair tokenizer. The encoder loads the pretrained
//! tokenizer file once and turns a class list into the padded
//! `input_ids` / `attention_mask` matrices the ONNX graphs expect.

use crate::error::VisionError;
use ndarray::Array2;
use std::path::Path;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// A class list encoded for one model's text tower.
#[derive(Debug, Clone)]
pub struct EncodedPrompts {
    labels: Vec<String>,
    input_ids: Array2<i64>,
    attention_mask: Array2<i64>,
}

impl EncodedPrompts {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn input_ids(&self) -> &Array2<i64> {
        &self.input_ids
    }

    pub fn attention_mask(&self) -> &Array2<i64> {
        &self.attention_mask
    }
}

/// Wraps the pretrained tokenizer with a fixed sequence length.
/// The detector pads to 16 tokens, the segmenter to the full 77-token
/// CLIP context.
pub struct PromptEncoder {
    tokenizer: Tokenizer,
    sequence_length: usize,
}

impl PromptEncoder {
    pub fn from_file(path: &Path, sequence_length: usize) -> Result<Self, VisionError> {
        let mut tokenizer = Tokenizer::from_file(path)
            .map_err(|e| VisionError::Tokenizer(format!("failed to load tokenizer: {}", e)))?;

        let mut padding = PaddingParams::default();
        padding.strategy = PaddingStrategy::Fixed(sequence_length);
        tokenizer.with_padding(Some(padding));

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: sequence_length,
                ..Default::default()
            }))
            .map_err(|e| VisionError::Tokenizer(format!("failed to set truncation: {}", e)))?;

        Ok(Self {
            tokenizer,
            sequence_length,
        })
    }

    /// Encode a cleaned class list. Rejects an empty list; the
    /// dispatcher is expected to have filtered that out already.
    pub fn encode(&self, classes: &[String]) -> Result<EncodedPrompts, VisionError> {
        if classes.is_empty() {
            return Err(VisionError::Processing(
                "at least one class name is required".to_string(),
            ));
        }

        let encodings = self
            .tokenizer
            .encode_batch(classes.to_vec(), true)
            .map_err(|e| VisionError::Tokenizer(format!("failed to encode prompts: {}", e)))?;

        let mut input_ids = Array2::<i64>::zeros((classes.len(), self.sequence_length));
        let mut attention_mask = Array2::<i64>::zeros((classes.len(), self.sequence_length));

        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            for col in 0..self.sequence_length.min(ids.len()) {
                input_ids[[row, col]] = ids[col] as i64;
                attention_mask[[row, col]] = mask[col] as i64;
            }
        }

        Ok(EncodedPrompts {
            labels: classes.to_vec(),
            input_ids,
            attention_mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rejects_empty_list() {
        // Construction needs a tokenizer file, so exercise the guard
        // through a hand-built encoder once a file is present; here we
        // only check the EncodedPrompts accessors on a synthetic value.
        let prompts = EncodedPrompts {
            labels: vec!["ball".to_string()],
            input_ids: Array2::zeros((1, 16)),
            attention_mask: Array2::zeros((1, 16)),
        };
        assert_eq!(prompts.len(), 1);
        assert!(!prompts.is_empty());
        assert_eq!(prompts.labels(), &["ball".to_string()]);
        assert_eq!(prompts.input_ids().dim(), (1, 16));
    }
}
