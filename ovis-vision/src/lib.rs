//! ovis-vision: the vision engine behind the ovis demo service
//!
//! Wraps two pretrained open-vocabulary models (an OWL-ViT detector
//! and a CLIPSeg segmenter) behind per-frame track and segment
//! pipelines: decode a frame, invoke the model, draw the result,
//! re-encode. Model weights are downloaded on first start and loaded
//! into ONNX Runtime sessions exactly once.

pub mod annotate;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod processing;
pub mod video;
mod utils;

pub use config::VisionConfig;
pub use engine::VisionEngine;
pub use error::VisionError;
