//! Shared types passed between the dispatcher and the vision engine

use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Processing mode selected on the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Open-vocabulary detection with bounding boxes drawn per frame.
    Track,
    /// Open-vocabulary segmentation masking each frame to the detected
    /// regions.
    Segment,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "track" => Ok(Mode::Track),
            "segment" => Ok(Mode::Segment),
            other => Err(format!("unknown processing mode: {:?}", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Track => write!(f, "track"),
            Mode::Segment => write!(f, "segment"),
        }
    }
}

/// One detector hit on one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    pub bbox: BoundingBox,
}

/// What a pipeline hands back after re-encoding the whole input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedVideo {
    pub path: PathBuf,
    pub frames: u64,
    pub width: i32,
    pub height: i32,
    pub fps: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("track".parse::<Mode>().unwrap(), Mode::Track);
        assert_eq!("Track".parse::<Mode>().unwrap(), Mode::Track);
        assert_eq!(" SEGMENT ".parse::<Mode>().unwrap(), Mode::Segment);
        assert!("detect".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [Mode::Track, Mode::Segment] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }
}
