//! Video file decode and re-encode

use crate::error::VisionError;
use opencv::core::{Mat, Size};
use opencv::prelude::{
    MatTraitConst, VideoCaptureTrait, VideoCaptureTraitConst, VideoWriterTrait,
    VideoWriterTraitConst,
};
use opencv::videoio::{self, VideoCapture};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Containers sometimes report zero for these; fall back to sane
/// defaults rather than producing a broken output header.
const DEFAULT_WIDTH: i32 = 640;
const DEFAULT_HEIGHT: i32 = 480;
const DEFAULT_FPS: f64 = 30.0;

/// Sequential frame reader over a video file.
pub struct VideoReader {
    capture: VideoCapture,
    width: i32,
    height: i32,
    fps: f64,
}

impl VideoReader {
    pub fn open(path: &Path) -> Result<Self, VisionError> {
        if !path.exists() {
            return Err(VisionError::Video("Video file not found!".to_string()));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| VisionError::Video("video path is not valid UTF-8".to_string()))?;

        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(VisionError::Video("Failed to open video!".to_string()));
        }

        let mut width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let mut height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let mut fps = capture.get(videoio::CAP_PROP_FPS)?;

        if width <= 0 || height <= 0 {
            warn!(
                "Container reports {}x{}, falling back to {}x{}",
                width, height, DEFAULT_WIDTH, DEFAULT_HEIGHT
            );
            width = DEFAULT_WIDTH;
            height = DEFAULT_HEIGHT;
        }
        if fps <= 0.0 || !fps.is_finite() {
            fps = DEFAULT_FPS;
        }

        Ok(Self {
            capture,
            width,
            height,
            fps,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Read the next frame; `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Mat>, VisionError> {
        let mut frame = Mat::default();
        if self.capture.read(&mut frame)? && frame.rows() > 0 {
            Ok(Some(frame))
        } else {
            Ok(None)
        }
    }
}

/// Frame writer producing an mp4v-encoded .mp4 file. Tracks how many
/// frames were appended so an empty output can be reported as an
/// error instead of a zero-byte video.
pub struct VideoWriter {
    writer: videoio::VideoWriter,
    path: PathBuf,
    frames: u64,
}

impl VideoWriter {
    pub fn create(path: &Path, fps: f64, width: i32, height: i32) -> Result<Self, VisionError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| VisionError::Video("output path is not valid UTF-8".to_string()))?;

        let fourcc = videoio::VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer =
            videoio::VideoWriter::new(path_str, fourcc, fps, Size::new(width, height), true)?;
        if !writer.is_opened()? {
            return Err(VisionError::Video(
                "Failed to initialize video writer!".to_string(),
            ));
        }

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            frames: 0,
        })
    }

    pub fn write(&mut self, frame: &Mat) -> Result<(), VisionError> {
        self.writer.write(frame)?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Release the writer and verify something usable was produced.
    pub fn finish(mut self) -> Result<(PathBuf, u64), VisionError> {
        self.writer.release()?;

        if self.frames == 0 {
            return Err(VisionError::Video("No frames processed!".to_string()));
        }
        if !self.path.exists() {
            return Err(VisionError::Video("Output file not created!".to_string()));
        }

        Ok((self.path, self.frames))
    }
}
