//! Error types for ovis-vision

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Video error: {0}")]
    Video(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ONNX Runtime error: {0}")]
    Ort(String),

    #[error("OpenCV error: {0}")]
    OpenCv(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}

impl From<ort::Error> for VisionError {
    fn from(err: ort::Error) -> Self {
        VisionError::Ort(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VisionError::Video("failed to open".to_string());
        assert!(err.to_string().contains("Video error"));
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VisionError = io_err.into();
        match err {
            VisionError::Io(_) => {}
            _ => panic!("expected Io error"),
        }
    }

    #[test]
    fn test_error_from_opencv() {
        let cv_err = opencv::Error::new(0, "bad mat".to_string());
        let err: VisionError = cv_err.into();
        match err {
            VisionError::OpenCv(msg) => assert!(msg.contains("bad mat")),
            _ => panic!("expected OpenCv error"),
        }
    }
}
