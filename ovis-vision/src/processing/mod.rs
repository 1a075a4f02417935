//! Per-frame processing pipelines

pub mod segment;
pub mod track;

pub use segment::SegmentPipeline;
pub use track::TrackPipeline;

use crate::error::VisionError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Interval between per-frame progress lines in the logs.
pub(crate) const PROGRESS_EVERY: u64 = 30;

/// Build `<output_dir>/<subdir>/<stem>_<job>_<suffix>.mp4`, creating
/// the directory on demand. The short job id keeps concurrent uploads
/// of identically named files from clobbering each other.
pub(crate) fn output_path(
    output_dir: &Path,
    subdir: &str,
    input: &Path,
    suffix: &str,
) -> Result<PathBuf, VisionError> {
    let dir = output_dir.join(subdir);
    std::fs::create_dir_all(&dir)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    let job = Uuid::new_v4().simple().to_string();

    Ok(dir.join(format!("{}_{}_{}.mp4", stem, &job[..8], suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(
            dir.path(),
            "tracking",
            Path::new("/tmp/uploads/ball.mp4"),
            "tracked",
        )
        .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ball_"));
        assert!(name.ends_with("_tracked.mp4"));
        assert!(path.parent().unwrap().ends_with("tracking"));
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_output_path_unique_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let input = Path::new("clip.mp4");
        let a = output_path(dir.path(), "tracking", input, "tracked").unwrap();
        let b = output_path(dir.path(), "tracking", input, "tracked").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_output_path_handles_missing_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(dir.path(), "segmentation", Path::new(".."), "segmented").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("video_"));
    }
}
