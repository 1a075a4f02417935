//! Model artifact management with auto-download

use crate::config::VisionConfig;
use crate::error::VisionError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Community ONNX exports of the two pretrained models, plus the CLIP
/// byte-pair tokenizer both of them condition text on.
const DETECTOR_URL: &str =
    "https://huggingface.co/Xenova/owlvit-base-patch32/resolve/main/onnx/model.onnx";
const DETECTOR_SHA256: &str = ""; // filled in when the export is mirrored

const SEGMENTER_URL: &str =
    "https://huggingface.co/Xenova/clipseg-rd64-refined/resolve/main/onnx/model.onnx";
const SEGMENTER_SHA256: &str = "";

const TOKENIZER_URL: &str =
    "https://huggingface.co/Xenova/owlvit-base-patch32/resolve/main/tokenizer.json";
const TOKENIZER_SHA256: &str = "";

const MAX_ARTIFACT_SIZE: usize = 2_000_000_000;
const DOWNLOAD_TIMEOUT_SECS: u64 = 3600;

/// Paths to everything the engine needs on disk.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub detector: PathBuf,
    pub segmenter: PathBuf,
    pub tokenizer: PathBuf,
}

/// Downloads and caches model artifacts under the configured model
/// directory. Each file is fetched at most once; writes are atomic
/// (tmp + rename) so an interrupted download never leaves a truncated
/// artifact behind.
pub struct ModelManager {
    config: Arc<VisionConfig>,
}

impl ModelManager {
    pub fn new(config: Arc<VisionConfig>) -> Self {
        Self { config }
    }

    /// Ensure the model directory exists.
    pub fn ensure_model_dir(&self) -> Result<PathBuf, VisionError> {
        let model_dir = &self.config.model_dir;
        if !model_dir.exists() {
            fs::create_dir_all(model_dir)?;
            info!("Created model directory: {:?}", model_dir);
        }
        Ok(model_dir.clone())
    }

    /// Ensure every artifact the engine needs is on disk.
    pub async fn ensure_all(&self) -> Result<ModelArtifacts, VisionError> {
        Ok(ModelArtifacts {
            detector: self
                .ensure_artifact("owlvit-base-patch32.onnx", DETECTOR_URL, DETECTOR_SHA256)
                .await?,
            segmenter: self
                .ensure_artifact("clipseg-rd64-refined.onnx", SEGMENTER_URL, SEGMENTER_SHA256)
                .await?,
            tokenizer: self
                .ensure_artifact("clip-tokenizer.json", TOKENIZER_URL, TOKENIZER_SHA256)
                .await?,
        })
    }

    /// Download one artifact if it is not already present.
    pub async fn ensure_artifact(
        &self,
        name: &str,
        url: &str,
        checksum: &str,
    ) -> Result<PathBuf, VisionError> {
        if name.is_empty() || name.len() > 255 {
            return Err(VisionError::Model("invalid artifact name".to_string()));
        }
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(VisionError::Model(
                "artifact name contains invalid characters".to_string(),
            ));
        }
        if !url.starts_with("https://") {
            return Err(VisionError::Model(
                "only HTTPS URLs are allowed for artifact downloads".to_string(),
            ));
        }

        self.ensure_model_dir()?;

        let path = self.config.model_dir.join(name);
        if path.exists() {
            return Ok(path);
        }

        info!("Downloading {} from {}", name, url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(VisionError::Model(format!(
                "failed to download {}: HTTP {}",
                name,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_ARTIFACT_SIZE as u64 {
                return Err(VisionError::Model(format!(
                    "artifact {} too large: {} bytes",
                    name, length
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_ARTIFACT_SIZE {
            return Err(VisionError::Model(format!(
                "artifact {} too large: {} bytes",
                name,
                bytes.len()
            )));
        }
        if bytes.len() < 1024 {
            return Err(VisionError::Model(format!(
                "artifact {} suspiciously small ({} bytes), refusing to keep it",
                name,
                bytes.len()
            )));
        }

        if !checksum.is_empty() {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let computed = hex::encode(hasher.finalize());
            if computed != checksum {
                return Err(VisionError::Model(format!(
                    "checksum mismatch for {}: expected {}, got {}",
                    name, checksum, computed
                )));
            }
            info!("Verified checksum for {}", name);
        }

        let tmp_path = self.config.model_dir.join(format!("{}.part", name));
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            VisionError::Io(e)
        })?;

        info!("Saved {} ({} bytes) to {:?}", name, bytes.len(), path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_with_dir(dir: &TempDir) -> ModelManager {
        let mut config = VisionConfig::default();
        config.model_dir = dir.path().to_path_buf();
        ModelManager::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_ensure_model_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let manager = manager_with_dir(&dir);
        assert!(manager.ensure_model_dir().is_ok());
        assert!(manager.ensure_model_dir().is_ok());
    }

    #[tokio::test]
    async fn test_rejects_traversal_names() {
        let dir = TempDir::new().unwrap();
        let manager = manager_with_dir(&dir);

        for name in ["", "../evil", "a/b", "a\\b"] {
            let result = manager
                .ensure_artifact(name, "https://example.com/m.onnx", "")
                .await;
            assert!(result.is_err(), "name {:?} should be rejected", name);
        }
    }

    #[tokio::test]
    async fn test_rejects_non_https_urls() {
        let dir = TempDir::new().unwrap();
        let manager = manager_with_dir(&dir);

        for url in ["http://example.com/m.onnx", "ftp://example.com/m.onnx", ""] {
            let result = manager.ensure_artifact("m.onnx", url, "").await;
            assert!(result.is_err(), "url {:?} should be rejected", url);
        }
    }

    #[tokio::test]
    async fn test_existing_artifact_is_not_refetched() {
        let dir = TempDir::new().unwrap();
        let manager = manager_with_dir(&dir);
        manager.ensure_model_dir().unwrap();

        let path = dir.path().join("m.onnx");
        fs::write(&path, b"cached").unwrap();

        // The URL is unreachable; an existing file must short-circuit
        // before any network access.
        let result = manager
            .ensure_artifact("m.onnx", "https://invalid.invalid/m.onnx", "")
            .await
            .unwrap();
        assert_eq!(result, path);
        assert_eq!(fs::read(&path).unwrap(), b"cached");
    }
}
