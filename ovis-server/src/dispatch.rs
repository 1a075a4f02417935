//! Request validation and routing
//!
//! The dispatcher owns every user-facing validation message; the
//! pipelines behind it may assume a present video and a non-empty
//! class list. Validation failures are answers, not transport errors:
//! they surface through the form's message box.

use axum::body::Bytes;
use ovis_core::{parse_class_list, Mode};
use std::str::FromStr;

/// Raw fields pulled out of the multipart form.
#[derive(Debug, Default)]
pub struct ProcessRequest {
    pub file_name: Option<String>,
    pub video: Option<Bytes>,
    pub mode: Option<String>,
    pub classes: Option<String>,
}

/// A request the pipelines will accept.
#[derive(Debug)]
pub struct ValidatedRequest {
    pub file_name: String,
    pub video: Bytes,
    pub mode: Mode,
    pub classes: Vec<String>,
}

/// Validate a raw form submission. The error string is the message
/// shown to the user, matching the demo's original wording.
pub fn validate(request: ProcessRequest) -> Result<ValidatedRequest, String> {
    let video = match request.video {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err("Invalid or missing video file.".to_string()),
    };

    let classes = parse_class_list(request.classes.as_deref().unwrap_or(""));
    if classes.is_empty() {
        return Err("Object classes are required for tracking!".to_string());
    }

    let mode = match request.mode.as_deref() {
        Some(raw) => Mode::from_str(raw).map_err(|e| format!("Error: {}", e))?,
        None => return Err("A processing mode is required.".to_string()),
    };

    let file_name = sanitize_file_name(request.file_name.as_deref());

    Ok(ValidatedRequest {
        file_name,
        video,
        mode,
        classes,
    })
}

/// Reduce an uploaded filename to a safe basename for the scratch
/// directory. Anything suspicious degrades to `upload.mp4`.
pub fn sanitize_file_name(name: Option<&str>) -> String {
    let base = name
        .map(|n| n.replace('\\', "/"))
        .and_then(|n| n.rsplit('/').next().map(str::to_string))
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload.mp4".to_string()
    } else {
        cleaned
    }
}
