//! Frame-to-tensor conversion shared by both models

use crate::error::VisionError;
use ndarray::Array4;
use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::MatTraitConst;

/// Normalization constants the CLIP-family preprocessors use.
pub(crate) const CLIP_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub(crate) const CLIP_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resize a BGR frame to `width` x `height`, convert to RGB, scale to
/// [0, 1] and apply CLIP mean/std normalization. Returns a
/// [1, 3, height, width] tensor.
pub(crate) fn mat_to_clip_tensor(
    frame: &Mat,
    width: i32,
    height: i32,
) -> Result<Array4<f32>, VisionError> {
    if frame.cols() <= 0 || frame.rows() <= 0 {
        return Err(VisionError::Processing("empty frame".to_string()));
    }
    if width <= 0 || height <= 0 {
        return Err(VisionError::Processing(
            "target dimensions must be positive".to_string(),
        ));
    }

    let mut resized = Mat::default();
    imgproc::resize(
        frame,
        &mut resized,
        Size::new(width, height),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let (w, h) = (width as usize, height as usize);
    let data = rgb.data_bytes()?;
    if data.len() != w * h * 3 {
        return Err(VisionError::Processing(format!(
            "unexpected frame buffer size: got {}, want {}",
            data.len(),
            w * h * 3
        )));
    }

    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
    for y in 0..h {
        for x in 0..w {
            let base = (y * w + x) * 3;
            for c in 0..3 {
                let value = data[base + c] as f32 / 255.0;
                tensor[[0, c, y, x]] = (value - CLIP_MEAN[c]) / CLIP_STD[c];
            }
        }
    }

    Ok(tensor)
}

/// Repeat a [1, C, H, W] tensor `count` times along the batch axis.
/// The segmenter scores every prompt against the same image, so the
/// image is duplicated once per prompt.
pub(crate) fn repeat_batch(tensor: &Array4<f32>, count: usize) -> Array4<f32> {
    let (_, c, h, w) = tensor.dim();
    let mut batched = Array4::<f32>::zeros((count, c, h, w));
    for i in 0..count {
        batched
            .index_axis_mut(ndarray::Axis(0), i)
            .assign(&tensor.index_axis(ndarray::Axis(0), 0));
    }
    batched
}

#[inline]
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn test_tensor_shape_and_normalization() {
        // 4x4 all-white BGR frame
        let frame =
            Mat::new_rows_cols_with_default(4, 4, CV_8UC3, Scalar::new(255.0, 255.0, 255.0, 0.0))
                .unwrap();
        let tensor = mat_to_clip_tensor(&frame, 4, 4).unwrap();
        assert_eq!(tensor.dim(), (1, 3, 4, 4));
        for c in 0..3 {
            let expected = (1.0 - CLIP_MEAN[c]) / CLIP_STD[c];
            assert!((tensor[[0, c, 0, 0]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_tensor_rejects_empty_frame() {
        let frame = Mat::default();
        assert!(mat_to_clip_tensor(&frame, 4, 4).is_err());
    }

    #[test]
    fn test_repeat_batch() {
        let frame =
            Mat::new_rows_cols_with_default(2, 2, CV_8UC3, Scalar::new(0.0, 128.0, 255.0, 0.0))
                .unwrap();
        let tensor = mat_to_clip_tensor(&frame, 2, 2).unwrap();
        let batched = repeat_batch(&tensor, 3);
        assert_eq!(batched.dim(), (3, 3, 2, 2));
        for i in 0..3 {
            assert_eq!(batched[[i, 0, 1, 1]], tensor[[0, 0, 1, 1]]);
        }
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }
}
