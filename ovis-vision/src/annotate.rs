//! Frame annotation: box drawing and mask application

use crate::error::VisionError;
use crate::models::PromptHeatmap;
use opencv::core::{self, Mat, Point, Rect, Scalar, Size, CV_8U, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::{MatExprTraitConst, MatTraitConst};
use ovis_core::Detection;

/// Box and caption color (BGR green, like most detector demos).
fn box_color() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

/// Draw every detection on the frame: a 2 px rectangle plus a
/// `label score` caption just above its top-left corner.
pub fn draw_detections(frame: &mut Mat, detections: &[Detection]) -> Result<(), VisionError> {
    for detection in detections {
        let bbox = &detection.bbox;
        let rect = Rect::new(
            bbox.x.round() as i32,
            bbox.y.round() as i32,
            bbox.width.round() as i32,
            bbox.height.round() as i32,
        );
        if rect.width <= 0 || rect.height <= 0 {
            continue;
        }

        imgproc::rectangle(frame, rect, box_color(), 2, imgproc::LINE_8, 0)?;

        let caption = format!("{} {:.3}", detection.label, detection.score);
        // Keep the caption inside the frame when the box touches the top.
        let text_y = (rect.y - 10).max(15);
        imgproc::put_text(
            frame,
            &caption,
            Point::new(rect.x, text_y),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.9,
            box_color(),
            2,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}

/// Upscale a model-resolution heatmap to frame size and binarize it at
/// `threshold`. Returns a CV_8U mask with 255 where the prompt matched.
pub fn heatmap_to_mask(
    heatmap: &PromptHeatmap,
    frame_width: i32,
    frame_height: i32,
    threshold: f32,
) -> Result<Mat, VisionError> {
    if heatmap.data.len() != heatmap.width * heatmap.height {
        return Err(VisionError::Processing(format!(
            "heatmap size mismatch: got {} values for {}x{}",
            heatmap.data.len(),
            heatmap.width,
            heatmap.height
        )));
    }
    if frame_width <= 0 || frame_height <= 0 {
        return Err(VisionError::Processing(
            "frame dimensions must be positive".to_string(),
        ));
    }

    let flat = Mat::from_slice(&heatmap.data)?;
    let heat = flat.reshape(1, heatmap.height as i32)?;

    let mut resized = Mat::default();
    imgproc::resize(
        &heat,
        &mut resized,
        Size::new(frame_width, frame_height),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut binary = Mat::default();
    imgproc::threshold(
        &resized,
        &mut binary,
        threshold as f64,
        255.0,
        imgproc::THRESH_BINARY,
    )?;

    let mut mask = Mat::default();
    binary.convert_to(&mut mask, CV_8U, 1.0, 0.0)?;
    Ok(mask)
}

/// Union of per-prompt masks.
pub fn merge_masks(masks: &[Mat]) -> Result<Mat, VisionError> {
    let first = masks
        .first()
        .ok_or_else(|| VisionError::Processing("no masks to merge".to_string()))?;

    let mut merged = first.try_clone()?;
    for mask in &masks[1..] {
        let mut next = Mat::default();
        core::bitwise_or(&merged, mask, &mut next, &core::no_array())?;
        merged = next;
    }
    Ok(merged)
}

/// Black canvas with the source pixels copied through the mask. This
/// is the segmented frame the output video is built from.
pub fn mask_frame(frame: &Mat, mask: &Mat) -> Result<Mat, VisionError> {
    let mut out = Mat::zeros(frame.rows(), frame.cols(), CV_8UC3)?.to_mat()?;
    frame.copy_to_masked(&mut out, mask)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::CV_8UC3;
    use opencv::prelude::MatTrait;
    use ovis_core::BoundingBox;

    fn solid_frame(rows: i32, cols: i32, b: f64, g: f64, r: f64) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(b, g, r, 0.0)).unwrap()
    }

    #[test]
    fn test_draw_detections_modifies_frame() {
        let mut frame = solid_frame(64, 64, 0.0, 0.0, 0.0);
        let detections = vec![Detection {
            label: "ball".to_string(),
            score: 0.75,
            bbox: BoundingBox::new(8.0, 8.0, 32.0, 32.0),
        }];
        draw_detections(&mut frame, &detections).unwrap();

        // A green box edge pixel must now exist.
        let px = frame.at_2d::<core::Vec3b>(8, 20).unwrap();
        assert_eq!(px[1], 255);
    }

    #[test]
    fn test_draw_skips_degenerate_boxes() {
        let mut frame = solid_frame(32, 32, 0.0, 0.0, 0.0);
        let detections = vec![Detection {
            label: "ball".to_string(),
            score: 0.5,
            bbox: BoundingBox::new(4.0, 4.0, 0.2, 0.2),
        }];
        // Rounds to zero size; must not error.
        draw_detections(&mut frame, &detections).unwrap();
    }

    #[test]
    fn test_heatmap_to_mask_thresholds() {
        // 2x2 heatmap: only the top-left value clears the cutoff.
        let heatmap = PromptHeatmap {
            label: "ball".to_string(),
            width: 2,
            height: 2,
            data: vec![0.9, 0.0, 0.0, 0.0],
        };
        let mask = heatmap_to_mask(&heatmap, 2, 2, 0.5).unwrap();
        assert_eq!(*mask.at_2d::<u8>(0, 0).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_heatmap_size_mismatch_rejected() {
        let heatmap = PromptHeatmap {
            label: "ball".to_string(),
            width: 4,
            height: 4,
            data: vec![0.0; 3],
        };
        assert!(heatmap_to_mask(&heatmap, 8, 8, 0.5).is_err());
    }

    #[test]
    fn test_merge_masks_union() {
        let a = Mat::new_rows_cols_with_default(2, 2, CV_8U, Scalar::all(0.0)).unwrap();
        let mut b = Mat::new_rows_cols_with_default(2, 2, CV_8U, Scalar::all(0.0)).unwrap();
        *b.at_2d_mut::<u8>(0, 1).unwrap() = 255;

        let merged = merge_masks(&[a, b]).unwrap();
        assert_eq!(*merged.at_2d::<u8>(0, 1).unwrap(), 255);
        assert_eq!(*merged.at_2d::<u8>(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_merge_masks_empty_rejected() {
        assert!(merge_masks(&[]).is_err());
    }

    #[test]
    fn test_mask_frame_blanks_outside_mask() {
        let frame = solid_frame(2, 2, 10.0, 20.0, 30.0);
        let mut mask = Mat::new_rows_cols_with_default(2, 2, CV_8U, Scalar::all(0.0)).unwrap();
        *mask.at_2d_mut::<u8>(0, 0).unwrap() = 255;

        let out = mask_frame(&frame, &mask).unwrap();
        let kept = out.at_2d::<core::Vec3b>(0, 0).unwrap();
        assert_eq!((kept[0], kept[1], kept[2]), (10, 20, 30));
        let blanked = out.at_2d::<core::Vec3b>(1, 1).unwrap();
        assert_eq!((blanked[0], blanked[1], blanked[2]), (0, 0, 0));
    }
}
