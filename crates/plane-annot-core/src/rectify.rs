//! Perspective rectification of the calibrated inspection surface.

use nalgebra::Point2;

use crate::frame::{GrayFrame, GrayFrameView};
use crate::homography::{homography_from_corners, warp_perspective, Homography};
use crate::quad::CalibrationQuad;

/// Rectification failures surfaced to the caller so the UI can prompt for
/// recalibration.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectifyError {
    #[error("rectification requires a locked 4-point calibration")]
    NotCalibrated,
    #[error("calibration quadrilateral is degenerate (collinear or coincident corners)")]
    DegenerateQuad,
}

/// A rectified frame plus the transform mapping rectified pixels back into
/// camera pixels, so detections found here can be reported in camera space.
#[derive(Clone, Debug)]
pub struct RectifiedFrame {
    pub frame: GrayFrame,
    pub img_from_rect: Homography,
}

impl RectifiedFrame {
    /// Map a point in the rectified frame back to camera pixels.
    #[inline]
    pub fn to_camera(&self, p: Point2<f32>) -> Point2<f32> {
        self.img_from_rect.apply(p)
    }

    /// Map a camera-space point into the rectified frame, when the transform
    /// is invertible (it always is for a non-degenerate calibration).
    pub fn to_rectified(&self, p: Point2<f32>) -> Option<Point2<f32>> {
        self.img_from_rect.inverse().map(|h| h.apply(p))
    }
}

/// Twice the signed area of the triangle `a b c`.
fn cross(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f64 {
    let abx = b.x as f64 - a.x as f64;
    let aby = b.y as f64 - a.y as f64;
    let acx = c.x as f64 - a.x as f64;
    let acy = c.y as f64 - a.y as f64;
    abx * acy - aby * acx
}

fn is_degenerate(corners: &[Point2<f32>; 4]) -> bool {
    let [tl, tr, br, bl] = *corners;
    let mut span = 0.0_f64;
    for a in corners.iter() {
        for b in corners.iter() {
            span = span.max((a.x as f64 - b.x as f64).hypot(a.y as f64 - b.y as f64));
        }
    }
    // any collinear corner triple leaves the homography underdetermined
    let eps = 1e-6 * span * span + 1e-9;
    [
        cross(tl, tr, br),
        cross(tr, br, bl),
        cross(br, bl, tl),
        cross(bl, tl, tr),
    ]
    .iter()
    .any(|area| area.abs() <= eps)
}

/// Warp the calibrated quadrilateral region of `src` into an axis-aligned
/// rectangle sized from the quad's edge lengths.
///
/// Corner `tl` lands on output pixel `(0, 0)`, `tr` on `(w-1, 0)`, `br` on
/// `(w-1, h-1)` and `bl` on `(0, h-1)`. The source frame is never mutated.
pub fn rectify(
    src: &GrayFrameView<'_>,
    quad: &CalibrationQuad,
) -> Result<RectifiedFrame, RectifyError> {
    let corners = quad.corners().ok_or(RectifyError::NotCalibrated)?;
    if is_degenerate(&corners) {
        return Err(RectifyError::DegenerateQuad);
    }
    let (out_w, out_h) = quad.target_size().ok_or(RectifyError::NotCalibrated)?;
    if out_w < 2 || out_h < 2 {
        return Err(RectifyError::DegenerateQuad);
    }

    let dst = [
        Point2::new(0.0_f32, 0.0),
        Point2::new(out_w as f32 - 1.0, 0.0),
        Point2::new(out_w as f32 - 1.0, out_h as f32 - 1.0),
        Point2::new(0.0, out_h as f32 - 1.0),
    ];
    // solve in the warp direction: rectified pixel -> camera pixel
    let img_from_rect =
        homography_from_corners(&dst, &corners).ok_or(RectifyError::DegenerateQuad)?;

    log::debug!("rectifying to {out_w}x{out_h}");
    let frame = warp_perspective(src, &img_from_rect, out_w, out_h);
    Ok(RectifiedFrame {
        frame,
        img_from_rect,
    })
}
