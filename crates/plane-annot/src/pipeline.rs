//! Collaborator seams: frame sources and detectors live outside this
//! subsystem and plug in through these traits.

use nalgebra::Point2;

use plane_annot_core::{GrayFrame, GrayFrameView, RectifiedFrame, RectifyError};

use crate::session::InspectSession;

/// Axis-aligned pixel box, `(x1, y1)` min corner, `(x2, y2)` max corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl PixelBox {
    /// Smallest axis-aligned box containing all of `points`.
    pub fn enclosing(points: impl IntoIterator<Item = Point2<f32>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = PixelBox {
            x1: first.x,
            y1: first.y,
            x2: first.x,
            y2: first.y,
        };
        for p in iter {
            b.x1 = b.x1.min(p.x);
            b.y1 = b.y1.min(p.y);
            b.x2 = b.x2.max(p.x);
            b.y2 = b.y2.max(p.y);
        }
        Some(b)
    }

    fn corners(&self) -> [Point2<f32>; 4] {
        [
            Point2::new(self.x1, self.y1),
            Point2::new(self.x2, self.y1),
            Point2::new(self.x2, self.y2),
            Point2::new(self.x1, self.y2),
        ]
    }
}

/// One detector hit on a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: PixelBox,
}

/// Produces successive raw camera frames on demand.
pub trait FrameSource {
    fn next_frame(&mut self) -> std::io::Result<GrayFrame>;
}

/// Black-box object detector. Runs on whatever frame it is handed; this
/// subsystem hands it the rectified frame whenever a calibration is locked.
pub trait Detector {
    fn detect(&self, frame: &GrayFrameView<'_>) -> Vec<Detection>;
}

/// Result of one capture tick.
#[derive(Clone, Debug)]
pub struct CaptureOutcome {
    /// The frame the detector saw: rectified when calibrated, raw otherwise.
    pub frame: GrayFrame,
    /// Detections in **camera** pixel space, regardless of rectification.
    pub detections: Vec<Detection>,
    pub rectified: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("frame capture failed: {0}")]
    Frame(#[from] std::io::Error),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
}

fn box_to_camera(rect: &RectifiedFrame, bbox: &PixelBox) -> PixelBox {
    // a rectified-space box maps to a quadrilateral in camera space; report
    // its axis-aligned hull
    PixelBox::enclosing(bbox.corners().map(|c| rect.to_camera(c)))
        .expect("four corners always yield a box")
}

/// Pull one frame, rectify it when a calibration is locked, run the detector
/// and report detections mapped back to camera pixels.
pub fn capture_and_detect(
    session: &InspectSession,
    source: &mut dyn FrameSource,
    detector: &dyn Detector,
) -> Result<CaptureOutcome, CaptureError> {
    let raw = source.next_frame()?;

    if !session.is_calibrated() {
        log::debug!("no calibration locked; detecting on the raw frame");
        let detections = detector.detect(&raw.view());
        return Ok(CaptureOutcome {
            frame: raw,
            detections,
            rectified: false,
        });
    }

    let rect = session.rectify_frame(&raw.view())?;
    let mut detections = detector.detect(&rect.frame.view());
    for d in &mut detections {
        d.bbox = box_to_camera(&rect, &d.bbox);
    }
    Ok(CaptureOutcome {
        frame: rect.frame,
        detections,
        rectified: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct OneFrame(GrayFrame);

    impl FrameSource for OneFrame {
        fn next_frame(&mut self) -> std::io::Result<GrayFrame> {
            Ok(self.0.clone())
        }
    }

    /// Claims a fixed box in whatever frame it is shown.
    struct FixedBoxDetector(PixelBox);

    impl Detector for FixedBoxDetector {
        fn detect(&self, _frame: &GrayFrameView<'_>) -> Vec<Detection> {
            vec![Detection {
                label: "elbow".into(),
                confidence: 0.9,
                bbox: self.0,
            }]
        }
    }

    #[test]
    fn uncalibrated_capture_detects_on_the_raw_frame() {
        let session = InspectSession::open("/nonexistent/c.json", "/nonexistent/l.txt");
        let mut source = OneFrame(GrayFrame::new(64, 48));
        let detector = FixedBoxDetector(PixelBox {
            x1: 1.0,
            y1: 2.0,
            x2: 10.0,
            y2: 12.0,
        });

        let out = capture_and_detect(&session, &mut source, &detector).expect("capture");
        assert!(!out.rectified);
        assert_eq!(out.frame.width, 64);
        assert_eq!(out.detections[0].bbox, detector.0);
    }

    #[test]
    fn calibrated_capture_maps_boxes_back_to_camera_space() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = InspectSession::open(
            dir.path().join("calibration.json"),
            dir.path().join("labels.txt"),
        );
        // axis-aligned calibration: camera (10,20)-(110,80), so the mapping
        // back from rectified space is a pure translate-and-scale
        for p in [(10.0, 20.0), (110.0, 20.0), (110.0, 80.0), (10.0, 80.0)] {
            session
                .add_calibration_point(Point2::new(p.0, p.1))
                .expect("persist");
        }

        let mut source = OneFrame(GrayFrame::new(160, 120));
        let detector = FixedBoxDetector(PixelBox {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 6.0,
        });

        let out = capture_and_detect(&session, &mut source, &detector).expect("capture");
        assert!(out.rectified);
        let b = out.detections[0].bbox;
        assert_abs_diff_eq!(b.x1, 10.0, epsilon = 0.5);
        assert_abs_diff_eq!(b.y1, 20.0, epsilon = 0.5);
        assert!(b.x2 > b.x1 && b.y2 > b.y1);
    }
}
