//! End-to-end flow: calibrate, rectify, annotate, export, restart.

use nalgebra::Point2;
use plane_annot::{GrayFrame, InspectSession, QuadState, RectifyError};
use std::path::Path;

fn p(x: f32, y: f32) -> Point2<f32> {
    Point2::new(x, y)
}

#[test]
fn full_sitting_round_trips_through_the_flat_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib_path = dir.path().join("calibration.json");
    let labels_path = dir.path().join("labels.txt");
    let image_path = dir.path().join("capture_img_20240101.jpg");

    let mut session = InspectSession::open(&calib_path, &labels_path);
    assert!(!session.is_calibrated());

    // rectify before lock must be refused
    let frame = GrayFrame::new(640, 480);
    assert_eq!(
        session.rectify_frame(&frame.view()).unwrap_err(),
        RectifyError::NotCalibrated
    );

    // four clicks lock and persist the quad
    let corners = [(100.0, 50.0), (500.0, 60.0), (480.0, 400.0), (90.0, 380.0)];
    for (i, c) in corners.iter().enumerate() {
        let state = session.add_calibration_point(p(c.0, c.1)).expect("persist");
        if i < 3 {
            assert_eq!(state, QuadState::Collecting(i + 1));
        } else {
            assert_eq!(state, QuadState::Locked);
        }
    }
    assert!(calib_path.exists());

    let rect = session.rectify_frame(&frame.view()).expect("rectify");
    let (w, h) = session.calibration_quad().target_size().expect("locked");
    assert_eq!((rect.frame.width, rect.frame.height), (w, h));

    // labels: add selects, duplicates keep their index
    assert_eq!(session.add_label("elbow").unwrap(), Some(0));
    assert_eq!(session.add_label("tee").unwrap(), Some(1));
    assert_eq!(session.add_label("valve").unwrap(), Some(2));
    assert_eq!(session.add_label("tee").unwrap(), Some(1));
    assert_eq!(session.selected_label(), Some("tee"));

    // a drag with no selection commits nothing
    session.clear_selection();
    session.begin_drag(p(5.0, 5.0));
    assert!(session.end_drag(p(50.0, 50.0)).is_none());
    assert!(session.annotations().is_empty());

    // two committed boxes, then export
    session.select_label("valve").expect("registered");
    session.begin_drag(p(100.0, 100.0));
    session.end_drag(p(300.0, 250.0)).expect("committed");
    session.select_label("elbow").expect("registered");
    session.begin_drag(p(400.0, 90.0));
    session.end_drag(p(380.0, 40.0)).expect("committed");

    let exported = session
        .save_annotations(&image_path, 640, 480)
        .expect("export");
    assert_eq!(exported, dir.path().join("capture_img_20240101.txt"));
    assert!(session.annotations().is_empty(), "save clears the session");

    let body = std::fs::read_to_string(&exported).expect("read export");
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2 0.3125 "), "line: {}", lines[0]);
    assert!(lines[1].starts_with("0 "), "line: {}", lines[1]);

    // a fresh session restores calibration and label indices from disk
    let restored = InspectSession::open(&calib_path, &labels_path);
    assert!(restored.is_calibrated());
    assert_eq!(restored.vocabulary().index_of("valve").unwrap(), 2);
    assert_eq!(restored.vocabulary().labels(), ["elbow", "tee", "valve"]);
}

#[test]
fn recalibration_replaces_the_persisted_quad_on_next_lock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calib_path = dir.path().join("calibration.json");
    let mut session = InspectSession::open(&calib_path, dir.path().join("labels.txt"));

    for c in [(0.0, 0.0), (100.0, 0.0), (100.0, 60.0), (0.0, 60.0)] {
        session.add_calibration_point(p(c.0, c.1)).expect("persist");
    }
    session.reset_calibration();
    assert!(!session.is_calibrated());

    for c in [(10.0, 10.0), (90.0, 12.0), (88.0, 55.0), (9.0, 52.0)] {
        session.add_calibration_point(p(c.0, c.1)).expect("persist");
    }
    let restored = InspectSession::open(&calib_path, Path::new("/nonexistent/labels.txt"));
    let pts = restored.calibration_quad().points().to_vec();
    assert_eq!(pts[0], p(10.0, 10.0));
}
