//! High-level facade for the `plane-annot-*` workspace.
//!
//! The crates implement the geometric calibration and annotation subsystem of
//! a desktop inspection-capture tool: a four-point planar calibration that
//! rectifies an oblique camera view of a fixed surface, and a drag-to-draw
//! annotation model that exports normalized, index-stable box records for
//! training pipelines. Cameras, detectors and UI widgets stay outside; they
//! talk to an [`InspectSession`] through the collaborator traits in
//! [`pipeline`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use nalgebra::Point2;
//! use plane_annot::InspectSession;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = InspectSession::open("calibration.json", "labels.txt");
//!
//! // calibration capture flow: four clicks, tl/tr/br/bl
//! for p in [(100.0, 50.0), (500.0, 60.0), (480.0, 400.0), (90.0, 380.0)] {
//!     session.add_calibration_point(Point2::new(p.0, p.1))?;
//! }
//! assert!(session.is_calibrated());
//!
//! // annotation flow on a displayed frame
//! session.add_label("elbow")?;
//! session.begin_drag(Point2::new(100.0, 100.0));
//! session.end_drag(Point2::new(300.0, 250.0));
//! session.save_annotations("capture_01.jpg".as_ref(), 640, 480)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`core`](plane_annot_core): frames, homography, calibration quad, rectifier.
//! - [`label`](plane_annot_label): vocabulary, annotation session, box codec.
//! - [`pipeline`]: frame-source/detector traits and the capture helper.

pub use plane_annot_core as core;
pub use plane_annot_label as label;

pub use plane_annot_core::{
    rectify, CalibrationQuad, CalibrationStore, GrayFrame, GrayFrameView, Homography, QuadState,
    RectifiedFrame, RectifyError,
};
pub use plane_annot_label::{
    Annotation, AnnotationSession, LabelVocabulary, NormalizedBox, VocabularyError,
};

pub mod pipeline;
mod session;

pub use session::{InspectSession, SaveError};
