//! Geometry core for the inspection-surface annotation tools.
//!
//! This crate is intentionally small and purely geometric: it knows nothing
//! about cameras, detectors or UI widgets. It provides
//! - row-major grayscale frame buffers and bilinear sampling,
//! - the four-corner calibration quadrilateral and its persisted store,
//! - the planar homography solver and the perspective rectifier.

mod frame;
mod homography;
mod logger;
mod quad;
mod rectify;

pub use frame::{sample_bilinear, sample_bilinear_u8, GrayFrame, GrayFrameView};
pub use homography::{homography_from_corners, warp_perspective, Homography};
pub use logger::init_with_level;
pub use quad::{CalibrationIoError, CalibrationQuad, CalibrationStore, QuadState};
pub use rectify::{rectify, RectifiedFrame, RectifyError};
