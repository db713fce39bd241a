//! Calibration quadrilateral: four clicked corners of the inspection surface.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Lifecycle of the clicked corner set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadState {
    Empty,
    /// 1..=3 points collected so far.
    Collecting(usize),
    Locked,
}

/// Errors from persisting the calibration point file.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Ordered corner points of the inspection surface in camera pixels.
///
/// Points are appended in click order and the caller contract is
/// top-left, top-right, bottom-right, bottom-left. The order is not
/// validated; out-of-order clicks produce a skewed rectification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationQuad {
    points: Vec<Point2<f32>>,
}

impl CalibrationQuad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a locked quad directly from four corners (tl, tr, br, bl).
    pub fn from_corners(corners: [Point2<f32>; 4]) -> Self {
        Self {
            points: corners.to_vec(),
        }
    }

    pub fn state(&self) -> QuadState {
        match self.points.len() {
            0 => QuadState::Empty,
            n @ 1..=3 => QuadState::Collecting(n),
            _ => QuadState::Locked,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.points.len() == 4
    }

    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    /// Append a corner click. Clicks on a locked quad are silently dropped;
    /// the returned state lets a UI notice that nothing changed.
    pub fn add_point(&mut self, p: Point2<f32>) -> QuadState {
        if !self.is_locked() {
            self.points.push(p);
        }
        self.state()
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    /// The four corners in click order, when locked.
    pub fn corners(&self) -> Option<[Point2<f32>; 4]> {
        if !self.is_locked() {
            return None;
        }
        Some([self.points[0], self.points[1], self.points[2], self.points[3]])
    }

    /// Rectified target size `(width, height)` from the quad edge lengths.
    ///
    /// Per axis this takes the longer of the two opposing edges, so a skewed
    /// view never shrinks content below its longest observed extent.
    pub fn target_size(&self) -> Option<(usize, usize)> {
        let [tl, tr, br, bl] = self.corners()?;
        let dist =
            |a: Point2<f32>, b: Point2<f32>| (a.x as f64 - b.x as f64).hypot(a.y as f64 - b.y as f64);
        let width = dist(br, bl).max(dist(tr, tl)).round();
        let height = dist(tr, br).max(dist(tl, bl)).round();
        Some((width as usize, height as usize))
    }
}

/// Persisted form of the quad: a JSON array of exactly four `[x, y]` pairs.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct StoredCorners(Vec<[f32; 2]>);

fn quad_from_stored(stored: StoredCorners) -> Option<CalibrationQuad> {
    if stored.0.len() != 4 {
        return None;
    }
    let mut corners = [Point2::new(0.0_f32, 0.0); 4];
    for (c, [x, y]) in corners.iter_mut().zip(stored.0) {
        *c = Point2::new(x, y);
    }
    Some(CalibrationQuad::from_corners(corners))
}

/// File-backed calibration store.
///
/// Loads are fail-soft: a missing, unreadable or malformed file yields an
/// empty (uncalibrated) quad. The file is written only when the fourth click
/// locks the quad; `reset` clears memory without touching the file.
#[derive(Debug)]
pub struct CalibrationStore {
    path: PathBuf,
    quad: CalibrationQuad,
}

impl CalibrationStore {
    /// Open the store, restoring a locked quad from `path` if one is there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let quad = Self::load(&path);
        Self { path, quad }
    }

    fn load(path: &Path) -> CalibrationQuad {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                log::debug!("no calibration file at {}: {err}", path.display());
                return CalibrationQuad::new();
            }
        };
        match serde_json::from_str::<StoredCorners>(&raw) {
            Ok(stored) => quad_from_stored(stored).unwrap_or_else(|| {
                log::warn!(
                    "calibration file {} does not hold 4 points; treating as uncalibrated",
                    path.display()
                );
                CalibrationQuad::new()
            }),
            Err(err) => {
                log::warn!(
                    "malformed calibration file {}: {err}; treating as uncalibrated",
                    path.display()
                );
                CalibrationQuad::new()
            }
        }
    }

    pub fn quad(&self) -> &CalibrationQuad {
        &self.quad
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.quad.is_locked()
    }

    /// Append a corner click; persists the quad when the fourth point locks
    /// it. Clicks past the fourth are dropped.
    pub fn add_point(&mut self, p: Point2<f32>) -> Result<QuadState, CalibrationIoError> {
        let was_locked = self.quad.is_locked();
        let state = self.quad.add_point(p);
        if !was_locked && state == QuadState::Locked {
            self.persist()?;
        }
        Ok(state)
    }

    fn persist(&self) -> Result<(), CalibrationIoError> {
        let stored = StoredCorners(self.quad.points().iter().map(|p| [p.x, p.y]).collect());
        let json = serde_json::to_string(&stored)?;
        fs::write(&self.path, json)?;
        log::info!("calibration locked, saved to {}", self.path.display());
        Ok(())
    }

    /// Drop all points and return to the uncalibrated state. The persisted
    /// file is left alone until the next lock overwrites it.
    pub fn reset(&mut self) {
        self.quad.reset();
    }
}
