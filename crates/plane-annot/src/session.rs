//! The owning session object for one capture/annotation sitting.

use std::path::{Path, PathBuf};

use nalgebra::Point2;

use plane_annot_core::{
    rectify, CalibrationIoError, CalibrationQuad, CalibrationStore, GrayFrameView, QuadState,
    RectifiedFrame, RectifyError,
};
use plane_annot_label::{
    to_normalized, write_boxes, Annotation, AnnotationSession, ExportError, LabelVocabulary,
    VocabularyError,
};

/// Failures while exporting the committed annotations.
#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// All mutable state of one annotation sitting: the calibration store, the
/// label vocabulary and the in-progress annotation session.
///
/// The session is single-writer by construction — every mutation goes through
/// `&mut self` — which is the whole concurrency model: run it on one thread
/// (typically the UI event loop) and ship camera frames in from wherever.
#[derive(Debug)]
pub struct InspectSession {
    calibration: CalibrationStore,
    vocabulary: LabelVocabulary,
    annotations: AnnotationSession,
    selected_label: Option<String>,
}

impl InspectSession {
    /// Open a session backed by the two flat files, restoring any previously
    /// persisted calibration and labels. Missing or corrupt files mean an
    /// uncalibrated session with no labels, never an error.
    pub fn open(calibration_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            calibration: CalibrationStore::open(calibration_path),
            vocabulary: LabelVocabulary::open(labels_path),
            annotations: AnnotationSession::new(),
            selected_label: None,
        }
    }

    // --- calibration -----------------------------------------------------

    /// Record one calibration click (tl, tr, br, bl order). The fourth click
    /// locks the quad and persists it.
    pub fn add_calibration_point(
        &mut self,
        p: Point2<f32>,
    ) -> Result<QuadState, CalibrationIoError> {
        self.calibration.add_point(p)
    }

    /// Discard the calibration and start collecting clicks again.
    pub fn reset_calibration(&mut self) {
        log::info!("calibration reset");
        self.calibration.reset();
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_locked()
    }

    pub fn calibration_quad(&self) -> &CalibrationQuad {
        self.calibration.quad()
    }

    /// Rectify a camera frame through the locked calibration.
    pub fn rectify_frame(&self, src: &GrayFrameView<'_>) -> Result<RectifiedFrame, RectifyError> {
        rectify(src, self.calibration.quad())
    }

    // --- labels ----------------------------------------------------------

    /// Register a label and make it the selected one, mirroring the add-label
    /// flow of the capture UI. Empty names are ignored.
    pub fn add_label(&mut self, name: &str) -> Result<Option<usize>, VocabularyError> {
        let index = self.vocabulary.add(name)?;
        if index.is_some() {
            self.selected_label = Some(name.to_owned());
        }
        Ok(index)
    }

    /// Select an already-registered label for subsequent drags.
    pub fn select_label(&mut self, name: &str) -> Result<(), VocabularyError> {
        let _ = self.vocabulary.index_of(name)?;
        self.selected_label = Some(name.to_owned());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_label = None;
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected_label.as_deref()
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    // --- annotation ------------------------------------------------------

    pub fn begin_drag(&mut self, p: Point2<f32>) {
        self.annotations.begin_drag(p);
    }

    /// Finish a drag against the currently selected label. With no selection
    /// the drag is dropped, matching the capture UI.
    pub fn end_drag(&mut self, p: Point2<f32>) -> Option<&Annotation> {
        self.annotations.end_drag(p, self.selected_label.as_deref())
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.annotations.annotations()
    }

    /// Drop all committed boxes (redo / new frame).
    pub fn discard_annotations(&mut self) {
        self.annotations.clear();
    }

    /// Export every committed box for `image_path` as normalized records,
    /// then clear the session for the next frame. Returns the file written.
    pub fn save_annotations(
        &mut self,
        image_path: &Path,
        image_width: usize,
        image_height: usize,
    ) -> Result<PathBuf, SaveError> {
        let mut boxes = Vec::with_capacity(self.annotations.annotations().len());
        for annotation in self.annotations.annotations() {
            boxes.push(to_normalized(
                annotation,
                image_width,
                image_height,
                &self.vocabulary,
            )?);
        }
        let path = write_boxes(image_path, &boxes)?;
        self.annotations.clear();
        Ok(path)
    }
}
