//! Drag-to-draw annotation session for the currently displayed frame.

use nalgebra::Point2;

/// One committed bounding box: the drag's start and end corners, exactly as
/// given, in the pixel space of the frame that was on screen when drawn.
/// Min/max corner reconciliation happens only in the codec.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub start: Point2<f32>,
    pub end: Point2<f32>,
}

/// Tracks the in-progress drag and the committed boxes for one frame.
///
/// There is no per-box deletion: the whole list is cleared on save, on an
/// explicit redo, or when a new frame is loaded.
#[derive(Clone, Debug, Default)]
pub struct AnnotationSession {
    drag_start: Option<Point2<f32>>,
    committed: Vec<Annotation>,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the press point of a drag. A press while a drag is already in
    /// progress restarts it from the new point (single-pointer model).
    pub fn begin_drag(&mut self, p: Point2<f32>) {
        self.drag_start = Some(p);
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Finish the drag at `p`. With no selected label the drag is discarded
    /// silently; otherwise the annotation is committed and returned. A
    /// release without a preceding press is a no-op.
    pub fn end_drag(&mut self, p: Point2<f32>, selected: Option<&str>) -> Option<&Annotation> {
        let start = self.drag_start.take()?;
        let label = match selected {
            Some(label) if !label.is_empty() => label,
            _ => {
                log::debug!("drag released with no label selected; box dropped");
                return None;
            }
        };
        self.committed.push(Annotation {
            label: label.to_owned(),
            start,
            end: p,
        });
        self.committed.last()
    }

    /// Committed boxes in insertion order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.committed
    }

    /// Drop every committed box and any drag in progress.
    pub fn clear(&mut self) {
        self.drag_start = None;
        self.committed.clear();
    }
}
