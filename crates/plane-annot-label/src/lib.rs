//! Label vocabulary and bounding-box annotation for the inspection tools.
//!
//! Annotations are drawn as pixel rectangles on whichever frame is on screen
//! and exported as normalized center/size records keyed by stable class
//! indices from the [`LabelVocabulary`].

mod codec;
mod export;
mod session;
mod vocab;

pub use codec::{to_annotation, to_normalized, NormalizedBox, ParseBoxError};
pub use export::{annotation_file_path, read_boxes, write_boxes, ExportError};
pub use session::{Annotation, AnnotationSession};
pub use vocab::{LabelVocabulary, VocabularyError};
