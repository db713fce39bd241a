//! Conversion between pixel-space annotations and normalized box records.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;

use crate::session::Annotation;
use crate::vocab::{LabelVocabulary, VocabularyError};

/// A normalized bounding box record: class index plus center/size as
/// fractions of the image dimensions. One record per exported line,
/// `<class> <x_center> <y_center> <width> <height>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    pub class_index: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Normalize a pixel annotation against the dimensions of the frame it was
/// drawn on.
///
/// The drag corners are reconciled to min/max here. Coordinates are taken as
/// given: a drag extending past the frame edge yields fractions outside
/// `[0, 1]`, matching the exported-format convention of the capture tools.
pub fn to_normalized(
    annotation: &Annotation,
    image_width: usize,
    image_height: usize,
    vocabulary: &LabelVocabulary,
) -> Result<NormalizedBox, VocabularyError> {
    let class_index = vocabulary.index_of(&annotation.label)?;

    let x1 = annotation.start.x.min(annotation.end.x) as f64;
    let x2 = annotation.start.x.max(annotation.end.x) as f64;
    let y1 = annotation.start.y.min(annotation.end.y) as f64;
    let y2 = annotation.start.y.max(annotation.end.y) as f64;
    let w = image_width as f64;
    let h = image_height as f64;

    Ok(NormalizedBox {
        class_index,
        x_center: (x1 + x2) / 2.0 / w,
        y_center: (y1 + y2) / 2.0 / h,
        width: (x2 - x1) / w,
        height: (y2 - y1) / h,
    })
}

/// Recover a pixel-space annotation from a normalized record. The label is
/// resolved back through the vocabulary; the box comes out with `start` at
/// the min corner and `end` at the max corner.
pub fn to_annotation(
    record: &NormalizedBox,
    image_width: usize,
    image_height: usize,
    vocabulary: &LabelVocabulary,
) -> Result<Annotation, VocabularyError> {
    let label = vocabulary.label_for(record.class_index)?.to_owned();
    let w = image_width as f64;
    let h = image_height as f64;

    let x1 = (record.x_center - record.width / 2.0) * w;
    let x2 = (record.x_center + record.width / 2.0) * w;
    let y1 = (record.y_center - record.height / 2.0) * h;
    let y2 = (record.y_center + record.height / 2.0) * h;

    Ok(Annotation {
        label,
        start: Point2::new(x1 as f32, y1 as f32),
        end: Point2::new(x2 as f32, y2 as f32),
    })
}

impl fmt::Display for NormalizedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.class_index, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Errors from parsing an exported record line.
#[derive(thiserror::Error, Debug)]
pub enum ParseBoxError {
    #[error("expected 5 space-separated fields, got {0}")]
    FieldCount(usize),
    #[error("invalid class index: {0}")]
    ClassIndex(#[from] std::num::ParseIntError),
    #[error("invalid fraction: {0}")]
    Fraction(#[from] std::num::ParseFloatError),
}

impl FromStr for NormalizedBox {
    type Err = ParseBoxError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ParseBoxError::FieldCount(fields.len()));
        }
        Ok(Self {
            class_index: fields[0].parse()?,
            x_center: fields[1].parse()?,
            y_center: fields[2].parse()?,
            width: fields[3].parse()?,
            height: fields[4].parse()?,
        })
    }
}
