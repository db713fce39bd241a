//! Reading and writing per-image annotation files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{NormalizedBox, ParseBoxError};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: ParseBoxError,
    },
}

/// Annotation file for a source image: same directory and stem, `.txt`
/// extension.
pub fn annotation_file_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

/// Write one record line per box to the annotation file for `image_path`.
/// Returns the path written. An empty box list still writes an empty file.
pub fn write_boxes(image_path: &Path, boxes: &[NormalizedBox]) -> Result<PathBuf, ExportError> {
    let path = annotation_file_path(image_path);
    let mut body = String::new();
    for b in boxes {
        body.push_str(&b.to_string());
        body.push('\n');
    }
    fs::write(&path, body)?;
    log::info!("wrote {} annotation(s) to {}", boxes.len(), path.display());
    Ok(path)
}

/// Read a previously exported annotation file.
pub fn read_boxes(path: &Path) -> Result<Vec<NormalizedBox>, ExportError> {
    let raw = fs::read_to_string(path)?;
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            line.parse().map_err(|source| ExportError::Parse {
                line: i + 1,
                source,
            })
        })
        .collect()
}
