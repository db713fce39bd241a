//! Ordered, append-only label vocabulary.

use std::fs;
use std::path::PathBuf;

/// Vocabulary failures. `LabelNotFound` and `ClassIndexOutOfRange` indicate a
/// broken invariant between the annotation session and the vocabulary, not a
/// user-recoverable condition.
#[derive(thiserror::Error, Debug)]
pub enum VocabularyError {
    #[error("label {label:?} is not registered in the vocabulary")]
    LabelNotFound { label: String },
    #[error("class index {index} out of range (vocabulary holds {len} labels)")]
    ClassIndexOutOfRange { index: usize, len: usize },
    #[error("failed to persist label list: {0}")]
    Persist(#[from] std::io::Error),
}

/// Ordered set of unique label strings.
///
/// Insertion order defines the class index of each label and never changes;
/// the vocabulary is append-only so previously exported indices stay valid.
/// Comparison is exact: case matters and whitespace is not trimmed.
#[derive(Clone, Debug, Default)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    path: Option<PathBuf>,
}

impl LabelVocabulary {
    /// An unpersisted vocabulary, mostly useful in tests and conversions.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the label store at `path`, one label per line in insertion order.
    ///
    /// Never fails: a missing or unreadable file means "no labels yet".
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let labels = match fs::read_to_string(&path) {
            Ok(raw) => raw
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            Err(err) => {
                log::debug!("no label list at {}: {err}", path.display());
                Vec::new()
            }
        };
        Self {
            labels,
            path: Some(path),
        }
    }

    /// Register `name`, persist the updated list, and return its class index.
    ///
    /// Empty names are rejected (`Ok(None)`); a duplicate is a no-op that
    /// returns the existing index.
    pub fn add(&mut self, name: &str) -> Result<Option<usize>, VocabularyError> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(index) = self.position(name) {
            return Ok(Some(index));
        }
        self.labels.push(name.to_owned());
        if let Err(err) = self.persist() {
            // keep memory and file in step so a retried add is not treated
            // as a duplicate of an entry the file never saw
            self.labels.pop();
            return Err(err);
        }
        Ok(Some(self.labels.len() - 1))
    }

    fn persist(&self) -> Result<(), VocabularyError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut body = String::new();
        for label in &self.labels {
            body.push_str(label);
            body.push('\n');
        }
        fs::write(path, body)?;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == name)
    }

    /// Class index of `name`. A miss is an invariant violation: callers must
    /// only pass labels previously registered here.
    pub fn index_of(&self, name: &str) -> Result<usize, VocabularyError> {
        self.position(name).ok_or_else(|| VocabularyError::LabelNotFound {
            label: name.to_owned(),
        })
    }

    /// Label for a class index, for decoding exported records.
    pub fn label_for(&self, index: usize) -> Result<&str, VocabularyError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(VocabularyError::ClassIndexOutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Ordered labels for display.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_indices_in_insertion_order() {
        let mut vocab = LabelVocabulary::in_memory();
        assert_eq!(vocab.add("elbow").unwrap(), Some(0));
        assert_eq!(vocab.add("tee").unwrap(), Some(1));
        assert_eq!(vocab.add("coupler").unwrap(), Some(2));
        assert_eq!(vocab.index_of("tee").unwrap(), 1);
        assert_eq!(vocab.labels(), ["elbow", "tee", "coupler"]);
    }

    #[test]
    fn add_is_idempotent() {
        let mut vocab = LabelVocabulary::in_memory();
        assert_eq!(vocab.add("elbow").unwrap(), Some(0));
        assert_eq!(vocab.add("elbow").unwrap(), Some(0));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut vocab = LabelVocabulary::in_memory();
        assert_eq!(vocab.add("").unwrap(), None);
        assert!(vocab.is_empty());
    }

    #[test]
    fn comparison_is_exact() {
        let mut vocab = LabelVocabulary::in_memory();
        vocab.add("Elbow").unwrap();
        assert_eq!(vocab.add("elbow").unwrap(), Some(1));
        assert_eq!(vocab.add(" elbow").unwrap(), Some(2));
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn unknown_label_lookup_fails() {
        let vocab = LabelVocabulary::in_memory();
        assert!(matches!(
            vocab.index_of("ghost"),
            Err(VocabularyError::LabelNotFound { .. })
        ));
    }

    #[test]
    fn indices_are_stable_across_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("labels.txt");

        let mut vocab = LabelVocabulary::open(&path);
        vocab.add("elbow").unwrap();
        vocab.add("tee").unwrap();
        vocab.add("valve").unwrap();

        let reloaded = LabelVocabulary::open(&path);
        assert_eq!(reloaded.labels(), vocab.labels());
        assert_eq!(reloaded.index_of("valve").unwrap(), 2);
    }

    #[test]
    fn failed_persist_rolls_back_the_add() {
        let dir = tempfile::tempdir().expect("tempdir");
        // unwritable store: the parent directory does not exist
        let path = dir.path().join("no_such_dir").join("labels.txt");
        let mut vocab = LabelVocabulary::open(&path);

        assert!(matches!(
            vocab.add("elbow"),
            Err(VocabularyError::Persist(_))
        ));
        assert!(!vocab.contains("elbow"));
        assert!(vocab.is_empty());

        // a retry must hit the persist error again, not a phantom duplicate
        assert!(matches!(
            vocab.add("elbow"),
            Err(VocabularyError::Persist(_))
        ));
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vocab = LabelVocabulary::open(dir.path().join("labels.txt"));
        assert!(vocab.is_empty());
    }

    #[test]
    fn label_file_is_one_label_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("labels.txt");
        let mut vocab = LabelVocabulary::open(&path);
        vocab.add("elbow").unwrap();
        vocab.add("tee").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "elbow\ntee\n");
    }
}
