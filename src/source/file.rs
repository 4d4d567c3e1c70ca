//! File-based transcript source.

use crate::model::error::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A transcript file read once, line by line.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    lines: Vec<String>,
}

impl FileSource {
    /// Open and read the whole file.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(path = %path.display(), lines = lines.len(), "transcript file read");

        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    /// Path the transcript was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines read, without terminators
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the source, returning its lines
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn new_reads_all_lines() {
        let temp_dir = std::env::temp_dir();
        let test_file = temp_dir.join("chatlist_file_source_reads_all.jsonl");
        fs::write(&test_file, "{\"line\": 1}\n{\"line\": 2}\n").unwrap();

        let result = FileSource::new(&test_file);

        // Cleanup
        let _ = fs::remove_file(&test_file);

        let source = result.unwrap();
        assert_eq!(source.lines(), ["{\"line\": 1}", "{\"line\": 2}"]);
        assert_eq!(source.path(), test_file.as_path());
    }

    #[test]
    fn new_keeps_final_line_without_newline() {
        let temp_dir = std::env::temp_dir();
        let test_file = temp_dir.join("chatlist_file_source_no_newline.jsonl");
        fs::write(&test_file, "a\nb").unwrap();

        let result = FileSource::new(&test_file);
        let _ = fs::remove_file(&test_file);

        assert_eq!(result.unwrap().into_lines(), vec!["a", "b"]);
    }

    #[test]
    fn new_returns_file_not_found_for_missing_file() {
        let missing_file = std::env::temp_dir().join("chatlist_nonexistent_12345.jsonl");

        let result = FileSource::new(&missing_file);

        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }
}
