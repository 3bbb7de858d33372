//! Output path construction.
//!
//! An output path is `directory + prefix + stamp + extension`, where the
//! directory already ends with a separator and the prefix with `_`.  The
//! combined length is held to the same ceiling as the configured parts.

use std::path::PathBuf;

use crate::config::{ResolvedConfig, DEFAULT_FILE_EXTENSION};
use crate::errors::CaptureError;

impl ResolvedConfig {
    /// Build the output path for one capture from a path-safe `stamp`.
    pub fn output_path(&self, stamp: &str) -> Result<PathBuf, CaptureError> {
        let len = self.write_directory.len()
            + self.filename_prefix.len()
            + stamp.len()
            + DEFAULT_FILE_EXTENSION.len();
        if len >= self.max_path_length {
            return Err(CaptureError::PathTooLong {
                len,
                max: self.max_path_length,
            });
        }

        let mut path = String::with_capacity(len);
        path.push_str(&self.write_directory);
        path.push_str(&self.filename_prefix);
        path.push_str(stamp);
        path.push_str(DEFAULT_FILE_EXTENSION);
        Ok(PathBuf::from(path))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
