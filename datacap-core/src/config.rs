//! Capture configuration: write directory, filename prefix and size ceiling.
//!
//! [`CaptureConfig`] is the mutable, caller-owned settings object filled in
//! by [`crate::args::parse_arguments`].  Unset fields stay empty/zero; the
//! defaults are applied by [`CaptureConfig::resolve`], which produces an
//! immutable [`ResolvedConfig`] and never writes back into the config.

use std::io;
use std::path::{is_separator, PathBuf, MAIN_SEPARATOR};

use crate::errors::CaptureError;

/// Ceiling on any configured or derived path, in bytes.
pub const MAX_FILEPATH_LENGTH: usize = 255;

/// Filename prefix used when `-n` was not given.
pub const DEFAULT_FILENAME_PREFIX: &str = "File_";

/// Extension appended to every output file.
pub const DEFAULT_FILE_EXTENSION: &str = ".dat";

/// Size ceiling used when `-s` was not given.
pub const DEFAULT_MAX_OUTPUT_SIZE_KB: u64 = 1024;

/// Terminator every stored prefix ends with.
const PREFIX_DELIMITER: char = '_';

const BYTES_PER_KB: u64 = 1024;

// ---------------------------------------------------------------------------
// Mutable configuration
// ---------------------------------------------------------------------------

/// Settings collected from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    write_directory: String,
    filename_prefix: String,
    max_output_size: u64,
    max_path_length: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            write_directory: String::new(),
            filename_prefix: String::new(),
            max_output_size: 0,
            max_path_length: MAX_FILEPATH_LENGTH,
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a path-length ceiling other than [`MAX_FILEPATH_LENGTH`].
    pub fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = max;
        self
    }

    /// Store the output directory, terminated by a path separator.
    pub fn set_write_directory(&mut self, path: &str) -> Result<(), CaptureError> {
        self.write_directory = normalize_directory(path, self.max_path_length)?;
        Ok(())
    }

    /// Store the filename prefix, terminated by `_`.
    pub fn set_filename_prefix(&mut self, prefix: &str) -> Result<(), CaptureError> {
        self.filename_prefix = normalize_prefix(prefix, self.max_path_length)?;
        Ok(())
    }

    /// Store the size ceiling from a kilobyte count given as text.
    ///
    /// Zero, negative, non-numeric and overflowing values are rejected and
    /// leave the current ceiling untouched.
    pub fn set_max_output_size(&mut self, size_kb: &str) -> Result<(), CaptureError> {
        let invalid = || CaptureError::InvalidFileSize(size_kb.to_owned());
        let kb: u64 = size_kb.trim().parse().map_err(|_| invalid())?;
        if kb == 0 {
            return Err(invalid());
        }
        self.max_output_size = kb.checked_mul(BYTES_PER_KB).ok_or_else(invalid)?;
        Ok(())
    }

    /// Forget every setting.  The path-length ceiling is not a setting.
    pub fn reset(&mut self) {
        self.write_directory.clear();
        self.filename_prefix.clear();
        self.max_output_size = 0;
    }

    /// Configured directory, or `""` when unset.
    pub fn write_directory(&self) -> &str {
        &self.write_directory
    }

    /// Configured prefix, or `""` when unset.
    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    /// Configured ceiling in bytes, `0` when unset.
    pub fn max_output_size(&self) -> u64 {
        self.max_output_size
    }

    /// Configured ceiling in kilobytes, `0` when unset.
    pub fn max_output_size_kb(&self) -> u64 {
        self.max_output_size / BYTES_PER_KB
    }

    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    /// `true` while nothing has been configured.
    pub fn is_unset(&self) -> bool {
        self.write_directory.is_empty()
            && self.filename_prefix.is_empty()
            && self.max_output_size == 0
    }

    /// Fill in defaults for every unset field.
    ///
    /// An unset directory falls back to the process working directory,
    /// normalized under the same rules as `-p`.
    pub fn resolve(&self) -> Result<ResolvedConfig, CaptureError> {
        self.resolve_with(std::env::current_dir)
    }

    fn resolve_with<F>(&self, current_dir: F) -> Result<ResolvedConfig, CaptureError>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        let write_directory = if self.write_directory.is_empty() {
            let cwd =
                current_dir().map_err(|e| CaptureError::WorkingDirectory(e.to_string()))?;
            let cwd = cwd.to_str().ok_or_else(|| {
                CaptureError::WorkingDirectory(format!(
                    "{} is not valid UTF-8",
                    cwd.display()
                ))
            })?;
            let dir = normalize_directory(cwd, self.max_path_length)?;
            log::debug!("no write directory configured, using {dir}");
            dir
        } else {
            self.write_directory.clone()
        };

        let filename_prefix = if self.filename_prefix.is_empty() {
            DEFAULT_FILENAME_PREFIX.to_owned()
        } else {
            self.filename_prefix.clone()
        };

        let max_output_size = if self.max_output_size == 0 {
            DEFAULT_MAX_OUTPUT_SIZE_KB * BYTES_PER_KB
        } else {
            self.max_output_size
        };

        Ok(ResolvedConfig {
            write_directory,
            filename_prefix,
            max_output_size,
            max_path_length: self.max_path_length,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully populated settings for one capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub(crate) write_directory: String,
    pub(crate) filename_prefix: String,
    pub(crate) max_output_size: u64,
    pub(crate) max_path_length: usize,
}

impl ResolvedConfig {
    pub fn write_directory(&self) -> &str {
        &self.write_directory
    }

    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    /// Size ceiling in bytes.
    pub fn max_output_size(&self) -> u64 {
        self.max_output_size
    }

    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject values that leave no room for their terminator.
fn check_length(value: &str, max: usize) -> Result<(), CaptureError> {
    if value.len() >= max {
        return Err(CaptureError::PathTooLong {
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn normalize_directory(path: &str, max: usize) -> Result<String, CaptureError> {
    if path.is_empty() {
        return Err(CaptureError::EmptyValue("write directory".into()));
    }
    check_length(path, max)?;
    let mut dir = path.to_owned();
    if !dir.ends_with(is_separator) {
        dir.push(MAIN_SEPARATOR);
    }
    Ok(dir)
}

fn normalize_prefix(prefix: &str, max: usize) -> Result<String, CaptureError> {
    if prefix.is_empty() {
        return Err(CaptureError::EmptyValue("filename prefix".into()));
    }
    check_length(prefix, max)?;
    let mut out = prefix.to_owned();
    if !out.ends_with(PREFIX_DELIMITER) {
        out.push(PREFIX_DELIMITER);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: char = MAIN_SEPARATOR;

    #[test]
    fn test_default_is_unset() {
        let c = CaptureConfig::new();
        assert!(c.is_unset());
        assert_eq!(c.write_directory(), "");
        assert_eq!(c.filename_prefix(), "");
        assert_eq!(c.max_output_size_kb(), 0);
        assert_eq!(c.max_path_length(), MAX_FILEPATH_LENGTH);
    }

    #[test]
    fn test_directory_gets_one_separator() {
        let mut c = CaptureConfig::new();
        c.set_write_directory("/var/capture").unwrap();
        assert_eq!(c.write_directory(), format!("/var/capture{SEP}"));

        let already = c.write_directory().to_owned();
        c.set_write_directory(&already).unwrap();
        assert_eq!(c.write_directory(), already);
    }

    #[test]
    fn test_prefix_gets_one_underscore() {
        let mut c = CaptureConfig::new();
        c.set_filename_prefix("test").unwrap();
        assert_eq!(c.filename_prefix(), "test_");
        c.set_filename_prefix("test_").unwrap();
        assert_eq!(c.filename_prefix(), "test_");
    }

    #[test]
    fn test_directory_length_ceiling() {
        let mut c = CaptureConfig::new();
        let fits = "d".repeat(MAX_FILEPATH_LENGTH - 1);
        c.set_write_directory(&fits).unwrap();
        assert_eq!(c.write_directory().len(), MAX_FILEPATH_LENGTH);

        let mut c = CaptureConfig::new();
        let too_long = "d".repeat(MAX_FILEPATH_LENGTH);
        let err = c.set_write_directory(&too_long).unwrap_err();
        assert!(matches!(err, CaptureError::PathTooLong { len: 255, max: 255 }));
        assert_eq!(c.write_directory(), "");
    }

    #[test]
    fn test_prefix_respects_custom_ceiling() {
        let mut c = CaptureConfig::new().with_max_path_length(8);
        c.set_filename_prefix("abcdefg").unwrap();
        assert_eq!(c.filename_prefix(), "abcdefg_");
        assert!(c.set_filename_prefix("abcdefgh").is_err());
    }

    #[test]
    fn test_size_in_kilobytes() {
        let mut c = CaptureConfig::new();
        c.set_max_output_size("4").unwrap();
        assert_eq!(c.max_output_size(), 4096);
        assert_eq!(c.max_output_size_kb(), 4);
        c.set_max_output_size(" 16 ").unwrap();
        assert_eq!(c.max_output_size_kb(), 16);
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        let mut c = CaptureConfig::new();
        for bad in ["0", "", "abc", "-5", "1.5", "18446744073709551615"] {
            let err = c.set_max_output_size(bad).unwrap_err();
            assert!(matches!(err, CaptureError::InvalidFileSize(_)), "{bad}");
        }
        assert_eq!(c.max_output_size(), 0);
    }

    #[test]
    fn test_failed_size_keeps_previous() {
        let mut c = CaptureConfig::new();
        c.set_max_output_size("2").unwrap();
        assert!(c.set_max_output_size("zero").is_err());
        assert_eq!(c.max_output_size_kb(), 2);
    }

    #[test]
    fn test_reset_clears_settings() {
        let mut c = CaptureConfig::new().with_max_path_length(100);
        c.set_write_directory("/tmp").unwrap();
        c.set_filename_prefix("x").unwrap();
        c.set_max_output_size("1").unwrap();
        c.reset();
        assert!(c.is_unset());
        assert_eq!(c.max_path_length(), 100);
    }

    #[test]
    fn test_resolve_applies_defaults_without_mutating() {
        let c = CaptureConfig::new();
        let r = c.resolve_with(|| Ok(PathBuf::from("/work"))).unwrap();
        assert_eq!(r.write_directory(), format!("/work{SEP}"));
        assert_eq!(r.filename_prefix(), DEFAULT_FILENAME_PREFIX);
        assert_eq!(r.max_output_size(), DEFAULT_MAX_OUTPUT_SIZE_KB * 1024);
        assert!(c.is_unset());
    }

    #[test]
    fn test_resolve_keeps_configured_values() {
        let mut c = CaptureConfig::new();
        c.set_write_directory("/data").unwrap();
        c.set_filename_prefix("log").unwrap();
        c.set_max_output_size("3").unwrap();
        let r = c.resolve().unwrap();
        assert_eq!(r.write_directory(), format!("/data{SEP}"));
        assert_eq!(r.filename_prefix(), "log_");
        assert_eq!(r.max_output_size(), 3072);
    }

    #[test]
    fn test_resolve_uses_process_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let r = CaptureConfig::new().resolve().unwrap();
        assert!(r.write_directory().starts_with(cwd.to_str().unwrap()));
        assert!(r.write_directory().ends_with(is_separator));
    }

    #[test]
    fn test_resolve_rejects_long_cwd() {
        let c = CaptureConfig::new().with_max_path_length(6);
        let err = c
            .resolve_with(|| Ok(PathBuf::from("/a/long/dir")))
            .unwrap_err();
        assert!(matches!(err, CaptureError::PathTooLong { .. }));
    }

    #[test]
    fn test_resolve_reports_missing_cwd() {
        let err = CaptureConfig::new()
            .resolve_with(|| Err(io::Error::from(io::ErrorKind::NotFound)))
            .unwrap_err();
        assert!(matches!(err, CaptureError::WorkingDirectory(_)));
    }

    #[test]
    fn test_empty_values_rejected() {
        let mut c = CaptureConfig::new();
        assert!(matches!(
            c.set_write_directory(""),
            Err(CaptureError::EmptyValue(_))
        ));
        assert!(matches!(
            c.set_filename_prefix(""),
            Err(CaptureError::EmptyValue(_))
        ));
        assert!(c.is_unset());
    }
}
