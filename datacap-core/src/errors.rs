//! Error types for `datacap_core`.
//!
//! Every failure the core can report is a [`CaptureError`], built with
//! `thiserror`.  The shell does not match on variants directly; it asks
//! for the coarse [`ErrorKind`] and prints [`ErrorKind::description`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `datacap_core` library.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A flag that is not in the argument table.
    #[error("InvalidArgument: unrecognized flag `{0}`")]
    InvalidArgument(String),

    /// A value-taking flag was the last token on the command line.
    #[error("InvalidArgument: flag `{0}` expects a value")]
    MissingValue(String),

    /// A directory or prefix was given as an empty string.
    #[error("InvalidArgument: {0} must not be empty")]
    EmptyValue(String),

    /// A configured or derived path does not fit the path-length ceiling.
    #[error("PathTooLong: {len} bytes exceeds the limit of {max}")]
    PathTooLong { len: usize, max: usize },

    /// The `-s` value is not a positive number of kilobytes.
    #[error("InvalidFileSize: `{0}` is not a positive kilobyte count")]
    InvalidFileSize(String),

    /// The named input file could not be opened.
    #[error("ReadFileOpenError: {}: {source}", .path.display())]
    ReadFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The computed output file could not be created.
    #[error("WriteFileOpenError: {}: {source}", .path.display())]
    WriteFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the source or writing the output failed mid-capture.
    #[error("StreamError: {}: {source}", .path.display())]
    Stream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The current working directory could not be used as a default.
    #[error("WorkingDirectoryError: {0}")]
    WorkingDirectory(String),
}

impl CaptureError {
    /// Classify this error into the status taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::InvalidArgument(_)
            | CaptureError::MissingValue(_)
            | CaptureError::EmptyValue(_) => ErrorKind::InvalidArgument,
            CaptureError::PathTooLong { .. } => ErrorKind::PathTooLong,
            CaptureError::InvalidFileSize(_) => ErrorKind::InvalidFileSize,
            CaptureError::ReadFileOpen { .. } => ErrorKind::ReadFileOpenError,
            CaptureError::WriteFileOpen { .. } => ErrorKind::WriteFileOpenError,
            CaptureError::Stream { .. } => ErrorKind::StreamError,
            CaptureError::WorkingDirectory(_) => ErrorKind::Unknown,
        }
    }

    /// The output path this error refers to, if one had been computed.
    ///
    /// Present for `WriteFileOpen` and `Stream`; absent for everything that
    /// fails before the output path exists or before output work starts.
    pub fn output_path(&self) -> Option<&PathBuf> {
        match self {
            CaptureError::WriteFileOpen { path, .. } | CaptureError::Stream { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Status taxonomy shared by parsing and capture.
///
/// `NoError`, `HelpRequested` and `FileSizeLimitReached` are not failures;
/// they are reported by [`crate::args::ParseOutcome`] and
/// [`crate::capture::CaptureOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoError,
    InvalidArgument,
    PathTooLong,
    InvalidFileSize,
    ReadFileOpenError,
    WriteFileOpenError,
    FileSizeLimitReached,
    HelpRequested,
    StreamError,
    Unknown,
}

impl ErrorKind {
    /// One-line status text shown to the user.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::NoError => "No error",
            ErrorKind::InvalidArgument => "Error! Invalid Arguments",
            ErrorKind::PathTooLong => "Error! Path exceeds max length",
            ErrorKind::InvalidFileSize => "Error! Invalid output file size limit",
            ErrorKind::ReadFileOpenError => "Error! Unable to open file for read",
            ErrorKind::WriteFileOpenError => "Error! Unable to open file for write",
            ErrorKind::FileSizeLimitReached => "Error! Output file size limit reached",
            ErrorKind::HelpRequested => "",
            ErrorKind::StreamError => "Error! Unable to transfer data",
            ErrorKind::Unknown => "Unknown error",
        }
    }

    /// `true` for kinds that mean the requested work did not happen.
    pub fn is_failure(self) -> bool {
        !matches!(
            self,
            ErrorKind::NoError | ErrorKind::HelpRequested | ErrorKind::FileSizeLimitReached
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
