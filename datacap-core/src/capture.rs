//! Bounded stream capture.
//!
//! [`Capturer`] turns one capture request into one freshly named output
//! file: resolve the configuration, build the path, open the source, create
//! the output, then copy in fixed-size chunks until the source is exhausted
//! or the next chunk would push the file past the size ceiling.
//!
//! # Size ceiling
//!
//! A chunk is written only if the running total plus the chunk stays at or
//! below the ceiling.  The chunk that would overflow is dropped whole, so the
//! file holds exactly the bytes written before it, never a partial chunk.
//!
//! # Handles
//!
//! The source file and the output file are owned by [`Capturer::capture`]
//! and dropped on every exit path.  Standard input is only locked for the
//! duration of the copy, never closed.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::CaptureConfig;
use crate::errors::{CaptureError, ErrorKind};
use crate::timestamp::{current_timestamp, NameSequencer};

/// Bytes moved per read/write round.
pub const CHUNK_SIZE: usize = 1024;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Where captured bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// An empty argument means standard input; anything else is taken as a
    /// file path verbatim.
    pub fn from_arg(arg: &str) -> Self {
        if arg.is_empty() {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }
}

/// Why the copy loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source hit end-of-input.
    Completed,
    /// The next chunk would have exceeded the size ceiling.
    SizeLimitReached,
}

/// Bytes moved by [`copy_bounded`] and why it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub bytes_written: u64,
    pub stop: StopReason,
}

/// Result of one capture that produced an output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureOutcome {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub stop: StopReason,
}

impl CaptureOutcome {
    pub fn kind(&self) -> ErrorKind {
        match self.stop {
            StopReason::Completed => ErrorKind::NoError,
            StopReason::SizeLimitReached => ErrorKind::FileSizeLimitReached,
        }
    }
}

// ---------------------------------------------------------------------------
// Copy loop
// ---------------------------------------------------------------------------

/// Which side of the copy failed.
#[derive(Debug)]
pub enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

impl CopyError {
    pub fn into_io(self) -> io::Error {
        match self {
            CopyError::Read(e) | CopyError::Write(e) => e,
        }
    }
}

/// Fill `buf` from `reader`, stopping early only at end-of-input.
fn read_chunk<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Copy `reader` into `writer` in `chunk_size` pieces, never letting the
/// total exceed `limit` bytes.
pub fn copy_bounded<R, W>(
    reader: &mut R,
    writer: &mut W,
    limit: u64,
    chunk_size: usize,
) -> Result<CopyReport, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    let stop = loop {
        let n = read_chunk(reader, &mut buf).map_err(CopyError::Read)?;
        if n == 0 {
            break StopReason::Completed;
        }
        if total + n as u64 > limit {
            break StopReason::SizeLimitReached;
        }
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    };

    writer.flush().map_err(CopyError::Write)?;
    Ok(CopyReport {
        bytes_written: total,
        stop,
    })
}

// ---------------------------------------------------------------------------
// Capturer
// ---------------------------------------------------------------------------

/// Runs capture requests against a configuration.
///
/// Holds the name sequencer, so keep one `Capturer` alive across requests
/// to get distinct names for captures issued within the same second.
#[derive(Debug)]
pub struct Capturer<'a> {
    config: &'a CaptureConfig,
    names: NameSequencer,
}

impl<'a> Capturer<'a> {
    pub fn new(config: &'a CaptureConfig) -> Self {
        Self {
            config,
            names: NameSequencer::new(),
        }
    }

    /// Capture `source` into a new output file.
    pub fn capture(&mut self, source: &Source) -> Result<CaptureOutcome, CaptureError> {
        match source {
            Source::Stdin => {
                let stdin = io::stdin();
                let mut lock = stdin.lock();
                self.capture_reader(&mut lock)
            }
            Source::File(path) => self.capture_file(path),
        }
    }

    /// Capture the contents of the file at `path`.
    ///
    /// The output path is computed first; no output file is created when the
    /// source cannot be opened.
    pub fn capture_file(&mut self, path: &Path) -> Result<CaptureOutcome, CaptureError> {
        let (output, limit) = self.next_output()?;
        let mut input = File::open(path).map_err(|source| CaptureError::ReadFileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        write_output(&mut input, output, limit)
    }

    /// Capture everything readable from `reader`.
    ///
    /// Used for standard input; any other `Read` works the same way.
    pub fn capture_reader<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<CaptureOutcome, CaptureError> {
        let (output, limit) = self.next_output()?;
        write_output(reader, output, limit)
    }

    /// Resolve the configuration and pick the next output path.
    fn next_output(&mut self) -> Result<(PathBuf, u64), CaptureError> {
        let resolved = self.config.resolve()?;
        let stamp = self.names.next(current_timestamp());
        let path = resolved.output_path(&stamp)?;
        log::debug!("resolved output path {}", path.display());
        Ok((path, resolved.max_output_size()))
    }
}

/// Create `path` and stream `reader` into it.
fn write_output<R: Read + ?Sized>(
    reader: &mut R,
    path: PathBuf,
    limit: u64,
) -> Result<CaptureOutcome, CaptureError> {
    // create_new: an existing file is never overwritten.
    let mut output = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(source) => return Err(CaptureError::WriteFileOpen { path, source }),
    };

    let report = match copy_bounded(reader, &mut output, limit, CHUNK_SIZE) {
        Ok(report) => report,
        Err(e) => {
            return Err(CaptureError::Stream {
                path,
                source: e.into_io(),
            })
        }
    };

    match report.stop {
        StopReason::Completed => log::info!(
            "captured {} bytes to {}",
            report.bytes_written,
            path.display()
        ),
        StopReason::SizeLimitReached => log::warn!(
            "size limit of {limit} bytes reached, kept {} bytes in {}",
            report.bytes_written,
            path.display()
        ),
    }

    Ok(CaptureOutcome {
        path,
        bytes_written: report.bytes_written,
        stop: report.stop,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
