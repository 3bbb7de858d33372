//! Filesystem-safe timestamps for output file names.
//!
//! The stamp is the locale-style date-time (`%c`) with every space, `:` and
//! `/` replaced by `_`, so it can be used as a single path segment on any
//! target filesystem.  Resolution is one second; [`NameSequencer`] keeps
//! repeated captures inside the same second from sharing a name.

use chrono::{DateTime, Local};

/// `strftime` pattern used for the stamp.
const TIMESTAMP_FORMAT: &str = "%c";

/// Characters that cannot appear in a path segment.
const UNSAFE_CHARS: [char; 3] = [' ', ':', '/'];

/// Render `now` as a path-safe stamp.
pub fn format_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT)
        .to_string()
        .replace(UNSAFE_CHARS, "_")
}

/// Path-safe stamp for the current local time.
pub fn current_timestamp() -> String {
    format_timestamp(Local::now())
}

/// Disambiguates stamps that repeat within one process.
///
/// The first occurrence of a stamp is returned unchanged.  If the next
/// stamp is identical, `_2`, `_3`, ... are appended until the clock moves
/// on, at which point the counter starts over.
#[derive(Debug, Default)]
pub struct NameSequencer {
    last: Option<String>,
    repeats: u32,
}

impl NameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a stamp that differs from every stamp previously returned
    /// for the same clock second.
    pub fn next(&mut self, stamp: String) -> String {
        if self.last.as_deref() == Some(stamp.as_str()) {
            self.repeats += 1;
            format!("{stamp}_{}", self.repeats + 1)
        } else {
            self.repeats = 0;
            self.last = Some(stamp.clone());
            stamp
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
