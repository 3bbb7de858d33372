//! `datacap_core` -- configuration and bounded-copy engine for `datacap`.
//!
//! This crate holds all capture logic and does no terminal I/O of its own.
//! It is consumed by `datacap-cli`, which renders results and drives the
//! interactive menu.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `CaptureError` enum via `thiserror`, `ErrorKind` status taxonomy |
//! | [`timestamp`] | Path-safe local timestamps and same-second disambiguation |
//! | [`config`] | `CaptureConfig` settings and the resolved per-request view |
//! | [`args`] | `-p`/`-n`/`-s`/`-help` flag parsing and usage text |
//! | [`path`] | Output path construction under the length ceiling |
//! | [`capture`] | `Capturer` and the bounded chunked copy loop |

pub mod args;
pub mod capture;
pub mod config;
pub mod errors;
pub mod path;
pub mod timestamp;

pub use args::{parse_arguments, ParseOutcome};
pub use capture::{CaptureOutcome, Capturer, Source, StopReason};
pub use config::{CaptureConfig, ResolvedConfig};
pub use errors::{CaptureError, ErrorKind};
