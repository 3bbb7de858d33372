//! Command-line flag parsing into a [`CaptureConfig`].
//!
//! Flags come as `-flag value` pairs, except `-help` which takes no value.
//! The first failing setter aborts the scan with its own error.  Every
//! `InvalidArgument` failure (an unrecognized flag, a value-taking flag with
//! nothing after it, or an empty value) resets the whole configuration so a
//! malformed invocation never leaves half of its settings behind.

use crate::config::CaptureConfig;
use crate::errors::{CaptureError, ErrorKind};

// ---------------------------------------------------------------------------
// Flag table
// ---------------------------------------------------------------------------

/// Flags understood by [`parse_arguments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Path,
    FilenamePrefix,
    MaxSize,
    Help,
}

/// Applies a flag's value to the configuration.
type Setter = fn(&mut CaptureConfig, &str) -> Result<(), CaptureError>;

impl Argument {
    /// The configuration setter for a value-taking flag; `None` for `-help`.
    fn setter(self) -> Option<Setter> {
        match self {
            Argument::Path => Some(CaptureConfig::set_write_directory),
            Argument::FilenamePrefix => Some(CaptureConfig::set_filename_prefix),
            Argument::MaxSize => Some(CaptureConfig::set_max_output_size),
            Argument::Help => None,
        }
    }
}

/// One row of the flag table.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentSpec {
    pub argument: Argument,
    pub flag: &'static str,
    pub value_name: Option<&'static str>,
    pub description: &'static str,
}

/// Every supported flag, in the order they are listed in the help text.
pub const ARGUMENTS: &[ArgumentSpec] = &[
    ArgumentSpec {
        argument: Argument::Path,
        flag: "-p",
        value_name: Some("<dir>"),
        description: "Path to store the file (absolute paths only)",
    },
    ArgumentSpec {
        argument: Argument::FilenamePrefix,
        flag: "-n",
        value_name: Some("<prefix>"),
        description: "File name prefix to use",
    },
    ArgumentSpec {
        argument: Argument::MaxSize,
        flag: "-s",
        value_name: Some("<kb>"),
        description: "Maximum output file size in KB",
    },
    ArgumentSpec {
        argument: Argument::Help,
        flag: "-help",
        value_name: None,
        description: "Prints the help instructions",
    },
];

fn find_argument(flag: &str) -> Option<&'static ArgumentSpec> {
    ARGUMENTS.iter().find(|spec| spec.flag == flag)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Successful result of [`parse_arguments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// All flags applied; captures may start.
    Configured,
    /// `-help` was seen; print usage and do no work.
    HelpRequested,
}

impl ParseOutcome {
    pub fn kind(self) -> ErrorKind {
        match self {
            ParseOutcome::Configured => ErrorKind::NoError,
            ParseOutcome::HelpRequested => ErrorKind::HelpRequested,
        }
    }
}

/// Apply `args` (program name excluded) to `config`.
///
/// An empty list is valid and leaves `config` untouched, so defaults are
/// filled in later by [`CaptureConfig::resolve`].
pub fn parse_arguments<S: AsRef<str>>(
    config: &mut CaptureConfig,
    args: &[S],
) -> Result<ParseOutcome, CaptureError> {
    let mut tokens = args.iter().map(AsRef::as_ref);

    while let Some(flag) = tokens.next() {
        let Some(spec) = find_argument(flag) else {
            log::debug!("unrecognized flag {flag:?}, resetting configuration");
            config.reset();
            return Err(CaptureError::InvalidArgument(flag.to_owned()));
        };

        let Some(apply) = spec.argument.setter() else {
            return Ok(ParseOutcome::HelpRequested);
        };

        let Some(value) = tokens.next() else {
            config.reset();
            return Err(CaptureError::MissingValue(flag.to_owned()));
        };

        if let Err(e) = apply(config, value) {
            if e.kind() == ErrorKind::InvalidArgument {
                log::debug!("{flag} rejected {value:?}, resetting configuration");
                config.reset();
            }
            return Err(e);
        }
    }

    Ok(ParseOutcome::Configured)
}

/// Help text listing every flag from [`ARGUMENTS`].
pub fn usage() -> String {
    let mut out = String::new();
    out.push_str("Reads data from stdin or a file and saves it to a file\n");
    out.push_str("Supported Arguments:\n");
    for spec in ARGUMENTS {
        let head = match spec.value_name {
            Some(value) => format!("{} {value}", spec.flag),
            None => spec.flag.to_owned(),
        };
        out.push_str(&format!("  {head:<14} {}\n", spec.description));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
