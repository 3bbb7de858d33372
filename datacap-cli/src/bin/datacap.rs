//! Capture stdin or a file into a timestamped output file.
//!
//! Legacy capture flags (`-p`, `-n`, `-s`, `-help`) are passed through to
//! `datacap_core::parse_arguments`.  Without `--source` the tool runs the
//! interactive menu until `e` or end-of-input.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use datacap_core::{
    args, CaptureConfig, CaptureError, CaptureOutcome, Capturer, ErrorKind, ParseOutcome, Source,
};

const RULE: &str = "-----------------------------------------------------";
const TITLE: &str = "------------------Data Capture-----------------------";

#[derive(Parser)]
#[command(
    name = "datacap",
    about = "Capture stdin or a file verbatim into a timestamped .dat file",
    disable_help_flag = true
)]
struct Args {
    /// Enable debug logging to stderr
    #[arg(long)]
    verbose: bool,

    /// Print each capture result as a JSON object on stdout
    #[arg(long)]
    json: bool,

    /// Capture once from this file ("-" for stdin) and exit
    #[arg(long, value_name = "PATH")]
    source: Option<String>,

    /// Print this help
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// Capture flags: -p <dir>, -n <prefix>, -s <kb>, -help (after all --options)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    flags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Shell input
// ---------------------------------------------------------------------------

/// Interpret a typed file name or `--source` value: surrounding whitespace
/// is dropped, and an empty name or `-` means stdin.
fn shell_source(input: &str) -> Source {
    match input.trim() {
        "-" => Source::Stdin,
        name => Source::from_arg(name),
    }
}

/// First `--option` that landed among the capture flags, if any.  Clap stops
/// parsing options at the first capture flag, so anything after it is passed
/// through verbatim.
fn misplaced_option(flags: &[String]) -> Option<&str> {
    flags
        .iter()
        .map(String::as_str)
        .find(|flag| flag.starts_with("--"))
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Stdin,
    File,
    Exit,
    Invalid,
}

impl MenuChoice {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "s" | "S" => MenuChoice::Stdin,
            "f" | "F" => MenuChoice::File,
            "e" | "E" => MenuChoice::Exit,
            _ => MenuChoice::Invalid,
        }
    }
}

/// Read one line from stdin; `None` at end-of-input.
fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line)?;
    Ok((n > 0).then_some(line))
}

fn print_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{TITLE}")?;
    writeln!(out, "s - Read from stdin")?;
    writeln!(out, "f - Read from file")?;
    writeln!(out, "e - Exit")?;
    write!(out, "Enter your choice: ")?;
    out.flush()
}

fn interactive<W: Write>(capturer: &mut Capturer<'_>, out: &mut W, json: bool) -> io::Result<()> {
    loop {
        print_menu(out)?;
        let Some(line) = read_line()? else {
            writeln!(out)?;
            break;
        };

        let source = match MenuChoice::parse(&line) {
            MenuChoice::Stdin => {
                writeln!(out, "Input read from stdin")?;
                Source::Stdin
            }
            MenuChoice::File => {
                writeln!(out, "Enter the file name with full path:")?;
                out.flush()?;
                let Some(path) = read_line()? else {
                    break;
                };
                let source = shell_source(&path);
                if let Source::File(p) = &source {
                    writeln!(out, "{RULE}")?;
                    writeln!(out, "Input read from {}", p.display())?;
                }
                source
            }
            MenuChoice::Exit => {
                writeln!(out, "{RULE}")?;
                writeln!(out, "Program terminated")?;
                writeln!(out, "{RULE}")?;
                break;
            }
            MenuChoice::Invalid => {
                writeln!(out, "Invalid input. Please try again")?;
                continue;
            }
        };

        let result = capturer.capture(&source);
        report(out, &result, json)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Machine-readable form of one capture result.
#[derive(Serialize)]
struct Report<'a> {
    status: String,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a CaptureOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a std::path::Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> Report<'a> {
    fn new(result: &'a Result<CaptureOutcome, CaptureError>) -> Self {
        let kind = status_of(result);
        match result {
            Ok(outcome) => Report {
                status: format!("{kind:?}"),
                message: kind.description(),
                outcome: Some(outcome),
                path: None,
                error: None,
            },
            Err(e) => Report {
                status: format!("{kind:?}"),
                message: kind.description(),
                outcome: None,
                path: e.output_path().map(|p| p.as_path()),
                error: Some(e.to_string()),
            },
        }
    }
}

fn status_of(result: &Result<CaptureOutcome, CaptureError>) -> ErrorKind {
    match result {
        Ok(outcome) => outcome.kind(),
        Err(e) => e.kind(),
    }
}

/// Print one capture result.  Returns `false` when the capture failed.
fn report<W: Write>(
    out: &mut W,
    result: &Result<CaptureOutcome, CaptureError>,
    json: bool,
) -> io::Result<bool> {
    let kind = status_of(result);

    if json {
        let line = serde_json::to_string(&Report::new(result)).map_err(io::Error::other)?;
        writeln!(out, "{line}")?;
        return Ok(!kind.is_failure());
    }

    match result {
        Ok(outcome) => {
            writeln!(out, "{RULE}")?;
            writeln!(out, "Data saved to file - {}", outcome.path.display())?;
            writeln!(out, "{RULE}")?;
        }
        Err(e) => {
            log::debug!("capture failed: {e}");
            if let Some(path) = e.output_path() {
                writeln!(out, "Output file - {}", path.display())?;
            }
        }
    }
    if kind != ErrorKind::NoError {
        writeln!(out, "{}", kind.description())?;
    }
    Ok(!kind.is_failure())
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{TITLE}")?;
    write!(out, "{}", args::usage())?;
    writeln!(out, "{RULE}")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let mut out = io::stdout().lock();
    let mut config = CaptureConfig::new();

    if let Some(option) = misplaced_option(&args.flags) {
        writeln!(
            out,
            "{}: {option} must come before the capture flags (-p, -n, -s, -help)",
            ErrorKind::InvalidArgument.description()
        )?;
        return Ok(ExitCode::FAILURE);
    }

    match datacap_core::parse_arguments(&mut config, &args.flags) {
        Ok(ParseOutcome::HelpRequested) => {
            print_help(&mut out).context("writing help")?;
            return Ok(ExitCode::SUCCESS);
        }
        Ok(ParseOutcome::Configured) => {}
        Err(e) => {
            log::debug!("argument parsing failed: {e}");
            writeln!(out, "{}", e.kind().description())?;
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut capturer = Capturer::new(&config);

    if let Some(source) = &args.source {
        let result = capturer.capture(&shell_source(source));
        let ok = report(&mut out, &result, args.json).context("writing capture report")?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    interactive(&mut capturer, &mut out, args.json).context("interactive session")?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("datacap: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use datacap_core::StopReason;
    use std::path::PathBuf;

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("s\n"), MenuChoice::Stdin);
        assert_eq!(MenuChoice::parse("F"), MenuChoice::File);
        assert_eq!(MenuChoice::parse(" e "), MenuChoice::Exit);
        assert_eq!(MenuChoice::parse("x"), MenuChoice::Invalid);
        assert_eq!(MenuChoice::parse(""), MenuChoice::Invalid);
    }

    #[test]
    fn test_legacy_flags_pass_through() {
        let args = Args::try_parse_from(["datacap", "-p", "/tmp", "-n", "cap", "-s", "4"]).unwrap();
        assert_eq!(args.flags, ["-p", "/tmp", "-n", "cap", "-s", "4"]);
        assert!(args.source.is_none());
    }

    #[test]
    fn test_shell_options_before_flags() {
        let args =
            Args::try_parse_from(["datacap", "--json", "--source", "-", "-help"]).unwrap();
        assert!(args.json);
        assert_eq!(args.source.as_deref(), Some("-"));
        assert_eq!(args.flags, ["-help"]);
    }

    #[test]
    fn test_shell_source() {
        assert_eq!(shell_source("-"), Source::Stdin);
        assert_eq!(shell_source("\n"), Source::Stdin);
        assert_eq!(shell_source(" - \n"), Source::Stdin);
        assert_eq!(
            shell_source("/data/in.bin\n"),
            Source::File(PathBuf::from("/data/in.bin"))
        );
    }

    #[test]
    fn test_option_after_flags_is_reported() {
        let args =
            Args::try_parse_from(["datacap", "-p", "/dir", "--source", "in.bin"]).unwrap();
        assert!(args.source.is_none());
        assert_eq!(misplaced_option(&args.flags), Some("--source"));

        let args = Args::try_parse_from(["datacap", "--source", "in.bin", "-p", "/dir"]).unwrap();
        assert_eq!(misplaced_option(&args.flags), None);
    }

    #[test]
    fn test_report_text_for_size_limit() {
        let result = Ok(CaptureOutcome {
            path: PathBuf::from("/tmp/File_x.dat"),
            bytes_written: 1024,
            stop: StopReason::SizeLimitReached,
        });
        let mut out = Vec::new();
        assert!(report(&mut out, &result, false).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Data saved to file - /tmp/File_x.dat"));
        assert!(text.contains(ErrorKind::FileSizeLimitReached.description()));
    }

    #[test]
    fn test_report_json_for_write_open_error() {
        let result = Err(CaptureError::WriteFileOpen {
            path: PathBuf::from("/nope/File_x.dat"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        let mut out = Vec::new();
        assert!(!report(&mut out, &result, true).unwrap());
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "WriteFileOpenError");
        assert_eq!(value["path"], "/nope/File_x.dat");
        assert!(value.get("outcome").is_none());
    }
}
