//! CLI error types with associated exit codes.
//!
//! Every [`CliError`] variant maps to a stable exit code via
//! [`CliError::exit_code`]:
//!
//! - **1** — the documents differ. The diagnostic has already been written
//!   to stdout.
//! - **2** — input failure: a document could not be read or is not JSON.
//! - **3** — a configured resource limit aborted the comparison.
//!
//! Equality exits 0 and is not an error.
use std::fmt;
use std::path::PathBuf;

use structeq_core::CompareError;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `structeq` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds `--max-file-size`.
    FileTooLarge {
        /// The path, or `-` for stdin.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size, when known before reading.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// The path, or `-` for stdin.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// Any other I/O failure while reading an input.
    IoError {
        /// The path, or `-` for stdin.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input is not a JSON document.
    ParseFailed {
        /// The path, or `-` for stdin.
        source: String,
        /// The parser's error message, including line and column.
        detail: String,
    },

    /// Standard input was named more than once.
    StdinTwice,

    // --- Exit code 1: logical outcome ---
    /// The documents differ.
    Different,

    // --- Exit code 3: resource limits ---
    /// A configured limit aborted the comparison.
    LimitExceeded(CompareError),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Different => 1,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::StdinTwice => 2,
            Self::LimitExceeded(_) => 3,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes"),
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => format!("error: file too large: {source} exceeded limit of {limit} bytes"),
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => format!("error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"),
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::ParseFailed { source, detail } => {
                format!("error: {source} is not valid JSON: {detail}")
            }
            Self::StdinTwice => "error: stdin (`-`) can be read only once".to_owned(),
            Self::Different => "documents differ".to_owned(),
            Self::LimitExceeded(err) => format!("error: {err}"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<CompareError> for CliError {
    fn from(err: CompareError) -> Self {
        Self::LimitExceeded(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
