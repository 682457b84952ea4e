/*!
 * Error types for the subconvert application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// AppError is never built inside the crate; it is for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised by the subtitle core: timing, sequences, parsing and synchronization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// Frame rate was zero, negative or not a number
    #[error("Invalid frame rate: {0}")]
    InvalidRate(f64),

    /// Two times (or a time and a sequence) use different frame rates
    #[error("Incompatible frame rates: expected {expected}, found {found}")]
    IncompatibleRate {
        /// Frame rate of the receiver
        expected: f64,
        /// Frame rate of the other operand
        found: f64,
    },

    /// A time string does not follow `[+|-]H:MM:SS[.mmm]`
    #[error("Malformed time: '{0}'")]
    MalformedTime(String),

    /// Subtitle index outside of the sequence
    #[error("Index {index} out of range (sequence has {len} subtitles)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Sequence length at the time of the request
        len: usize,
    },

    /// None of the registered formats recognised the input
    #[error("Unknown subtitle format")]
    UnknownFormat,

    /// A format was recognised but broke down later in the file
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number where the failing section ended
        line: usize,
        /// Description of the failure
        message: String,
    },

    /// Nothing to work with
    #[error("Empty input")]
    EmptyInput,

    /// A subtitle without a start time was handed to a sequence
    #[error("Incomplete subtitle: {0}")]
    IncompleteSubtitle(String),

    /// Synchronization would move a subtitle before zero
    #[error("Subtitle {index} would start or end before 0:00:00.000")]
    NegativeTime {
        /// 0-based index of the offending subtitle
        index: usize,
    },

    /// A time does not fit into the millisecond range
    #[error("Time out of range: {0}")]
    TimeOutOfRange(String),

    /// Malformed `--sync` expression
    #[error("Invalid sync expression: {0}")]
    InvalidSyncExpr(String),
}

/// Main application error type that wraps all other errors.
///
/// Library consumers can use it to carry subtitle, config and I/O failures behind one type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<SubtitleError>() {
            Ok(subtitle_error) => Self::Subtitle(subtitle_error),
            Err(other) => Self::Unknown(format!("{:#}", other)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
