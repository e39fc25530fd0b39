//! Error types for SQL parsing and analysis.
//!
//! # Error Handling Strategy
//!
//! Two kinds of failure exist and they travel differently:
//!
//! - [`ParseError`]: the SQL could not be turned into a syntax tree. During analysis these
//!   are never returned as `Err`; they are rendered into [`ParseError::to_positioned_string`]
//!   form and stored in [`crate::types::AnalysisResult::errors`], and the analysis
//!   short-circuits with every other list empty.
//!
//! - [`AnalysisError`]: contract violations by the caller (empty input) and formatting
//!   failures. These are returned as `Err` from the public entry points.
//!
//! Columns and tables that cannot be resolved are not errors at all. They are left with
//! `None` identity fields in the result.

use crate::types::Dialect;
use regex::Regex;
use sqlparser::parser::ParserError;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error encountered during SQL parsing.
///
/// Preserves the position reported by the underlying parser when one is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message, without the parser's trailing position suffix.
    pub message: String,
    /// Line/column where the error occurred, if available.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u64,
    /// Column number (1-indexed).
    pub column: u64,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Missing required clause or keyword.
    MissingClause,
    /// Invalid or unexpected end of input.
    UnexpectedEof,
    /// Lexer/tokenization error.
    LexerError,
    /// The parser gave up because the input nests too deeply.
    RecursionLimit,
}

fn position_regex() -> &'static Regex {
    static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
    POSITION_REGEX.get_or_init(|| {
        // "at Line: 1, Column: 5" as well as "Line:1,Column:5"
        Regex::new(r"(?:\s+at)?\s*Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
    })
}

impl ParseError {
    /// Creates a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Creates a parse error with position information.
    pub fn with_position(message: impl Into<String>, line: u64, column: u64) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Sets the error kind.
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Renders the error in the `"Line {line}, Column {column}: {message}"` form used by
    /// [`crate::types::AnalysisResult::errors`].
    ///
    /// Errors without a position report line 0, column 0.
    pub fn to_positioned_string(&self) -> String {
        let Position { line, column } = self.position.unwrap_or(Position { line: 0, column: 0 });
        format!("Line {line}, Column {column}: {}", self.message)
    }

    /// Splits a sqlparser message into its text and the "at Line: X, Column: Y" suffix.
    ///
    /// Coupled to the message format of the `sqlparser` crate; returns the message
    /// untouched and no position when that format is not found.
    fn split_position(message: &str) -> (String, Option<Position>) {
        let re = position_regex();
        let Some(caps) = re.captures(message) else {
            #[cfg(feature = "tracing")]
            if message.contains("Line") || message.contains("Column") {
                trace!(
                    "Failed to parse position from error message that appears to contain position info: {}",
                    message
                );
            }
            return (message.trim().to_string(), None);
        };

        let position = (|| {
            let line = caps.get(1)?.as_str().parse().ok()?;
            let column = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        })();

        let Some(whole) = caps.get(0) else {
            return (message.trim().to_string(), position);
        };
        let mut text = String::with_capacity(message.len());
        text.push_str(&message[..whole.start()]);
        text.push_str(&message[whole.end()..]);
        (text.trim().to_string(), position)
    }

    /// Determines the error kind from the message content.
    fn infer_kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("found: eof") || lower.contains("unexpected end") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("expected") {
            ParseErrorKind::MissingClause
        } else if lower.contains("unterminated") || lower.contains("unexpected character") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ParserError> for ParseError {
    fn from(err: ParserError) -> Self {
        let (raw, lexer) = match err {
            ParserError::TokenizerError(msg) => (msg, true),
            ParserError::ParserError(msg) => (msg, false),
            ParserError::RecursionLimitExceeded => {
                return Self::new("recursion limit exceeded")
                    .with_kind(ParseErrorKind::RecursionLimit);
            }
        };
        let (message, position) = Self::split_position(&raw);
        let kind = if lexer {
            ParseErrorKind::LexerError
        } else {
            Self::infer_kind_from_message(&message)
        };

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}

/// Failure returned by the public entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Empty or whitespace-only SQL was handed to an entry point.
    #[error("SQL input is empty")]
    EmptyInput,
    /// Formatting needs a valid syntax tree and the input did not parse.
    #[error("cannot format invalid SQL: {0}")]
    Format(#[source] ParseError),
}
