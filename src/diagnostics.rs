use std::fmt;

use thiserror::Error;

/// Classification of a language-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Parse,
    Type,
    Arity,
    Unbound,
    Domain,
    Io,
    /// Raised by the `error` builtin.
    User,
}

/// Payload of an `Error` value.
///
/// The kind is informational only: two diagnostics with the same message are
/// the same error as far as the language is concerned.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>, offset: usize) -> Self {
        Self::new(
            DiagnosticKind::Parse,
            format!("{} at offset {offset}", message.into()),
        )
    }

    pub fn unbound(name: &str) -> Self {
        Self::new(DiagnosticKind::Unbound, format!("Unbound symbol '{name}'"))
    }

    pub fn arity(func: &str, got: usize, expected: usize) -> Self {
        Self::new(
            DiagnosticKind::Arity,
            format!(
                "Function '{func}' passed incorrect number of arguments. Got {got}, Expected {expected}."
            ),
        )
    }

    pub fn wrong_type(func: &str, index: usize, got: &str, expected: &str) -> Self {
        Self::new(
            DiagnosticKind::Type,
            format!(
                "Function '{func}' passed incorrect type for argument {index}. Got {got}, Expected {expected}."
            ),
        )
    }

    pub fn empty(func: &str, index: usize) -> Self {
        Self::new(
            DiagnosticKind::Arity,
            format!("Function '{func}' passed {{}} for argument {index}."),
        )
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Domain, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Host-level failures: anything that goes wrong outside the language itself.
#[derive(Debug, Error)]
pub enum LispyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

pub type Result<T> = std::result::Result<T, LispyError>;
