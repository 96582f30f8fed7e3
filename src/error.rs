use std::fmt::{self, Display};

use nom::error::ErrorKind;

use crate::translator::TranslateError;
use crate::vm::parser::ParseError as CommandParseError;

#[derive(Debug, Clone, PartialEq)]
enum InnerError<Kind> {
    Incomplete,
    Context(&'static str),
    Other(Kind),
    Nom(ErrorKind),
}

impl<Kind: Display> fmt::Display for InnerError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InnerError::Context(ctx) => write!(f, "invalid {}", ctx),
            InnerError::Nom(_err) => write!(f, "unexpected input"),
            InnerError::Other(op) => fmt::Display::fmt(op, f),
            InnerError::Incomplete => write!(f, "expected more input"),
        }
    }
}

/// Error type that contains the reason of the error and the unconsumed input.
///
/// For error location information see [ParseError::verbose].
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError<Kind> {
    stack: Vec<(String, InnerError<Kind>)>,
}

impl<Kind> ParseError<Kind> {
    pub(crate) fn from_kind(input: &str, kind: Kind) -> ParseError<Kind> {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Other(kind))],
        }
    }

    pub(crate) fn incomplete() -> ParseError<Kind> {
        ParseError {
            stack: vec![(String::new(), InnerError::Incomplete)],
        }
    }

    /// The most specific reason, if it is not a generic parser failure.
    pub fn kind(&self) -> Option<&Kind> {
        self.stack.iter().find_map(|(_, inner)| match inner {
            InnerError::Other(kind) => Some(kind),
            _ => None,
        })
    }
}

/// Error type containing location information in addition to the reason of the error.
///
/// Created from a [ParseError] with [ParseError::verbose].
#[derive(Clone, Debug)]
pub struct VerboseParseError<'a, Kind> {
    /// The line number of the error location.
    pub line: usize,
    /// The column number of the error location.
    pub column: usize,
    kind: InnerError<Kind>,
    rest: &'a str,
}

impl<'a, Kind: Display> fmt::Display for VerboseParseError<'a, Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at line {} col {}: {}, at '{}'", self.line, self.column, self.kind, self.rest)
    }
}

impl<Kind> ParseError<Kind> {
    /// Calculates the error location information from the [ParseError] and the original input
    /// line.
    ///
    /// # Parameters
    /// - `input`: The line that was given to the parser or an exact copy of it.
    /// - `line`: The number of that line in the source file.
    pub fn verbose(self, input: &str, line: usize) -> VerboseParseError<Kind> {
        // The first entry is the innermost failure and has the most precise position.
        let (rest, kind) = match self.stack.into_iter().next() {
            Some(entry) => entry,
            None => (String::new(), InnerError::Incomplete),
        };

        let start = input.len().saturating_sub(rest.len());
        let column = input[..start].chars().count() + 1;

        let rest = match input[start..].char_indices().nth(20) {
            Some((end, _)) => &input[start..start + end],
            None => &input[start..],
        };

        VerboseParseError {
            line,
            column,
            kind,
            rest,
        }
    }
}

impl<Kind: Display> fmt::Display for ParseError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (input, kind) = match self.stack.first() {
            Some(entry) => entry,
            None => return write!(f, "unknown error"),
        };

        let end = input
            .char_indices()
            .nth(20)
            .map(|(i, _)| i)
            .unwrap_or_else(|| input.len());

        write!(f, "{} at: '{}'", kind, &input[..end])
    }
}

impl<Kind> nom::error::ParseError<&str> for ParseError<Kind> {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Nom(kind))],
        }
    }

    fn append(input: &str, kind: ErrorKind, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Nom(kind)));
        other
    }

    fn add_context(input: &str, ctx: &'static str, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Context(ctx)));
        other
    }
}

/// Failure to turn a single VM command into target code.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The command text is malformed.
    Parse(CommandParseError),
    /// The command is well formed but cannot be translated.
    Translate(TranslateError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err.kind),
            Error::Translate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<CommandParseError> for Error {
    fn from(err: CommandParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<TranslateError> for Error {
    fn from(err: TranslateError) -> Error {
        Error::Translate(err)
    }
}

/// An [Error] together with the source line it happened on.
///
/// This is the error reported for a whole translation run: the run stops at the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationError {
    /// 1-based line number in the source file.
    pub line: usize,
    /// The offending line as it appears in the source.
    pub text: String,
    pub error: Error,
}

impl CompilationError {
    pub fn new<E: Into<Error>>(line: usize, text: &str, error: E) -> CompilationError {
        CompilationError {
            line,
            text: text.to_string(),
            error: error.into(),
        }
    }

    /// 1-based column of the offending token, when known.
    pub fn column(&self) -> Option<usize> {
        match self.error {
            Error::Parse(ref err) => err
                .span
                .as_ref()
                .and_then(|span| self.text.get(..span.start))
                .map(|before| before.chars().count() + 1),
            Error::Translate(_) => None,
        }
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "error at line {}", self.line)?;

        if let Some(column) = self.column() {
            write!(f, ", column {}", column)?;
        }

        write!(f, ": {}\n  | {}", self.error, self.text.trim_end())
    }
}

impl std::error::Error for CompilationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
