//! Turning a line of tokens into a [Command].

use std::fmt;

use super::command::{Command, Segment};
use super::token::{command_keywords, segment_keywords, suggest, Span, StackOp, Token};

/// The largest offset that fits in the immediate field of an A-instruction.
pub const MAX_OFFSET: u16 = 0x7FFF;

/// Reason a line could not be parsed into a [Command].
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// The line held no tokens.
    Empty,

    /// The first word is not a command.
    UnknownCommand {
        word: String,
        suggestion: Option<&'static str>,
    },

    /// The second word of a `push` or `pop` is not a segment.
    UnknownSegment {
        word: String,
        suggestion: Option<&'static str>,
    },

    /// The offset is not a number or does not fit in 15 bits.
    InvalidOffset { word: String },

    /// The command has too few or too many operands.
    OperandCount {
        command: String,
        expected: usize,
        got: usize,
    },

    /// `pop constant` has nowhere to store the value.
    PopConstant,

    /// A VM command that exists but that this translator does not implement.
    Unsupported { word: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Empty => write!(f, "expected a command"),
            ErrorKind::UnknownCommand { word, suggestion } => {
                write!(f, "unknown command '{}'", word)?;
                if let Some(suggestion) = suggestion {
                    write!(f, ", did you mean '{}'?", suggestion)?;
                }
                Ok(())
            }
            ErrorKind::UnknownSegment { word, suggestion } => {
                write!(f, "unknown segment '{}'", word)?;
                if let Some(suggestion) = suggestion {
                    write!(f, ", did you mean '{}'?", suggestion)?;
                }
                Ok(())
            }
            ErrorKind::InvalidOffset { word } => {
                write!(
                    f,
                    "invalid offset '{}', expected a number between 0 and {}",
                    word, MAX_OFFSET
                )
            }
            ErrorKind::OperandCount { command, expected, got } => write!(
                f,
                "'{}' takes {} operand{}, got {}",
                command,
                expected,
                if *expected == 1 { "" } else { "s" },
                got
            ),
            ErrorKind::PopConstant => write!(f, "cannot pop into the constant segment"),
            ErrorKind::Unsupported { word } => {
                write!(f, "the '{}' command is not supported", word)
            }
        }
    }
}

/// Error produced while parsing a single line.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,

    /// Position of the offending token in the line, when there is one.
    pub span: Option<Span>,
}

impl ParseError {
    fn new(kind: ErrorKind, span: Option<Span>) -> ParseError {
        ParseError { kind, span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.span {
            Some(ref span) => write!(f, "at column {}: {}", span.start + 1, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ParseError {}

/// Text of the token at `span`, falling back to the token's own rendering.
fn word_at(line: Option<&str>, token: &Token, span: &Span) -> String {
    line.and_then(|line| line.get(span.clone()))
        .map(str::to_string)
        .unwrap_or_else(|| token.to_string())
}

/// Builds a command from tokens.
///
/// # Parameters
/// - `tokens`: The tokens of the line together with their spans.
/// - `line`: The text the spans refer to. Only used for error messages.
pub fn parse_tokens(tokens: &[(Token, Span)], line: Option<&str>) -> Result<Command, ParseError> {
    let (first, first_span) = match tokens.first() {
        Some(token) => token,
        None => return Err(ParseError::new(ErrorKind::Empty, None)),
    };

    let operands = &tokens[1..];

    match first {
        Token::Operator(op) => {
            if let Some((_, span)) = operands.first() {
                let kind = ErrorKind::OperandCount {
                    command: op.to_string(),
                    expected: 0,
                    got: operands.len(),
                };

                return Err(ParseError::new(kind, Some(span.clone())));
            }

            Ok(Command::Arithmetic(*op))
        }
        Token::Stack(op) => parse_stack_command(*op, first_span, operands, line),
        Token::Unsupported(word) => Err(ParseError::new(
            ErrorKind::Unsupported {
                word: word.to_lowercase(),
            },
            Some(first_span.clone()),
        )),
        other => {
            let word = word_at(line, other, first_span);
            let suggestion = suggest(&word, command_keywords());

            Err(ParseError::new(
                ErrorKind::UnknownCommand { word, suggestion },
                Some(first_span.clone()),
            ))
        }
    }
}

fn parse_stack_command(
    op: StackOp,
    span: &Span,
    operands: &[(Token, Span)],
    line: Option<&str>,
) -> Result<Command, ParseError> {
    if operands.len() != 2 {
        let kind = ErrorKind::OperandCount {
            command: op.as_str().to_string(),
            expected: 2,
            got: operands.len(),
        };

        let span = operands.get(2).map(|(_, s)| s.clone()).unwrap_or_else(|| span.clone());

        return Err(ParseError::new(kind, Some(span)));
    }

    let (segment_token, segment_span) = &operands[0];
    let (offset_token, offset_span) = &operands[1];

    let segment = match segment_token {
        Token::Segment(segment) => *segment,
        other => {
            let word = word_at(line, other, segment_span);
            let suggestion = suggest(&word, segment_keywords());

            return Err(ParseError::new(
                ErrorKind::UnknownSegment { word, suggestion },
                Some(segment_span.clone()),
            ));
        }
    };

    let offset = match offset_token {
        Token::Number(offset) if *offset <= MAX_OFFSET => *offset,
        other => {
            let kind = ErrorKind::InvalidOffset {
                word: word_at(line, other, offset_span),
            };

            return Err(ParseError::new(kind, Some(offset_span.clone())));
        }
    };

    match (op, segment) {
        (StackOp::Pop, Segment::Constant) => {
            Err(ParseError::new(ErrorKind::PopConstant, Some(segment_span.clone())))
        }
        (StackOp::Pop, segment) => Ok(Command::Pop(segment, offset)),
        (StackOp::Push, segment) => Ok(Command::Push(segment, offset)),
    }
}

/// Parses one line of VM source. Comments are allowed.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let tokens = Token::tokenize(line);
    parse_tokens(&tokens, Some(line))
}

/// Parses a command that has already been split into words.
pub fn parse_words<S: AsRef<str>>(words: &[S]) -> Result<Command, ParseError> {
    let mut offset = 0;

    let tokens: Vec<_> = words
        .iter()
        .map(|word| {
            let word = word.as_ref();
            let span = offset..offset + word.len();
            offset += word.len() + 1;
            (Token::from_word(word), span)
        })
        .collect();

    let line = words.iter().map(|word| word.as_ref()).collect::<Vec<&str>>().join(" ");

    parse_tokens(&tokens, Some(&line))
}
