//! Tokens and a tokenizer for VM source.

use logos::{Lexer, Logos};

use std::fmt;
use std::ops::Range;

use edit_distance::edit_distance;

use super::command::{BinaryOp, Comparison, Operator, Segment, UnaryOp};

/// Byte range of a token in the line it was read from.
pub type Span = Range<usize>;

/// Suggestions further away than this from the misspelled word are not offered.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// The two commands that move values between the stack and a segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StackOp {
    Push,
    Pop,
}

impl StackOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackOp::Push => "push",
            StackOp::Pop => "pop",
        }
    }
}

/// Enumeration of all tokens of the VM format.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Errorneous token that could not be interpreted as any of the other variants.
    /// Also produced for numbers that do not fit in 16 bits.
    #[error]
    #[regex(r"[ \t\r\f\n]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,

    /// An arithmetic or logical command.
    #[regex("(?i)add|sub|neg|eq|gt|lt|and|or|not", operator_callback)]
    Operator(Operator),

    /// `push` or `pop`.
    #[regex("(?i)push|pop", stack_callback)]
    Stack(StackOp),

    /// A memory segment keyword.
    #[regex("(?i)local|argument|this|that|temp|pointer|static|constant", segment_callback)]
    Segment(Segment),

    /// A VM command this translator recognises but does not implement.
    #[regex("(?i)label|goto|if-goto|function|call|return", Lexer::slice)]
    Unsupported(&'a str),

    /// A non-negative decimal number.
    #[regex("[0-9]+", number_callback)]
    Number(u16),

    /// Any other word. Never valid, kept so that errors can name it.
    #[regex(r"[A-Za-z_.$:][A-Za-z0-9_.$:]*", Lexer::slice)]
    Word(&'a str),
}

fn operator_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Option<Operator> {
    let operator = match lex.slice().to_lowercase().as_ref() {
        "add" => Operator::Binary(BinaryOp::Add),
        "sub" => Operator::Binary(BinaryOp::Sub),
        "and" => Operator::Binary(BinaryOp::And),
        "or" => Operator::Binary(BinaryOp::Or),
        "neg" => Operator::Unary(UnaryOp::Neg),
        "not" => Operator::Unary(UnaryOp::Not),
        "eq" => Operator::Compare(Comparison::Eq),
        "gt" => Operator::Compare(Comparison::Gt),
        "lt" => Operator::Compare(Comparison::Lt),
        _ => return None,
    };

    Some(operator)
}

fn stack_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Option<StackOp> {
    match lex.slice().to_lowercase().as_ref() {
        "push" => Some(StackOp::Push),
        "pop" => Some(StackOp::Pop),
        _ => None,
    }
}

fn segment_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Option<Segment> {
    let slice = lex.slice().to_lowercase();

    Segment::ALL
        .iter()
        .copied()
        .find(|segment| segment.as_str() == slice)
}

fn number_callback<'a>(
    lex: &mut Lexer<'a, Token<'a>>,
) -> std::result::Result<u16, std::num::ParseIntError> {
    lex.slice().parse()
}

impl<'a> Token<'a> {
    /// Splits a line of VM source into tokens. Comments are dropped.
    pub fn tokenize(line: &'a str) -> Vec<(Token<'a>, Span)> {
        Token::lexer(line).spanned().collect()
    }

    /// Classifies a single, already separated word.
    ///
    /// Returns [Token::Error] unless the whole word is a single token.
    pub fn from_word(word: &'a str) -> Token<'a> {
        let mut tokens = Token::lexer(word).spanned();

        match (tokens.next(), tokens.next()) {
            (Some((token, span)), None) if span == (0..word.len()) => token,
            _ => Token::Error,
        }
    }
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Stack(op) => write!(f, "{}", op.as_str()),
            Token::Segment(segment) => write!(f, "{}", segment),
            Token::Unsupported(word) => write!(f, "{}", word),
            Token::Number(num) => write!(f, "{}", num),
            Token::Word(word) => write!(f, "{}", word),
        }
    }
}

/// Returns the keyword in `candidates` closest to `word`, if any is close enough to be a likely
/// misspelling.
///
/// A keyword is only close enough if fewer edits than the length of `word` reach it, so very
/// short words get no suggestion.
pub fn suggest<I>(word: &str, candidates: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'static str>,
{
    let word = word.to_lowercase();
    let length = word.chars().count();

    candidates
        .into_iter()
        .map(|candidate| (edit_distance(&word, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE && *distance < length)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Keywords that can start a command.
pub fn command_keywords() -> impl Iterator<Item = &'static str> {
    Operator::ALL
        .to_vec()
        .into_iter()
        .map(|op| op.as_str())
        .chain(vec![StackOp::Push.as_str(), StackOp::Pop.as_str()])
}

/// Keywords that name a segment.
pub fn segment_keywords() -> impl Iterator<Item = &'static str> {
    Segment::ALL.to_vec().into_iter().map(|segment| segment.as_str())
}
