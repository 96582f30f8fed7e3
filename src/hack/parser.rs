use std::fmt;
use std::result::Result as StdResult;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1, take_while_m_n},
    character::complete::char,
    combinator::{map, opt, recognize},
    error::context,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use super::instruction::{Address, Comp, Dest, Instruction, Jump};

/// The largest value an A-instruction can load.
pub const MAX_CONSTANT: u16 = 0x7FFF;

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ConstantTooLarge,
    InvalidDest(String),
    InvalidComp(String),
    InvalidJump(String),
    TrailingInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::ConstantTooLarge => {
                write!(f, "constant does not fit in {} bits", 15)
            }
            ErrorKind::InvalidDest(dest) => write!(f, "invalid destination '{}'", dest),
            ErrorKind::InvalidComp(comp) => write!(f, "invalid computation '{}'", comp),
            ErrorKind::InvalidJump(jump) => write!(f, "invalid jump '{}'", jump),
            ErrorKind::TrailingInput => write!(f, "unexpected input after the instruction"),
        }
    }
}

pub type ParseError = crate::error::ParseError<ErrorKind>;
type Result<'a, T> = IResult<&'a str, T, ParseError>;

const SPACE_CHARACTERS: &str = " \t\r";
const SYMBOL_CHARACTERS: &str = "_.$:";
const DEST_CHARACTERS: &str = "ADM";
const OPERATOR_CHARACTERS: &str = "!-+&|";

fn sp(input: &str) -> Result<&str> {
    take_while(|c| SPACE_CHARACTERS.contains(c))(input)
}

fn failure<T>(input: &str, kind: ErrorKind) -> Result<T> {
    Err(nom::Err::Failure(ParseError::from_kind(input, kind)))
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || SYMBOL_CHARACTERS.contains(c)
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SYMBOL_CHARACTERS.contains(c)
}

fn symbol(input: &str) -> Result<&str> {
    recognize(pair(
        take_while_m_n(1, 1, is_symbol_start),
        take_while(is_symbol_char),
    ))(input)
}

fn constant(input: &str) -> Result<u16> {
    let (rest, digits) = take_while1(|c: char| c.is_ascii_digit())(input)?;

    match digits.parse::<u16>() {
        Ok(value) if value <= MAX_CONSTANT => Ok((rest, value)),
        _ => failure(input, ErrorKind::ConstantTooLarge),
    }
}

fn address(input: &str) -> Result<Instruction> {
    let (input, _) = char('@')(input)?;

    context(
        "address",
        map(
            alt((
                map(constant, Address::Constant),
                map(symbol, |s: &str| Address::Symbol(s.to_string())),
            )),
            Instruction::Address,
        ),
    )(input)
}

fn label(input: &str) -> Result<Instruction> {
    map(
        delimited(char('('), context("label", symbol), char(')')),
        |name: &str| Instruction::label(name),
    )(input)
}

fn compute(input: &str) -> Result<Instruction> {
    let dest_start = input;
    let (input, dest) = opt(terminated(
        take_while1(|c: char| DEST_CHARACTERS.contains(c)),
        char('='),
    ))(input)?;

    let dest = match dest.map(Dest::from_str) {
        None => Dest::NONE,
        Some(Ok(dest)) => dest,
        Some(Err(())) => {
            let text = dest.unwrap_or_default().to_string();
            return failure(dest_start, ErrorKind::InvalidDest(text));
        }
    };

    let comp_start = input;
    let (input, comp) = take_while1(|c: char| {
        c.is_ascii_alphanumeric() || OPERATOR_CHARACTERS.contains(c)
    })(input)?;

    let comp = match Comp::from_str(comp) {
        Ok(comp) => comp,
        Err(()) => return failure(comp_start, ErrorKind::InvalidComp(comp.to_string())),
    };

    let jump_start = input;
    let (input, jump) = opt(preceded(
        char(';'),
        take_while1(|c: char| c.is_ascii_uppercase()),
    ))(input)?;

    let jump = match jump.map(Jump::from_str) {
        None => None,
        Some(Ok(jump)) => Some(jump),
        Some(Err(())) => {
            let text = jump.unwrap_or_default().to_string();
            return failure(jump_start, ErrorKind::InvalidJump(text));
        }
    };

    Ok((input, Instruction::Compute { dest, comp, jump }))
}

fn comment(input: &str) -> Result<&str> {
    preceded(tag("//"), take_while(|_: char| true))(input)
}

fn line(input: &str) -> Result<Option<Instruction>> {
    let (input, _) = sp(input)?;
    let (input, instruction) = opt(alt((address, label, compute)))(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = opt(comment)(input)?;

    if !input.is_empty() {
        return failure(input, ErrorKind::TrailingInput);
    }

    Ok((input, instruction))
}

/// Parses one line of symbolic assembly.
///
/// Returns `None` for lines that hold only whitespace or a comment.
pub fn parse_line(input: &str) -> StdResult<Option<Instruction>, ParseError> {
    match line(input) {
        Ok((_, instruction)) => Ok(instruction),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::incomplete()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Instruction {
        parse_line(input).unwrap().unwrap()
    }

    #[test]
    fn test_address() {
        assert_eq!(parse("@SP"), Instruction::at("SP"));
        assert_eq!(parse("  @17 // seventeen"), Instruction::constant(17));
        assert_eq!(parse("@eq$true.3"), Instruction::at("eq$true.3"));
        assert_eq!(parse("@Foo.0"), Instruction::at("Foo.0"));
    }

    #[test]
    fn test_constant_too_large() {
        let err = parse_line("@32768").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::ConstantTooLarge));
        assert_eq!(err.verbose("@32768", 4).column, 2);
    }

    #[test]
    fn test_label() {
        assert_eq!(parse("(LOOP)"), Instruction::label("LOOP"));
        assert!(parse_line("(LOOP").is_err());
    }

    #[test]
    fn test_compute() {
        assert_eq!(parse("AM=M-1"), Instruction::assign(Dest::AM, Comp::MMinusOne));
        assert_eq!(parse("D=M+D"), Instruction::assign(Dest::D, Comp::DPlusM));
        assert_eq!(parse("D;JEQ"), Instruction::jump(Comp::D, Jump::Equal));
        assert_eq!(parse("0;JMP"), Instruction::jump(Comp::Zero, Jump::Always));
        assert_eq!(parse("M=-1"), Instruction::assign(Dest::M, Comp::MinusOne));
        assert_eq!(
            parse("MD=D+1;JNE"),
            Instruction::Compute {
                dest: Dest { a: false, d: true, m: true },
                comp: Comp::DPlusOne,
                jump: Some(Jump::NotEqual),
            }
        );
    }

    #[test]
    fn test_invalid_compute() {
        let err = parse_line("D=M+2").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidComp("M+2".into())));

        let err = parse_line("DD=M").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidDest("DD".into())));

        let err = parse_line("D;JXX").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InvalidJump("JXX".into())));
        assert_eq!(err.verbose("D;JXX", 1).column, 2);

        let err = parse_line("D=M junk").unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::TrailingInput));
    }

    #[test]
    fn test_empty_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   // comment only"), Ok(None));
    }

    #[test]
    fn test_render_and_parse() {
        for text in &["@SP", "AM=M-1", "D=M-D", "(lt$true.7)", "D;JLT", "M=!M"] {
            assert_eq!(parse(text).to_string(), *text);
        }
    }
}
