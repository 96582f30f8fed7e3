//! Types for representing VM commands and their parts.

use std::fmt;

/// A named region of storage that `push` and `pop` address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Locals of the current function. Base address held in `LCL`.
    Local,

    /// Arguments of the current function. Base address held in `ARG`.
    Argument,

    /// Base address held in `THIS`.
    This,

    /// Base address held in `THAT`.
    That,

    /// Eight scratch words at a fixed base address.
    Temp,

    /// The `THIS` (offset 0) and `THAT` (any other offset) pointer registers themselves.
    Pointer,

    /// Globals of the source unit, addressed by the symbol `Unit.offset`.
    Static,

    /// Not storage at all: pushing from it pushes the offset as an immediate value.
    Constant,
}

impl Segment {
    /// All segments, in the order they are usually listed.
    pub const ALL: [Segment; 8] = [
        Segment::Local,
        Segment::Argument,
        Segment::This,
        Segment::That,
        Segment::Temp,
        Segment::Pointer,
        Segment::Static,
        Segment::Constant,
    ];

    /// The keyword of the segment in VM source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
            Segment::Static => "static",
            Segment::Constant => "constant",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators that replace the top of the stack with a function of itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Two's complement negation.
    Neg,
    /// Bitwise not.
    Not,
}

/// Operators that pop two values and push one non-boolean result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
}

/// Operators that pop two values and push `-1` (true) or `0` (false).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `left == right`
    Eq,
    /// `left > right`
    Gt,
    /// `left < right`
    Lt,
}

/// An arithmetic or logical VM command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
    Compare(Comparison),
}

impl Operator {
    /// All operators, in the order they are usually listed.
    pub const ALL: [Operator; 9] = [
        Operator::Binary(BinaryOp::Add),
        Operator::Binary(BinaryOp::Sub),
        Operator::Unary(UnaryOp::Neg),
        Operator::Compare(Comparison::Eq),
        Operator::Compare(Comparison::Gt),
        Operator::Compare(Comparison::Lt),
        Operator::Binary(BinaryOp::And),
        Operator::Binary(BinaryOp::Or),
        Operator::Unary(UnaryOp::Not),
    ];

    /// The keyword of the operator in VM source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Unary(UnaryOp::Neg) => "neg",
            Operator::Unary(UnaryOp::Not) => "not",
            Operator::Binary(BinaryOp::Add) => "add",
            Operator::Binary(BinaryOp::Sub) => "sub",
            Operator::Binary(BinaryOp::And) => "and",
            Operator::Binary(BinaryOp::Or) => "or",
            Operator::Compare(Comparison::Eq) => "eq",
            Operator::Compare(Comparison::Gt) => "gt",
            Operator::Compare(Comparison::Lt) => "lt",
        }
    }

    /// Change of the stack depth caused by executing the operator.
    pub fn stack_effect(&self) -> i32 {
        match self {
            Operator::Unary(_) => 0,
            Operator::Binary(_) | Operator::Compare(_) => -1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&Operator::Compare(*self), f)
    }
}

/// A single decoded VM command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// An arithmetic or logical operation on the top of the stack.
    Arithmetic(Operator),

    /// Push the value at `segment[offset]` on the stack.
    Push(Segment, u16),

    /// Pop the top of the stack into `segment[offset]`.
    Pop(Segment, u16),
}

impl Command {
    /// Change of the stack depth caused by executing the command.
    pub fn stack_effect(&self) -> i32 {
        match self {
            Command::Arithmetic(op) => op.stack_effect(),
            Command::Push(..) => 1,
            Command::Pop(..) => -1,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(segment, offset) => write!(f, "push {} {}", segment, offset),
            Command::Pop(segment, offset) => write!(f, "pop {} {}", segment, offset),
        }
    }
}

#[test]
fn test_command_display() {
    assert_eq!(Command::Push(Segment::Constant, 7).to_string(), "push constant 7");
    assert_eq!(Command::Pop(Segment::Temp, 3).to_string(), "pop temp 3");
    assert_eq!(Command::Arithmetic(Operator::Compare(Comparison::Lt)).to_string(), "lt");
}

#[test]
fn test_stack_effect() {
    assert_eq!(Command::Arithmetic(Operator::Unary(UnaryOp::Not)).stack_effect(), 0);
    assert_eq!(Command::Arithmetic(Operator::Binary(BinaryOp::Sub)).stack_effect(), -1);
    assert_eq!(Command::Arithmetic(Operator::Compare(Comparison::Eq)).stack_effect(), -1);
    assert_eq!(Command::Push(Segment::Local, 0).stack_effect(), 1);
    assert_eq!(Command::Pop(Segment::Local, 0).stack_effect(), -1);
}
