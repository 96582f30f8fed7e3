//! Parsing and storing VM programs.

pub mod command;
pub mod parser;
pub mod program;
pub mod token;

pub use self::command::{BinaryOp, Command, Comparison, Operator, Segment, UnaryOp};
pub use self::program::{CommandEntry, Program};
