//! The Hack target: typed instructions, a parser for symbolic assembly and an assembler.

pub mod instruction;
pub mod parser;
pub mod program;

pub use self::instruction::{Address, Comp, Dest, Instruction, Jump};
pub use self::program::{AssembleError, Image, Program};
