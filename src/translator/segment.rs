//! Base address computation for the offset-addressed segments.

use crate::hack::{Comp, Dest, Instruction};
use crate::vm::Segment;

/// Fixed base address of the `temp` segment.
pub const TEMP_BASE: u16 = 5;

/// How to get the base address of a segment into `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressProgram {
    /// The base is stored in the named register: `@REG`, `A=M`.
    Indirect(&'static str),

    /// The base is a constant: `@base`.
    Fixed(u16),

    /// The segment has no base address and is handled by its own template.
    Special,
}

impl AddressProgram {
    /// The instructions that leave the base address in `A`. Empty for [AddressProgram::Special].
    pub fn instructions(&self) -> Vec<Instruction> {
        match self {
            AddressProgram::Indirect(register) => vec![
                Instruction::at(*register),
                Instruction::assign(Dest::A, Comp::M),
            ],
            AddressProgram::Fixed(base) => vec![Instruction::constant(*base)],
            AddressProgram::Special => Vec::new(),
        }
    }

    pub fn is_special(&self) -> bool {
        *self == AddressProgram::Special
    }
}

/// Picks the address program of `segment`.
pub fn resolve(segment: Segment) -> AddressProgram {
    match segment {
        Segment::Local => AddressProgram::Indirect("LCL"),
        Segment::Argument => AddressProgram::Indirect("ARG"),
        Segment::This => AddressProgram::Indirect("THIS"),
        Segment::That => AddressProgram::Indirect("THAT"),
        Segment::Temp => AddressProgram::Fixed(TEMP_BASE),
        Segment::Pointer | Segment::Static | Segment::Constant => AddressProgram::Special,
    }
}

/// The register `pointer offset` refers to.
pub fn pointer_register(offset: u16) -> &'static str {
    if offset == 0 {
        "THIS"
    } else {
        "THAT"
    }
}
