//! Code templates for `push`.

use crate::hack::{Comp, Dest, Instruction};
use crate::vm::Segment;

use super::arithmetic::increment_sp;
use super::segment::{pointer_register, resolve};
use super::{static_symbol, TranslateError};

/// Pushes the value of `D`.
fn push_d() -> Vec<Instruction> {
    let mut code = vec![
        Instruction::at("SP"),
        Instruction::assign(Dest::A, Comp::M),
        Instruction::assign(Dest::M, Comp::D),
    ];
    code.extend(increment_sp());
    code
}

/// Pushes `value` itself.
pub fn constant(value: u16) -> Vec<Instruction> {
    let mut code = vec![Instruction::constant(value), Instruction::assign(Dest::D, Comp::A)];
    code.extend(push_d());
    code
}

/// Pushes the word stored at `symbol`.
pub fn from_symbol(symbol: &str) -> Vec<Instruction> {
    let mut code = vec![Instruction::at(symbol), Instruction::assign(Dest::D, Comp::M)];
    code.extend(push_d());
    code
}

/// Pushes `segment[offset]` for a segment with a base address.
pub fn general(segment: Segment, offset: u16) -> Result<Vec<Instruction>, TranslateError> {
    let base = resolve(segment);

    if base.is_special() {
        return Err(TranslateError::NotOffsetAddressable(segment));
    }

    let mut code = vec![Instruction::constant(offset), Instruction::assign(Dest::D, Comp::A)];
    code.extend(base.instructions());
    code.push(Instruction::assign(Dest::A, Comp::DPlusA));
    code.push(Instruction::assign(Dest::D, Comp::M));
    code.extend(push_d());

    Ok(code)
}

/// Code for `push segment offset` in source unit `unit`.
pub fn translate(
    segment: Segment,
    offset: u16,
    unit: &str,
) -> Result<Vec<Instruction>, TranslateError> {
    match segment {
        Segment::Constant => Ok(constant(offset)),
        Segment::Pointer => Ok(from_symbol(pointer_register(offset))),
        Segment::Static => Ok(from_symbol(&static_symbol(unit, offset))),
        segment => general(segment, offset),
    }
}
