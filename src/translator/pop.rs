//! Code templates for `pop`.

use crate::hack::{Comp, Dest, Instruction};
use crate::vm::Segment;

use super::segment::{pointer_register, resolve};
use super::{static_symbol, TranslateError};

/// Cell that holds the target address while the popped value is fetched.
pub const SCRATCH: &str = "R13";

/// Pops the top of the stack into `D`.
fn pop_d() -> Vec<Instruction> {
    vec![
        Instruction::at("SP"),
        Instruction::assign(Dest::M, Comp::MMinusOne),
        Instruction::assign(Dest::A, Comp::M),
        Instruction::assign(Dest::D, Comp::M),
    ]
}

/// Pops the top of the stack into the word at `symbol`.
pub fn into_symbol(symbol: &str) -> Vec<Instruction> {
    let mut code = pop_d();
    code.push(Instruction::at(symbol));
    code.push(Instruction::assign(Dest::M, Comp::D));
    code
}

/// Pops into `segment[offset]` for a segment with a base address.
pub fn general(segment: Segment, offset: u16) -> Result<Vec<Instruction>, TranslateError> {
    let base = resolve(segment);

    if base.is_special() {
        return Err(TranslateError::NotOffsetAddressable(segment));
    }

    let mut code = vec![Instruction::constant(offset), Instruction::assign(Dest::D, Comp::A)];
    code.extend(base.instructions());
    code.push(Instruction::assign(Dest::D, Comp::DPlusA));
    code.push(Instruction::at(SCRATCH));
    code.push(Instruction::assign(Dest::M, Comp::D));
    code.extend(pop_d());
    code.push(Instruction::at(SCRATCH));
    code.push(Instruction::assign(Dest::A, Comp::M));
    code.push(Instruction::assign(Dest::M, Comp::D));

    Ok(code)
}

/// Code for `pop segment offset` in source unit `unit`.
pub fn translate(
    segment: Segment,
    offset: u16,
    unit: &str,
) -> Result<Vec<Instruction>, TranslateError> {
    match segment {
        Segment::Constant => Err(TranslateError::PopConstant),
        Segment::Pointer => Ok(into_symbol(pointer_register(offset))),
        Segment::Static => Ok(into_symbol(&static_symbol(unit, offset))),
        segment => general(segment, offset),
    }
}
