//! Code templates for the arithmetic and logical commands.

use crate::hack::{Comp, Dest, Instruction, Jump};
use crate::symbol::SymbolAllocator;
use crate::vm::{BinaryOp, Comparison, Operator, UnaryOp};

/// `SP--`, leaving `A` pointing at the new top slot.
fn pop_address() -> Vec<Instruction> {
    vec![Instruction::at("SP"), Instruction::assign(Dest::AM, Comp::MMinusOne)]
}

/// `SP++`
pub(crate) fn increment_sp() -> Vec<Instruction> {
    vec![Instruction::at("SP"), Instruction::assign(Dest::M, Comp::MPlusOne)]
}

/// Pops the right operand into `D` and leaves `A` pointing at the left operand.
fn pop_operands() -> Vec<Instruction> {
    let mut code = pop_address();
    code.push(Instruction::assign(Dest::D, Comp::M));
    code.extend(pop_address());
    code
}

fn unary_comp(op: UnaryOp) -> Comp {
    match op {
        UnaryOp::Neg => Comp::NegM,
        UnaryOp::Not => Comp::NotM,
    }
}

fn binary_comp(op: BinaryOp) -> Comp {
    match op {
        BinaryOp::Add => Comp::DPlusM,
        BinaryOp::Sub => Comp::MMinusD,
        BinaryOp::And => Comp::DAndM,
        BinaryOp::Or => Comp::DOrM,
    }
}

fn comparison_jump(comparison: Comparison) -> Jump {
    match comparison {
        Comparison::Eq => Jump::Equal,
        Comparison::Gt => Jump::Greater,
        Comparison::Lt => Jump::Less,
    }
}

/// Replaces the top of the stack with `op` applied to it.
pub fn unary(op: UnaryOp) -> Vec<Instruction> {
    let mut code = pop_address();
    code.push(Instruction::assign(Dest::M, unary_comp(op)));
    code.extend(increment_sp());
    code
}

/// Pops `y`, then `x`, and pushes `x op y`.
pub fn binary(op: BinaryOp) -> Vec<Instruction> {
    let mut code = pop_operands();
    code.push(Instruction::assign(Dest::D, binary_comp(op)));
    code.push(Instruction::assign(Dest::M, Comp::D));
    code.extend(increment_sp());
    code
}

/// Pops `y`, then `x`, and pushes `-1` if `x comparison y` holds and `0` otherwise.
///
/// Allocates one label from `allocator`, named after the comparison.
pub fn compare(comparison: Comparison, allocator: &SymbolAllocator) -> Vec<Instruction> {
    let base = format!("{}$true", Operator::Compare(comparison));
    let label = allocator.allocate(base.as_str()).to_string();

    let mut code = pop_operands();
    code.push(Instruction::assign(Dest::D, Comp::MMinusD));

    // Assume true, jump over the overwrite with false when the comparison holds.
    code.push(Instruction::at("SP"));
    code.push(Instruction::assign(Dest::A, Comp::M));
    code.push(Instruction::assign(Dest::M, Comp::MinusOne));
    code.push(Instruction::at(label.as_str()));
    code.push(Instruction::jump(Comp::D, comparison_jump(comparison)));
    code.push(Instruction::at("SP"));
    code.push(Instruction::assign(Dest::A, Comp::M));
    code.push(Instruction::assign(Dest::M, Comp::Zero));
    code.push(Instruction::label(label));

    code.extend(increment_sp());
    code
}

/// Code for any arithmetic or logical command.
pub fn translate(op: Operator, allocator: &SymbolAllocator) -> Vec<Instruction> {
    match op {
        Operator::Unary(op) => unary(op),
        Operator::Binary(op) => binary(op),
        Operator::Compare(comparison) => compare(comparison, allocator),
    }
}
