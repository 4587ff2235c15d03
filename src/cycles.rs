//! A pure function from an instruction to an estimated 8086 cycle
//! cost, per a static per-(mnemonic, operand-kind) cost table.

use crate::instruction::{Instruction, Mnemonic};
use crate::operand::{EaBase, Operand};
use crate::registers::{Register, RegisterIndex};

/// Which of the four operand shapes a slot occupies, for the purpose
/// of looking up a row/column in the cost table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandKind {
    Register,
    Immediate,
    Memory,
}

impl OperandKind {
    fn of(operand: Operand) -> Self {
        match operand {
            Operand::Register(_) => OperandKind::Register,
            Operand::Immediate { .. } => OperandKind::Immediate,
            Operand::DirectAddress { .. } | Operand::EffectiveAddress { .. } => OperandKind::Memory,
        }
    }
}

/// The effective-address cycle penalty for a memory operand; `None`
/// for non-memory operands.
fn ea_cost(operand: Operand) -> Option<u32> {
    match operand {
        Operand::DirectAddress { .. } => Some(6),
        Operand::EffectiveAddress { base, disp, .. } => {
            let mut cost = 5;
            cost += match base {
                EaBase::BxDi | EaBase::BpSi => 3,
                EaBase::BxSi | EaBase::BpDi => 2,
                EaBase::Si | EaBase::Di | EaBase::Bp | EaBase::Bx => 0,
            };
            if disp != 0 {
                cost += 4;
            }
            Some(cost)
        }
        Operand::Register(_) | Operand::Immediate { .. } => None,
    }
}

fn is_accumulator(operand: Operand) -> bool {
    matches!(operand, Operand::Register(register) if register.is_accumulator())
}

/// Estimates the cycle cost of `instruction`, or `None` if its
/// mnemonic has no documented cost (anything outside mov/add/sub/cmp).
///
/// # Panics
///
/// Panics if `instruction` somehow carries two memory operands; the
/// decoder never produces that combination.
pub fn estimate_cycles(instruction: &Instruction) -> Option<u32> {
    let dest = instruction.destination()?;
    let source = instruction.source()?;
    let dest_kind = OperandKind::of(dest);
    let source_kind = OperandKind::of(source);

    let ea_penalty = ea_cost(dest).or_else(|| ea_cost(source)).unwrap_or(0);

    let base = match instruction.mnemonic {
        Mnemonic::Mov => match (dest_kind, source_kind) {
            (OperandKind::Register, OperandKind::Register) => {
                if is_accumulator(source) {
                    10
                } else {
                    2
                }
            }
            (OperandKind::Register, OperandKind::Immediate) => 4,
            (OperandKind::Register, OperandKind::Memory) => 8 + ea_penalty,
            (OperandKind::Memory, OperandKind::Register) => {
                if is_accumulator(source) {
                    10 + ea_penalty
                } else {
                    9 + ea_penalty
                }
            }
            (OperandKind::Memory, OperandKind::Immediate) => 10 + ea_penalty,
            (OperandKind::Memory, OperandKind::Memory) => unreachable!("decoder never produces (mem, mem)"),
            (OperandKind::Immediate, _) => unreachable!("an immediate is never a destination"),
        },
        Mnemonic::Add | Mnemonic::Sub => match (dest_kind, source_kind) {
            (OperandKind::Register, OperandKind::Register) => 3,
            (OperandKind::Register, OperandKind::Immediate) => 4,
            (OperandKind::Register, OperandKind::Memory) => 9 + ea_penalty,
            (OperandKind::Memory, OperandKind::Register) => 16 + ea_penalty,
            (OperandKind::Memory, OperandKind::Immediate) => 17 + ea_penalty,
            (OperandKind::Memory, OperandKind::Memory) => unreachable!("decoder never produces (mem, mem)"),
            (OperandKind::Immediate, _) => unreachable!("an immediate is never a destination"),
        },
        Mnemonic::Cmp => match (dest_kind, source_kind) {
            (OperandKind::Register, OperandKind::Register) => 3,
            (OperandKind::Register, OperandKind::Immediate) => 4,
            (OperandKind::Register, OperandKind::Memory) => 9 + ea_penalty,
            (OperandKind::Memory, OperandKind::Register) => 9 + ea_penalty,
            (OperandKind::Memory, OperandKind::Immediate) => 10 + ea_penalty,
            (OperandKind::Memory, OperandKind::Memory) => unreachable!("decoder never produces (mem, mem)"),
            (OperandKind::Immediate, _) => unreachable!("an immediate is never a destination"),
        },
        _ => return None,
    };

    Some(base)
}

fn reg_reg(mnemonic: Mnemonic, dest: RegisterIndex, src: RegisterIndex) -> Instruction {
    Instruction::new(
        mnemonic,
        2,
        [
            Some(Operand::Register(Register::word(dest))),
            Some(Operand::Register(Register::word(src))),
        ],
    )
}

#[test]
fn add_with_effective_address_source() {
    let instruction = Instruction::new(
        Mnemonic::Add,
        2,
        [
            Some(Operand::Register(Register::word(RegisterIndex::B))),
            Some(Operand::EffectiveAddress {
                base: EaBase::BxSi,
                disp: 0,
                wide: true,
            }),
        ],
    );
    assert_eq!(estimate_cycles(&instruction), Some(9 + 7));
}

#[test]
fn mov_accumulator_bonus_applies_only_to_the_accumulator() {
    let accumulator_source = reg_reg(Mnemonic::Mov, RegisterIndex::B, RegisterIndex::A);
    let other_source = reg_reg(Mnemonic::Mov, RegisterIndex::B, RegisterIndex::C);
    assert_eq!(estimate_cycles(&accumulator_source), Some(10));
    assert_eq!(estimate_cycles(&other_source), Some(2));
}

#[test]
fn mnemonics_outside_the_documented_table_have_no_cost() {
    let instruction = reg_reg(Mnemonic::And, RegisterIndex::A, RegisterIndex::B);
    assert_eq!(estimate_cycles(&instruction), None);
}

#[test]
fn direct_address_ea_cost_is_flat_six() {
    let instruction = Instruction::new(
        Mnemonic::Mov,
        3,
        [
            Some(Operand::Register(Register::word(RegisterIndex::A))),
            Some(Operand::DirectAddress { offset: 16 }),
        ],
    );
    assert_eq!(estimate_cycles(&instruction), Some(8 + 6));
}
