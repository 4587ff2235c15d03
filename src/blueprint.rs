//! The declarative catalogue of recognised opcodes.
//!
//! Each [`Blueprint`] is an ordered list of [`BitPart`]s describing one
//! instruction encoding, bit by bit, in the order they appear in the
//! byte stream. [`crate::decode`] is the single interpreter that walks
//! this table; no opcode-specific logic lives outside it.

use crate::instruction::Mnemonic;

/// What a [`BitPart`] contributes to the field table built up while
/// matching a blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartKind {
    /// A fixed bit pattern that must match verbatim.
    Literal,
    Mod,
    Reg,
    Rm,
    /// Width: 0 = byte, 1 = word.
    W,
    /// Direction: 1 ⇒ `reg` field is the destination.
    D,
    /// Sign-extension flag for immediates in ALU encodings.
    S,
    /// "Reverse direction" marker for accumulator-memory forms.
    E,
    /// Marks that trailing immediate data follows the fixed portion.
    HasData,
    /// Marks that a mod/rm-selected displacement follows.
    HasDisp,
    /// Marks that a 16-bit direct address follows.
    HasAddr,
}

/// One field within a blueprint: either a bit-count to read and
/// compare/store, or a zero-width marker/implicit value.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BitPart {
    pub kind: PartKind,
    pub bits: u8,
    pub value: u8,
}

impl BitPart {
    const fn literal(bits: u8, value: u8) -> Self {
        Self {
            kind: PartKind::Literal,
            bits,
            value,
        }
    }

    const fn field(kind: PartKind, bits: u8) -> Self {
        Self {
            kind,
            bits,
            value: 0,
        }
    }

    const fn implicit(kind: PartKind, value: u8) -> Self {
        Self {
            kind,
            bits: 0,
            value,
        }
    }

    const fn marker(kind: PartKind) -> Self {
        Self {
            kind,
            bits: 0,
            value: 0,
        }
    }
}

/// A named mnemonic plus its ordered bit parts.
pub(crate) struct Blueprint {
    pub mnemonic: Mnemonic,
    pub parts: &'static [BitPart],
}

use PartKind::{D, E, HasAddr, HasData, HasDisp, Mod, Reg, Rm, S, W};

const MOV_RM_REG: &[BitPart] = &[
    BitPart::literal(6, 0b100010),
    BitPart::field(D, 1),
    BitPart::field(W, 1),
    BitPart::field(Mod, 2),
    BitPart::field(Reg, 3),
    BitPart::field(Rm, 3),
    BitPart::marker(HasDisp),
];

const MOV_IMM_RM: &[BitPart] = &[
    BitPart::literal(7, 0b1100011),
    BitPart::field(W, 1),
    BitPart::field(Mod, 2),
    BitPart::literal(3, 0b000),
    BitPart::field(Rm, 3),
    BitPart::marker(HasDisp),
    BitPart::marker(HasData),
];

const MOV_IMM_REG: &[BitPart] = &[
    BitPart::literal(4, 0b1011),
    BitPart::field(W, 1),
    BitPart::field(Reg, 3),
    BitPart::implicit(D, 1),
    BitPart::marker(HasData),
];

const MOV_ACC_MEM: &[BitPart] = &[
    BitPart::literal(6, 0b101000),
    BitPart::field(E, 1),
    BitPart::field(W, 1),
    BitPart::implicit(Reg, 0),
    BitPart::marker(HasAddr),
];

/// `(mnemonic, 3-bit op field value)` shared by the ALU r/m↔reg and
/// ALU imm→r/m families, in encoding order.
const ALU_OPS: [(Mnemonic, u8); 8] = [
    (Mnemonic::Add, 0b000),
    (Mnemonic::Or, 0b001),
    (Mnemonic::Adc, 0b010),
    (Mnemonic::Sbb, 0b011),
    (Mnemonic::And, 0b100),
    (Mnemonic::Sub, 0b101),
    (Mnemonic::Xor, 0b110),
    (Mnemonic::Cmp, 0b111),
];

/// `add`/`sub`/`cmp`, the only three members of [`ALU_OPS`] that also
/// have an imm→accumulator form.
const ALU_ACC_OPS: [(Mnemonic, u8); 3] = [
    (Mnemonic::Add, 0b000),
    (Mnemonic::Sub, 0b101),
    (Mnemonic::Cmp, 0b111),
];

/// `(mnemonic, 4-bit condition code)` for the conditional-jump family,
/// `0111 cccc | disp8`.
const JUMP_CONDITIONS: [(Mnemonic, u8); 16] = [
    (Mnemonic::Jo, 0b0000),
    (Mnemonic::Jno, 0b0001),
    (Mnemonic::Jb, 0b0010),
    (Mnemonic::Jnb, 0b0011),
    (Mnemonic::Je, 0b0100),
    (Mnemonic::Jne, 0b0101),
    (Mnemonic::Jbe, 0b0110),
    (Mnemonic::Ja, 0b0111),
    (Mnemonic::Js, 0b1000),
    (Mnemonic::Jns, 0b1001),
    (Mnemonic::Jp, 0b1010),
    (Mnemonic::Jnp, 0b1011),
    (Mnemonic::Jl, 0b1100),
    (Mnemonic::Jge, 0b1101),
    (Mnemonic::Jle, 0b1110),
    (Mnemonic::Jg, 0b1111),
];

/// `(mnemonic, 2-bit selector)` for `1110 00xx | disp8`.
const LOOP_FORMS: [(Mnemonic, u8); 4] = [
    (Mnemonic::Loopnz, 0b00),
    (Mnemonic::Loopz, 0b01),
    (Mnemonic::Loop, 0b10),
    (Mnemonic::Jcxz, 0b11),
];

macro_rules! alu_rm_reg_parts {
    ($op:expr) => {
        &[
            BitPart::literal(2, 0b00),
            BitPart::literal(3, $op),
            BitPart::literal(1, 0),
            BitPart::field(D, 1),
            BitPart::field(W, 1),
            BitPart::field(Mod, 2),
            BitPart::field(Reg, 3),
            BitPart::field(Rm, 3),
            BitPart::marker(HasDisp),
        ]
    };
}

macro_rules! alu_imm_rm_parts {
    ($op:expr) => {
        &[
            BitPart::literal(6, 0b100000),
            BitPart::field(S, 1),
            BitPart::field(W, 1),
            BitPart::field(Mod, 2),
            BitPart::literal(3, $op),
            BitPart::field(Rm, 3),
            BitPart::marker(HasDisp),
            BitPart::marker(HasData),
        ]
    };
}

macro_rules! alu_imm_acc_parts {
    ($op:expr) => {
        &[
            BitPart::literal(2, 0b00),
            BitPart::literal(3, $op),
            BitPart::literal(2, 0b10),
            BitPart::field(W, 1),
            BitPart::implicit(Reg, 0),
            BitPart::implicit(D, 1),
            BitPart::marker(HasData),
        ]
    };
}

macro_rules! jump_parts {
    ($cccc:expr) => {
        &[
            BitPart::literal(4, 0b0111),
            BitPart::literal(4, $cccc),
            BitPart::marker(HasData),
        ]
    };
}

macro_rules! loop_parts {
    ($xx:expr) => {
        &[
            BitPart::literal(4, 0b1110),
            BitPart::literal(2, 0b00),
            BitPart::literal(2, $xx),
            BitPart::marker(HasData),
        ]
    };
}

const ALU_RM_REG_ADD: &[BitPart] = alu_rm_reg_parts!(0b000);
const ALU_RM_REG_OR: &[BitPart] = alu_rm_reg_parts!(0b001);
const ALU_RM_REG_ADC: &[BitPart] = alu_rm_reg_parts!(0b010);
const ALU_RM_REG_SBB: &[BitPart] = alu_rm_reg_parts!(0b011);
const ALU_RM_REG_AND: &[BitPart] = alu_rm_reg_parts!(0b100);
const ALU_RM_REG_SUB: &[BitPart] = alu_rm_reg_parts!(0b101);
const ALU_RM_REG_XOR: &[BitPart] = alu_rm_reg_parts!(0b110);
const ALU_RM_REG_CMP: &[BitPart] = alu_rm_reg_parts!(0b111);

const ALU_IMM_RM_ADD: &[BitPart] = alu_imm_rm_parts!(0b000);
const ALU_IMM_RM_OR: &[BitPart] = alu_imm_rm_parts!(0b001);
const ALU_IMM_RM_ADC: &[BitPart] = alu_imm_rm_parts!(0b010);
const ALU_IMM_RM_SBB: &[BitPart] = alu_imm_rm_parts!(0b011);
const ALU_IMM_RM_AND: &[BitPart] = alu_imm_rm_parts!(0b100);
const ALU_IMM_RM_SUB: &[BitPart] = alu_imm_rm_parts!(0b101);
const ALU_IMM_RM_XOR: &[BitPart] = alu_imm_rm_parts!(0b110);
const ALU_IMM_RM_CMP: &[BitPart] = alu_imm_rm_parts!(0b111);

const ALU_IMM_ACC_ADD: &[BitPart] = alu_imm_acc_parts!(0b000);
const ALU_IMM_ACC_SUB: &[BitPart] = alu_imm_acc_parts!(0b101);
const ALU_IMM_ACC_CMP: &[BitPart] = alu_imm_acc_parts!(0b111);

const JUMP_0: &[BitPart] = jump_parts!(0b0000);
const JUMP_1: &[BitPart] = jump_parts!(0b0001);
const JUMP_2: &[BitPart] = jump_parts!(0b0010);
const JUMP_3: &[BitPart] = jump_parts!(0b0011);
const JUMP_4: &[BitPart] = jump_parts!(0b0100);
const JUMP_5: &[BitPart] = jump_parts!(0b0101);
const JUMP_6: &[BitPart] = jump_parts!(0b0110);
const JUMP_7: &[BitPart] = jump_parts!(0b0111);
const JUMP_8: &[BitPart] = jump_parts!(0b1000);
const JUMP_9: &[BitPart] = jump_parts!(0b1001);
const JUMP_10: &[BitPart] = jump_parts!(0b1010);
const JUMP_11: &[BitPart] = jump_parts!(0b1011);
const JUMP_12: &[BitPart] = jump_parts!(0b1100);
const JUMP_13: &[BitPart] = jump_parts!(0b1101);
const JUMP_14: &[BitPart] = jump_parts!(0b1110);
const JUMP_15: &[BitPart] = jump_parts!(0b1111);

const LOOP_0: &[BitPart] = loop_parts!(0b00);
const LOOP_1: &[BitPart] = loop_parts!(0b01);
const LOOP_2: &[BitPart] = loop_parts!(0b10);
const LOOP_3: &[BitPart] = loop_parts!(0b11);

/// The full, ordered catalogue. First-match: a blueprint earlier in
/// this list wins if its literal bits accept the input, but every
/// entry's literal bits are mutually exclusive by construction, so the
/// order only matters for readability.
pub(crate) static BLUEPRINT_TABLE: &[Blueprint] = &[
    Blueprint {
        mnemonic: Mnemonic::Mov,
        parts: MOV_RM_REG,
    },
    Blueprint {
        mnemonic: Mnemonic::Mov,
        parts: MOV_IMM_RM,
    },
    Blueprint {
        mnemonic: Mnemonic::Mov,
        parts: MOV_IMM_REG,
    },
    Blueprint {
        mnemonic: Mnemonic::Mov,
        parts: MOV_ACC_MEM,
    },
    Blueprint {
        mnemonic: ALU_OPS[0].0,
        parts: ALU_RM_REG_ADD,
    },
    Blueprint {
        mnemonic: ALU_OPS[1].0,
        parts: ALU_RM_REG_OR,
    },
    Blueprint {
        mnemonic: ALU_OPS[2].0,
        parts: ALU_RM_REG_ADC,
    },
    Blueprint {
        mnemonic: ALU_OPS[3].0,
        parts: ALU_RM_REG_SBB,
    },
    Blueprint {
        mnemonic: ALU_OPS[4].0,
        parts: ALU_RM_REG_AND,
    },
    Blueprint {
        mnemonic: ALU_OPS[5].0,
        parts: ALU_RM_REG_SUB,
    },
    Blueprint {
        mnemonic: ALU_OPS[6].0,
        parts: ALU_RM_REG_XOR,
    },
    Blueprint {
        mnemonic: ALU_OPS[7].0,
        parts: ALU_RM_REG_CMP,
    },
    Blueprint {
        mnemonic: ALU_OPS[0].0,
        parts: ALU_IMM_RM_ADD,
    },
    Blueprint {
        mnemonic: ALU_OPS[1].0,
        parts: ALU_IMM_RM_OR,
    },
    Blueprint {
        mnemonic: ALU_OPS[2].0,
        parts: ALU_IMM_RM_ADC,
    },
    Blueprint {
        mnemonic: ALU_OPS[3].0,
        parts: ALU_IMM_RM_SBB,
    },
    Blueprint {
        mnemonic: ALU_OPS[4].0,
        parts: ALU_IMM_RM_AND,
    },
    Blueprint {
        mnemonic: ALU_OPS[5].0,
        parts: ALU_IMM_RM_SUB,
    },
    Blueprint {
        mnemonic: ALU_OPS[6].0,
        parts: ALU_IMM_RM_XOR,
    },
    Blueprint {
        mnemonic: ALU_OPS[7].0,
        parts: ALU_IMM_RM_CMP,
    },
    Blueprint {
        mnemonic: ALU_ACC_OPS[0].0,
        parts: ALU_IMM_ACC_ADD,
    },
    Blueprint {
        mnemonic: ALU_ACC_OPS[1].0,
        parts: ALU_IMM_ACC_SUB,
    },
    Blueprint {
        mnemonic: ALU_ACC_OPS[2].0,
        parts: ALU_IMM_ACC_CMP,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[0].0,
        parts: JUMP_0,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[1].0,
        parts: JUMP_1,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[2].0,
        parts: JUMP_2,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[3].0,
        parts: JUMP_3,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[4].0,
        parts: JUMP_4,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[5].0,
        parts: JUMP_5,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[6].0,
        parts: JUMP_6,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[7].0,
        parts: JUMP_7,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[8].0,
        parts: JUMP_8,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[9].0,
        parts: JUMP_9,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[10].0,
        parts: JUMP_10,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[11].0,
        parts: JUMP_11,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[12].0,
        parts: JUMP_12,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[13].0,
        parts: JUMP_13,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[14].0,
        parts: JUMP_14,
    },
    Blueprint {
        mnemonic: JUMP_CONDITIONS[15].0,
        parts: JUMP_15,
    },
    Blueprint {
        mnemonic: LOOP_FORMS[0].0,
        parts: LOOP_0,
    },
    Blueprint {
        mnemonic: LOOP_FORMS[1].0,
        parts: LOOP_1,
    },
    Blueprint {
        mnemonic: LOOP_FORMS[2].0,
        parts: LOOP_2,
    },
    Blueprint {
        mnemonic: LOOP_FORMS[3].0,
        parts: LOOP_3,
    },
];

#[test]
fn every_blueprint_fixed_width_is_a_multiple_of_eight_bits() {
    for blueprint in BLUEPRINT_TABLE {
        let fixed_bits: u32 = blueprint
            .parts
            .iter()
            .map(|part| u32::from(part.bits))
            .sum();
        assert_eq!(
            fixed_bits % 8,
            0,
            "{:?} fixed width {fixed_bits} is not byte-aligned",
            blueprint.mnemonic
        );
    }
}

#[test]
fn table_has_the_expected_entry_count() {
    // 4 mov forms + 8 alu r/m<->reg + 8 alu imm->r/m + 3 alu imm->acc
    // + 16 conditional jumps + 4 loop/jcxz forms.
    assert_eq!(BLUEPRINT_TABLE.len(), 4 + 8 + 8 + 3 + 16 + 4);
}
