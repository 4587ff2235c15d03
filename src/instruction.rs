//! The mnemonic set and the `Instruction` value the decoder produces.

use core::fmt;

use crate::operand::{EaBase, Operand};
use crate::registers::{Register, RegisterIndex};

/// The closed set of mnemonics this crate recognises. One variant per
/// blueprint family; ALU blueprints that share a bit-prefix still get
/// one mnemonic each (see [`crate::blueprint`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Mov,
    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,
    Jo,
    Jno,
    Jb,
    Jnb,
    Je,
    Jne,
    Jbe,
    Ja,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jge,
    Jle,
    Jg,
    Loopnz,
    Loopz,
    Loop,
    Jcxz,
}

impl Mnemonic {
    /// Whether this instruction updates the flags register when
    /// executed (per the interpreter's flag semantics).
    pub(crate) const fn updates_flags(self) -> bool {
        matches!(
            self,
            Mnemonic::Add
                | Mnemonic::Sub
                | Mnemonic::Cmp
                | Mnemonic::And
                | Mnemonic::Or
                | Mnemonic::Xor
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mnemonic::Mov => "mov",
            Mnemonic::Add => "add",
            Mnemonic::Or => "or",
            Mnemonic::Adc => "adc",
            Mnemonic::Sbb => "sbb",
            Mnemonic::And => "and",
            Mnemonic::Sub => "sub",
            Mnemonic::Xor => "xor",
            Mnemonic::Cmp => "cmp",
            Mnemonic::Jo => "jo",
            Mnemonic::Jno => "jno",
            Mnemonic::Jb => "jb",
            Mnemonic::Jnb => "jnb",
            Mnemonic::Je => "je",
            Mnemonic::Jne => "jne",
            Mnemonic::Jbe => "jbe",
            Mnemonic::Ja => "ja",
            Mnemonic::Js => "js",
            Mnemonic::Jns => "jns",
            Mnemonic::Jp => "jp",
            Mnemonic::Jnp => "jnp",
            Mnemonic::Jl => "jl",
            Mnemonic::Jge => "jge",
            Mnemonic::Jle => "jle",
            Mnemonic::Jg => "jg",
            Mnemonic::Loopnz => "loopnz",
            Mnemonic::Loopz => "loopz",
            Mnemonic::Loop => "loop",
            Mnemonic::Jcxz => "jcxz",
        };
        f.write_str(name)
    }
}

/// Whether a mnemonic is one of the conditional-jump or loop/jcxz
/// forms, which serialise their sole operand as a bare signed
/// displacement rather than through the generic operand formatter.
pub(crate) const fn is_jump_class(mnemonic: Mnemonic) -> bool {
    matches!(
        mnemonic,
        Mnemonic::Jo
            | Mnemonic::Jno
            | Mnemonic::Jb
            | Mnemonic::Jnb
            | Mnemonic::Je
            | Mnemonic::Jne
            | Mnemonic::Jbe
            | Mnemonic::Ja
            | Mnemonic::Js
            | Mnemonic::Jns
            | Mnemonic::Jp
            | Mnemonic::Jnp
            | Mnemonic::Jl
            | Mnemonic::Jge
            | Mnemonic::Jle
            | Mnemonic::Jg
            | Mnemonic::Loopnz
            | Mnemonic::Loopz
            | Mnemonic::Loop
            | Mnemonic::Jcxz
    )
}

/// A decoded instruction: a mnemonic, the number of bytes it consumed
/// from the image, and up to two operand slots (slot 0 is the
/// destination when the mnemonic has one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub size: usize,
    pub operands: [Option<Operand>; 2],
}

impl Instruction {
    pub(crate) const fn new(mnemonic: Mnemonic, size: usize, operands: [Option<Operand>; 2]) -> Self {
        Self {
            mnemonic,
            size,
            operands,
        }
    }

    pub fn destination(&self) -> Option<Operand> {
        self.operands[0]
    }

    pub fn source(&self) -> Option<Operand> {
        self.operands[1]
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_jump_class(self.mnemonic) {
            let offset = self.operands[0]
                .expect("jump-class instruction always decodes exactly one operand")
                .as_jump_offset();
            return write!(f, "{} {offset}", self.mnemonic);
        }
        write!(f, "{}", self.mnemonic)?;
        match (self.operands[0], self.operands[1]) {
            (Some(dest), Some(src)) => write!(f, " {dest}, {src}"),
            (Some(dest), None) => write!(f, " {dest}"),
            (None, Some(src)) => write!(f, " {src}"),
            (None, None) => Ok(()),
        }
    }
}

#[test]
fn two_operand_instruction_is_comma_separated() {
    let instruction = Instruction::new(
        Mnemonic::Mov,
        2,
        [
            Some(Operand::Register(Register::word(RegisterIndex::C))),
            Some(Operand::Register(Register::word(RegisterIndex::B))),
        ],
    );
    assert_eq!(instruction.to_string(), "mov cx, bx");
}

#[test]
fn jump_class_instruction_prints_bare_signed_displacement() {
    let instruction = Instruction::new(
        Mnemonic::Jne,
        2,
        [
            Some(Operand::Immediate {
                value: 0x00FE,
                wide: false,
            }),
            None,
        ],
    );
    assert_eq!(instruction.to_string(), "jne -2");
}

#[test]
fn single_operand_effective_address_form() {
    let instruction = Instruction::new(
        Mnemonic::Mov,
        3,
        [
            Some(Operand::EffectiveAddress {
                base: EaBase::BxDi,
                disp: 0,
                wide: true,
            }),
            Some(Operand::Immediate {
                value: 7,
                wide: false,
            }),
        ],
    );
    assert_eq!(instruction.to_string(), "mov [bx+di+0], byte 7");
}
