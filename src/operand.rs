//! The operand model: the closed set of value/location shapes an
//! instruction's slots can hold, and their NASM-compatible `Display`
//! contract.

use core::fmt;

use crate::registers::{Register, RegisterIndex};

/// One of the eight `mod/rm`-addressable base-register pairs (or single
/// registers) used to compute an effective address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EaBase {
    BxSi,
    BxDi,
    BpSi,
    BpDi,
    Si,
    Di,
    Bp,
    Bx,
}

impl EaBase {
    const TABLE: [EaBase; 8] = [
        EaBase::BxSi,
        EaBase::BxDi,
        EaBase::BpSi,
        EaBase::BpDi,
        EaBase::Si,
        EaBase::Di,
        EaBase::Bp,
        EaBase::Bx,
    ];

    pub(crate) const fn from_rm(rm: u8) -> Self {
        Self::TABLE[rm as usize]
    }

    /// The registers summed to form the base of the effective address.
    pub(crate) const fn registers(self) -> (RegisterIndex, Option<RegisterIndex>) {
        use RegisterIndex::{Bp, Bx, Di, Si};
        match self {
            EaBase::BxSi => (Bx, Some(Si)),
            EaBase::BxDi => (Bx, Some(Di)),
            EaBase::BpSi => (Bp, Some(Si)),
            EaBase::BpDi => (Bp, Some(Di)),
            EaBase::Si => (Si, None),
            EaBase::Di => (Di, None),
            EaBase::Bp => (Bp, None),
            EaBase::Bx => (Bx, None),
        }
    }
}

impl fmt::Display for EaBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EaBase::BxSi => "bx+si",
            EaBase::BxDi => "bx+di",
            EaBase::BpSi => "bp+si",
            EaBase::BpDi => "bp+di",
            EaBase::Si => "si",
            EaBase::Di => "di",
            EaBase::Bp => "bp",
            EaBase::Bx => "bx",
        };
        f.write_str(name)
    }
}

/// A decoded operand: a register, an immediate, a fixed memory address,
/// or a memory address computed from a base and a displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate { value: u16, wide: bool },
    DirectAddress { offset: u16 },
    EffectiveAddress { base: EaBase, disp: i16, wide: bool },
}

impl Operand {
    /// Reinterprets a stored `Immediate` as a signed byte displacement,
    /// the way conditional-jump and loop/jcxz instructions need it. Only
    /// meaningful for operands produced by those blueprints, which always
    /// read the displacement as a raw, non-sign-extended byte.
    pub(crate) fn as_jump_offset(&self) -> i16 {
        match self {
            Operand::Immediate { value, .. } => (*value as u8) as i8 as i16,
            _ => panic!("as_jump_offset called on a non-immediate operand"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{register}"),
            Operand::Immediate { value, wide } => {
                let width = if *wide { "word" } else { "byte" };
                write!(f, "{width} {value}")
            }
            Operand::DirectAddress { offset } => write!(f, "[{offset}]"),
            Operand::EffectiveAddress { base, disp, .. } => {
                if *disp >= 0 {
                    write!(f, "[{base}+{disp}]")
                } else {
                    write!(f, "[{base}{disp}]")
                }
            }
        }
    }
}

#[test]
fn register_operand_displays_the_canonical_name() {
    assert_eq!(
        Operand::Register(Register::word(RegisterIndex::B)).to_string(),
        "bx"
    );
}

#[test]
fn immediate_uses_byte_or_word_prefix() {
    assert_eq!(
        Operand::Immediate {
            value: 12,
            wide: false
        }
        .to_string(),
        "byte 12"
    );
    assert_eq!(
        Operand::Immediate {
            value: 300,
            wide: true
        }
        .to_string(),
        "word 300"
    );
}

#[test]
fn direct_address_is_bracketed() {
    assert_eq!(Operand::DirectAddress { offset: 16 }.to_string(), "[16]");
}

#[test]
fn effective_address_always_shows_an_explicit_sign() {
    assert_eq!(
        Operand::EffectiveAddress {
            base: EaBase::BxSi,
            disp: 0,
            wide: true
        }
        .to_string(),
        "[bx+si+0]"
    );
    assert_eq!(
        Operand::EffectiveAddress {
            base: EaBase::Bp,
            disp: -4,
            wide: false
        }
        .to_string(),
        "[bp-4]"
    );
    assert_eq!(
        Operand::EffectiveAddress {
            base: EaBase::Di,
            disp: 12,
            wide: true
        }
        .to_string(),
        "[di+12]"
    );
}

#[test]
fn jump_offset_reinterprets_the_raw_byte_as_signed() {
    let op = Operand::Immediate {
        value: 0x00FE,
        wide: false,
    };
    assert_eq!(op.as_jump_offset(), -2);
}
