/*!
8086 general-purpose register definitions.

The register file models the nine 16-bit slots the decoder and
interpreter need: the four accumulator-style registers (which also
expose byte-sized high/low halves), four pointer/index registers, and
the instruction pointer, which lives in the same file but is only ever
advanced by the interpreter, never by the decoder.
*/

use core::fmt;

/// Index into the register file. Only `A`..`D` have byte-sized halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterIndex {
    A,
    B,
    C,
    D,
    Sp,
    Bp,
    Si,
    Di,
    Ip,
}

/// Number of 16-bit slots in the register file.
pub const NUMBER_OF_REGISTERS: usize = 9;

impl RegisterIndex {
    pub(crate) const fn slot(self) -> usize {
        match self {
            RegisterIndex::A => 0,
            RegisterIndex::B => 1,
            RegisterIndex::C => 2,
            RegisterIndex::D => 3,
            RegisterIndex::Sp => 4,
            RegisterIndex::Bp => 5,
            RegisterIndex::Si => 6,
            RegisterIndex::Di => 7,
            RegisterIndex::Ip => 8,
        }
    }
}

impl fmt::Display for RegisterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegisterIndex::A => "ax",
            RegisterIndex::B => "bx",
            RegisterIndex::C => "cx",
            RegisterIndex::D => "dx",
            RegisterIndex::Sp => "sp",
            RegisterIndex::Bp => "bp",
            RegisterIndex::Si => "si",
            RegisterIndex::Di => "di",
            RegisterIndex::Ip => "ip",
        };
        f.write_str(name)
    }
}

/// Which half of a byte-sized register a `Register` operand refers to.
/// Meaningless for word-sized registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOffset {
    Low,
    High,
}

/// A register operand: an index into the file, which half (for byte
/// registers), and its size in bytes (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub index: RegisterIndex,
    pub byte_offset: ByteOffset,
    pub size: u8,
}

impl Register {
    pub(crate) const fn word(index: RegisterIndex) -> Self {
        Self {
            index,
            byte_offset: ByteOffset::Low,
            size: 2,
        }
    }

    const fn byte(index: RegisterIndex, byte_offset: ByteOffset) -> Self {
        Self {
            index,
            byte_offset,
            size: 1,
        }
    }

    /// `decode_reg` from the decoding contract: selects a byte register
    /// when `wide` is false, a word register otherwise.
    pub(crate) const fn decode(r: u8, wide: bool) -> Self {
        use ByteOffset::{High, Low};
        use RegisterIndex::{A, B, Bp, C, D, Di, Si, Sp};
        match (r, wide) {
            (0b000, false) => Self::byte(A, Low),
            (0b000, true) => Self::word(A),
            (0b001, false) => Self::byte(C, Low),
            (0b001, true) => Self::word(C),
            (0b010, false) => Self::byte(D, Low),
            (0b010, true) => Self::word(D),
            (0b011, false) => Self::byte(B, Low),
            (0b011, true) => Self::word(B),
            (0b100, false) => Self::byte(A, High),
            (0b100, true) => Self::word(Sp),
            (0b101, false) => Self::byte(C, High),
            (0b101, true) => Self::word(Bp),
            (0b110, false) => Self::byte(D, High),
            (0b110, true) => Self::word(Si),
            (0b111, false) => Self::byte(B, High),
            (0b111, true) => Self::word(Di),
            _ => unreachable!("r is a 3-bit field"),
        }
    }

    /// Whether this is the accumulator register (`al` or `ax`), used by
    /// the cycle estimator's accumulator-form bonus.
    pub(crate) const fn is_accumulator(&self) -> bool {
        matches!(self.index, RegisterIndex::A)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ByteOffset::{High, Low};
        use RegisterIndex::{A, B, C, D};
        let name = match (self.index, self.byte_offset, self.size) {
            (A, Low, 1) => "al",
            (A, High, 1) => "ah",
            (B, Low, 1) => "bl",
            (B, High, 1) => "bh",
            (C, Low, 1) => "cl",
            (C, High, 1) => "ch",
            (D, Low, 1) => "dl",
            (D, High, 1) => "dh",
            _ => return write!(f, "{}", self.index),
        };
        f.write_str(name)
    }
}

#[test]
fn decode_table_selects_the_documented_register_names() {
    assert_eq!(Register::decode(0b000, false).to_string(), "al");
    assert_eq!(Register::decode(0b000, true).to_string(), "ax");
    assert_eq!(Register::decode(0b100, false).to_string(), "ah");
    assert_eq!(Register::decode(0b100, true).to_string(), "sp");
    assert_eq!(Register::decode(0b111, false).to_string(), "bh");
    assert_eq!(Register::decode(0b111, true).to_string(), "di");
}

#[test]
fn word_register_display_uses_the_index_name() {
    assert_eq!(Register::word(RegisterIndex::Ip).to_string(), "ip");
    assert_eq!(Register::word(RegisterIndex::Bp).to_string(), "bp");
}

#[test]
fn accumulator_detection_is_about_the_a_index_not_the_size() {
    assert!(Register::decode(0b000, false).is_accumulator());
    assert!(Register::decode(0b000, true).is_accumulator());
    assert!(!Register::decode(0b011, true).is_accumulator());
}
