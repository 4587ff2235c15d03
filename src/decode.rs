//! The decoder: walks [`crate::blueprint::BLUEPRINT_TABLE`] against an
//! image at a given offset and assembles a typed [`Instruction`].

use core::fmt;
use std::error::Error;

use crate::bits::BitCursor;
use crate::blueprint::{BitPart, Blueprint, PartKind, BLUEPRINT_TABLE};
use crate::instruction::{Instruction, Mnemonic};
use crate::operand::{EaBase, Operand};
use crate::registers::Register;

/// Why decoding failed at a given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `offset` is at or past the end of the image; a clean place to
    /// stop, not a malformed instruction.
    EndOfInput,
    /// No blueprint's literal bits accept the byte at `offset`.
    NoMatch { offset: usize, byte: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::EndOfInput => write!(f, "end of input"),
            DecodeError::NoMatch { offset, byte } => {
                write!(f, "no blueprint matches byte {byte:#04x} at offset {offset}")
            }
        }
    }
}

impl Error for DecodeError {}

/// One field captured while walking a blueprint's fixed-width parts.
#[derive(Default, Clone, Copy)]
struct Fields {
    modbits: Option<u8>,
    reg: Option<u8>,
    rm: Option<u8>,
    w: Option<u8>,
    d: Option<u8>,
    s: Option<u8>,
    e: Option<u8>,
    has_data: bool,
    has_disp: bool,
    has_addr: bool,
}

impl Fields {
    fn store(&mut self, kind: PartKind, value: u8) {
        match kind {
            PartKind::Mod => self.modbits = Some(value),
            PartKind::Reg => self.reg = Some(value),
            PartKind::Rm => self.rm = Some(value),
            PartKind::W => self.w = Some(value),
            PartKind::D => self.d = Some(value),
            PartKind::S => self.s = Some(value),
            PartKind::E => self.e = Some(value),
            PartKind::HasData => self.has_data = true,
            PartKind::HasDisp => self.has_disp = true,
            PartKind::HasAddr => self.has_addr = true,
            PartKind::Literal => {}
        }
    }
}

/// Attempts to match `blueprint` at `offset`, returning the assembled
/// instruction on success.
fn try_match(blueprint: &Blueprint, image: &[u8], offset: usize) -> Option<Instruction> {
    let mut cursor = BitCursor::new(image, offset);
    let mut fields = Fields::default();

    for part in blueprint.parts {
        if part.bits == 0 {
            fields.store(part.kind, part.value);
            continue;
        }
        let read = cursor.read_bits(part.bits)?;
        if part.kind == PartKind::Literal {
            if read != part.value {
                return None;
            }
        } else {
            fields.store(part.kind, read);
        }
    }

    let w = fields.w == Some(1);
    let s = fields.s == Some(1);
    let modbits = fields.modbits;
    let rm = fields.rm;

    let is_direct_address = modbits == Some(0b00) && rm == Some(0b110);

    let mut disp: i16 = 0;
    if fields.has_disp {
        if is_direct_address {
            disp = cursor.read_u16_le()? as i16;
        } else {
            match modbits {
                Some(0b01) => disp = i16::from(cursor.read_byte()? as i8),
                Some(0b10) => disp = cursor.read_u16_le()? as i16,
                _ => {}
            }
        }
    }

    let mut data: u16 = 0;
    if fields.has_data {
        if w && !s {
            data = cursor.read_u16_le()?;
        } else if s {
            data = (cursor.read_byte()? as i8) as i16 as u16;
        } else {
            data = u16::from(cursor.read_byte()?);
        }
    }

    let mut slot0 = None;
    let mut slot1 = None;

    if fields.has_addr {
        let address = cursor.read_u16_le()?;
        slot0 = Some(Operand::DirectAddress { offset: address });
    }

    if let Some(modbits) = modbits {
        slot0 = Some(decode_rm(rm.expect("Rm present whenever Mod is"), modbits, w, disp));
    }

    if let Some(reg) = fields.reg {
        slot1 = Some(Operand::Register(Register::decode(reg, w)));
    }

    let swap = fields.d == Some(1) || fields.e == Some(0);
    if swap {
        core::mem::swap(&mut slot0, &mut slot1);
    }

    if fields.has_data {
        slot1 = Some(Operand::Immediate { value: data, wide: w });
    }

    let size = cursor.bytes_consumed();
    Some(Instruction::new(blueprint.mnemonic, size, [slot0, slot1]))
}

/// `decode_rm` from the decoding contract.
fn decode_rm(rm: u8, modbits: u8, w: bool, disp: i16) -> Operand {
    if modbits == 0b00 && rm == 0b110 {
        // Direct-address form: `disp` was read as the raw 16-bit address.
        return Operand::DirectAddress { offset: disp as u16 };
    }
    if modbits == 0b11 {
        return Operand::Register(Register::decode(rm, w));
    }
    Operand::EffectiveAddress {
        base: EaBase::from_rm(rm),
        disp,
        wide: w,
    }
}

/// Decodes one instruction starting at `offset`.
///
/// # Errors
///
/// Returns [`DecodeError::EndOfInput`] once `offset` reaches or passes
/// the end of `image`, and [`DecodeError::NoMatch`] when no blueprint's
/// literal bits accept the byte at `offset`.
pub fn decode(image: &[u8], offset: usize) -> Result<Instruction, DecodeError> {
    if offset >= image.len() {
        return Err(DecodeError::EndOfInput);
    }
    for blueprint in BLUEPRINT_TABLE {
        if let Some(instruction) = try_match(blueprint, image, offset) {
            return Ok(instruction);
        }
    }
    Err(DecodeError::NoMatch {
        offset,
        byte: image[offset],
    })
}

#[test]
fn mov_reg_to_reg() {
    let image = [0x89, 0xD9];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.mnemonic, Mnemonic::Mov);
    assert_eq!(instruction.size, 2);
    assert_eq!(instruction.to_string(), "mov cx, bx");
}

#[test]
fn mov_memory_with_displacement() {
    let image = [0x8B, 0x57, 0x00];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "mov dx, [bx+0]");
}

#[test]
fn mov_immediate_to_memory_byte() {
    let image = [0xC6, 0x03, 0x07];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "mov [bp+di+0], byte 7");
}

#[test]
fn mov_immediate_to_register() {
    let image = [0xB1, 0x0C];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "mov cl, 12");
}

#[test]
fn mov_accumulator_from_direct_address() {
    let image = [0xA1, 0x10, 0x00];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "mov ax, [16]");
}

#[test]
fn add_effective_address_source() {
    let image = [0x03, 0x18];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "add bx, [bx+si+0]");
}

#[test]
fn conditional_jump_negative_offset() {
    let image = [0x75, 0xFE];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "jne -2");
}

#[test]
fn loop_negative_offset() {
    let image = [0xE2, 0xFC];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), "loop -4");
}

#[test]
fn end_of_input_is_reported_distinctly_from_no_match() {
    let image = [0x89, 0xD9];
    assert_eq!(decode(&image, 2), Err(DecodeError::EndOfInput));
}

#[test]
fn an_unrecognised_byte_is_a_no_match() {
    // 0x0F is not a supported opcode prefix in this subset.
    let image = [0x0F];
    assert_eq!(
        decode(&image, 0),
        Err(DecodeError::NoMatch { offset: 0, byte: 0x0F })
    );
}

#[test]
fn length_consistency_across_a_run_of_instructions() {
    let image = [0x89, 0xD9, 0xB1, 0x0C, 0x75, 0xFE];
    let mut offset = 0;
    let mut total = 0;
    while offset < image.len() {
        let instruction = decode(&image, offset).unwrap();
        total += instruction.size;
        offset += instruction.size;
    }
    assert_eq!(total, image.len());
}

#[test]
fn operand_swap_is_the_only_difference_between_d_0_and_d_1() {
    // mov cx, bx (d=0) vs mov bx, cx (d=1) -- same reg/rm bits.
    let d0 = decode(&[0x89, 0xD9], 0).unwrap();
    let d1 = decode(&[0x8B, 0xD9], 0).unwrap();
    assert_eq!(d1.destination(), d0.source());
    assert_eq!(d1.source(), d0.destination());
}
