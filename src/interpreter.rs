//! Executes decoded instructions against a register file, flags, and a
//! 64 KiB memory image.

use core::fmt;

use crate::decode::{decode, DecodeError};
use crate::instruction::{Instruction, Mnemonic};
use crate::operand::{EaBase, Operand};
use crate::registers::{Register, RegisterIndex, NUMBER_OF_REGISTERS};

/// Size, in bytes, of the interpreter's linear address space.
pub const MEMORY_SIZE: usize = 1 << 16;

/// The zero and sign flags; this crate models no others (see
/// [`Flags::update`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub sign: bool,
}

impl Flags {
    /// Clears both flags, then sets `zero` iff `value == 0` and `sign`
    /// iff `value` is negative when read as a signed 16-bit result.
    pub(crate) fn update(&mut self, value: u16) {
        self.zero = value == 0;
        self.sign = (value as i16) < 0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zero {
            write!(f, "Z")?;
        }
        if self.sign {
            write!(f, "S")?;
        }
        Ok(())
    }
}

/// The nine 16-bit register slots, indexed by [`RegisterIndex::slot`].
#[derive(Debug, Clone, Copy)]
pub struct Registers([u16; NUMBER_OF_REGISTERS]);

impl Default for Registers {
    fn default() -> Self {
        Self([0; NUMBER_OF_REGISTERS])
    }
}

impl Registers {
    pub fn get(&self, index: RegisterIndex) -> u16 {
        self.0[index.slot()]
    }

    pub fn set(&mut self, index: RegisterIndex, value: u16) {
        self.0[index.slot()] = value;
    }

    /// Iterates `(index, value)` in dump order (`ax bx cx dx sp bp si
    /// di ip`), skipping registers holding zero.
    pub fn dump_order(&self) -> impl Iterator<Item = (RegisterIndex, u16)> + '_ {
        const ORDER: [RegisterIndex; 9] = [
            RegisterIndex::A,
            RegisterIndex::B,
            RegisterIndex::C,
            RegisterIndex::D,
            RegisterIndex::Sp,
            RegisterIndex::Bp,
            RegisterIndex::Si,
            RegisterIndex::Di,
            RegisterIndex::Ip,
        ];
        ORDER
            .into_iter()
            .filter(move |index| self.get(*index) != 0)
            .map(move |index| (index, self.get(index)))
    }
}

/// The 64 KiB linear address space the interpreter reads and writes.
pub struct Memory(Box<[u8; MEMORY_SIZE]>);

impl Default for Memory {
    fn default() -> Self {
        Self(Box::new([0; MEMORY_SIZE]))
    }
}

impl Memory {
    pub fn bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.0
    }

    fn read_u8(&self, addr: u16) -> u8 {
        self.0[addr as usize]
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        self.0[addr as usize] = value;
    }

    fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read_u8(addr);
        let hi = self.read_u8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write_u16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_u8(addr, lo);
        self.write_u8(addr.wrapping_add(1), hi);
    }
}

/// What happened when [`Interpreter::step`] executed one instruction.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub instruction: Instruction,
    /// `(destination, value before, value after)`, present for every
    /// mutating mnemonic except `cmp`.
    pub delta: Option<(Operand, u16, u16)>,
    /// Whether this step updated the flags register (and therefore
    /// whether a flags comment line should be emitted).
    pub flags_changed: bool,
}

/// Owns the register file and memory for the duration of a run and
/// drives the decode/execute loop.
pub struct Interpreter<'a> {
    image: &'a [u8],
    pub registers: Registers,
    pub flags: Flags,
    pub memory: Memory,
}

impl<'a> Interpreter<'a> {
    pub fn new(image: &'a [u8]) -> Self {
        Self {
            image,
            registers: Registers::default(),
            flags: Flags::default(),
            memory: Memory::default(),
        }
    }

    fn ip(&self) -> u16 {
        self.registers.get(RegisterIndex::Ip)
    }

    fn set_ip(&mut self, value: u16) {
        self.registers.set(RegisterIndex::Ip, value);
    }

    /// Decodes and executes the instruction at the current IP. Returns
    /// `Ok(None)` once IP reaches or exceeds the image length (clean
    /// termination); propagates a decode error otherwise.
    pub fn step(&mut self) -> Result<Option<StepOutcome>, DecodeError> {
        let offset = self.ip() as usize;
        if offset >= self.image.len() {
            return Ok(None);
        }
        let instruction = decode(self.image, offset)?;
        self.set_ip((offset + instruction.size) as u16);
        let (delta, flags_changed) = self.execute(&instruction);
        Ok(Some(StepOutcome {
            instruction,
            delta,
            flags_changed,
        }))
    }

    fn execute(&mut self, instruction: &Instruction) -> (Option<(Operand, u16, u16)>, bool) {
        use Mnemonic::{Add, And, Cmp, Je, Jne, Jns, Js, Mov, Or, Sub, Xor};

        match instruction.mnemonic {
            Mov => {
                let source = self.read(instruction.source().expect("mov has a source"));
                let dest = instruction.destination().expect("mov has a destination");
                let before = self.read(dest);
                self.write(dest, source);
                (Some((dest, before, source)), false)
            }
            Add | Sub | And | Or | Xor => {
                let dest = instruction
                    .destination()
                    .expect("alu instruction has a destination");
                let source = self.read(instruction.source().expect("alu instruction has a source"));
                let before = self.read(dest);
                let result = match instruction.mnemonic {
                    Add => before.wrapping_add(source),
                    Sub => before.wrapping_sub(source),
                    And => before & source,
                    Or => before | source,
                    Xor => before ^ source,
                    _ => unreachable!(),
                };
                self.flags.update(result);
                self.write(dest, result);
                (Some((dest, before, result)), true)
            }
            Cmp => {
                let dest = instruction.destination().expect("cmp has a destination");
                let source = self.read(instruction.source().expect("cmp has a source"));
                let before = self.read(dest);
                self.flags.update(before.wrapping_sub(source));
                (None, true)
            }
            Jne | Je | Js | Jns => {
                let taken = match instruction.mnemonic {
                    Jne => !self.flags.zero,
                    Je => self.flags.zero,
                    Js => self.flags.sign,
                    Jns => !self.flags.sign,
                    _ => unreachable!(),
                };
                if taken {
                    self.branch(instruction);
                }
                (None, false)
            }
            // The remaining condition codes need carry, overflow, or
            // parity, which this crate does not track; they decode and
            // print but never branch. adc/sbb need carry and loop/jcxz
            // have no documented CX-decrement model, so they likewise
            // no-op at runtime.
            _ => (None, false),
        }
    }

    fn branch(&mut self, instruction: &Instruction) {
        let offset = instruction
            .destination()
            .expect("branch instruction decodes its displacement into slot 0")
            .as_jump_offset();
        let target = (self.ip() as i32 + i32::from(offset)) as u16;
        self.set_ip(target);
    }

    fn read(&self, operand: Operand) -> u16 {
        match operand {
            Operand::Register(register) => self.registers.get(register.index),
            Operand::Immediate { value, .. } => value,
            Operand::DirectAddress { offset } => self.memory.read_u16(offset),
            Operand::EffectiveAddress { base, disp, wide } => {
                let addr = self.effective_address(base, disp);
                if wide {
                    self.memory.read_u16(addr)
                } else {
                    u16::from(self.memory.read_u8(addr))
                }
            }
        }
    }

    fn write(&mut self, operand: Operand, value: u16) {
        match operand {
            Operand::Register(register) => self.registers.set(register.index, value),
            Operand::Immediate { .. } => panic!("an immediate is never a write target"),
            Operand::DirectAddress { offset } => self.memory.write_u16(offset, value),
            Operand::EffectiveAddress { base, disp, wide } => {
                let addr = self.effective_address(base, disp);
                if wide {
                    self.memory.write_u16(addr, value);
                } else {
                    // 0xff, not 0x0f.
                    self.memory.write_u8(addr, (value & 0xff) as u8);
                }
            }
        }
    }

    fn effective_address(&self, base: EaBase, disp: i16) -> u16 {
        let (first, second) = base.registers();
        let mut sum = self.registers.get(first);
        if let Some(second) = second {
            sum = sum.wrapping_add(self.registers.get(second));
        }
        (sum as i32 + i32::from(disp)) as u16
    }
}

#[test]
fn sub_a_from_a_sets_zero_not_sign() {
    // mov ax, 5 ; sub ax, ax
    let image = [0xB8, 0x05, 0x00, 0x29, 0xC0];
    let mut interpreter = Interpreter::new(&image);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert!(interpreter.flags.zero);
    assert!(!interpreter.flags.sign);
}

#[test]
fn cmp_equal_registers_leaves_ip_unchanged_on_jne() {
    // cmp ax, ax ; jne +5
    let image = [0x39, 0xC0, 0x75, 0x05];
    let mut interpreter = Interpreter::new(&image);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(interpreter.registers.get(RegisterIndex::Ip), 4);
}

#[test]
fn jne_branches_backward_into_a_tight_loop() {
    // jne -2, starting at IP=0
    let image = [0x75, 0xFE];
    let mut interpreter = Interpreter::new(&image);
    interpreter.flags.zero = false;
    interpreter.step().unwrap();
    assert_eq!(interpreter.registers.get(RegisterIndex::Ip), 0);
}

#[test]
fn mov_immediate_to_register_reports_a_delta() {
    let image = [0xB8, 0x2A, 0x00];
    let mut interpreter = Interpreter::new(&image);
    let outcome = interpreter.step().unwrap().unwrap();
    let (operand, before, after) = outcome.delta.unwrap();
    assert_eq!(operand, Operand::Register(Register::word(RegisterIndex::A)));
    assert_eq!(before, 0);
    assert_eq!(after, 42);
}

#[test]
fn cmp_reports_no_delta_but_updates_flags() {
    let image = [0x39, 0xC0];
    let mut interpreter = Interpreter::new(&image);
    let outcome = interpreter.step().unwrap().unwrap();
    assert!(outcome.delta.is_none());
    assert!(outcome.flags_changed);
}

#[test]
fn stepping_past_the_end_of_the_image_terminates_cleanly() {
    let image: [u8; 0] = [];
    let mut interpreter = Interpreter::new(&image);
    assert!(interpreter.step().unwrap().is_none());
}

#[test]
fn byte_store_masks_with_0xff() {
    let image: [u8; 0] = [];
    let mut interpreter = Interpreter::new(&image);
    interpreter.write(
        Operand::EffectiveAddress {
            base: EaBase::Bx,
            disp: 0,
            wide: false,
        },
        0x1234,
    );
    assert_eq!(interpreter.memory.read_u8(0), 0x34);
}
