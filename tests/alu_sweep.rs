//! Parametrized sweep over the ALU r/m<->reg opcode family: one case
//! per mnemonic, same mod/reg/r/m bits, only the 3-bit op field varies.

use rstest::rstest;
use sim8086::decode::decode;

#[rstest]
#[case(0b000, "add")]
#[case(0b001, "or")]
#[case(0b010, "adc")]
#[case(0b011, "sbb")]
#[case(0b100, "and")]
#[case(0b101, "sub")]
#[case(0b110, "xor")]
#[case(0b111, "cmp")]
fn alu_rm_reg_family_decodes_its_own_mnemonic(#[case] op: u8, #[case] mnemonic: &str) {
    // 00<op>0 d=1 w=1 | mod=11 reg=001(cx) rm=000(ax)
    let first_byte = (0b00 << 6) | (op << 3) | 0b0_1_1;
    let image = [first_byte, 0xC8];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), format!("{mnemonic} cx, ax"));
}

#[rstest]
#[case(0b000, "add")]
#[case(0b001, "or")]
#[case(0b010, "adc")]
#[case(0b011, "sbb")]
#[case(0b100, "and")]
#[case(0b101, "sub")]
#[case(0b110, "xor")]
#[case(0b111, "cmp")]
fn alu_imm_to_rm_family_decodes_its_own_mnemonic(#[case] op: u8, #[case] mnemonic: &str) {
    // 100000 s=0 w=0 | mod=11 <op> rm=000(al) | data
    let image = [0b1000_0000, (0b11 << 6) | (op << 3), 0x05];
    let instruction = decode(&image, 0).unwrap();
    assert_eq!(instruction.to_string(), format!("{mnemonic} al, byte 5"));
}
