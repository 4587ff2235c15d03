//! End-to-end coverage of the worked byte-sequence-to-listing examples,
//! plus the decoder's universal properties (determinism, length
//! consistency, first-match, operand-swap, flag semantics).

use sim8086::decode::{decode, DecodeError};
use sim8086::interpreter::Interpreter;

fn listing(image: &[u8]) -> String {
    let mut offset = 0;
    let mut lines = Vec::new();
    while offset < image.len() {
        let instruction = decode(image, offset).expect("image is composed of supported encodings");
        lines.push(instruction.to_string());
        offset += instruction.size;
    }
    lines.join("\n")
}

#[test]
fn worked_examples_match_the_documented_listing() {
    assert_eq!(listing(&[0x89, 0xD9]), "mov cx, bx");
    assert_eq!(listing(&[0x8B, 0x57, 0x00]), "mov dx, [bx+0]");
    assert_eq!(listing(&[0xC6, 0x03, 0x07]), "mov [bp+di+0], byte 7");
    assert_eq!(listing(&[0xB1, 0x0C]), "mov cl, 12");
    assert_eq!(listing(&[0xA1, 0x10, 0x00]), "mov ax, [16]");
    assert_eq!(listing(&[0x03, 0x18]), "add bx, [bx+si+0]");
    assert_eq!(listing(&[0x75, 0xFE]), "jne -2");
    assert_eq!(listing(&[0xE2, 0xFC]), "loop -4");
}

#[test]
fn length_consistency_covers_the_whole_image() {
    let image = [
        0x89, 0xD9, // mov cx, bx
        0x8B, 0x57, 0x00, // mov dx, [bx+0]
        0xC6, 0x03, 0x07, // mov [bp+di+0], byte 7
        0xB1, 0x0C, // mov cl, 12
        0xA1, 0x10, 0x00, // mov ax, [16]
        0x03, 0x18, // add bx, [bx+si+0]
    ];
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
fn decoding_past_the_end_of_the_image_is_end_of_input() {
    let image = [0x89, 0xD9];
    assert_eq!(decode(&image, image.len()), Err(DecodeError::EndOfInput));
}

#[test]
fn an_unsupported_byte_halts_with_no_match() {
    let image = [0x0F];
    assert!(matches!(
        decode(&image, 0),
        Err(DecodeError::NoMatch { offset: 0, .. })
    ));
}

#[test]
fn cmp_equal_registers_does_not_take_jne() {
    // cmp ax, ax ; jne +5
    let image = [0x39, 0xC0, 0x75, 0x05];
    let mut interpreter = Interpreter::new(&image);
    interpreter.step().unwrap();
    let before_branch = interpreter.registers.get(sim8086::registers::RegisterIndex::Ip);
    interpreter.step().unwrap();
    assert_eq!(
        interpreter.registers.get(sim8086::registers::RegisterIndex::Ip),
        before_branch + 2
    );
}

#[test]
fn flag_semantics_over_subtraction() {
    // sub cx, cx ; Z=1, S=0
    let mut interpreter = Interpreter::new(&[0x29, 0xC9]);
    interpreter.step().unwrap();
    assert!(interpreter.flags.zero && !interpreter.flags.sign);

    // mov ax, 1 ; sub ax, ax ; sub ax, 1 -- leaves ax = -1, Z=0, S=1
    let mut interpreter = Interpreter::new(&[0xB8, 0x01, 0x00, 0x29, 0xC0, 0x2D, 0x01, 0x00]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert!(!interpreter.flags.zero && interpreter.flags.sign);
}
