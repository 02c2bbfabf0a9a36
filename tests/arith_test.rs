// Copyright (c) 2017, 2018 Marek Benc <dusxmt@gmx.com>
//
// Permission to use, copy, modify, and distribute this software for any
// purpose with or without fee is hereby granted, provided that the above
// copyright notice and this permission notice appear in all copies.
//
// THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHOR DISCLAIMS ALL WARRANTIES
// WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
// MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHOR BE LIABLE FOR
// ANY SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
// WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN
// ACTION OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF
// OR IN CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.
//

//! The 8-bit and 16-bit arithmetic/logic groups: register-to-accumulator
//! ALU ops, CP leaving the accumulator untouched, INC/DEC's carry
//! preservation, and the `HL`-pair ADD/ADC/SBC family.

mod common;
use common::cpu_with_program;

#[test]
fn add_a_b_sets_half_carry_and_overflow() {
    let mut cpu = cpu_with_program(&[0x80]); // ADD A,B
    cpu.registers.a = 0x2F;
    cpu.registers.b = 0x01;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.a, 0x30);
    assert!(cpu.flags.half_carry, "0x0F + 0x01 carries out of bit 3");
    assert!(!cpu.flags.carry);
    assert!(!cpu.flags.parity_overflow);
    assert!(!cpu.flags.subtract);
}

#[test]
fn add_a_b_detects_signed_overflow() {
    let mut cpu = cpu_with_program(&[0x80]);
    cpu.registers.a = 0x7F;
    cpu.registers.b = 0x01;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.a, 0x80);
    assert!(cpu.flags.parity_overflow, "0x7F + 1 overflows into negative");
    assert!(cpu.flags.sign);
    assert!(cpu.flags.half_carry);
}

#[test]
fn cp_b_leaves_accumulator_untouched() {
    let mut cpu = cpu_with_program(&[0xB8]); // CP B
    cpu.registers.a = 0x10;
    cpu.registers.b = 0x10;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.a, 0x10, "CP never writes back to A");
    assert!(cpu.flags.zero);
    assert!(cpu.flags.subtract);
}

#[test]
fn inc_b_preserves_carry_but_sets_half_carry_on_rollover() {
    let mut cpu = cpu_with_program(&[0x04]); // INC B
    cpu.registers.b = 0x0F;
    cpu.flags.carry = true;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.b, 0x10);
    assert!(cpu.flags.half_carry);
    assert!(cpu.flags.carry, "INC never touches C");
    assert!(!cpu.flags.subtract);
}

#[test]
fn dec_b_to_zero_sets_zero_and_subtract() {
    let mut cpu = cpu_with_program(&[0x05]); // DEC B
    cpu.registers.b = 0x01;
    cpu.flags.carry = true;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.b, 0x00);
    assert!(cpu.flags.zero);
    assert!(cpu.flags.subtract);
    assert!(cpu.flags.carry, "DEC never touches C");
}

#[test]
fn dec_b_from_zero_flags_overflow_for_0x80_minus_1_wraps() {
    let mut cpu = cpu_with_program(&[0x05]); // DEC B
    cpu.registers.b = 0x80;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.b, 0x7F);
    assert!(cpu.flags.parity_overflow, "0x80 - 1 overflows out of negative");
    assert!(!cpu.flags.sign);
}

#[test]
fn add_hl_de_sets_carry_and_half_carry_without_touching_sign_zero() {
    let mut cpu = cpu_with_program(&[0x19]); // ADD HL,DE
    cpu.registers.set_hl(0xFFFF);
    cpu.registers.set_de(0x0001);
    cpu.flags.zero = true;
    cpu.flags.sign = true;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.hl(), 0x0000);
    assert!(cpu.flags.carry);
    assert!(cpu.flags.half_carry);
    assert!(cpu.flags.zero, "16-bit ADD never touches Z");
    assert!(cpu.flags.sign, "16-bit ADD never touches S");
}

#[test]
fn inc_de_wraps_without_touching_any_flag() {
    let mut cpu = cpu_with_program(&[0x13]); // INC DE
    cpu.registers.set_de(0xFFFF);
    cpu.flags.zero = true;
    cpu.flags.carry = true;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.de(), 0x0000);
    assert!(cpu.flags.zero, "16-bit INC/DEC leaves all flags alone");
    assert!(cpu.flags.carry);
}
