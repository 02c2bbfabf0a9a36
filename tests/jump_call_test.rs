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

//! The unconditional control-transfer group: `JP nn`, `JP (HL)`, `RET`,
//! `RST p` and `CALL nn`. These differ from the conditional forms in that
//! the decoder must always commit the computed target to `PC`.

mod common;
use common::cpu_with_program;

#[test]
fn jp_nn_sets_pc_to_the_immediate() {
    let mut cpu = cpu_with_program(&[0xC3, 0x34, 0x12]); // JP 0x1234
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cycles, 10);
}

#[test]
fn jp_hl_jumps_to_the_address_held_in_hl() {
    let mut cpu = cpu_with_program(&[0xE9]); // JP (HL)
    cpu.registers.set_hl(0x4000);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x4000);
    assert_eq!(cycles, 4);
}

#[test]
fn unconditional_ret_pops_the_return_address() {
    let mut cpu = cpu_with_program(&[0xC9]); // RET
    cpu.sp = 0x8000;
    cpu.memory.write_word(0x8000, 0x5678).unwrap();

    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x5678);
    assert_eq!(cpu.sp, 0x8002);
    assert_eq!(cycles, 10);
}

#[test]
fn rst_pushes_the_return_address_and_jumps_to_its_vector() {
    let mut cpu = cpu_with_program(&[0xDF]); // RST 18H
    cpu.sp = 0x8000;

    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x18);
    assert_eq!(cpu.sp, 0x7FFE);
    assert_eq!(cpu.memory.read_word(0x7FFE).unwrap(), 1);
    assert_eq!(cycles, 11);
}

#[test]
fn rst_00_jumps_to_the_reset_vector() {
    let mut cpu = cpu_with_program(&[0xC7]); // RST 00H
    cpu.sp = 0x8000;

    cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x00);
    assert_eq!(cpu.sp, 0x7FFE);
}

#[test]
fn call_nn_pushes_the_return_address_and_jumps() {
    let mut cpu = cpu_with_program(&[0xCD, 0x00, 0x40]); // CALL 0x4000
    cpu.sp = 0x8000;

    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc, 0x4000);
    assert_eq!(cpu.sp, 0x7FFE);
    assert_eq!(cpu.memory.read_word(0x7FFE).unwrap(), 3, "return address is right after the 3-byte CALL");
    assert_eq!(cycles, 17);
}

#[test]
fn call_then_ret_round_trips_back_past_the_call_site() {
    let mut cpu = cpu_with_program(&[0xCD, 0x05, 0x00, 0x00, 0x00, 0xC9]); // CALL 0x0005; RET at 0x0005
    cpu.sp = 0x8000;

    cpu.step().unwrap(); // CALL 0x0005
    assert_eq!(cpu.pc, 0x0005);
    cpu.step().unwrap(); // RET
    assert_eq!(cpu.pc, 0x0003, "RET lands back right after the CALL instruction");
    assert_eq!(cpu.sp, 0x8000);
}
