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

//! `DD`/`FD`-prefixed indexed addressing and the `DD CB d`/`FD CB d`
//! indexed bit-instruction family, redirecting `(HL)`-shaped operands to
//! `(IX+d)`/`(IY+d)`.

mod common;
use common::cpu_with_program;

#[test]
fn ld_a_from_ix_plus_displacement() {
    let mut cpu = cpu_with_program(&[0xDD, 0x7E, 0x05]); // LD A,(IX+5)
    cpu.registers.ix = 0x3000;
    cpu.memory.write_byte(0x3005, 0x42).unwrap();

    let cycles = cpu.step().unwrap();
    assert_eq!(cycles, 15);
    assert_eq!(cpu.registers.a, 0x42);
    assert_eq!(cpu.pc, 0x03);
}

#[test]
fn ld_a_from_ix_with_negative_displacement() {
    let mut cpu = cpu_with_program(&[0xDD, 0x7E, 0xFE]); // LD A,(IX-2)
    cpu.registers.ix = 0x3000;
    cpu.memory.write_byte(0x2FFE, 0x99).unwrap();

    cpu.step().unwrap();
    assert_eq!(cpu.registers.a, 0x99);
}

#[test]
fn ld_iy_plus_displacement_from_b() {
    let mut cpu = cpu_with_program(&[0xFD, 0x70, 0x03]); // LD (IY+3),B
    cpu.registers.iy = 0x4000;
    cpu.registers.b = 0x77;

    let cycles = cpu.step().unwrap();
    assert_eq!(cycles, 15);
    assert_eq!(cpu.memory.raw()[0x4003], 0x77);
}

#[test]
fn ixh_ixl_are_independently_addressable() {
    let mut cpu = cpu_with_program(&[0xDD, 0x26, 0x12, 0xDD, 0x2E, 0x34]); // LD IXH,0x12; LD IXL,0x34
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.registers.ix, 0x1234);
}

#[test]
fn rlc_ix_plus_d_rotates_memory_and_costs_twentythree() {
    let mut cpu = cpu_with_program(&[0xDD, 0xCB, 0x02, 0x06]); // RLC (IX+2)
    cpu.registers.ix = 0x5000;
    cpu.memory.write_byte(0x5002, 0b1000_0001).unwrap();

    let cycles = cpu.step().unwrap();
    assert_eq!(cycles, 23);
    assert_eq!(cpu.memory.raw()[0x5002], 0b0000_0011);
    assert!(cpu.flags.carry);
}

#[test]
fn add_ix_bc_sets_half_carry_and_carry() {
    let mut cpu = cpu_with_program(&[0xDD, 0x09]); // ADD IX,BC
    cpu.registers.ix = 0xFFFF;
    cpu.registers.set_bc(0x0001);

    cpu.step().unwrap();
    assert_eq!(cpu.registers.ix, 0x0000);
    assert!(cpu.flags.carry);
    assert!(cpu.flags.half_carry);
}
