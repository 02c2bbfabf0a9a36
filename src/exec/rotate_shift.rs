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

//! RLCA/RRCA/RLA/RRA and the CB-prefixed rotate/shift family. Grounded on
//! `inst_rlca` and the `inst_rlc_b`..`inst_rlc_a` block in the teacher's
//! `instructions.rs`, generalized to a byte-in/byte-out function shared by
//! every register and `(HL)`/`(IX+d)`/`(IY+d)` operand.

use crate::exec::alu::even_parity;
use crate::state::Flags;

fn standard_flags(result: u8, carry: bool, previous: Flags) -> Flags {
    Flags {
        sign: result & 0x80 != 0,
        zero: result == 0,
        y: result & 0x20 != 0,
        half_carry: false,
        x: result & 0x08 != 0,
        parity_overflow: even_parity(result),
        subtract: false,
        carry,
        ..previous
    }
}

pub fn rlc(value: u8) -> (u8, bool) {
    let carry = value & 0x80 != 0;
    (value.rotate_left(1), carry)
}

pub fn rrc(value: u8) -> (u8, bool) {
    let carry = value & 0x01 != 0;
    (value.rotate_right(1), carry)
}

pub fn rl(value: u8, carry_in: bool) -> (u8, bool) {
    let carry = value & 0x80 != 0;
    let result = (value << 1) | (if carry_in { 1 } else { 0 });
    (result, carry)
}

pub fn rr(value: u8, carry_in: bool) -> (u8, bool) {
    let carry = value & 0x01 != 0;
    let result = (value >> 1) | (if carry_in { 0x80 } else { 0 });
    (result, carry)
}

pub fn sla(value: u8) -> (u8, bool) {
    let carry = value & 0x80 != 0;
    (value << 1, carry)
}

pub fn sra(value: u8) -> (u8, bool) {
    let carry = value & 0x01 != 0;
    let result = (value >> 1) | (value & 0x80);
    (result, carry)
}

/// Undocumented: shifts a 1 into bit 0 instead of a 0.
pub fn sll(value: u8) -> (u8, bool) {
    let carry = value & 0x80 != 0;
    (value.wrapping_shl(1) | 0x01, carry)
}

pub fn srl(value: u8) -> (u8, bool) {
    let carry = value & 0x01 != 0;
    (value >> 1, carry)
}

/// Apply one of the eight CB-prefixed rotate/shift operations (selected by
/// the `x`/`y` bitfields of the opcode byte, `y` in 0..8) to `value`,
/// returning the result and the S/Z/P/C-updated flags (H and N cleared).
pub fn apply(op: u8, value: u8, carry_in: bool, previous: Flags) -> (u8, Flags) {
    let (result, carry) = match op {
        0 => rlc(value),
        1 => rrc(value),
        2 => rl(value, carry_in),
        3 => rr(value, carry_in),
        4 => sla(value),
        5 => sra(value),
        6 => sll(value),
        7 => srl(value),
        _ => unreachable!("CB rotate/shift selector is a 3-bit field"),
    };
    (result, standard_flags(result, carry, previous))
}

/// RLCA/RRCA/RLA/RRA: only C, H, N change; S/Z/P/V are left alone.
pub fn accumulator_op(op: u8, value: u8, carry_in: bool, previous: Flags) -> (u8, Flags) {
    let (result, carry) = match op {
        0 => rlc(value),
        1 => rrc(value),
        2 => rl(value, carry_in),
        3 => rr(value, carry_in),
        _ => unreachable!("accumulator rotate selector is a 2-bit field"),
    };
    (
        result,
        Flags {
            half_carry: false,
            subtract: false,
            carry,
            y: result & 0x20 != 0,
            x: result & 0x08 != 0,
            ..previous
        },
    )
}
