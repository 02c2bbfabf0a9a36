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

//! NOP/HALT have no computational body of their own and are handled
//! directly in `cpu.rs`'s dispatch; this module holds DAA, CPL, SCF, CCF.
//!
//! DAA in particular replaces the teacher's digit-range `inst_daa`, which
//! falls through to a logged warning for combinations it doesn't handle
//! (`"Warning: daa instruction failed."`). This implementation uses the
//! complete correction algorithm instead, so every (N, H, C, digit)
//! combination produces a defined result.

use crate::exec::alu::even_parity;
use crate::state::Flags;

pub fn daa(a: u8, flags: Flags) -> (u8, Flags) {
    let mut diff: u8 = 0;
    let mut carry = flags.carry;

    if flags.half_carry || (a & 0x0F) > 9 {
        diff |= 0x06;
    }
    if flags.carry || a > 0x99 {
        diff |= 0x60;
        carry = true;
    }

    let (result, half_carry) = if flags.subtract {
        let new_half = flags.half_carry && (a & 0x0F) < 6;
        (a.wrapping_sub(diff), new_half)
    } else {
        let new_half = (a & 0x0F) > 9;
        (a.wrapping_add(diff), new_half)
    };

    (
        result,
        Flags {
            sign: result & 0x80 != 0,
            zero: result == 0,
            y: result & 0x20 != 0,
            half_carry,
            x: result & 0x08 != 0,
            parity_overflow: even_parity(result),
            subtract: flags.subtract,
            carry,
        },
    )
}

pub fn cpl(a: u8, previous: Flags) -> (u8, Flags) {
    let result = !a;
    (
        result,
        Flags {
            half_carry: true,
            subtract: true,
            y: result & 0x20 != 0,
            x: result & 0x08 != 0,
            ..previous
        },
    )
}

pub fn scf(a: u8, previous: Flags) -> Flags {
    Flags {
        half_carry: false,
        subtract: false,
        carry: true,
        y: a & 0x20 != 0,
        x: a & 0x08 != 0,
        ..previous
    }
}

pub fn ccf(a: u8, previous: Flags) -> Flags {
    Flags {
        half_carry: previous.carry,
        subtract: false,
        carry: !previous.carry,
        y: a & 0x20 != 0,
        x: a & 0x08 != 0,
        ..previous
    }
}

/// `NEG`: `0 - A`, full subtract-style flags.
pub fn neg(a: u8) -> (u8, Flags) {
    super::alu::sub8(0, a, 0)
}
