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

//! CB-prefixed BIT/SET/RES, grounded on `inst_bit_0_b`/`inst_res_0_b`/
//! `inst_set_0_b` in the teacher's `instructions.rs`.

use crate::state::Flags;

/// BIT n,r: Z is the complement of the tested bit; S and P/V mirror Z
/// (undocumented but consistently observed on real hardware); H=1, N=0.
pub fn bit(n: u8, value: u8, previous: Flags) -> Flags {
    let is_set = (value & (1 << n)) != 0;
    Flags {
        zero: !is_set,
        sign: n == 7 && is_set,
        parity_overflow: !is_set,
        half_carry: true,
        subtract: false,
        ..previous
    }
}

pub fn res(n: u8, value: u8) -> u8 {
    value & !(1 << n)
}

pub fn set(n: u8, value: u8) -> u8 {
    value | (1 << n)
}
