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

//! Flag computation for the ED-prefixed block transfer, block compare and
//! block I/O families. Grounded on `inst_ldi`, `inst_ldir`, `inst_cpi`,
//! `inst_cpir`, `inst_cpdr` (the direct source for the CPDR scenario this
//! crate is validated against) and `inst_ini` in the teacher's
//! `instructions.rs`. Memory movement and the HL/DE/BC/PC bookkeeping stay
//! in `cpu.rs`, since they need fallible, bounds-checked memory access;
//! this module only derives the flag side effects from already-read values.

use crate::exec::alu::even_parity;
use crate::state::Flags;

/// LDI/LDD/LDIR/LDDR: copies (HL)->(DE) happen in the caller. Only H, N,
/// P/V (and the undocumented Y/X, derived from A + transferred byte) change.
pub fn ld_block_flags(a: u8, transferred: u8, bc_after: u16, previous: Flags) -> Flags {
    let n = a.wrapping_add(transferred);
    Flags {
        half_carry: false,
        subtract: false,
        parity_overflow: bc_after != 0,
        y: n & 0x02 != 0,
        x: n & 0x08 != 0,
        ..previous
    }
}

/// CPI/CPD/CPIR/CPDR: A - (HL) computed without storing. Carry is
/// preserved from before the instruction.
pub fn cp_block_flags(a: u8, value: u8, bc_after: u16, previous: Flags) -> Flags {
    let result = a.wrapping_sub(value);
    let half_carry = (a & 0x0F) < (value & 0x0F);
    let n = result.wrapping_sub(if half_carry { 1 } else { 0 });
    Flags {
        sign: result & 0x80 != 0,
        zero: result == 0,
        half_carry,
        parity_overflow: bc_after != 0,
        subtract: true,
        y: n & 0x02 != 0,
        x: n & 0x08 != 0,
        carry: previous.carry,
        ..previous
    }
}

/// Whether a repeating block-transfer/compare instruction (LDIR/LDDR,
/// CPIR/CPDR) should hold PC and run again.
pub fn ld_should_repeat(bc_after: u16) -> bool {
    bc_after != 0
}

pub fn cp_should_repeat(bc_after: u16, zero: bool) -> bool {
    bc_after != 0 && !zero
}

/// INI/IND/OUTI/OUTD: flags derived from Zilog's documented "k" formula,
/// `k = transferred_byte + ((c +/- 1) & 0xFF)`, where `c_after` is the C
/// register value after the +/-1 adjustment made for the block's direction.
pub fn io_block_flags(transferred: u8, b_after: u8, k: u8) -> Flags {
    Flags {
        sign: b_after & 0x80 != 0,
        zero: b_after == 0,
        half_carry: k < transferred,
        subtract: transferred & 0x80 != 0,
        parity_overflow: even_parity((k & 0x07) ^ b_after),
        y: b_after & 0x20 != 0,
        x: b_after & 0x08 != 0,
        carry: k < transferred,
    }
}

pub fn io_should_repeat(b_after: u8) -> bool {
    b_after != 0
}
