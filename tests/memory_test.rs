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

//! Writeable-window enforcement (S6 in the spec this crate targets): a
//! write outside `[WriteableMemoryStart, WriteableMemoryEnd]` is rejected
//! rather than silently dropped or clamped.

mod common;
use common::cpu_with_windows;

use z80_core::CoreError;

#[test]
fn write_outside_window_is_rejected_and_memory_is_untouched() {
    // LD (0x1000), A; the window only covers 0x2000..=0x3FFF.
    let mut cpu = cpu_with_windows(&[0x32, 0x00, 0x10], 0x2000, 0x3FFF);
    cpu.registers.a = 0xAB;

    let err = cpu.step().unwrap_err();
    assert_eq!(
        err,
        CoreError::IllegalMemoryAccess {
            address: 0x1000,
            writeable_start: 0x2000,
            writeable_end: 0x3FFF,
            mirror_start: 0,
            mirror_end: 0,
        }
    );
    assert_eq!(cpu.memory.raw()[0x1000], 0x00, "rejected write leaves memory unchanged");
}

#[test]
fn write_inside_window_succeeds() {
    let mut cpu = cpu_with_windows(&[0x32, 0x00, 0x30], 0x2000, 0x3FFF);
    cpu.registers.a = 0xAB;

    cpu.step().unwrap();
    assert_eq!(cpu.memory.raw()[0x3000], 0xAB);
}

#[test]
fn read_is_unaffected_by_the_writeable_window() {
    // LD A, (0x1000) should still succeed even though 0x1000 sits outside
    // the writeable window: the window only gates writes.
    let mut cpu = cpu_with_windows(&[0x3A, 0x00, 0x10], 0x2000, 0x3FFF);
    cpu.memory.raw_mut()[0x1000] = 0x77;

    cpu.step().unwrap();
    assert_eq!(cpu.registers.a, 0x77);
}
