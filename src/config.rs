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

use crate::state::{Flags, Registers};

/// Parameters for constructing and resetting a [`crate::Cpu`].
///
/// Fields left at their `Default` values reproduce the Z80's documented
/// power-on state: all-ones registers, PC/SP at zero, interrupts disabled,
/// and both the writeable and mirror memory windows disabled (meaning the
/// whole buffer is writeable and no address translation occurs).
#[derive(Clone, Debug)]
pub struct Config {
    pub memory_size: usize,

    pub registers: Registers,
    pub flags: Flags,

    pub program_counter: u16,
    pub stack_pointer: u16,

    pub interrupts_enabled: bool,

    pub writeable_memory_start: u16,
    pub writeable_memory_end: u16,

    pub mirror_memory_start: u16,
    pub mirror_memory_end: u16,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memory_size: 0x10000,

            registers: Registers::power_on(),
            flags: Flags::power_on(),

            program_counter: 0x0000,
            stack_pointer: 0x0000,

            interrupts_enabled: false,

            writeable_memory_start: 0,
            writeable_memory_end: 0,

            mirror_memory_start: 0,
            mirror_memory_end: 0,
        }
    }
}
