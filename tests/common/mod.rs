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

//! Shared helpers for the integration suite: build a `Cpu` over a given
//! program, run it to completion, and give tests a place to park a tiny
//! in-memory "device" for the I/O-hook tests. Mirrors the minimal
//! `TestBus` shape used by the Z80 test suite in the retrieval pack's
//! `patsoffice-phosphor-core` crate, adapted to this crate's
//! `Cpu`-owns-its-own-memory model instead of a shared bus trait.

use z80_core::{Config, Cpu};

#[allow(dead_code)]
pub fn cpu_with_program(program: &[u8]) -> Cpu {
    let _ = env_logger::try_init();
    let config = Config {
        memory_size: 0x10000,
        ..Config::default()
    };
    let mut cpu = Cpu::new(config);
    cpu.load_memory(program).expect("program fits in memory");
    cpu
}

#[allow(dead_code)]
pub fn cpu_with_windows(
    program: &[u8],
    writeable_start: u16,
    writeable_end: u16,
) -> Cpu {
    let _ = env_logger::try_init();
    let config = Config {
        memory_size: 0x10000,
        writeable_memory_start: writeable_start,
        writeable_memory_end: writeable_end,
        ..Config::default()
    };
    let mut cpu = Cpu::new(config);
    cpu.load_memory(program).expect("program fits in memory");
    cpu
}

/// Runs `step()` until `Finished` is set, returning the per-step cycle
/// counts in execution order (so a repeating block instruction shows up
/// as multiple entries).
#[allow(dead_code)]
pub fn run_to_halt(cpu: &mut Cpu) -> Vec<u32> {
    let mut cycles = Vec::new();
    while !cpu.finished {
        cycles.push(cpu.step().expect("step should succeed"));
    }
    cycles
}
