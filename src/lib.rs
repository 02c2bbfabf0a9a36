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

//! A cycle-counted Zilog Z80 instruction interpreter core: registers,
//! flags, a bounds-checked memory interface, the full prefix-dispatched
//! opcode table, and the executors behind every documented (and a few
//! load-bearing undocumented) opcode. See [`Cpu`] for the entry point.

pub mod config;
pub mod cpu;
pub mod error;
pub mod exec;
pub mod memory;
pub mod opcode_table;
pub mod state;

pub use config::Config;
pub use cpu::Cpu;
pub use error::CoreError;
pub use memory::Memory;
pub use opcode_table::{Family, OpcodeInfo};
pub use state::{Flags, InterruptMode, Registers};
