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

use thiserror::Error;

/// Errors returned from the fallible entry points of a [`crate::Cpu`].
///
/// Every variant is logged via `log::error!` at its construction site,
/// immediately before it propagates out of the public call that raised it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unimplemented opcode: prefix={prefix:?} byte=0x{byte:02X}")]
    UnimplementedOpcode { prefix: Option<u8>, byte: u8 },

    #[error("invalid opcode table entry for prefix={prefix:?} byte=0x{byte:02X}: {reason}")]
    InvalidOpcodeTable {
        prefix: Option<u8>,
        byte: u8,
        reason: &'static str,
    },

    #[error("illegal memory access at 0x{address:04X} (writeable=[0x{writeable_start:04X}, 0x{writeable_end:04X}], mirror=[0x{mirror_start:04X}, 0x{mirror_end:04X}])")]
    IllegalMemoryAccess {
        address: u16,
        writeable_start: u16,
        writeable_end: u16,
        mirror_start: u16,
        mirror_end: u16,
    },

    #[error("memory overflow: {byte_count} bytes given, memory_size is {memory_size}")]
    MemoryOverflow { byte_count: usize, memory_size: usize },

    #[error("step() called after HALT without an intervening reset() or step_interrupt()")]
    ExecutionAfterHalt,

    #[error("unhandled interrupt id {id}, must be in 0..8")]
    UnhandledInterrupt { id: u8 },
}
