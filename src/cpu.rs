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

use log::{error, info, warn};

use crate::config::Config;
use crate::error::CoreError;
use crate::exec::{alu, bit_ops, block, misc, rotate_shift};
use crate::memory::Memory;
use crate::opcode_table::{self, Family, OpcodeInfo};
use crate::state::{Flags, InterruptMode, Registers};

/// Which register file an `(HL)`-or-`H`/`L`-shaped operand actually reads
/// from for the instruction currently being decoded. `DD`/`FD` prefixes
/// redirect `H`, `L` and `(HL)` to `IXH`/`IXL`/`(IX+d)` (or the `IY`
/// equivalents) without changing anything else about the opcode map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Index {
    Hl,
    Ix,
    Iy,
}

struct ExecOutcome {
    advance_pc: bool,
    use_alternate_cycles: bool,
}

impl ExecOutcome {
    fn fallthrough() -> ExecOutcome {
        ExecOutcome {
            advance_pc: true,
            use_alternate_cycles: false,
        }
    }
    fn jumped() -> ExecOutcome {
        ExecOutcome {
            advance_pc: false,
            use_alternate_cycles: false,
        }
    }
    fn alternate(taken: bool) -> ExecOutcome {
        ExecOutcome {
            advance_pc: true,
            use_alternate_cycles: !taken,
        }
    }
    /// Block-repeat instructions (LDIR/CPIR/INIR/OTIR and the decrementing
    /// forms): a continuing iteration holds PC (the caller has already
    /// rewound `cursor`) and costs the *higher* cycle count; the
    /// terminating iteration advances PC as normal and costs the base
    /// count. This is the opposite polarity from a conditional branch,
    /// where "taken" is the expensive path.
    fn block_repeat(continuing: bool) -> ExecOutcome {
        ExecOutcome {
            advance_pc: true,
            use_alternate_cycles: continuing,
        }
    }
}

/// A cycle-counted Zilog Z80 instruction interpreter.
///
/// Construct with [`Cpu::new`], feed it a program with [`Cpu::load_memory`],
/// then drive it by calling [`Cpu::step`] in a loop. Device I/O is surfaced
/// through [`Cpu::set_device_read`] / [`Cpu::set_device_write`] rather than
/// a global registry.
pub struct Cpu {
    pub registers: Registers,
    pub flags: Flags,
    pub pc: u16,
    pub sp: u16,
    pub memory: Memory,
    pub finished: bool,

    config: Config,

    /// Set by `EI`'s dispatch arm, cleared at the top of the following
    /// `step()`. While set, `step_interrupt` treats interrupts as masked
    /// even though `IFF1` already reads true, reproducing the one
    /// instruction of deferral real hardware gives `EI`.
    ei_pending: bool,

    device_read: Option<Box<dyn FnMut(u8) -> u8>>,
    device_write: Option<Box<dyn FnMut(u8, u8)>>,
}

impl Cpu {
    pub fn new(config: Config) -> Cpu {
        info!(
            "constructing Z80 core, memory_size=0x{:04X}",
            config.memory_size
        );
        let memory = Memory::new(
            config.memory_size,
            config.writeable_memory_start,
            config.writeable_memory_end,
            config.mirror_memory_start,
            config.mirror_memory_end,
        );
        let mut cpu = Cpu {
            registers: config.registers,
            flags: config.flags,
            pc: config.program_counter,
            sp: config.stack_pointer,
            memory,
            finished: false,
            config: config.clone(),
            ei_pending: false,
            device_read: None,
            device_write: None,
        };
        cpu.reset();
        cpu
    }

    pub fn reset(&mut self) {
        info!("resetting Z80 core");
        self.registers = self.config.registers;
        self.flags = self.config.flags;
        self.pc = self.config.program_counter;
        self.sp = self.config.stack_pointer;
        self.registers.iff1 = self.config.interrupts_enabled;
        self.registers.iff2 = self.config.interrupts_enabled;
        self.finished = false;
        self.ei_pending = false;
    }

    pub fn set_device_read<F: FnMut(u8) -> u8 + 'static>(&mut self, hook: F) {
        self.device_read = Some(Box::new(hook));
    }

    pub fn set_device_write<F: FnMut(u8, u8) + 'static>(&mut self, hook: F) {
        self.device_write = Some(Box::new(hook));
    }

    pub fn load_memory(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        if bytes.len() > self.memory.len() {
            let error = CoreError::MemoryOverflow {
                byte_count: bytes.len(),
                memory_size: self.memory.len(),
            };
            error!("load_memory failed: {}", error);
            return Err(error);
        }
        let raw = self.memory.raw_mut();
        for byte in raw.iter_mut() {
            *byte = 0;
        }
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn device_read(&mut self, port: u8) -> u8 {
        match self.device_read.as_mut() {
            Some(hook) => hook(port),
            None => {
                warn!("device_read invoked on port 0x{:02X} with no hook installed", port);
                0xFF
            }
        }
    }

    fn device_write(&mut self, port: u8, value: u8) {
        match self.device_write.as_mut() {
            Some(hook) => hook(port, value),
            None => warn!(
                "device_write invoked on port 0x{:02X}, value 0x{:02X}, with no hook installed",
                port, value
            ),
        }
    }

    fn fetch(&mut self, cursor: &mut u16) -> Result<u8, CoreError> {
        let byte = self.memory.read_byte(*cursor)?;
        *cursor = cursor.wrapping_add(1);
        self.registers.r = (self.registers.r & 0x80) | ((self.registers.r.wrapping_add(1)) & 0x7F);
        Ok(byte)
    }

    fn fetch_signed(&mut self, cursor: &mut u16) -> Result<i8, CoreError> {
        Ok(self.fetch(cursor)? as i8)
    }

    fn fetch_word(&mut self, cursor: &mut u16) -> Result<u16, CoreError> {
        let low = self.fetch(cursor)?;
        let high = self.fetch(cursor)?;
        Ok(((high as u16) << 8) | (low as u16))
    }

    /// Runs exactly one instruction (including any interrupt-servicing
    /// performed by `step_interrupt`) and returns its elapsed cycle count.
    pub fn step(&mut self) -> Result<u32, CoreError> {
        if self.finished {
            let error = CoreError::ExecutionAfterHalt;
            error!("{}", error);
            return Err(error);
        }

        // Lifts the one-instruction deferral armed by a previous `EI`: if
        // the instruction decoded below is itself `EI`, its dispatch arm
        // re-arms this flag for the instruction after *it*.
        self.ei_pending = false;

        let start_pc = self.pc;
        let mut cursor = start_pc;
        let byte0 = self.fetch(&mut cursor)?;

        let (family, index, final_byte, displacement, prefix) = match byte0 {
            0xCB => {
                let opcode = self.fetch(&mut cursor)?;
                (Family::ExtendedBit, Index::Hl, opcode, None, Some(0xCB))
            }
            0xED => {
                let opcode = self.fetch(&mut cursor)?;
                (Family::ExtendedStandard, Index::Hl, opcode, None, Some(0xED))
            }
            0xDD | 0xFD => {
                let index = if byte0 == 0xDD { Index::Ix } else { Index::Iy };
                let next = self.fetch(&mut cursor)?;
                if next == 0xCB {
                    let disp = self.fetch_signed(&mut cursor)?;
                    let opcode = self.fetch(&mut cursor)?;
                    let family = if index == Index::Ix {
                        Family::IxBit
                    } else {
                        Family::IyBit
                    };
                    (family, index, opcode, Some(disp), Some(byte0))
                } else {
                    let family = if index == Index::Ix { Family::Ix } else { Family::Iy };
                    (family, index, next, None, Some(byte0))
                }
            }
            _ => (Family::Standard, Index::Hl, byte0, None, None),
        };

        let info = opcode_table::lookup(family, final_byte).ok_or_else(|| {
            let error = CoreError::UnimplementedOpcode { prefix, byte: final_byte };
            error!("{}", error);
            error
        })?;

        let displacement = if displacement.is_none()
            && matches!(family, Family::Ix | Family::Iy)
            && opcode_table::opcode_uses_memory_hl_pub(final_byte, family)
        {
            Some(self.fetch_signed(&mut cursor)?)
        } else {
            displacement
        };

        let outcome = self.dispatch(family, final_byte, index, displacement, &mut cursor, &info)?;

        if outcome.advance_pc {
            self.pc = cursor;
        }

        let cycles = if outcome.use_alternate_cycles {
            info.alternate_cycles.ok_or_else(|| {
                let error = CoreError::InvalidOpcodeTable {
                    prefix,
                    byte: final_byte,
                    reason: "alternate cycles requested but not defined",
                };
                error!("{}", error);
                error
            })?
        } else {
            info.base_cycles
        };

        Ok(cycles)
    }

    /// Equivalent to the hardware accepting an interrupt in the current
    /// mode: pushes PC and jumps to the RST vector `8 * id` (mode 1
    /// behavior; IM0/IM2 are layered on top by the host feeding the right
    /// `id`/vector through this same primitive).
    pub fn step_interrupt(&mut self, id: u8) -> Result<u32, CoreError> {
        if id > 7 {
            let error = CoreError::UnhandledInterrupt { id };
            error!("{}", error);
            return Err(error);
        }
        if !self.registers.iff1 || self.ei_pending {
            return Ok(0);
        }
        self.registers.iff1 = false;
        self.registers.iff2 = false;
        self.finished = false;
        self.push16(self.pc)?;
        self.pc = 8 * id as u16;
        Ok(13)
    }

    // -- register file helpers -------------------------------------------------

    fn reg8_high_low(&self, index: Index) -> (u8, u8) {
        match index {
            Index::Hl => (self.registers.h, self.registers.l),
            Index::Ix => (self.registers.ixh(), self.registers.ixl()),
            Index::Iy => (self.registers.iyh(), self.registers.iyl()),
        }
    }

    fn indexed_base(&self, index: Index) -> u16 {
        match index {
            Index::Hl => self.registers.hl(),
            Index::Ix => self.registers.ix,
            Index::Iy => self.registers.iy,
        }
    }

    fn effective_address(&self, index: Index, displacement: Option<i8>) -> u16 {
        match (index, displacement) {
            (Index::Hl, _) => self.registers.hl(),
            (_, Some(d)) => self.indexed_base(index).wrapping_add(d as i16 as u16),
            (_, None) => self.indexed_base(index),
        }
    }

    fn get_reg8(
        &mut self,
        field: u8,
        index: Index,
        displacement: Option<i8>,
    ) -> Result<u8, CoreError> {
        let (high, low) = self.reg8_high_low(index);
        match field {
            0 => Ok(self.registers.b),
            1 => Ok(self.registers.c),
            2 => Ok(self.registers.d),
            3 => Ok(self.registers.e),
            4 => Ok(high),
            5 => Ok(low),
            6 => {
                let address = self.effective_address(index, displacement);
                self.memory.read_byte(address)
            }
            7 => Ok(self.registers.a),
            _ => unreachable!("register field is a 3-bit value"),
        }
    }

    fn set_reg8(
        &mut self,
        field: u8,
        index: Index,
        displacement: Option<i8>,
        value: u8,
    ) -> Result<(), CoreError> {
        match field {
            0 => self.registers.b = value,
            1 => self.registers.c = value,
            2 => self.registers.d = value,
            3 => self.registers.e = value,
            4 => match index {
                Index::Hl => self.registers.h = value,
                Index::Ix => self.registers.set_ixh(value),
                Index::Iy => self.registers.set_iyh(value),
            },
            5 => match index {
                Index::Hl => self.registers.l = value,
                Index::Ix => self.registers.set_ixl(value),
                Index::Iy => self.registers.set_iyl(value),
            },
            6 => {
                let address = self.effective_address(index, displacement);
                self.memory.write_byte(address, value)?;
            }
            7 => self.registers.a = value,
            _ => unreachable!("register field is a 3-bit value"),
        }
        Ok(())
    }

    fn get_rp(&self, field: u8, index: Index) -> u16 {
        match field {
            0 => self.registers.bc(),
            1 => self.registers.de(),
            2 => self.indexed_base(index),
            3 => self.sp,
            _ => unreachable!("register-pair field is a 2-bit value"),
        }
    }

    fn set_rp(&mut self, field: u8, index: Index, value: u16) {
        match field {
            0 => self.registers.set_bc(value),
            1 => self.registers.set_de(value),
            2 => match index {
                Index::Hl => self.registers.set_hl(value),
                Index::Ix => self.registers.ix = value,
                Index::Iy => self.registers.iy = value,
            },
            3 => self.sp = value,
            _ => unreachable!("register-pair field is a 2-bit value"),
        }
    }

    fn get_rp2(&self, field: u8, index: Index) -> u16 {
        match field {
            0 => self.registers.bc(),
            1 => self.registers.de(),
            2 => self.indexed_base(index),
            3 => ((self.registers.a as u16) << 8) | (self.flags.to_byte() as u16),
            _ => unreachable!("register-pair field is a 2-bit value"),
        }
    }

    fn set_rp2(&mut self, field: u8, index: Index, value: u16) {
        match field {
            0 => self.registers.set_bc(value),
            1 => self.registers.set_de(value),
            2 => match index {
                Index::Hl => self.registers.set_hl(value),
                Index::Ix => self.registers.ix = value,
                Index::Iy => self.registers.iy = value,
            },
            3 => {
                self.registers.a = (value >> 8) as u8;
                self.flags = Flags::from_byte(value as u8);
            }
            _ => unreachable!("register-pair field is a 2-bit value"),
        }
    }

    fn condition(&self, field: u8) -> bool {
        match field {
            0 => !self.flags.zero,
            1 => self.flags.zero,
            2 => !self.flags.carry,
            3 => self.flags.carry,
            4 => !self.flags.parity_overflow,
            5 => self.flags.parity_overflow,
            6 => !self.flags.sign,
            7 => self.flags.sign,
            _ => unreachable!("condition field is a 3-bit value"),
        }
    }

    fn push16(&mut self, value: u16) -> Result<(), CoreError> {
        self.sp = self.sp.wrapping_sub(1);
        self.memory.write_byte(self.sp, (value >> 8) as u8)?;
        self.sp = self.sp.wrapping_sub(1);
        self.memory.write_byte(self.sp, value as u8)?;
        Ok(())
    }

    fn pop16(&mut self) -> Result<u16, CoreError> {
        let low = self.memory.read_byte(self.sp)?;
        self.sp = self.sp.wrapping_add(1);
        let high = self.memory.read_byte(self.sp)?;
        self.sp = self.sp.wrapping_add(1);
        Ok(((high as u16) << 8) | (low as u16))
    }

    // -- dispatch ---------------------------------------------------------------

    fn dispatch(
        &mut self,
        family: Family,
        byte: u8,
        index: Index,
        displacement: Option<i8>,
        cursor: &mut u16,
        info: &OpcodeInfo,
    ) -> Result<ExecOutcome, CoreError> {
        match family {
            Family::Standard | Family::Ix | Family::Iy => {
                self.exec_standard(byte, index, displacement, cursor, info)
            }
            Family::ExtendedBit => self.exec_cb(byte, Index::Hl, None),
            Family::IxBit | Family::IyBit => self.exec_cb(byte, index, displacement),
            Family::ExtendedStandard => self.exec_ed(byte, cursor),
        }
    }

    fn exec_standard(
        &mut self,
        byte: u8,
        index: Index,
        displacement: Option<i8>,
        cursor: &mut u16,
        info: &OpcodeInfo,
    ) -> Result<ExecOutcome, CoreError> {
        let x = byte >> 6;
        let y = (byte >> 3) & 0x07;
        let z = byte & 0x07;

        match (x, y, z) {
            (0, 0, 0) => Ok(ExecOutcome::fallthrough()), // NOP
            (0, 1, 0) => {
                self.registers.exchange_af(&mut self.flags);
                Ok(ExecOutcome::fallthrough())
            }
            (0, 2, 0) => {
                let e = self.fetch_signed(cursor)?;
                self.registers.b = self.registers.b.wrapping_sub(1);
                let taken = self.registers.b != 0;
                if taken {
                    *cursor = cursor.wrapping_add(e as i16 as u16);
                }
                Ok(ExecOutcome::alternate(taken))
            }
            (0, 3, 0) => {
                let e = self.fetch_signed(cursor)?;
                *cursor = cursor.wrapping_add(e as i16 as u16);
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 0) if (4..=7).contains(&y) => {
                let e = self.fetch_signed(cursor)?;
                let taken = self.condition(y - 4);
                if taken {
                    *cursor = cursor.wrapping_add(e as i16 as u16);
                }
                Ok(ExecOutcome::alternate(taken))
            }
            (0, y, 1) if y % 2 == 0 => {
                let nn = self.fetch_word(cursor)?;
                self.set_rp(y / 2, index, nn);
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 1) => {
                let rp = self.get_rp((y - 1) / 2, index);
                let base = self.indexed_base(index);
                let (result, new_flags) = alu::add16(base, rp, self.flags);
                self.flags = new_flags;
                self.set_rp(2, index, result);
                Ok(ExecOutcome::fallthrough())
            }
            (0, 0, 2) => {
                self.memory.write_byte(self.registers.bc(), self.registers.a)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 1, 2) => {
                self.registers.a = self.memory.read_byte(self.registers.bc())?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 2, 2) => {
                self.memory.write_byte(self.registers.de(), self.registers.a)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 3, 2) => {
                self.registers.a = self.memory.read_byte(self.registers.de())?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 4, 2) => {
                let nn = self.fetch_word(cursor)?;
                let value = self.indexed_base(index);
                self.memory.write_word(nn, value)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 5, 2) => {
                let nn = self.fetch_word(cursor)?;
                let value = self.memory.read_word(nn)?;
                self.set_rp(2, index, value);
                Ok(ExecOutcome::fallthrough())
            }
            (0, 6, 2) => {
                let nn = self.fetch_word(cursor)?;
                self.memory.write_byte(nn, self.registers.a)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 7, 2) => {
                let nn = self.fetch_word(cursor)?;
                self.registers.a = self.memory.read_byte(nn)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 3) if y % 2 == 0 => {
                let rp = self.get_rp(y / 2, index);
                self.set_rp(y / 2, index, rp.wrapping_add(1));
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 3) => {
                let rp = self.get_rp((y - 1) / 2, index);
                self.set_rp((y - 1) / 2, index, rp.wrapping_sub(1));
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 4) => {
                let value = self.get_reg8(y, index, displacement)?;
                let (result, new_flags) = alu::inc8(value, self.flags.carry);
                self.flags = new_flags;
                self.set_reg8(y, index, displacement, result)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 5) => {
                let value = self.get_reg8(y, index, displacement)?;
                let (result, new_flags) = alu::dec8(value, self.flags.carry);
                self.flags = new_flags;
                self.set_reg8(y, index, displacement, result)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, y, 6) => {
                let n = self.fetch(cursor)?;
                self.set_reg8(y, index, displacement, n)?;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 0, 7) => {
                let (result, new_flags) =
                    rotate_shift::accumulator_op(0, self.registers.a, self.flags.carry, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 1, 7) => {
                let (result, new_flags) =
                    rotate_shift::accumulator_op(1, self.registers.a, self.flags.carry, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 2, 7) => {
                let (result, new_flags) =
                    rotate_shift::accumulator_op(2, self.registers.a, self.flags.carry, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 3, 7) => {
                let (result, new_flags) =
                    rotate_shift::accumulator_op(3, self.registers.a, self.flags.carry, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 4, 7) => {
                let (result, new_flags) = misc::daa(self.registers.a, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 5, 7) => {
                let (result, new_flags) = misc::cpl(self.registers.a, self.flags);
                self.registers.a = result;
                self.flags = new_flags;
                Ok(ExecOutcome::fallthrough())
            }
            (0, 6, 7) => {
                self.flags = misc::scf(self.registers.a, self.flags);
                Ok(ExecOutcome::fallthrough())
            }
            (0, 7, 7) => {
                self.flags = misc::ccf(self.registers.a, self.flags);
                Ok(ExecOutcome::fallthrough())
            }
            (1, 6, 6) => {
                // Real hardware parks PC on the HALT opcode itself (it
                // keeps re-fetching the same address while halted rather
                // than advancing), so this leaves PC unmoved instead of
                // stepping past the single HALT byte.
                self.finished = true;
                Ok(ExecOutcome::jumped())
            }
            (1, y, z) => {
                let value = self.get_reg8(z, index, displacement)?;
                self.set_reg8(y, index, displacement, value)?;
                Ok(ExecOutcome::fallthrough())
            }
            (2, y, z) => {
                let value = self.get_reg8(z, index, displacement)?;
                self.apply_alu(y, value);
                Ok(ExecOutcome::fallthrough())
            }
            (3, y, 0) => {
                let taken = self.condition(y);
                if taken {
                    let target = self.pop16()?;
                    *cursor = target;
                }
                Ok(ExecOutcome::alternate(taken))
            }
            (3, y, 1) if y % 2 == 0 => {
                let value = self.pop16()?;
                self.set_rp2(y / 2, index, value);
                Ok(ExecOutcome::fallthrough())
            }
            (3, 1, 1) => {
                let target = self.pop16()?;
                self.pc = target;
                Ok(ExecOutcome::jumped())
            }
            (3, 3, 1) => {
                self.registers.exchange_exx();
                Ok(ExecOutcome::fallthrough())
            }
            (3, 5, 1) => {
                self.pc = self.indexed_base(index);
                Ok(ExecOutcome::jumped())
            }
            (3, 7, 1) => {
                self.sp = self.indexed_base(index);
                Ok(ExecOutcome::fallthrough())
            }
            (3, y, 2) => {
                let nn = self.fetch_word(cursor)?;
                if self.condition(y) {
                    *cursor = nn;
                }
                Ok(ExecOutcome::fallthrough())
            }
            (3, 0, 3) => {
                let nn = self.fetch_word(cursor)?;
                self.pc = nn;
                Ok(ExecOutcome::jumped())
            }
            (3, 2, 3) => {
                let n = self.fetch(cursor)?;
                self.device_write(n, self.registers.a);
                Ok(ExecOutcome::fallthrough())
            }
            (3, 3, 3) => {
                let n = self.fetch(cursor)?;
                self.registers.a = self.device_read(n);
                Ok(ExecOutcome::fallthrough())
            }
            (3, 4, 3) => {
                let address = self.sp;
                let stacked = self.memory.read_word(address)?;
                let value = self.indexed_base(index);
                self.memory.write_word(address, value)?;
                self.set_rp(2, index, stacked);
                Ok(ExecOutcome::fallthrough())
            }
            (3, 5, 3) => {
                let hl = self.registers.hl();
                self.registers.set_hl(self.registers.de());
                self.registers.set_de(hl);
                Ok(ExecOutcome::fallthrough())
            }
            (3, 6, 3) => {
                self.registers.iff1 = false;
                self.registers.iff2 = false;
                self.ei_pending = false;
                Ok(ExecOutcome::fallthrough())
            }
            (3, 7, 3) => {
                self.registers.iff1 = true;
                self.registers.iff2 = true;
                self.ei_pending = true;
                Ok(ExecOutcome::fallthrough())
            }
            (3, y, 4) => {
                let nn = self.fetch_word(cursor)?;
                let taken = self.condition(y);
                if taken {
                    self.push16(*cursor)?;
                    *cursor = nn;
                }
                Ok(ExecOutcome::alternate(taken))
            }
            (3, y, 5) if y % 2 == 0 => {
                let value = self.get_rp2(y / 2, index);
                self.push16(value)?;
                Ok(ExecOutcome::fallthrough())
            }
            (3, 1, 5) => {
                let nn = self.fetch_word(cursor)?;
                self.push16(*cursor)?;
                self.pc = nn;
                Ok(ExecOutcome::jumped())
            }
            (3, 0, 6) | (3, 1, 6) | (3, 2, 6) | (3, 3, 6) | (3, 4, 6) | (3, 5, 6) | (3, 6, 6)
            | (3, 7, 6) => {
                let n = self.fetch(cursor)?;
                self.apply_alu(y, n);
                Ok(ExecOutcome::fallthrough())
            }
            (3, y, 7) => {
                self.push16(*cursor)?;
                self.pc = 8 * y as u16;
                Ok(ExecOutcome::jumped())
            }
            _ => {
                let _ = info;
                let error = CoreError::UnimplementedOpcode { prefix: None, byte };
                error!("{}", error);
                Err(error)
            }
        }
    }

    fn apply_alu(&mut self, op: u8, operand: u8) {
        let a = self.registers.a;
        let (result, flags) = match op {
            0 => alu::add8(a, operand, 0),
            1 => alu::add8(a, operand, if self.flags.carry { 1 } else { 0 }),
            2 => alu::sub8(a, operand, 0),
            3 => alu::sub8(a, operand, if self.flags.carry { 1 } else { 0 }),
            4 => alu::and8(a, operand),
            5 => alu::xor8(a, operand),
            6 => alu::or8(a, operand),
            7 => {
                // CP: compute SUB without storing.
                let (_, flags) = alu::sub8(a, operand, 0);
                self.flags = flags;
                return;
            }
            _ => unreachable!("ALU selector is a 3-bit value"),
        };
        self.registers.a = result;
        self.flags = flags;
    }

    fn exec_cb(
        &mut self,
        byte: u8,
        index: Index,
        displacement: Option<i8>,
    ) -> Result<ExecOutcome, CoreError> {
        let x = byte >> 6;
        let y = (byte >> 3) & 0x07;
        let z = byte & 0x07;

        // Under DD CB d / FD CB d, the operand is always (IX+d)/(IY+d);
        // `z` still names the register that additionally receives a copy
        // for SET/RES (undocumented) but per SPEC_FULL.md that copy-back
        // is out of scope, so those forms just touch memory.
        let field = if index == Index::Hl { z } else { 6 };

        match x {
            0 => {
                let value = self.get_reg8(field, index, displacement)?;
                let (result, new_flags) = rotate_shift::apply(y, value, self.flags.carry, self.flags);
                self.flags = new_flags;
                self.set_reg8(field, index, displacement, result)?;
                Ok(ExecOutcome::fallthrough())
            }
            1 => {
                let value = self.get_reg8(field, index, displacement)?;
                self.flags = bit_ops::bit(y, value, self.flags);
                Ok(ExecOutcome::fallthrough())
            }
            2 => {
                let value = self.get_reg8(field, index, displacement)?;
                let result = bit_ops::res(y, value);
                self.set_reg8(field, index, displacement, result)?;
                Ok(ExecOutcome::fallthrough())
            }
            3 => {
                let value = self.get_reg8(field, index, displacement)?;
                let result = bit_ops::set(y, value);
                self.set_reg8(field, index, displacement, result)?;
                Ok(ExecOutcome::fallthrough())
            }
            _ => unreachable!("CB top field is a 2-bit value"),
        }
    }

    fn exec_ed(&mut self, byte: u8, cursor: &mut u16) -> Result<ExecOutcome, CoreError> {
        let x = byte >> 6;
        let y = (byte >> 3) & 0x07;
        let z = byte & 0x07;

        if x != 1 && !(x == 2 && z <= 3 && (4..=7).contains(&y)) {
            return Ok(ExecOutcome::fallthrough()); // undefined ED opcode: NOP
        }

        if x == 1 {
            return self.exec_ed_misc(y, z, cursor);
        }

        self.exec_ed_block(y, z, cursor)
    }

    fn exec_ed_misc(&mut self, y: u8, z: u8, cursor: &mut u16) -> Result<ExecOutcome, CoreError> {
        match (y, z) {
            (y, 0) if y != 6 => {
                let value = self.device_read(self.registers.c);
                self.set_reg8(y, Index::Hl, None, value)?;
                let parity = alu::even_parity(value);
                self.flags = Flags {
                    sign: value & 0x80 != 0,
                    zero: value == 0,
                    half_carry: false,
                    parity_overflow: parity,
                    subtract: false,
                    ..self.flags
                };
                Ok(ExecOutcome::fallthrough())
            }
            (6, 0) => {
                let _ = self.device_read(self.registers.c);
                Ok(ExecOutcome::fallthrough())
            }
            (y, 1) if y != 6 => {
                let value = self.get_reg8(y, Index::Hl, None)?;
                self.device_write(self.registers.c, value);
                Ok(ExecOutcome::fallthrough())
            }
            (6, 1) => {
                self.device_write(self.registers.c, 0);
                Ok(ExecOutcome::fallthrough())
            }
            (y, 2) if y % 2 == 0 => {
                let rp = self.get_rp(y / 2, Index::Hl);
                let (result, flags) = alu::sbc16(self.registers.hl(), rp, self.flags.carry);
                self.registers.set_hl(result);
                self.flags = flags;
                Ok(ExecOutcome::fallthrough())
            }
            (y, 2) => {
                let rp = self.get_rp((y - 1) / 2, Index::Hl);
                let (result, flags) = alu::adc16(self.registers.hl(), rp, self.flags.carry);
                self.registers.set_hl(result);
                self.flags = flags;
                Ok(ExecOutcome::fallthrough())
            }
            (y, 3) if y % 2 == 0 => {
                let nn = self.fetch_word(cursor)?;
                let value = self.get_rp(y / 2, Index::Hl);
                self.memory.write_word(nn, value)?;
                Ok(ExecOutcome::fallthrough())
            }
            (y, 3) => {
                let nn = self.fetch_word(cursor)?;
                let value = self.memory.read_word(nn)?;
                self.set_rp((y - 1) / 2, Index::Hl, value);
                Ok(ExecOutcome::fallthrough())
            }
            (_, 4) => {
                let (result, flags) = misc::neg(self.registers.a);
                self.registers.a = result;
                self.flags = flags;
                Ok(ExecOutcome::fallthrough())
            }
            (1, 5) => {
                self.registers.iff1 = self.registers.iff2;
                let target = self.pop16()?;
                self.pc = target;
                Ok(ExecOutcome::jumped())
            }
            (_, 5) => {
                self.registers.iff1 = self.registers.iff2;
                let target = self.pop16()?;
                self.pc = target;
                Ok(ExecOutcome::jumped())
            }
            (y, 6) => {
                self.registers.interrupt_mode = match y {
                    0 | 4 => InterruptMode::Im0,
                    1 | 5 => InterruptMode::Im0,
                    2 | 6 => InterruptMode::Im1,
                    _ => InterruptMode::Im2,
                };
                Ok(ExecOutcome::fallthrough())
            }
            (0, 7) => {
                self.registers.i = self.registers.a;
                Ok(ExecOutcome::fallthrough())
            }
            (1, 7) => {
                self.registers.r = self.registers.a;
                Ok(ExecOutcome::fallthrough())
            }
            (2, 7) => {
                let value = self.registers.i;
                self.registers.a = value;
                self.flags = Flags {
                    sign: value & 0x80 != 0,
                    zero: value == 0,
                    half_carry: false,
                    parity_overflow: self.registers.iff2,
                    subtract: false,
                    ..self.flags
                };
                Ok(ExecOutcome::fallthrough())
            }
            (3, 7) => {
                let value = self.registers.r;
                self.registers.a = value;
                self.flags = Flags {
                    sign: value & 0x80 != 0,
                    zero: value == 0,
                    half_carry: false,
                    parity_overflow: self.registers.iff2,
                    subtract: false,
                    ..self.flags
                };
                Ok(ExecOutcome::fallthrough())
            }
            (4, 7) => {
                self.rotate_digit(true)?;
                Ok(ExecOutcome::fallthrough())
            }
            (5, 7) => {
                self.rotate_digit(false)?;
                Ok(ExecOutcome::fallthrough())
            }
            _ => Ok(ExecOutcome::fallthrough()),
        }
    }

    /// RRD/RLD: rotate a BCD digit between A's low nibble and `(HL)`'s two
    /// nibbles.
    fn rotate_digit(&mut self, right: bool) -> Result<(), CoreError> {
        let address = self.registers.hl();
        let mem_value = self.memory.read_byte(address)?;
        let a = self.registers.a;
        let (new_a, new_mem) = if right {
            let new_a = (a & 0xF0) | (mem_value & 0x0F);
            let new_mem = ((mem_value >> 4) & 0x0F) | ((a & 0x0F) << 4);
            (new_a, new_mem)
        } else {
            let new_a = (a & 0xF0) | ((mem_value >> 4) & 0x0F);
            let new_mem = ((mem_value << 4) & 0xF0) | (a & 0x0F);
            (new_a, new_mem)
        };
        self.memory.write_byte(address, new_mem)?;
        self.registers.a = new_a;
        self.flags = Flags {
            sign: new_a & 0x80 != 0,
            zero: new_a == 0,
            half_carry: false,
            parity_overflow: alu::even_parity(new_a),
            subtract: false,
            ..self.flags
        };
        Ok(())
    }

    fn exec_ed_block(&mut self, y: u8, z: u8, cursor: &mut u16) -> Result<ExecOutcome, CoreError> {
        let increment = y % 2 == 0; // y in {4,6} -> I-forms; {5,7} -> D-forms
        let repeat = y >= 6;

        match z {
            0 => self.exec_ldi_family(increment, repeat, cursor),
            1 => self.exec_cpi_family(increment, repeat, cursor),
            2 => self.exec_ini_family(increment, repeat, cursor),
            3 => self.exec_outi_family(increment, repeat, cursor),
            _ => Ok(ExecOutcome::fallthrough()),
        }
    }

    fn exec_ldi_family(
        &mut self,
        increment: bool,
        repeat: bool,
        cursor: &mut u16,
    ) -> Result<ExecOutcome, CoreError> {
        let hl = self.registers.hl();
        let de = self.registers.de();
        let value = self.memory.read_byte(hl)?;
        self.memory.write_byte(de, value)?;

        let step: i32 = if increment { 1 } else { -1 };
        self.registers.set_hl((hl as i32 + step) as u16);
        self.registers.set_de((de as i32 + step) as u16);
        let bc = self.registers.bc().wrapping_sub(1);
        self.registers.set_bc(bc);

        self.flags = block::ld_block_flags(self.registers.a, value, bc, self.flags);

        if repeat && block::ld_should_repeat(bc) {
            *cursor = self.pc;
            Ok(ExecOutcome::block_repeat(true))
        } else {
            Ok(ExecOutcome::block_repeat(false))
        }
    }

    fn exec_cpi_family(
        &mut self,
        increment: bool,
        repeat: bool,
        cursor: &mut u16,
    ) -> Result<ExecOutcome, CoreError> {
        let hl = self.registers.hl();
        let value = self.memory.read_byte(hl)?;

        let step: i32 = if increment { 1 } else { -1 };
        self.registers.set_hl((hl as i32 + step) as u16);
        let bc = self.registers.bc().wrapping_sub(1);
        self.registers.set_bc(bc);

        self.flags = block::cp_block_flags(self.registers.a, value, bc, self.flags);
        let zero = self.flags.zero;

        if repeat && block::cp_should_repeat(bc, zero) {
            *cursor = self.pc;
            Ok(ExecOutcome::block_repeat(true))
        } else {
            Ok(ExecOutcome::block_repeat(false))
        }
    }

    fn exec_ini_family(
        &mut self,
        increment: bool,
        repeat: bool,
        cursor: &mut u16,
    ) -> Result<ExecOutcome, CoreError> {
        let hl = self.registers.hl();
        let value = self.device_read(self.registers.c);
        self.memory.write_byte(hl, value)?;

        let step: i32 = if increment { 1 } else { -1 };
        self.registers.set_hl((hl as i32 + step) as u16);
        self.registers.b = self.registers.b.wrapping_sub(1);

        let c_after = (self.registers.c as i32 + step) as u8;
        let k = value.wrapping_add(c_after);
        self.flags = block::io_block_flags(value, self.registers.b, k);

        if repeat && block::io_should_repeat(self.registers.b) {
            *cursor = self.pc;
            Ok(ExecOutcome::block_repeat(true))
        } else {
            Ok(ExecOutcome::block_repeat(false))
        }
    }

    fn exec_outi_family(
        &mut self,
        increment: bool,
        repeat: bool,
        cursor: &mut u16,
    ) -> Result<ExecOutcome, CoreError> {
        let hl = self.registers.hl();
        let value = self.memory.read_byte(hl)?;
        self.device_write(self.registers.c, value);

        let step: i32 = if increment { 1 } else { -1 };
        self.registers.set_hl((hl as i32 + step) as u16);
        self.registers.b = self.registers.b.wrapping_sub(1);

        let hl_after = self.registers.l;
        let k = value.wrapping_add(hl_after);
        self.flags = block::io_block_flags(value, self.registers.b, k);

        if repeat && block::io_should_repeat(self.registers.b) {
            *cursor = self.pc;
            Ok(ExecOutcome::block_repeat(true))
        } else {
            Ok(ExecOutcome::block_repeat(false))
        }
    }
}
