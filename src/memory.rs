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

use log::warn;

use crate::error::CoreError;

/// The CPU's linear address space, with an optional writeable window and
/// an optional mirror window translated back onto the base image.
///
/// A window is considered disabled when both of its bounds are zero, per
/// the same convention the rest of this crate's configuration uses.
pub struct Memory {
    bytes: Vec<u8>,

    writeable_start: u16,
    writeable_end: u16,

    mirror_start: u16,
    mirror_end: u16,
}

impl Memory {
    pub fn new(
        memory_size: usize,
        writeable_start: u16,
        writeable_end: u16,
        mirror_start: u16,
        mirror_end: u16,
    ) -> Memory {
        Memory {
            bytes: vec![0; memory_size],
            writeable_start,
            writeable_end,
            mirror_start,
            mirror_end,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    fn mirror_enabled(&self) -> bool {
        self.mirror_start != 0 || self.mirror_end != 0
    }

    fn writeable_window_enabled(&self) -> bool {
        self.writeable_start != 0 || self.writeable_end != 0
    }

    fn translate_mirror(&self, address: u16) -> Option<usize> {
        if !self.mirror_enabled() {
            return None;
        }
        if address < self.mirror_start || address > self.mirror_end {
            return None;
        }
        let window_width = (self.mirror_end - self.mirror_start) as usize + 1;
        let translated = (address as usize).wrapping_sub(window_width);
        if translated < self.bytes.len() {
            Some(translated)
        } else {
            None
        }
    }

    fn access_error(&self, address: u16) -> CoreError {
        let error = CoreError::IllegalMemoryAccess {
            address,
            writeable_start: self.writeable_start,
            writeable_end: self.writeable_end,
            mirror_start: self.mirror_start,
            mirror_end: self.mirror_end,
        };
        warn!("rejected memory access at 0x{:04X}: {}", address, error);
        error
    }

    pub fn read_byte(&self, address: u16) -> Result<u8, CoreError> {
        if (address as usize) < self.bytes.len() {
            return Ok(self.bytes[address as usize]);
        }
        if let Some(translated) = self.translate_mirror(address) {
            return Ok(self.bytes[translated]);
        }
        Err(self.access_error(address))
    }

    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<(), CoreError> {
        if self.writeable_window_enabled() {
            if address >= self.writeable_start && address <= self.writeable_end {
                let index = address as usize;
                if index < self.bytes.len() {
                    self.bytes[index] = value;
                    return Ok(());
                }
            }
        } else if (address as usize) < self.bytes.len() {
            self.bytes[address as usize] = value;
            return Ok(());
        }
        if let Some(translated) = self.translate_mirror(address) {
            self.bytes[translated] = value;
            return Ok(());
        }
        Err(self.access_error(address))
    }

    pub fn read_word(&self, address: u16) -> Result<u16, CoreError> {
        let low = self.read_byte(address)?;
        let high = self.read_byte(address.wrapping_add(1))?;
        Ok(((high as u16) << 8) | (low as u16))
    }

    pub fn write_word(&mut self, address: u16, value: u16) -> Result<(), CoreError> {
        self.write_byte(address, value as u8)?;
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8)?;
        Ok(())
    }

    /// Direct, unchecked access for the host between `step()` calls (e.g.
    /// `load_memory`, or a debugger peeking at state). Bypasses the
    /// writeable-window check by design; the window only governs writes
    /// performed by executing guest code.
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
