// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::super::decode::Instruction;
use super::super::CPU;
use super::AccessSize;
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === Store Instructions ===

    /// SW: Store Word (32-bit)
    ///
    /// The address must be 4-byte aligned.
    ///
    /// Format: sw rt, offset(rs)
    /// Operation: memory[rs + sign_extend(offset)] = rt
    ///
    /// # Returns
    ///
    /// Ok(()) on success, triggers AddressErrorStore exception on misalignment
    pub(crate) fn op_sw(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.rt());
        self.write_data(bus, addr, AccessSize::Word, value)
    }

    /// SH: Store Halfword (low 16 bits of rt)
    pub(crate) fn op_sh(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.rt());
        self.write_data(bus, addr, AccessSize::Half, value)
    }

    /// SB: Store Byte (low 8 bits of rt)
    pub(crate) fn op_sb(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.reg(instruction.rt());
        self.write_data(bus, addr, AccessSize::Byte, value)
    }

    /// SWL: Store Word Left (unaligned store support)
    ///
    /// Read-modify-write of the aligned word containing the address. The
    /// data breakpoint sees one write at the effective address.
    ///
    /// | addr & 3 | written word                   |
    /// |----------|--------------------------------|
    /// | 0        | (m & 0xFFFFFF00) \| (rt >> 24) |
    /// | 1        | (m & 0xFFFF0000) \| (rt >> 16) |
    /// | 2        | (m & 0xFF000000) \| (rt >> 8)  |
    /// | 3        | rt                             |
    pub(crate) fn op_swl(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let aligned = addr & !0x3;
        let rt = self.reg(instruction.rt());

        let Some(word) = self.bus_read(bus, aligned, AccessSize::Word)? else {
            return Ok(());
        };

        let value = match addr & 0x3 {
            0 => (word & 0xFFFF_FF00) | (rt >> 24),
            1 => (word & 0xFFFF_0000) | (rt >> 16),
            2 => (word & 0xFF00_0000) | (rt >> 8),
            _ => rt,
        };

        if self.bus_write(bus, aligned, AccessSize::Word, value)? {
            self.check_data_breakpoint(addr, true);
        }
        Ok(())
    }

    /// SWR: Store Word Right (unaligned store support)
    ///
    /// | addr & 3 | written word                   |
    /// |----------|--------------------------------|
    /// | 0        | rt                             |
    /// | 1        | (m & 0x000000FF) \| (rt << 8)  |
    /// | 2        | (m & 0x0000FFFF) \| (rt << 16) |
    /// | 3        | (m & 0x00FFFFFF) \| (rt << 24) |
    pub(crate) fn op_swr(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let aligned = addr & !0x3;
        let rt = self.reg(instruction.rt());

        let Some(word) = self.bus_read(bus, aligned, AccessSize::Word)? else {
            return Ok(());
        };

        let value = match addr & 0x3 {
            0 => rt,
            1 => (word & 0x0000_00FF) | (rt << 8),
            2 => (word & 0x0000_FFFF) | (rt << 16),
            _ => (word & 0x00FF_FFFF) | (rt << 24),
        };

        if self.bus_write(bus, aligned, AccessSize::Word, value)? {
            self.check_data_breakpoint(addr, true);
        }
        Ok(())
    }
}
