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
    // === Load Instructions ===
    //
    // All loads go through the load delay slot: the value becomes visible
    // to the second instruction after the load, not the first.

    /// LW: Load Word (32-bit)
    ///
    /// The address must be 4-byte aligned.
    ///
    /// Format: lw rt, offset(rs)
    /// Operation: rt = memory[rs + sign_extend(offset)]
    ///
    /// # Arguments
    ///
    /// * `instruction` - The full instruction
    /// * `bus` - Memory bus for reading
    ///
    /// # Returns
    ///
    /// Ok(()) on success, triggers AddressErrorLoad exception on misalignment
    pub(crate) fn op_lw(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Word)? {
            self.set_reg_delayed(instruction.rt(), value);
        }
        Ok(())
    }

    /// LH: Load Halfword (16-bit, sign-extended)
    ///
    /// The address must be 2-byte aligned.
    pub(crate) fn op_lh(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Half)? {
            self.set_reg_delayed(instruction.rt(), value as u16 as i16 as u32);
        }
        Ok(())
    }

    /// LHU: Load Halfword Unsigned (16-bit, zero-extended)
    pub(crate) fn op_lhu(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Half)? {
            self.set_reg_delayed(instruction.rt(), value);
        }
        Ok(())
    }

    /// LB: Load Byte (8-bit, sign-extended)
    pub(crate) fn op_lb(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Byte)? {
            self.set_reg_delayed(instruction.rt(), value as u8 as i8 as u32);
        }
        Ok(())
    }

    /// LBU: Load Byte Unsigned (8-bit, zero-extended)
    pub(crate) fn op_lbu(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Byte)? {
            self.set_reg_delayed(instruction.rt(), value);
        }
        Ok(())
    }

    /// LWL: Load Word Left (unaligned load support)
    ///
    /// Reads the aligned word containing the address and merges its low
    /// bytes into the high bytes of rt. Paired with LWR to load an
    /// unaligned word:
    ///
    /// ```text
    /// lwl $t0, 3($a0)
    /// lwr $t0, 0($a0)
    /// ```
    ///
    /// | addr & 3 | result                         |
    /// |----------|--------------------------------|
    /// | 0        | (rt & 0x00FFFFFF) \| (m << 24) |
    /// | 1        | (rt & 0x0000FFFF) \| (m << 16) |
    /// | 2        | (rt & 0x000000FF) \| (m << 8)  |
    /// | 3        | m                              |
    ///
    /// rt is taken including a load still in flight to it, so the pair does
    /// not need a gap between the two instructions.
    pub(crate) fn op_lwl(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let rt = instruction.rt();

        let Some(word) = self.bus_read(bus, addr & !0x3, AccessSize::Word)? else {
            return Ok(());
        };
        let current = self.reg_for_merge(rt);

        let value = match addr & 0x3 {
            0 => (current & 0x00FF_FFFF) | (word << 24),
            1 => (current & 0x0000_FFFF) | (word << 16),
            2 => (current & 0x0000_00FF) | (word << 8),
            _ => word,
        };

        self.set_reg_delayed(rt, value);
        self.check_data_breakpoint(addr, false);
        Ok(())
    }

    /// LWR: Load Word Right (unaligned load support)
    ///
    /// | addr & 3 | result                         |
    /// |----------|--------------------------------|
    /// | 0        | m                              |
    /// | 1        | (rt & 0xFF000000) \| (m >> 8)  |
    /// | 2        | (rt & 0xFFFF0000) \| (m >> 16) |
    /// | 3        | (rt & 0xFFFFFF00) \| (m >> 24) |
    pub(crate) fn op_lwr(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let rt = instruction.rt();

        let Some(word) = self.bus_read(bus, addr & !0x3, AccessSize::Word)? else {
            return Ok(());
        };
        let current = self.reg_for_merge(rt);

        let value = match addr & 0x3 {
            0 => word,
            1 => (current & 0xFF00_0000) | (word >> 8),
            2 => (current & 0xFFFF_0000) | (word >> 16),
            _ => (current & 0xFFFF_FF00) | (word >> 24),
        };

        self.set_reg_delayed(rt, value);
        self.check_data_breakpoint(addr, false);
        Ok(())
    }
}
