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

//! COP2 (GTE) instruction implementations
//!
//! This module implements CPU instructions that interact with Coprocessor 2
//! (the Geometry Transformation Engine). Register traffic is forwarded to the
//! attached [`Coprocessor2`](super::super::Coprocessor2).

use super::super::decode::Instruction;
use super::{AccessSize, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    /// MFC2: Move From Coprocessor 2 (data register)
    ///
    /// Format: MFC2 rt, rd
    /// - rt: CPU destination register (bits [20:16])
    /// - rd: GTE data register (bits [15:11])
    ///
    /// # Example
    ///
    /// ```text
    /// MFC2 r5, [25]  // r5 = GTE.data[25] (MAC1)
    /// ```
    pub(super) fn op_mfc2(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let rd = instruction.rd();

        let value = self.cop2.read_data(rd);
        self.set_reg_delayed(rt, value);

        log::trace!("MFC2: r{} = GTE.data[{}] (0x{:08X})", rt, rd, value);

        Ok(())
    }

    /// CFC2: Move From Coprocessor 2 (control register)
    ///
    /// Format: CFC2 rt, rd
    pub(super) fn op_cfc2(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let rd = instruction.rd();

        let value = self.cop2.read_control(rd);
        self.set_reg_delayed(rt, value);

        log::trace!("CFC2: r{} = GTE.control[{}] (0x{:08X})", rt, rd, value);

        Ok(())
    }

    /// MTC2: Move To Coprocessor 2 (data register)
    ///
    /// Format: MTC2 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// MTC2 r5, [0]  // GTE.data[0] = r5 (set VXY0)
    /// ```
    pub(super) fn op_mtc2(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let rd = instruction.rd();

        let value = self.reg(rt);
        self.cop2.write_data(rd, value);

        log::trace!("MTC2: GTE.data[{}] = r{} (0x{:08X})", rd, rt, value);

        Ok(())
    }

    /// CTC2: Move To Coprocessor 2 (control register)
    pub(super) fn op_ctc2(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let rd = instruction.rd();

        let value = self.reg(rt);
        self.cop2.write_control(rd, value);

        log::trace!("CTC2: GTE.control[{}] = r{} (0x{:08X})", rd, rt, value);

        Ok(())
    }

    /// GTE command (COP2 with bit 25 set)
    ///
    /// The low 25 bits are passed through unchanged.
    pub(super) fn op_gte_command(&mut self, instruction: Instruction) -> Result<()> {
        self.cop2.execute(instruction.imm25());
        Ok(())
    }

    /// LWC2: Load Word to Coprocessor 2
    ///
    /// Format: LWC2 rt, offset(base)
    /// Operation: GTE.data[rt] = memory[base + offset]
    ///
    /// Same alignment and bus fault rules as LW.
    pub(super) fn op_lwc2(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);

        if let Some(value) = self.read_data(bus, addr, AccessSize::Word)? {
            self.cop2.write_data(instruction.rt(), value);
            log::trace!(
                "LWC2: GTE.data[{}] = [0x{:08X}] (0x{:08X})",
                instruction.rt(),
                addr,
                value
            );
        }
        Ok(())
    }

    /// SWC2: Store Word from Coprocessor 2
    ///
    /// Format: SWC2 rt, offset(base)
    /// Operation: memory[base + offset] = GTE.data[rt]
    pub(super) fn op_swc2(&mut self, instruction: Instruction, bus: &mut dyn Bus) -> Result<()> {
        let addr = self.effective_address(instruction);
        let value = self.cop2.read_data(instruction.rt());

        log::trace!(
            "SWC2: [0x{:08X}] = GTE.data[{}] (0x{:08X})",
            addr,
            instruction.rt(),
            value
        );

        self.write_data(bus, addr, AccessSize::Word, value)
    }
}
