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
use crate::core::error::Result;

impl CPU {
    // === Branch Instructions ===
    //
    // Conditions are evaluated when the branch executes. The target is
    // relative to the delay slot: (B + 4) + (sign_extend(offset) << 2).

    /// Handle BCONDZ instructions (opcode 0x01)
    ///
    /// BCONDZ instructions include BLTZ, BGEZ, BLTZAL, and BGEZAL. Bit 0 of
    /// rt selects GEZ over LTZ; the link forms are those with
    /// `(rt & 0x1E) == 0x10`. Every other rt value decodes to plain
    /// BLTZ/BGEZ, as on the real chip.
    ///
    /// The link register is written whether or not the branch is taken.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The full instruction
    pub(in crate::core::cpu) fn execute_bcondz(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let is_bgez = (rt & 0x01) != 0;
        let is_link = (rt & 0x1E) == 0x10;

        let is_negative = (self.reg(instruction.rs()) as i32) < 0;
        let taken = is_negative != is_bgez;

        if is_link {
            self.set_reg(31, self.next_pc);
        }

        self.branch(instruction, taken);
        Ok(())
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    /// Operation: if (rs == rt) PC = PC + 4 + (sign_extend(offset) << 2)
    pub(in crate::core::cpu) fn op_beq(&mut self, instruction: Instruction) -> Result<()> {
        let taken = self.reg(instruction.rs()) == self.reg(instruction.rt());
        self.branch(instruction, taken);
        Ok(())
    }

    /// BNE: Branch on Not Equal
    pub(in crate::core::cpu) fn op_bne(&mut self, instruction: Instruction) -> Result<()> {
        let taken = self.reg(instruction.rs()) != self.reg(instruction.rt());
        self.branch(instruction, taken);
        Ok(())
    }

    /// BLEZ: Branch on Less Than or Equal to Zero (signed)
    pub(in crate::core::cpu) fn op_blez(&mut self, instruction: Instruction) -> Result<()> {
        let taken = (self.reg(instruction.rs()) as i32) <= 0;
        self.branch(instruction, taken);
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero (signed)
    pub(in crate::core::cpu) fn op_bgtz(&mut self, instruction: Instruction) -> Result<()> {
        let taken = (self.reg(instruction.rs()) as i32) > 0;
        self.branch(instruction, taken);
        Ok(())
    }

    /// Resolve a conditional branch
    ///
    /// The following instruction becomes a delay slot either way; only a
    /// taken branch redirects `next_pc`.
    ///
    /// # Note
    ///
    /// While the branch executes, `self.pc` already holds the delay slot
    /// address (B + 4), so it is the base of the target calculation.
    fn branch(&mut self, instruction: Instruction, taken: bool) {
        if taken {
            let offset = instruction.imm16_se() << 2;
            self.next_pc = self.pc.wrapping_add(offset);
        }
        self.branch_delay = true;
        self.branch_taken = taken;
    }
}
