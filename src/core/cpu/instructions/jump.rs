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
    // === Jump Instructions ===

    /// J: Jump
    ///
    /// The target keeps the upper 4 bits of the delay slot address and
    /// replaces the rest with the 26-bit target field shifted left by 2.
    ///
    /// Format: j target
    /// Operation: PC = (PC & 0xF0000000) | (target << 2)
    pub(crate) fn op_j(&mut self, instruction: Instruction) -> Result<()> {
        self.jump((self.pc & 0xF000_0000) | (instruction.target() << 2));
        Ok(())
    }

    /// JAL: Jump and Link
    ///
    /// The return address is the instruction after the delay slot.
    ///
    /// Format: jal target
    /// Operation: r31 = PC + 8; PC = (PC & 0xF0000000) | (target << 2)
    pub(crate) fn op_jal(&mut self, instruction: Instruction) -> Result<()> {
        // next_pc already points past the delay slot
        self.set_reg(31, self.next_pc);
        self.op_j(instruction)
    }

    /// JR: Jump Register
    ///
    /// Used for function returns and indirect jumps. The target is not
    /// checked for alignment here; a misaligned target faults on fetch.
    ///
    /// Format: jr rs
    /// Operation: PC = rs
    pub(crate) fn op_jr(&mut self, rs: u8) -> Result<()> {
        self.jump(self.reg(rs));
        Ok(())
    }

    /// JALR: Jump and Link Register
    ///
    /// rs is read before rd is written, so `jalr $t0, $t0` jumps to the
    /// old value of `$t0`.
    ///
    /// Format: jalr rd, rs
    /// Operation: rd = PC + 8; PC = rs
    pub(crate) fn op_jalr(&mut self, rs: u8, rd: u8) -> Result<()> {
        let target = self.reg(rs);
        self.set_reg(rd, self.next_pc);
        self.jump(target);
        Ok(())
    }

    fn jump(&mut self, target: u32) {
        self.next_pc = target;
        self.branch_delay = true;
        self.branch_taken = true;
    }
}
