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

//! Coprocessor 0 (System Control) instructions

use super::super::decode::Instruction;
use super::CPU;
use crate::core::error::Result;

impl CPU {
    /// MFC0: Move From Coprocessor 0
    ///
    /// Moves the contents of a COP0 register to a general-purpose register.
    /// The value arrives through the load delay slot.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The full instruction
    ///
    /// # Format
    ///
    /// MFC0 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// MFC0 $t0, $12  # Move Status Register to $t0
    /// ```
    pub(in crate::core::cpu) fn op_mfc0(&mut self, instruction: Instruction) -> Result<()> {
        let rt = instruction.rt();
        let rd = instruction.rd();

        match self.cop0.read(rd) {
            Some(value) => {
                self.set_reg_delayed(rt, value);
                Ok(())
            }
            None => self.unimplemented("COP0 register", rd),
        }
    }

    /// MTC0: Move To Coprocessor 0
    ///
    /// Moves the contents of a general-purpose register to a COP0 register.
    /// Read-only registers ignore the write; only the software interrupt
    /// bits of CAUSE are writable.
    ///
    /// # Format
    ///
    /// MTC0 rt, rd
    ///
    /// # Example
    ///
    /// ```text
    /// MTC0 $t0, $12  # Move $t0 to Status Register
    /// ```
    pub(in crate::core::cpu) fn op_mtc0(&mut self, instruction: Instruction) -> Result<()> {
        let rd = instruction.rd();
        let value = self.reg(instruction.rt());

        if self.cop0.write(rd, value) {
            Ok(())
        } else {
            self.unimplemented("COP0 register", rd)
        }
    }

    /// RFE: Return From Exception
    ///
    /// Pops the (KU, IE) stack in SR: current takes previous, previous takes
    /// old, old keeps its value.
    ///
    /// # Details
    ///
    /// The Status Register contains mode bits in positions [5:0]:
    /// - Bits [1:0]: Current mode (IEc, KUc)
    /// - Bits [3:2]: Previous mode (IEp, KUp)
    /// - Bits [5:4]: Old mode (IEo, KUo)
    pub(in crate::core::cpu) fn op_rfe(&mut self, _instruction: Instruction) -> Result<()> {
        self.cop0.sr.return_from_exception();
        Ok(())
    }
}
