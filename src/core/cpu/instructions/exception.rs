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

//! Exception-triggering instructions

use super::super::decode::Instruction;
use super::super::{DebugControl, ExceptionCause};
use super::CPU;
use crate::core::error::Result;

/// BIOS service selected by $a0 when SYSCALL is issued
fn syscall_name(a0: u32) -> &'static str {
    match a0 {
        0 => "Exception",
        1 => "EnterCriticalSection",
        2 => "ExitCriticalSection",
        _ => "unknown",
    }
}

impl CPU {
    /// SYSCALL: System Call
    ///
    /// Always triggers ExceptionCause::Syscall. The 20-bit code field is
    /// ignored by the hardware and only logged.
    ///
    /// # Example
    ///
    /// ```text
    /// li  $a0, 1
    /// SYSCALL  # EnterCriticalSection
    /// ```
    pub(in crate::core::cpu) fn op_syscall(&mut self, instruction: Instruction) -> Result<()> {
        let a0 = self.reg(4);
        log::debug!(
            "SYSCALL {} (a0={}, code=0x{:05X}) at PC=0x{:08X}",
            syscall_name(a0),
            a0,
            instruction.imm20(),
            self.current_pc
        );

        self.signal_exception(ExceptionCause::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint
    ///
    /// Enters the debug vector with the DCIC hit flag set. EPC and CAUSE are
    /// left alone.
    pub(in crate::core::cpu) fn op_break(&mut self, instruction: Instruction) -> Result<()> {
        log::debug!(
            "BREAK code=0x{:05X} at PC=0x{:08X}",
            instruction.imm20(),
            self.current_pc
        );

        self.enter_debug_break(DebugControl::empty());
        Ok(())
    }
}
