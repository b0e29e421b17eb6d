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

//! CPU instruction implementations
//!
//! This module contains all MIPS R3000A instruction implementations,
//! organized by instruction type for better maintainability.

use super::decode::{Cop0Function, CopOperation, Instruction, Opcode, SpecialFunction};
use super::{DebugControl, ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

// Instruction modules organized by type
mod arithmetic;
mod branch;
mod cop0;
mod cop2;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

/// Width of a data access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessSize {
    Byte,
    Half,
    Word,
}

impl AccessSize {
    fn alignment_mask(self) -> u32 {
        match self {
            AccessSize::Byte => 0,
            AccessSize::Half => 1,
            AccessSize::Word => 3,
        }
    }
}

impl CPU {
    /// Decode and execute the current instruction
    ///
    /// This method dispatches the instruction to the appropriate handler
    /// based on its opcode (upper 6 bits).
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus for memory operations
    ///
    /// # Returns
    ///
    /// Ok(()) on success, or an error if the bus breaks its contract
    pub(super) fn execute_instruction(&mut self, bus: &mut dyn Bus) -> Result<()> {
        let instruction = self.current_instruction;

        match Opcode::decode(instruction.opcode()) {
            Opcode::Special => self.execute_special(instruction),
            Opcode::Bcondz => self.execute_bcondz(instruction),
            Opcode::J => self.op_j(instruction),
            Opcode::Jal => self.op_jal(instruction),
            Opcode::Beq => self.op_beq(instruction),
            Opcode::Bne => self.op_bne(instruction),
            Opcode::Blez => self.op_blez(instruction),
            Opcode::Bgtz => self.op_bgtz(instruction),
            Opcode::Addi => self.op_addi(instruction),
            Opcode::Addiu => self.op_addiu(instruction),
            Opcode::Slti => self.op_slti(instruction),
            Opcode::Sltiu => self.op_sltiu(instruction),
            Opcode::Andi => self.op_andi(instruction),
            Opcode::Ori => self.op_ori(instruction),
            Opcode::Xori => self.op_xori(instruction),
            Opcode::Lui => self.op_lui(instruction),
            Opcode::Cop0 => self.execute_cop0(instruction),
            Opcode::Cop2 => self.execute_cop2(instruction),
            Opcode::Lb => self.op_lb(instruction, bus),
            Opcode::Lh => self.op_lh(instruction, bus),
            Opcode::Lwl => self.op_lwl(instruction, bus),
            Opcode::Lw => self.op_lw(instruction, bus),
            Opcode::Lbu => self.op_lbu(instruction, bus),
            Opcode::Lhu => self.op_lhu(instruction, bus),
            Opcode::Lwr => self.op_lwr(instruction, bus),
            Opcode::Sb => self.op_sb(instruction, bus),
            Opcode::Sh => self.op_sh(instruction, bus),
            Opcode::Swl => self.op_swl(instruction, bus),
            Opcode::Sw => self.op_sw(instruction, bus),
            Opcode::Swr => self.op_swr(instruction, bus),
            Opcode::Lwc2 => self.op_lwc2(instruction, bus),
            Opcode::Swc2 => self.op_swc2(instruction, bus),
            Opcode::Unimplemented(op) => self.unimplemented("opcode", op),
        }
    }

    /// Handle SPECIAL instructions (opcode 0x00)
    ///
    /// SPECIAL instructions use the lower 6 bits (funct field) to determine
    /// the specific operation.
    fn execute_special(&mut self, instruction: Instruction) -> Result<()> {
        let rs = instruction.rs();
        let rt = instruction.rt();
        let rd = instruction.rd();
        let shamt = instruction.shamt();

        match SpecialFunction::decode(instruction.function()) {
            SpecialFunction::Sll => self.op_sll(rt, rd, shamt),
            SpecialFunction::Srl => self.op_srl(rt, rd, shamt),
            SpecialFunction::Sra => self.op_sra(rt, rd, shamt),
            SpecialFunction::Sllv => self.op_sllv(rs, rt, rd),
            SpecialFunction::Srlv => self.op_srlv(rs, rt, rd),
            SpecialFunction::Srav => self.op_srav(rs, rt, rd),
            SpecialFunction::Jr => self.op_jr(rs),
            SpecialFunction::Jalr => self.op_jalr(rs, rd),
            SpecialFunction::Syscall => self.op_syscall(instruction),
            SpecialFunction::Break => self.op_break(instruction),
            SpecialFunction::Mfhi => self.op_mfhi(rd),
            SpecialFunction::Mthi => self.op_mthi(rs),
            SpecialFunction::Mflo => self.op_mflo(rd),
            SpecialFunction::Mtlo => self.op_mtlo(rs),
            SpecialFunction::Mult => self.op_mult(rs, rt),
            SpecialFunction::Multu => self.op_multu(rs, rt),
            SpecialFunction::Div => self.op_div(rs, rt),
            SpecialFunction::Divu => self.op_divu(rs, rt),
            SpecialFunction::Add => self.op_add(rs, rt, rd),
            SpecialFunction::Addu => self.op_addu(rs, rt, rd),
            SpecialFunction::Sub => self.op_sub(rs, rt, rd),
            SpecialFunction::Subu => self.op_subu(rs, rt, rd),
            SpecialFunction::And => self.op_and(rs, rt, rd),
            SpecialFunction::Or => self.op_or(rs, rt, rd),
            SpecialFunction::Xor => self.op_xor(rs, rt, rd),
            SpecialFunction::Nor => self.op_nor(rs, rt, rd),
            SpecialFunction::Slt => self.op_slt(rs, rt, rd),
            SpecialFunction::Sltu => self.op_sltu(rs, rt, rd),
            SpecialFunction::Unimplemented(funct) => self.unimplemented("SPECIAL function", funct),
        }
    }

    /// Handle COP0 instructions (opcode 0x10)
    ///
    /// The rs field selects the sub-operation; commands carry their function
    /// in the low 6 bits. CFC0/CTC0/BC0 and the TLB commands have nothing to
    /// act on and are reported as unimplemented.
    fn execute_cop0(&mut self, instruction: Instruction) -> Result<()> {
        match CopOperation::decode(instruction.rs()) {
            CopOperation::Mfc => self.op_mfc0(instruction),
            CopOperation::Mtc => self.op_mtc0(instruction),
            CopOperation::Command => match Cop0Function::decode(instruction.function()) {
                Cop0Function::Rfe => self.op_rfe(instruction),
                Cop0Function::Unimplemented(funct) => self.unimplemented("COP0 function", funct),
            },
            CopOperation::Cfc
            | CopOperation::Ctc
            | CopOperation::Bc
            | CopOperation::Unimplemented(_) => {
                self.unimplemented("COP0 sub-opcode", instruction.rs())
            }
        }
    }

    /// Handle COP2 instructions (opcode 0x12)
    fn execute_cop2(&mut self, instruction: Instruction) -> Result<()> {
        match CopOperation::decode(instruction.rs()) {
            CopOperation::Mfc => self.op_mfc2(instruction),
            CopOperation::Cfc => self.op_cfc2(instruction),
            CopOperation::Mtc => self.op_mtc2(instruction),
            CopOperation::Ctc => self.op_ctc2(instruction),
            CopOperation::Command => self.op_gte_command(instruction),
            CopOperation::Bc | CopOperation::Unimplemented(_) => {
                self.unimplemented("COP2 sub-opcode", instruction.rs())
            }
        }
    }

    /// Effective address of a load/store: rs + sign_extend(imm16)
    #[inline(always)]
    fn effective_address(&self, instruction: Instruction) -> u32 {
        self.reg(instruction.rs())
            .wrapping_add(instruction.imm16_se())
    }

    /// Perform a data read
    ///
    /// Misaligned addresses raise AddressErrorLoad (latching BadVAddr) and
    /// never reach the bus; a bus that reports nothing mapped raises
    /// DataBusError. Either way `None` is returned and the caller must not
    /// write back.
    fn read_data(&mut self, bus: &mut dyn Bus, addr: u32, size: AccessSize) -> Result<Option<u32>> {
        let value = self.bus_read(bus, addr, size)?;
        if value.is_some() {
            self.check_data_breakpoint(addr, false);
        }
        Ok(value)
    }

    /// Perform a data write
    ///
    /// Same fault rules as [`CPU::read_data`] with AddressErrorStore. While
    /// the cache is isolated the write is dropped after the alignment check.
    fn write_data(
        &mut self,
        bus: &mut dyn Bus,
        addr: u32,
        size: AccessSize,
        value: u32,
    ) -> Result<()> {
        if self.bus_write(bus, addr, size, value)? {
            self.check_data_breakpoint(addr, true);
        }
        Ok(())
    }

    /// Bus half of [`CPU::read_data`], without the breakpoint compare
    ///
    /// The unaligned loads and stores fetch the containing word through
    /// here and compare their own effective address afterwards.
    fn bus_read(&mut self, bus: &mut dyn Bus, addr: u32, size: AccessSize) -> Result<Option<u32>> {
        if addr & size.alignment_mask() != 0 {
            self.cop0.bad_vaddr = addr;
            self.signal_exception(ExceptionCause::AddressErrorLoad);
            return Ok(None);
        }

        let result = match size {
            AccessSize::Byte => bus.read8(addr).map(u32::from),
            AccessSize::Half => bus.read16(addr).map(u32::from),
            AccessSize::Word => bus.read32(addr),
        };

        match result {
            Ok(value) => Ok(Some(value)),
            Err(EmulatorError::InvalidMemoryAccess { .. }) => {
                self.signal_exception(ExceptionCause::DataBusError);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Bus half of [`CPU::write_data`], without the breakpoint compare
    ///
    /// Returns whether the write reached the bus.
    fn bus_write(
        &mut self,
        bus: &mut dyn Bus,
        addr: u32,
        size: AccessSize,
        value: u32,
    ) -> Result<bool> {
        if addr & size.alignment_mask() != 0 {
            self.cop0.bad_vaddr = addr;
            self.signal_exception(ExceptionCause::AddressErrorStore);
            return Ok(false);
        }

        if self.cop0.sr.isolate_cache {
            log::trace!(
                "Cache isolated, dropping store of 0x{:08X} to 0x{:08X}",
                value,
                addr
            );
            return Ok(false);
        }

        let result = match size {
            AccessSize::Byte => bus.write8(addr, value as u8),
            AccessSize::Half => bus.write16(addr, value as u16),
            AccessSize::Word => bus.write32(addr, value),
        };

        match result {
            Ok(()) => Ok(true),
            Err(EmulatorError::InvalidMemoryAccess { .. }) => {
                self.signal_exception(ExceptionCause::DataBusError);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Compare a completed data access against BDA/BDAM
    fn check_data_breakpoint(&mut self, addr: u32, is_write: bool) {
        let dcic = self.cop0.dcic;
        let armed = if is_write {
            dcic.write_breakpoints_enabled()
        } else {
            dcic.read_breakpoints_enabled()
        };

        if armed && ((addr ^ self.cop0.bda) & self.cop0.bdam) == 0 {
            let direction = if is_write {
                DebugControl::DATA_WRITE_BREAK
            } else {
                DebugControl::DATA_READ_BREAK
            };
            self.enter_debug_break(DebugControl::DATA_BREAK | direction);
        }
    }
}
