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

//! Instruction field extraction and opcode decoding
//!
//! Formats:
//!
//! ```text
//! R-type: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
//! I-type: | op (6) | rs (5) | rt (5) |        immediate (16)         |
//! J-type: | op (6) |                 target (26)                    |
//! ```
//!
//! Every level of decoding is total: encodings the core does not execute
//! map to an explicit `Unimplemented` variant carrying the raw field.

use std::fmt;

/// A raw 32-bit instruction word
///
/// # Example
///
/// ```
/// use psrx_cpu::core::cpu::{Instruction, Opcode};
///
/// // addiu $t0, $zero, -1
/// let instr = Instruction(0x2408FFFF);
/// assert_eq!(Opcode::decode(instr.opcode()), Opcode::Addiu);
/// assert_eq!(instr.rt(), 8);
/// assert_eq!(instr.imm16(), 0xFFFF);
/// assert_eq!(instr.imm16_se(), 0xFFFFFFFF);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Primary opcode (bits 31-26)
    #[inline(always)]
    pub fn opcode(self) -> u8 {
        (self.0 >> 26) as u8
    }

    /// SPECIAL function code (bits 5-0)
    #[inline(always)]
    pub fn function(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    #[inline(always)]
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    #[inline(always)]
    pub fn shamt(self) -> u8 {
        ((self.0 >> 6) & 0x1F) as u8
    }

    /// Immediate, zero-extended
    #[inline(always)]
    pub fn imm16(self) -> u32 {
        self.0 & 0xFFFF
    }

    /// Immediate, sign-extended
    #[inline(always)]
    pub fn imm16_se(self) -> u32 {
        (self.0 as u16) as i16 as u32
    }

    /// SYSCALL/BREAK code field (bits 25-6)
    #[inline(always)]
    pub fn imm20(self) -> u32 {
        (self.0 >> 6) & 0xF_FFFF
    }

    /// Coprocessor command (bits 24-0)
    #[inline(always)]
    pub fn imm25(self) -> u32 {
        self.0 & 0x1FF_FFFF
    }

    /// Jump target (bits 25-0)
    #[inline(always)]
    pub fn imm26(self) -> u32 {
        self.0 & 0x3FF_FFFF
    }

    /// Alias of [`Instruction::imm26`]
    #[inline(always)]
    pub fn target(self) -> u32 {
        self.imm26()
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Instruction(word)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Primary opcode (bits 31-26)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Special,
    Bcondz,
    J,
    Jal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Cop0,
    Cop2,
    Lb,
    Lh,
    Lwl,
    Lw,
    Lbu,
    Lhu,
    Lwr,
    Sb,
    Sh,
    Swl,
    Sw,
    Swr,
    Lwc2,
    Swc2,
    /// COP1, COP3, LWC0/1/3, SWC0/1/3 and reserved opcodes
    Unimplemented(u8),
}

impl Opcode {
    pub fn decode(op: u8) -> Self {
        match op {
            0x00 => Opcode::Special,
            0x01 => Opcode::Bcondz,
            0x02 => Opcode::J,
            0x03 => Opcode::Jal,
            0x04 => Opcode::Beq,
            0x05 => Opcode::Bne,
            0x06 => Opcode::Blez,
            0x07 => Opcode::Bgtz,
            0x08 => Opcode::Addi,
            0x09 => Opcode::Addiu,
            0x0A => Opcode::Slti,
            0x0B => Opcode::Sltiu,
            0x0C => Opcode::Andi,
            0x0D => Opcode::Ori,
            0x0E => Opcode::Xori,
            0x0F => Opcode::Lui,
            0x10 => Opcode::Cop0,
            0x12 => Opcode::Cop2,
            0x20 => Opcode::Lb,
            0x21 => Opcode::Lh,
            0x22 => Opcode::Lwl,
            0x23 => Opcode::Lw,
            0x24 => Opcode::Lbu,
            0x25 => Opcode::Lhu,
            0x26 => Opcode::Lwr,
            0x28 => Opcode::Sb,
            0x29 => Opcode::Sh,
            0x2A => Opcode::Swl,
            0x2B => Opcode::Sw,
            0x2E => Opcode::Swr,
            0x32 => Opcode::Lwc2,
            0x3A => Opcode::Swc2,
            other => Opcode::Unimplemented(other),
        }
    }
}

/// SPECIAL function code (bits 5-0 when opcode is 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFunction {
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Syscall,
    Break,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Unimplemented(u8),
}

impl SpecialFunction {
    pub fn decode(funct: u8) -> Self {
        match funct {
            0x00 => SpecialFunction::Sll,
            0x02 => SpecialFunction::Srl,
            0x03 => SpecialFunction::Sra,
            0x04 => SpecialFunction::Sllv,
            0x06 => SpecialFunction::Srlv,
            0x07 => SpecialFunction::Srav,
            0x08 => SpecialFunction::Jr,
            0x09 => SpecialFunction::Jalr,
            0x0C => SpecialFunction::Syscall,
            0x0D => SpecialFunction::Break,
            0x10 => SpecialFunction::Mfhi,
            0x11 => SpecialFunction::Mthi,
            0x12 => SpecialFunction::Mflo,
            0x13 => SpecialFunction::Mtlo,
            0x18 => SpecialFunction::Mult,
            0x19 => SpecialFunction::Multu,
            0x1A => SpecialFunction::Div,
            0x1B => SpecialFunction::Divu,
            0x20 => SpecialFunction::Add,
            0x21 => SpecialFunction::Addu,
            0x22 => SpecialFunction::Sub,
            0x23 => SpecialFunction::Subu,
            0x24 => SpecialFunction::And,
            0x25 => SpecialFunction::Or,
            0x26 => SpecialFunction::Xor,
            0x27 => SpecialFunction::Nor,
            0x2A => SpecialFunction::Slt,
            0x2B => SpecialFunction::Sltu,
            other => SpecialFunction::Unimplemented(other),
        }
    }
}

/// Coprocessor sub-operation (rs field of a COPz encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopOperation {
    /// Move from data register
    Mfc,
    /// Move from control register
    Cfc,
    /// Move to data register
    Mtc,
    /// Move to control register
    Ctc,
    /// Branch on coprocessor condition
    Bc,
    /// Coprocessor command (rs bit 4 set); low 25 bits are the command
    Command,
    Unimplemented(u8),
}

impl CopOperation {
    pub fn decode(rs: u8) -> Self {
        match rs {
            0x00 => CopOperation::Mfc,
            0x02 => CopOperation::Cfc,
            0x04 => CopOperation::Mtc,
            0x06 => CopOperation::Ctc,
            0x08 => CopOperation::Bc,
            r if r & 0x10 != 0 => CopOperation::Command,
            other => CopOperation::Unimplemented(other),
        }
    }
}

/// COP0 command function (bits 5-0 of a COP0 command)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cop0Function {
    /// Return from exception
    Rfe,
    /// TLBR/TLBWI/TLBWR/TLBP and anything else; there is no TLB
    Unimplemented(u8),
}

impl Cop0Function {
    pub fn decode(funct: u8) -> Self {
        match funct {
            0x10 => Cop0Function::Rfe,
            other => Cop0Function::Unimplemented(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        // add $v1, $v0, $at
        let instr = Instruction(0x00411820);
        assert_eq!(instr.opcode(), 0);
        assert_eq!(instr.rs(), 2);
        assert_eq!(instr.rt(), 1);
        assert_eq!(instr.rd(), 3);
        assert_eq!(instr.shamt(), 0);
        assert_eq!(instr.function(), 0x20);
    }

    #[test]
    fn test_immediates() {
        let instr = Instruction(0x2401_8000);
        assert_eq!(instr.imm16(), 0x0000_8000);
        assert_eq!(instr.imm16_se(), 0xFFFF_8000);

        let instr = Instruction(0x0000_7FFF);
        assert_eq!(instr.imm16_se(), 0x0000_7FFF);
    }

    #[test]
    fn test_code_and_target_fields() {
        // break 0x12345 (code in bits 25-6)
        let instr = Instruction((0x12345 << 6) | 0x0D);
        assert_eq!(instr.imm20(), 0x12345);

        let instr = Instruction(0x0BF0_0000);
        assert_eq!(instr.target(), 0x03F0_0000);
        assert_eq!(instr.imm26(), instr.target());

        let instr = Instruction(0x4A18_0001);
        assert_eq!(instr.imm25(), 0x0018_0001);
    }

    #[test]
    fn test_opcode_decode_is_total() {
        for op in 0u8..64 {
            let decoded = Opcode::decode(op);
            if let Opcode::Unimplemented(raw) = decoded {
                assert_eq!(raw, op);
            }
        }
        assert_eq!(Opcode::decode(0x11), Opcode::Unimplemented(0x11));
        assert_eq!(Opcode::decode(0x13), Opcode::Unimplemented(0x13));
        assert_eq!(Opcode::decode(0x30), Opcode::Unimplemented(0x30));
        assert_eq!(Opcode::decode(0x32), Opcode::Lwc2);
        assert_eq!(Opcode::decode(0x3A), Opcode::Swc2);
    }

    #[test]
    fn test_special_decode() {
        assert_eq!(SpecialFunction::decode(0x20), SpecialFunction::Add);
        assert_eq!(SpecialFunction::decode(0x0D), SpecialFunction::Break);
        assert_eq!(
            SpecialFunction::decode(0x01),
            SpecialFunction::Unimplemented(0x01)
        );
        assert_eq!(
            SpecialFunction::decode(0x3F),
            SpecialFunction::Unimplemented(0x3F)
        );
    }

    #[test]
    fn test_cop_operation_decode() {
        assert_eq!(CopOperation::decode(0x00), CopOperation::Mfc);
        assert_eq!(CopOperation::decode(0x04), CopOperation::Mtc);
        assert_eq!(CopOperation::decode(0x10), CopOperation::Command);
        assert_eq!(CopOperation::decode(0x1F), CopOperation::Command);
        assert_eq!(
            CopOperation::decode(0x01),
            CopOperation::Unimplemented(0x01)
        );
        assert_eq!(Cop0Function::decode(0x10), Cop0Function::Rfe);
        assert_eq!(Cop0Function::decode(0x01), Cop0Function::Unimplemented(0x01));
    }
}
