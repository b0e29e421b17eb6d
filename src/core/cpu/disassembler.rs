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

//! MIPS instruction disassembler for debugging
//!
//! Converts binary instruction encodings to human-readable assembly mnemonics.
//! Registers are printed by their ABI names.

use super::decode::{Cop0Function, CopOperation, Instruction, Opcode, SpecialFunction};

const REGISTER_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// Conventional ABI name of a general-purpose register
///
/// # Example
/// ```
/// use psrx_cpu::core::cpu::register_name;
///
/// assert_eq!(register_name(0), "zero");
/// assert_eq!(register_name(29), "sp");
/// assert_eq!(register_name(31), "ra");
/// ```
pub fn register_name(index: u8) -> &'static str {
    REGISTER_NAMES[(index & 0x1F) as usize]
}

fn cop0_register_name(index: u8) -> Option<&'static str> {
    match index {
        3 => Some("bpc"),
        5 => Some("bda"),
        6 => Some("jumpdest"),
        7 => Some("dcic"),
        8 => Some("badvaddr"),
        9 => Some("bdam"),
        11 => Some("bpcm"),
        12 => Some("sr"),
        13 => Some("cause"),
        14 => Some("epc"),
        15 => Some("prid"),
        _ => None,
    }
}

/// Instruction disassembler
///
/// Converts 32-bit MIPS instruction encodings to human-readable assembly format.
///
/// # Example
/// ```
/// use psrx_cpu::core::cpu::Disassembler;
///
/// let instruction = 0x00000000; // NOP
/// let disasm = Disassembler::disassemble(instruction, 0xBFC00000);
/// assert_eq!(disasm, "nop");
/// ```
pub struct Disassembler;

impl Disassembler {
    /// Disassemble a single instruction to human-readable format
    ///
    /// # Arguments
    ///
    /// * `instruction` - The 32-bit instruction to disassemble
    /// * `pc` - Address of the instruction (used for branch and jump targets)
    ///
    /// # Returns
    ///
    /// String containing the disassembled instruction. Encodings the core
    /// does not execute render as `??? 0x........`.
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::Disassembler;
    ///
    /// let instruction = 0x3C011234; // LUI at, 0x1234
    /// let disasm = Disassembler::disassemble(instruction, 0xBFC00000);
    /// assert_eq!(disasm, "lui $at, 0x1234");
    /// ```
    pub fn disassemble(instruction: u32, pc: u32) -> String {
        let i = Instruction(instruction);
        let rs = register_name(i.rs());
        let rt = register_name(i.rt());
        let simm = i.imm16() as u16 as i16;

        match Opcode::decode(i.opcode()) {
            Opcode::Special => Self::disasm_special(i),
            Opcode::Bcondz => Self::disasm_bcondz(i, pc),
            Opcode::J => format!("j 0x{:08X}", Self::jump_target(i, pc)),
            Opcode::Jal => format!("jal 0x{:08X}", Self::jump_target(i, pc)),
            Opcode::Beq => format!("beq ${}, ${}, 0x{:08X}", rs, rt, Self::branch_target(i, pc)),
            Opcode::Bne => format!("bne ${}, ${}, 0x{:08X}", rs, rt, Self::branch_target(i, pc)),
            Opcode::Blez => format!("blez ${}, 0x{:08X}", rs, Self::branch_target(i, pc)),
            Opcode::Bgtz => format!("bgtz ${}, 0x{:08X}", rs, Self::branch_target(i, pc)),
            Opcode::Addi => format!("addi ${}, ${}, {}", rt, rs, simm),
            Opcode::Addiu => format!("addiu ${}, ${}, {}", rt, rs, simm),
            Opcode::Slti => format!("slti ${}, ${}, {}", rt, rs, simm),
            Opcode::Sltiu => format!("sltiu ${}, ${}, {}", rt, rs, simm),
            Opcode::Andi => format!("andi ${}, ${}, 0x{:04X}", rt, rs, i.imm16()),
            Opcode::Ori => format!("ori ${}, ${}, 0x{:04X}", rt, rs, i.imm16()),
            Opcode::Xori => format!("xori ${}, ${}, 0x{:04X}", rt, rs, i.imm16()),
            Opcode::Lui => format!("lui ${}, 0x{:04X}", rt, i.imm16()),
            Opcode::Cop0 => Self::disasm_cop0(i),
            Opcode::Cop2 => Self::disasm_cop2(i),
            Opcode::Lb => Self::memory("lb", rt, simm, rs),
            Opcode::Lh => Self::memory("lh", rt, simm, rs),
            Opcode::Lwl => Self::memory("lwl", rt, simm, rs),
            Opcode::Lw => Self::memory("lw", rt, simm, rs),
            Opcode::Lbu => Self::memory("lbu", rt, simm, rs),
            Opcode::Lhu => Self::memory("lhu", rt, simm, rs),
            Opcode::Lwr => Self::memory("lwr", rt, simm, rs),
            Opcode::Sb => Self::memory("sb", rt, simm, rs),
            Opcode::Sh => Self::memory("sh", rt, simm, rs),
            Opcode::Swl => Self::memory("swl", rt, simm, rs),
            Opcode::Sw => Self::memory("sw", rt, simm, rs),
            Opcode::Swr => Self::memory("swr", rt, simm, rs),
            Opcode::Lwc2 => format!("lwc2 $gte{}, {}(${})", i.rt(), simm, rs),
            Opcode::Swc2 => format!("swc2 $gte{}, {}(${})", i.rt(), simm, rs),
            Opcode::Unimplemented(_) => Self::unknown(i),
        }
    }

    fn memory(mnemonic: &str, rt: &str, offset: i16, base: &str) -> String {
        format!("{} ${}, {}(${})", mnemonic, rt, offset, base)
    }

    fn unknown(instruction: Instruction) -> String {
        format!("??? {}", instruction)
    }

    /// Target of a branch at `pc`: relative to the delay slot
    fn branch_target(instruction: Instruction, pc: u32) -> u32 {
        pc.wrapping_add(4)
            .wrapping_add(instruction.imm16_se() << 2)
    }

    /// Target of a J/JAL at `pc`: the delay slot's 256MB region
    fn jump_target(instruction: Instruction, pc: u32) -> u32 {
        (pc.wrapping_add(4) & 0xF000_0000) | (instruction.target() << 2)
    }

    /// Disassemble SPECIAL (opcode 0x00) instruction
    fn disasm_special(i: Instruction) -> String {
        let rs = register_name(i.rs());
        let rt = register_name(i.rt());
        let rd = register_name(i.rd());
        let shamt = i.shamt();

        match SpecialFunction::decode(i.function()) {
            SpecialFunction::Sll if i.0 == 0 => "nop".to_string(),
            SpecialFunction::Sll => format!("sll ${}, ${}, {}", rd, rt, shamt),
            SpecialFunction::Srl => format!("srl ${}, ${}, {}", rd, rt, shamt),
            SpecialFunction::Sra => format!("sra ${}, ${}, {}", rd, rt, shamt),
            SpecialFunction::Sllv => format!("sllv ${}, ${}, ${}", rd, rt, rs),
            SpecialFunction::Srlv => format!("srlv ${}, ${}, ${}", rd, rt, rs),
            SpecialFunction::Srav => format!("srav ${}, ${}, ${}", rd, rt, rs),
            SpecialFunction::Jr => format!("jr ${}", rs),
            SpecialFunction::Jalr if i.rd() == 31 => format!("jalr ${}", rs),
            SpecialFunction::Jalr => format!("jalr ${}, ${}", rd, rs),
            SpecialFunction::Syscall if i.imm20() == 0 => "syscall".to_string(),
            SpecialFunction::Syscall => format!("syscall 0x{:05X}", i.imm20()),
            SpecialFunction::Break if i.imm20() == 0 => "break".to_string(),
            SpecialFunction::Break => format!("break 0x{:05X}", i.imm20()),
            SpecialFunction::Mfhi => format!("mfhi ${}", rd),
            SpecialFunction::Mthi => format!("mthi ${}", rs),
            SpecialFunction::Mflo => format!("mflo ${}", rd),
            SpecialFunction::Mtlo => format!("mtlo ${}", rs),
            SpecialFunction::Mult => format!("mult ${}, ${}", rs, rt),
            SpecialFunction::Multu => format!("multu ${}, ${}", rs, rt),
            SpecialFunction::Div => format!("div ${}, ${}", rs, rt),
            SpecialFunction::Divu => format!("divu ${}, ${}", rs, rt),
            SpecialFunction::Add => format!("add ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Addu => format!("addu ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Sub => format!("sub ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Subu => format!("subu ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::And => format!("and ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Or => format!("or ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Xor => format!("xor ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Nor => format!("nor ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Slt => format!("slt ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Sltu => format!("sltu ${}, ${}, ${}", rd, rs, rt),
            SpecialFunction::Unimplemented(_) => Self::unknown(i),
        }
    }

    /// Disassemble BcondZ (opcode 0x01) instruction
    ///
    /// Bit 16 selects BGEZ over BLTZ; rt bits 4-1 == 0b1000 adds the link.
    fn disasm_bcondz(i: Instruction, pc: u32) -> String {
        let is_bgez = i.rt() & 0x01 != 0;
        let link = (i.rt() & 0x1E) == 0x10;

        let mnemonic = match (is_bgez, link) {
            (false, false) => "bltz",
            (true, false) => "bgez",
            (false, true) => "bltzal",
            (true, true) => "bgezal",
        };

        format!(
            "{} ${}, 0x{:08X}",
            mnemonic,
            register_name(i.rs()),
            Self::branch_target(i, pc)
        )
    }

    /// Disassemble COP0 (coprocessor 0) instruction
    fn disasm_cop0(i: Instruction) -> String {
        let rt = register_name(i.rt());
        let rd = match cop0_register_name(i.rd()) {
            Some(name) => format!("${}", name),
            None => format!("$cop0r{}", i.rd()),
        };

        match CopOperation::decode(i.rs()) {
            CopOperation::Mfc => format!("mfc0 ${}, {}", rt, rd),
            CopOperation::Mtc => format!("mtc0 ${}, {}", rt, rd),
            CopOperation::Command => match Cop0Function::decode(i.function()) {
                Cop0Function::Rfe => "rfe".to_string(),
                Cop0Function::Unimplemented(_) => Self::unknown(i),
            },
            _ => Self::unknown(i),
        }
    }

    /// Disassemble COP2 (GTE) instruction
    fn disasm_cop2(i: Instruction) -> String {
        let rt = register_name(i.rt());

        match CopOperation::decode(i.rs()) {
            CopOperation::Mfc => format!("mfc2 ${}, $gte{}", rt, i.rd()),
            CopOperation::Cfc => format!("cfc2 ${}, $gtec{}", rt, i.rd()),
            CopOperation::Mtc => format!("mtc2 ${}, $gte{}", rt, i.rd()),
            CopOperation::Ctc => format!("ctc2 ${}, $gtec{}", rt, i.rd()),
            CopOperation::Command => format!("cop2 0x{:07X}", i.imm25()),
            _ => Self::unknown(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_names() {
        assert_eq!(register_name(0), "zero");
        assert_eq!(register_name(4), "a0");
        assert_eq!(register_name(26), "k0");
        assert_eq!(register_name(30), "fp");
    }

    #[test]
    fn test_disasm_nop() {
        let result = Disassembler::disassemble(0x00000000, 0);
        assert_eq!(result, "nop");
    }

    #[test]
    fn test_disasm_lui() {
        let result = Disassembler::disassemble(0x3C011234, 0); // LUI r1, 0x1234
        assert_eq!(result, "lui $at, 0x1234");
    }

    #[test]
    fn test_disasm_addiu() {
        let result = Disassembler::disassemble(0x24220042, 0); // ADDIU r2, r1, 66
        assert_eq!(result, "addiu $v0, $at, 66");

        let result = Disassembler::disassemble(0x2442FFFF, 0); // ADDIU r2, r2, -1
        assert_eq!(result, "addiu $v0, $v0, -1");
    }

    #[test]
    fn test_disasm_or() {
        let result = Disassembler::disassemble(0x00411825, 0); // OR r3, r2, r1
        assert_eq!(result, "or $v1, $v0, $at");
    }

    #[test]
    fn test_disasm_loads_and_stores() {
        assert_eq!(Disassembler::disassemble(0xAC220000, 0), "sw $v0, 0($at)");
        assert_eq!(Disassembler::disassemble(0x8C220004, 0), "lw $v0, 4($at)");
        assert_eq!(Disassembler::disassemble(0x8FBFFFFC, 0), "lw $ra, -4($sp)");
    }

    #[test]
    fn test_disasm_j() {
        let result = Disassembler::disassemble(0x0BF00000, 0xBFC00000); // J 0xBFC00000
        assert_eq!(result, "j 0xBFC00000");
    }

    #[test]
    fn test_disasm_branch_target() {
        // BEQ r1, r2, +2 at 0x80010000 -> 0x80010000 + 4 + 8
        let result = Disassembler::disassemble(0x10220002, 0x8001_0000);
        assert_eq!(result, "beq $at, $v0, 0x8001000C");

        // BNE r0, r0, -1 branches back onto itself
        let result = Disassembler::disassemble(0x1400FFFF, 0x8001_0000);
        assert_eq!(result, "bne $zero, $zero, 0x80010000");
    }

    #[test]
    fn test_disasm_bcondz() {
        assert_eq!(
            Disassembler::disassemble(0x04200001, 0),
            "bltz $at, 0x00000008"
        );
        assert_eq!(
            Disassembler::disassemble(0x04310001, 0),
            "bgezal $at, 0x00000008"
        );
    }

    #[test]
    fn test_disasm_jr() {
        let result = Disassembler::disassemble(0x03E00008, 0); // JR r31
        assert_eq!(result, "jr $ra");
    }

    #[test]
    fn test_disasm_cop0() {
        assert_eq!(Disassembler::disassemble(0x40026000, 0), "mfc0 $v0, $sr");
        assert_eq!(Disassembler::disassemble(0x40826800, 0), "mtc0 $v0, $cause");
        assert_eq!(Disassembler::disassemble(0x42000010, 0), "rfe");
        assert_eq!(Disassembler::disassemble(0x40020000, 0), "mfc0 $v0, $cop0r0");
    }

    #[test]
    fn test_disasm_cop2() {
        assert_eq!(Disassembler::disassemble(0x48024800, 0), "mfc2 $v0, $gte9");
        assert_eq!(Disassembler::disassemble(0x48C2D000, 0), "ctc2 $v0, $gtec26");
        assert_eq!(Disassembler::disassemble(0x4A180001, 0), "cop2 0x0180001");
        assert_eq!(Disassembler::disassemble(0xC8220008, 0), "lwc2 $gte2, 8($at)");
    }

    #[test]
    fn test_disasm_unknown() {
        let result = Disassembler::disassemble(0xFFFFFFFF, 0);
        assert_eq!(result, "??? 0xFFFFFFFF");
    }
}
