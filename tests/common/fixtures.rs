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

//! Test fixtures: a tiny assembler and program runners

use psrx_cpu::core::cpu::CPU;
use psrx_cpu::core::memory::MemoryBus;

/// Where test programs are loaded (KSEG0 view of RAM offset 0x10000)
#[allow(dead_code)]
pub const PROGRAM_BASE: u32 = 0x8001_0000;

/// General exception vector with SR.BEV clear
#[allow(dead_code)]
pub const RAM_EXCEPTION_VECTOR: u32 = 0x8000_0080;

/// Address of the `index`th instruction of a program at [`PROGRAM_BASE`]
#[allow(dead_code)]
pub fn at(index: u32) -> u32 {
    PROGRAM_BASE + index * 4
}

/// Instruction encoders for the handful of opcodes the scenarios use
#[allow(dead_code)]
pub mod asm {
    /// Register numbers by ABI name
    pub const ZERO: u8 = 0;
    pub const V0: u8 = 2;
    pub const A0: u8 = 4;
    pub const A1: u8 = 5;
    pub const A2: u8 = 6;
    pub const T0: u8 = 8;
    pub const T1: u8 = 9;
    pub const K0: u8 = 26;
    pub const K1: u8 = 27;

    pub const NOP: u32 = 0;
    pub const SYSCALL: u32 = 0x0000_000C;
    pub const RFE: u32 = 0x4200_0010;

    /// COP0 register numbers
    pub const SR: u8 = 12;
    pub const EPC: u8 = 14;

    fn i_type(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
        (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
    }

    pub fn addiu(rt: u8, rs: u8, imm: i16) -> u32 {
        i_type(0x09, rs, rt, imm as u16)
    }
    pub fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
        i_type(0x0D, rs, rt, imm)
    }
    pub fn lui(rt: u8, imm: u16) -> u32 {
        i_type(0x0F, 0, rt, imm)
    }
    pub fn addu(rd: u8, rs: u8, rt: u8) -> u32 {
        ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | 0x21
    }
    pub fn jr(rs: u8) -> u32 {
        ((rs as u32) << 21) | 0x08
    }
    pub fn j(target: u32) -> u32 {
        (0x02 << 26) | ((target >> 2) & 0x03FF_FFFF)
    }
    pub fn bne(rs: u8, rt: u8, offset: i16) -> u32 {
        i_type(0x05, rs, rt, offset as u16)
    }
    pub fn lw(rt: u8, offset: i16, base: u8) -> u32 {
        i_type(0x23, base, rt, offset as u16)
    }
    pub fn sw(rt: u8, offset: i16, base: u8) -> u32 {
        i_type(0x2B, base, rt, offset as u16)
    }
    pub fn mfc0(rt: u8, rd: u8) -> u32 {
        (0x10 << 26) | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
    pub fn mtc0(rt: u8, rd: u8) -> u32 {
        (0x10 << 26) | (0x04 << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
    }
}

/// Write `program` into memory at `addr`
#[allow(dead_code)]
pub fn load_program(bus: &mut MemoryBus, addr: u32, program: &[u32]) {
    let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    bus.load_image(addr, &bytes)
        .expect("Failed to load program");
}

/// Create a CPU and bus with `program` at [`PROGRAM_BASE`] and PC pointing at it
#[allow(dead_code)]
pub fn create_cpu_with_program(program: &[u32]) -> (CPU, MemoryBus) {
    let mut bus = MemoryBus::new();
    load_program(&mut bus, PROGRAM_BASE, program);

    let mut cpu = CPU::new();
    cpu.set_pc(PROGRAM_BASE);
    (cpu, bus)
}

/// Step until PC reaches `target`, returning the number of steps taken
///
/// Panics if the target is not reached within `max_steps`.
#[allow(dead_code)]
pub fn run_until_pc(cpu: &mut CPU, bus: &mut MemoryBus, target: u32, max_steps: usize) -> usize {
    for steps in 0..max_steps {
        if cpu.pc() == target {
            return steps;
        }
        cpu.step(bus).expect("CPU step failed");
    }
    panic!(
        "PC 0x{:08X} not reached within {} steps (stopped at 0x{:08X})",
        target,
        max_steps,
        cpu.pc()
    );
}

/// Execute N CPU instructions
#[allow(dead_code)]
pub fn execute_n_instructions(cpu: &mut CPU, bus: &mut MemoryBus, n: usize) {
    for _ in 0..n {
        cpu.step(bus).expect("CPU step failed");
    }
}
