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

//! CPU test modules
//!
//! Tests are organized into the following categories:
//! - `basic`: CPU initialization, reset, register access, PC handling
//! - `load_delay`: Load delay slot behavior
//! - `branch_delay`: Branch and jump delay slots, link registers
//! - `exceptions`: Exception entry, syscall, break, interrupts, bus errors
//! - `cop0`: COP0 coprocessor operations (MFC0, MTC0, RFE) and breakpoints
//! - `instructions`: ALU, multiply/divide, load and store execution
//! - `unaligned`: LWL/LWR/SWL/SWR merges
//! - `dispatch`: Unimplemented encodings and COP2 forwarding
//! - `properties`: proptest invariants for the register file and ALU
//!
//! Most tests assemble a short program into RAM with the encoders below
//! and drive it through [`CPU::step`].

use super::*;
use crate::core::memory::MemoryBus;
use std::cell::RefCell;
use std::rc::Rc;

mod cop0;

/// Where test programs are loaded (KSEG0 view of RAM offset 0x10000)
const PROGRAM_BASE: u32 = 0x8001_0000;

/// Address of the `index`th instruction of a test program
fn at(index: u32) -> u32 {
    PROGRAM_BASE + index * 4
}

// === Instruction encoders ===

fn r_type(funct: u32, rs: u8, rt: u8, rd: u8, shamt: u8) -> u32 {
    ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | ((shamt as u32) << 6) | funct
}

fn i_type(op: u32, rs: u8, rt: u8, imm: u16) -> u32 {
    (op << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | imm as u32
}

fn j_type(op: u32, target: u32) -> u32 {
    (op << 26) | ((target >> 2) & 0x03FF_FFFF)
}

const NOP: u32 = 0;
const SYSCALL: u32 = 0x0000_000C;
const BREAK: u32 = 0x0000_000D;
const RFE: u32 = 0x4200_0010;

fn sll(rd: u8, rt: u8, shamt: u8) -> u32 {
    r_type(0x00, 0, rt, rd, shamt)
}
fn sra(rd: u8, rt: u8, shamt: u8) -> u32 {
    r_type(0x03, 0, rt, rd, shamt)
}
fn srlv(rd: u8, rt: u8, rs: u8) -> u32 {
    r_type(0x06, rs, rt, rd, 0)
}
fn jr(rs: u8) -> u32 {
    r_type(0x08, rs, 0, 0, 0)
}
fn jalr(rd: u8, rs: u8) -> u32 {
    r_type(0x09, rs, 0, rd, 0)
}
fn mfhi(rd: u8) -> u32 {
    r_type(0x10, 0, 0, rd, 0)
}
fn mflo(rd: u8) -> u32 {
    r_type(0x12, 0, 0, rd, 0)
}
fn mult(rs: u8, rt: u8) -> u32 {
    r_type(0x18, rs, rt, 0, 0)
}
fn multu(rs: u8, rt: u8) -> u32 {
    r_type(0x19, rs, rt, 0, 0)
}
fn div(rs: u8, rt: u8) -> u32 {
    r_type(0x1A, rs, rt, 0, 0)
}
fn divu(rs: u8, rt: u8) -> u32 {
    r_type(0x1B, rs, rt, 0, 0)
}
fn add(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x20, rs, rt, rd, 0)
}
fn addu(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x21, rs, rt, rd, 0)
}
fn sub(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x22, rs, rt, rd, 0)
}
fn nor(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x27, rs, rt, rd, 0)
}
fn slt(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x2A, rs, rt, rd, 0)
}
fn sltu(rd: u8, rs: u8, rt: u8) -> u32 {
    r_type(0x2B, rs, rt, rd, 0)
}

fn bltz(rs: u8, offset: i16) -> u32 {
    i_type(0x01, rs, 0x00, offset as u16)
}
fn bgezal(rs: u8, offset: i16) -> u32 {
    i_type(0x01, rs, 0x11, offset as u16)
}
fn bltzal(rs: u8, offset: i16) -> u32 {
    i_type(0x01, rs, 0x10, offset as u16)
}
fn j(target: u32) -> u32 {
    j_type(0x02, target)
}
fn jal(target: u32) -> u32 {
    j_type(0x03, target)
}
fn beq(rs: u8, rt: u8, offset: i16) -> u32 {
    i_type(0x04, rs, rt, offset as u16)
}
fn bne(rs: u8, rt: u8, offset: i16) -> u32 {
    i_type(0x05, rs, rt, offset as u16)
}
fn addi(rt: u8, rs: u8, imm: i16) -> u32 {
    i_type(0x08, rs, rt, imm as u16)
}
fn addiu(rt: u8, rs: u8, imm: i16) -> u32 {
    i_type(0x09, rs, rt, imm as u16)
}
fn sltiu(rt: u8, rs: u8, imm: i16) -> u32 {
    i_type(0x0B, rs, rt, imm as u16)
}
fn andi(rt: u8, rs: u8, imm: u16) -> u32 {
    i_type(0x0C, rs, rt, imm)
}
fn ori(rt: u8, rs: u8, imm: u16) -> u32 {
    i_type(0x0D, rs, rt, imm)
}
fn lui(rt: u8, imm: u16) -> u32 {
    i_type(0x0F, 0, rt, imm)
}

fn mfc0(rt: u8, rd: u8) -> u32 {
    (0x10 << 26) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn mtc0(rt: u8, rd: u8) -> u32 {
    (0x10 << 26) | (0x04 << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn mfc2(rt: u8, rd: u8) -> u32 {
    (0x12 << 26) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn cfc2(rt: u8, rd: u8) -> u32 {
    (0x12 << 26) | (0x02 << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn mtc2(rt: u8, rd: u8) -> u32 {
    (0x12 << 26) | (0x04 << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn ctc2(rt: u8, rd: u8) -> u32 {
    (0x12 << 26) | (0x06 << 21) | ((rt as u32) << 16) | ((rd as u32) << 11)
}
fn cop2(command: u32) -> u32 {
    (0x12 << 26) | (1 << 25) | (command & 0x1FF_FFFF)
}

fn lb(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x20, base, rt, offset as u16)
}
fn lh(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x21, base, rt, offset as u16)
}
fn lwl(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x22, base, rt, offset as u16)
}
fn lw(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x23, base, rt, offset as u16)
}
fn lbu(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x24, base, rt, offset as u16)
}
fn lhu(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x25, base, rt, offset as u16)
}
fn lwr(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x26, base, rt, offset as u16)
}
fn sb(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x28, base, rt, offset as u16)
}
fn sh(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x29, base, rt, offset as u16)
}
fn swl(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x2A, base, rt, offset as u16)
}
fn sw(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x2B, base, rt, offset as u16)
}
fn swr(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x2E, base, rt, offset as u16)
}
fn lwc2(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x32, base, rt, offset as u16)
}
fn swc2(rt: u8, offset: i16, base: u8) -> u32 {
    i_type(0x3A, base, rt, offset as u16)
}

// === Harness ===

/// Load `program` at [`PROGRAM_BASE`] and point a fresh CPU at it
fn setup(program: &[u32]) -> (CPU, MemoryBus) {
    let mut bus = MemoryBus::new();
    load_words(&mut bus, PROGRAM_BASE, program);

    let mut cpu = CPU::new();
    cpu.set_pc(PROGRAM_BASE);
    (cpu, bus)
}

fn load_words(bus: &mut MemoryBus, addr: u32, words: &[u32]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    bus.load_image(addr, &bytes).unwrap();
}

fn run(cpu: &mut CPU, bus: &mut dyn Bus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).unwrap();
    }
}

/// Clear BEV so exceptions vector to RAM
fn use_ram_vectors(cpu: &mut CPU) {
    cpu.cop0.sr.boot_exception = false;
}

/// One bus transaction seen by [`RecordingBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read { addr: u32, size: u8 },
    Write { addr: u32, size: u8, value: u32 },
}

/// Bus double that logs every access before forwarding it to a
/// [`MemoryBus`]
///
/// Accesses to `fatal_at` fail with an error that is not a bus error.
struct RecordingBus {
    memory: MemoryBus,
    accesses: Vec<Access>,
    fatal_at: Option<u32>,
}

impl RecordingBus {
    fn new(memory: MemoryBus) -> Self {
        Self {
            memory,
            accesses: Vec::new(),
            fatal_at: None,
        }
    }

    fn writes(&self) -> Vec<Access> {
        self.accesses
            .iter()
            .copied()
            .filter(|a| matches!(a, Access::Write { .. }))
            .collect()
    }

    /// Whether any access touched `addr`
    fn touched(&self, addr: u32) -> bool {
        self.accesses.iter().any(|access| match *access {
            Access::Read { addr: a, .. } | Access::Write { addr: a, .. } => a == addr,
        })
    }

    fn check(&self, addr: u32) -> Result<()> {
        if self.fatal_at == Some(addr) {
            return Err(EmulatorError::UnalignedAccess { address: addr, size: 0 });
        }
        Ok(())
    }
}

impl Bus for RecordingBus {
    fn read8(&mut self, addr: u32) -> Result<u8> {
        self.accesses.push(Access::Read { addr, size: 1 });
        self.check(addr)?;
        self.memory.read8(addr)
    }

    fn read16(&mut self, addr: u32) -> Result<u16> {
        self.accesses.push(Access::Read { addr, size: 2 });
        self.check(addr)?;
        self.memory.read16(addr)
    }

    fn read32(&mut self, addr: u32) -> Result<u32> {
        self.accesses.push(Access::Read { addr, size: 4 });
        self.check(addr)?;
        self.memory.read32(addr)
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<()> {
        self.accesses.push(Access::Write { addr, size: 1, value: value as u32 });
        self.check(addr)?;
        self.memory.write8(addr, value)
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<()> {
        self.accesses.push(Access::Write { addr, size: 2, value: value as u32 });
        self.check(addr)?;
        self.memory.write16(addr, value)
    }

    fn write32(&mut self, addr: u32, value: u32) -> Result<()> {
        self.accesses.push(Access::Write { addr, size: 4, value });
        self.check(addr)?;
        self.memory.write32(addr, value)
    }
}

/// Coprocessor 2 double sharing its log with the test
#[derive(Default)]
struct GteLog {
    commands: Vec<u32>,
    data_writes: Vec<(u8, u32)>,
    control_writes: Vec<(u8, u32)>,
}

struct RecordingGte {
    log: Rc<RefCell<GteLog>>,
}

impl Coprocessor2 for RecordingGte {
    fn read_data(&self, index: u8) -> u32 {
        0x0D00_0000 | index as u32
    }

    fn write_data(&mut self, index: u8, value: u32) {
        self.log.borrow_mut().data_writes.push((index, value));
    }

    fn read_control(&self, index: u8) -> u32 {
        0x0C00_0000 | index as u32
    }

    fn write_control(&mut self, index: u8, value: u32) {
        self.log.borrow_mut().control_writes.push((index, value));
    }

    fn execute(&mut self, command: u32) {
        self.log.borrow_mut().commands.push(command);
    }
}

fn attach_recording_gte(cpu: &mut CPU) -> Rc<RefCell<GteLog>> {
    let log = Rc::new(RefCell::new(GteLog::default()));
    cpu.set_coprocessor2(Box::new(RecordingGte { log: log.clone() }));
    log
}
