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

use super::*;

const DCIC_CODE_BREAK: u32 = 0xC180_0000;
const DCIC_READ_BREAK: u32 = 0xC680_0000;
const DCIC_WRITE_BREAK: u32 = 0xCA80_0000;

#[test]
fn test_cop0_initialization() {
    let cpu = CPU::new();
    assert_eq!(cpu.read_cop0(COP0::SR), Some(0x1040_0000));
    assert_eq!(cpu.read_cop0(COP0::PRID), Some(0x0000_0002));
    assert_eq!(cpu.read_cop0(COP0::CAUSE), Some(0));
    assert_eq!(cpu.read_cop0(0), None);
}

#[test]
fn test_rfe_restores_mode() {
    let mut cpu = CPU::new();
    cpu.cop0.sr = Status::from_word(0x0000_000C);

    cpu.op_rfe(Instruction(RFE)).unwrap();

    assert_eq!(cpu.status().word() & 0x3F, 0x03);
}

#[test]
fn test_rfe_keeps_old_pair() {
    let mut cpu = CPU::new();
    cpu.cop0.sr = Status::from_word(0x0000_0030);

    cpu.op_rfe(Instruction(RFE)).unwrap();

    assert_eq!(cpu.status().word() & 0x3F, 0x3C);
}

#[test]
fn test_mtc0_then_mfc0_status() {
    let (mut cpu, mut bus) = setup(&[ori(1, 0, 0xFF01), mtc0(1, 12), mfc0(2, 12), NOP]);

    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.status().word(), 0x0000_FF01);
    assert!(cpu.status().interrupt_enable);
    assert_eq!(cpu.reg(2), 0x0000_FF01);
}

#[test]
fn test_mtc0_read_only_registers() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, -1), mtc0(1, 8), mtc0(1, 14), mtc0(1, 15), mtc0(1, 6)]);
    cpu.cop0.epc = 0x1234;

    run(&mut cpu, &mut bus, 5);

    assert_eq!(cpu.epc(), 0x1234);
    assert_eq!(cpu.bad_vaddr(), 0);
    assert_eq!(cpu.read_cop0(COP0::PRID), Some(2));
    assert_eq!(cpu.read_cop0(COP0::JUMPDEST), Some(0));
    assert_eq!(cpu.unimplemented_count(), 0);
}

#[test]
fn test_mtc0_cause_only_software_bits() {
    let (mut cpu, mut bus) = setup(&[addiu(1, 0, -1), mtc0(1, 13)]);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.read_cop0(COP0::CAUSE), Some(0x0000_0300));
}

#[test]
fn test_mtc0_breakpoint_registers() {
    let (mut cpu, mut bus) = setup(&[
        lui(1, 0x8001),
        mtc0(1, 3),
        mtc0(1, 5),
        addiu(2, 0, -4),
        mtc0(2, 9),
        mtc0(2, 11),
        mfc0(3, 11),
        NOP,
    ]);

    run(&mut cpu, &mut bus, 8);

    assert_eq!(cpu.read_cop0(COP0::BPC), Some(0x8001_0000));
    assert_eq!(cpu.read_cop0(COP0::BDA), Some(0x8001_0000));
    assert_eq!(cpu.read_cop0(COP0::BDAM), Some(0xFFFF_FFFC));
    assert_eq!(cpu.reg(3), 0xFFFF_FFFC);
}

#[test]
fn test_mfc0_bad_vaddr_after_fault() {
    let (mut cpu, mut bus) = setup(&[lw(2, 0x103, 0)]);
    use_ram_vectors(&mut cpu);
    load_words(&mut bus, 0x8000_0080, &[mfc0(26, 8), NOP]);

    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.reg(26), 0x0000_0103);
}

#[test]
fn test_missing_cop0_register_is_unimplemented() {
    let (mut cpu, mut bus) = setup(&[mtc0(1, 0), mfc0(2, 2), NOP]);

    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.unimplemented_count(), 2);
    assert_eq!(cpu.reg(2), 0);
    assert_eq!(
        cpu.last_unimplemented(),
        Some(UnimplementedInstruction {
            pc: at(1),
            instruction: Instruction(mfc0(2, 2)),
        })
    );
}

#[test]
fn test_code_breakpoint() {
    let (mut cpu, mut bus) = setup(&[NOP, addiu(8, 0, 1), NOP]);
    cpu.cop0.bpc = at(1);
    cpu.cop0.bpcm = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_CODE_BREAK);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.pc(), 0xBFC0_0140);
    assert_eq!(cpu.reg(8), 0);
    assert!(cpu
        .dcic()
        .contains(DebugControl::ANY_BREAK | DebugControl::CODE_BREAK));
}

#[test]
fn test_code_breakpoint_mask() {
    let (mut cpu, mut bus) = setup(&[NOP, NOP]);
    cpu.cop0.bpc = at(0) | 0xF0;
    cpu.cop0.bpcm = 0xFFFF_FF00;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_CODE_BREAK);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), 0xBFC0_0140);
}

#[test]
fn test_code_breakpoint_needs_all_enables() {
    let (mut cpu, mut bus) = setup(&[NOP, NOP]);
    cpu.cop0.bpc = at(0);
    cpu.cop0.bpcm = 0xFFFF_FFFF;
    // Super-master enable 2 missing
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_CODE_BREAK & !(1 << 31));

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), at(1));
    assert!(!cpu.dcic().contains(DebugControl::ANY_BREAK));
}

#[test]
fn test_data_read_breakpoint() {
    let (mut cpu, mut bus) = setup(&[lw(2, 0x100, 0), NOP]);
    bus.write32(0x100, 0xCAFE).unwrap();
    cpu.cop0.bda = 0x100;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_READ_BREAK);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc(), 0xBFC0_0140);
    assert_eq!(cpu.dcic().bits() & 0x3F, 0x0D);

    // The load completed before the break
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(2), 0xCAFE);
}

#[test]
fn test_data_read_breakpoint_ignores_stores() {
    let (mut cpu, mut bus) = setup(&[sw(2, 0x100, 0)]);
    cpu.cop0.bda = 0x100;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_READ_BREAK);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc(), at(1));
}

#[test]
fn test_data_write_breakpoint() {
    let (mut cpu, mut bus) = setup(&[sw(2, 0x100, 0)]);
    cpu.set_reg(2, 0xBEEF);
    cpu.cop0.bda = 0x100;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_WRITE_BREAK);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), 0xBFC0_0140);
    assert_eq!(cpu.dcic().bits() & 0x3F, 0x15);
    assert_eq!(bus.read32(0x100).unwrap(), 0xBEEF);
}

#[test]
fn test_swl_does_not_trip_read_breakpoint() {
    let (mut cpu, mut bus) = setup(&[swl(2, 0x101, 0)]);
    bus.write32(0x100, 0x1122_3344).unwrap();
    cpu.set_reg(2, 0xAABB_CCDD);
    cpu.cop0.bda = 0x100;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_READ_BREAK);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), at(1));
    assert!(!cpu.dcic().contains(DebugControl::ANY_BREAK));
    assert_eq!(bus.read32(0x100).unwrap(), 0x1122_AABB);
}

#[test]
fn test_lwl_breakpoint_compares_effective_address() {
    let (mut cpu, mut bus) = setup(&[lwl(2, 0x101, 0), NOP]);
    bus.write32(0x100, 0x1122_3344).unwrap();
    cpu.cop0.bda = 0x101;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_READ_BREAK);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc(), 0xBFC0_0140);
    assert_eq!(cpu.dcic().bits() & 0x3F, 0x0D);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.reg(2), 0x3344_0000);
}

#[test]
fn test_lwr_misses_breakpoint_on_containing_word() {
    let (mut cpu, mut bus) = setup(&[lwr(2, 0x102, 0)]);
    cpu.cop0.bda = 0x100;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_READ_BREAK);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), at(1));
    assert!(!cpu.dcic().contains(DebugControl::ANY_BREAK));
}

#[test]
fn test_swr_trips_write_breakpoint_once() {
    let (mut cpu, mut bus) = setup(&[swr(2, 0x103, 0)]);
    bus.write32(0x100, 0x1122_3344).unwrap();
    cpu.set_reg(2, 0xAABB_CCDD);
    cpu.cop0.bda = 0x103;
    cpu.cop0.bdam = 0xFFFF_FFFF;
    cpu.cop0.dcic = DebugControl::from_bits_retain(DCIC_WRITE_BREAK);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc(), 0xBFC0_0140);
    assert_eq!(cpu.dcic().bits() & 0x3F, 0x15);
    assert_eq!(bus.read32(0x100).unwrap(), 0xDD22_3344);
}

#[test]
fn test_isolated_cache_drops_stores() {
    let (mut cpu, memory) = setup(&[sw(2, 0x100, 0), sb(2, 0x104, 0), lw(3, 0x100, 0), NOP]);
    let mut bus = RecordingBus::new(memory);
    cpu.set_reg(2, 0xFFFF_FFFF);
    cpu.cop0.sr.isolate_cache = true;

    run(&mut cpu, &mut bus, 4);

    assert!(bus.writes().is_empty());
    assert!(bus.touched(0x100));
    assert_eq!(cpu.reg(3), 0);
    assert_eq!(cpu.cause().excode, 0);
}

#[test]
fn test_isolated_cache_still_checks_alignment() {
    let (mut cpu, mut bus) = setup(&[sw(2, 0x101, 0)]);
    cpu.cop0.sr.isolate_cache = true;

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.cause().excode, ExceptionCause::AddressErrorStore as u8);
}
