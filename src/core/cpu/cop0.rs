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

//! Coprocessor 0 (System Control) register block
//!
//! Status and Cause are kept as named fields; the raw register word is only
//! built when software reads it (MFC0) and parsed when software writes it
//! (MTC0).

use bitflags::bitflags;

/// Status Register (cop0r12)
///
/// Bit layout:
///
/// | Bits  | Field                 |
/// |-------|-----------------------|
/// | 0     | IEc                   |
/// | 1     | KUc (0 = kernel)      |
/// | 2-3   | IEp, KUp              |
/// | 4-5   | IEo, KUo              |
/// | 8-15  | Interrupt mask        |
/// | 16-21 | Cache/diagnostic bits |
/// | 22    | BEV                   |
/// | 25    | RE                    |
/// | 28-31 | CU0-CU3               |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub interrupt_enable: bool,
    /// false = kernel mode
    pub current_kernel_mode: bool,
    pub prev_interrupt: bool,
    pub prev_kernel: bool,
    /// Old interrupt enable (IEo)
    pub interrupt_disable: bool,
    pub old_kernel: bool,
    pub interrupt_mask: u8,
    /// Stores go to the data cache only, never to memory
    pub isolate_cache: bool,
    pub swapped_cache: bool,
    pub parity_zero: bool,
    pub cache_miss: bool,
    pub cache_parity_error: bool,
    pub tlb_shutdown: bool,
    /// BEV: exceptions vector into the BIOS
    pub boot_exception: bool,
    pub reverse_endianness: bool,
    pub coprocessor_enable: u8,
}

impl Status {
    /// Power-on value: BEV and CU0 set
    pub const RESET_VALUE: u32 = 0x1040_0000;

    /// Pack the fields into the register word
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::Status;
    ///
    /// let sr = Status::from_word(0x1040_0401);
    /// assert!(sr.interrupt_enable);
    /// assert!(sr.boot_exception);
    /// assert_eq!(sr.interrupt_mask, 0x04);
    /// assert_eq!(sr.word(), 0x1040_0401);
    /// ```
    pub fn word(&self) -> u32 {
        (self.interrupt_enable as u32)
            | (self.current_kernel_mode as u32) << 1
            | (self.prev_interrupt as u32) << 2
            | (self.prev_kernel as u32) << 3
            | (self.interrupt_disable as u32) << 4
            | (self.old_kernel as u32) << 5
            | (self.interrupt_mask as u32) << 8
            | (self.isolate_cache as u32) << 16
            | (self.swapped_cache as u32) << 17
            | (self.parity_zero as u32) << 18
            | (self.cache_miss as u32) << 19
            | (self.cache_parity_error as u32) << 20
            | (self.tlb_shutdown as u32) << 21
            | (self.boot_exception as u32) << 22
            | (self.reverse_endianness as u32) << 25
            | ((self.coprocessor_enable & 0xF) as u32) << 28
    }

    /// Unpack a register word
    ///
    /// Bits with no field (6-7, 23-24, 26-27) are dropped.
    pub fn from_word(word: u32) -> Self {
        let bit = |n: u32| word & (1 << n) != 0;
        Self {
            interrupt_enable: bit(0),
            current_kernel_mode: bit(1),
            prev_interrupt: bit(2),
            prev_kernel: bit(3),
            interrupt_disable: bit(4),
            old_kernel: bit(5),
            interrupt_mask: (word >> 8) as u8,
            isolate_cache: bit(16),
            swapped_cache: bit(17),
            parity_zero: bit(18),
            cache_miss: bit(19),
            cache_parity_error: bit(20),
            tlb_shutdown: bit(21),
            boot_exception: bit(22),
            reverse_endianness: bit(25),
            coprocessor_enable: ((word >> 28) & 0xF) as u8,
        }
    }

    /// Push the (IE, KU) stack on exception entry
    ///
    /// old <- previous, previous <- current, current <- (disabled, kernel)
    pub(super) fn enter_exception(&mut self) {
        self.interrupt_disable = self.prev_interrupt;
        self.old_kernel = self.prev_kernel;
        self.prev_interrupt = self.interrupt_enable;
        self.prev_kernel = self.current_kernel_mode;
        self.interrupt_enable = false;
        self.current_kernel_mode = false;
    }

    /// Pop the (IE, KU) stack (RFE)
    ///
    /// The old pair is left in place.
    pub(super) fn return_from_exception(&mut self) {
        self.interrupt_enable = self.prev_interrupt;
        self.current_kernel_mode = self.prev_kernel;
        self.prev_interrupt = self.interrupt_disable;
        self.prev_kernel = self.old_kernel;
    }
}

/// Cause Register (cop0r13)
///
/// | Bits  | Field                              |
/// |-------|------------------------------------|
/// | 2-6   | Exception code                     |
/// | 8-9   | Software interrupts (R/W)          |
/// | 10-15 | Hardware interrupts (R)            |
/// | 28-29 | Coprocessor number for CpU         |
/// | 31    | BD: exception hit a delay slot     |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cause {
    pub excode: u8,
    pub interrupt_pending: u8,
    pub coprocessor_exception: u8,
    pub branch_delay_slot: bool,
}

impl Cause {
    /// Interrupt pending bits writable through MTC0
    pub const SOFTWARE_INTERRUPTS: u8 = 0x03;

    pub fn word(&self) -> u32 {
        ((self.excode & 0x1F) as u32) << 2
            | (self.interrupt_pending as u32) << 8
            | ((self.coprocessor_exception & 0x3) as u32) << 28
            | (self.branch_delay_slot as u32) << 31
    }

    pub fn from_word(word: u32) -> Self {
        Self {
            excode: ((word >> 2) & 0x1F) as u8,
            interrupt_pending: (word >> 8) as u8,
            coprocessor_exception: ((word >> 28) & 0x3) as u8,
            branch_delay_slot: word & (1 << 31) != 0,
        }
    }
}

bitflags! {
    /// Debug and Cache Invalidate Control (cop0r7)
    ///
    /// The low bits are hit flags set by the hardware when a break is taken;
    /// the high bits enable the breakpoint units. A breakpoint only fires
    /// when both super-master enables and the master enable are set too.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DebugControl: u32 {
        const ANY_BREAK = 1 << 0;
        const CODE_BREAK = 1 << 1;
        const DATA_BREAK = 1 << 2;
        const DATA_READ_BREAK = 1 << 3;
        const DATA_WRITE_BREAK = 1 << 4;
        const JUMP_BREAK = 1 << 5;
        const SUPER_MASTER_ENABLE_1 = 1 << 23;
        const EXECUTION_BREAKPOINT = 1 << 24;
        const DATA_ACCESS_BREAKPOINT = 1 << 25;
        const BREAK_ON_DATA_READ = 1 << 26;
        const BREAK_ON_DATA_WRITE = 1 << 27;
        const BREAK_ON_ANY_JUMP = 1 << 28;
        const MASTER_ENABLE_ANY_JUMP = 1 << 29;
        const MASTER_ENABLE_BREAK = 1 << 30;
        const SUPER_MASTER_ENABLE_2 = 1 << 31;
    }
}

impl DebugControl {
    const ARMED: Self = Self::SUPER_MASTER_ENABLE_1
        .union(Self::SUPER_MASTER_ENABLE_2)
        .union(Self::MASTER_ENABLE_BREAK);

    /// Execution breakpoint (BPC/BPCM) armed
    pub fn code_breakpoints_enabled(self) -> bool {
        self.contains(Self::ARMED | Self::EXECUTION_BREAKPOINT)
    }

    /// Data breakpoint (BDA/BDAM) armed for loads
    pub fn read_breakpoints_enabled(self) -> bool {
        self.contains(Self::ARMED | Self::DATA_ACCESS_BREAKPOINT | Self::BREAK_ON_DATA_READ)
    }

    /// Data breakpoint (BDA/BDAM) armed for stores
    pub fn write_breakpoints_enabled(self) -> bool {
        self.contains(Self::ARMED | Self::DATA_ACCESS_BREAKPOINT | Self::BREAK_ON_DATA_WRITE)
    }
}

/// Coprocessor 0 (System Control)
///
/// COP0 is the system control unit responsible for exception handling,
/// status management and the debug breakpoint unit. The PlayStation has no
/// TLB, so only the registers below exist.
pub(super) struct COP0 {
    pub(super) bpc: u32,
    pub(super) bda: u32,
    pub(super) jumpdest: u32,
    pub(super) dcic: DebugControl,
    pub(super) bad_vaddr: u32,
    pub(super) bdam: u32,
    pub(super) bpcm: u32,
    pub(super) sr: Status,
    pub(super) cause: Cause,
    pub(super) epc: u32,
    pub(super) prid: u32,
}

impl COP0 {
    /// Breakpoint PC
    pub const BPC: u8 = 3;
    /// Breakpoint Data Address
    pub const BDA: u8 = 5;
    /// Branch target of the last exception taken in a delay slot
    pub const JUMPDEST: u8 = 6;
    /// Debug and Cache Invalidate Control
    pub const DCIC: u8 = 7;
    /// Bad Virtual Address
    pub const BAD_VADDR: u8 = 8;
    /// Data Address Mask
    pub const BDAM: u8 = 9;
    /// PC Mask
    pub const BPCM: u8 = 11;
    /// Status Register
    pub const SR: u8 = 12;
    /// Cause Register
    pub const CAUSE: u8 = 13;
    /// Exception PC
    pub const EPC: u8 = 14;
    /// Processor ID
    pub const PRID: u8 = 15;

    pub(super) fn new(prid: u32) -> Self {
        Self {
            bpc: 0,
            bda: 0,
            jumpdest: 0,
            dcic: DebugControl::empty(),
            bad_vaddr: 0,
            bdam: 0,
            bpcm: 0,
            sr: Status::from_word(Status::RESET_VALUE),
            cause: Cause::default(),
            epc: 0,
            prid,
        }
    }

    /// Reset COP0 registers to initial state
    ///
    /// PRID is a property of the chip and survives reset.
    pub(super) fn reset(&mut self) {
        *self = Self::new(self.prid);
    }

    /// Read a register as software sees it
    ///
    /// Returns `None` for register numbers that do not exist.
    pub(super) fn read(&self, reg: u8) -> Option<u32> {
        let value = match reg {
            Self::BPC => self.bpc,
            Self::BDA => self.bda,
            Self::JUMPDEST => self.jumpdest,
            Self::DCIC => self.dcic.bits(),
            Self::BAD_VADDR => self.bad_vaddr,
            Self::BDAM => self.bdam,
            Self::BPCM => self.bpcm,
            Self::SR => self.sr.word(),
            Self::CAUSE => self.cause.word(),
            Self::EPC => self.epc,
            Self::PRID => self.prid,
            _ => return None,
        };
        Some(value)
    }

    /// Write a register from software (MTC0)
    ///
    /// Read-only registers silently keep their value. Only the two software
    /// interrupt bits of CAUSE are writable. Returns `false` for register
    /// numbers that do not exist.
    pub(super) fn write(&mut self, reg: u8, value: u32) -> bool {
        match reg {
            Self::BPC => self.bpc = value,
            Self::BDA => self.bda = value,
            Self::DCIC => self.dcic = DebugControl::from_bits_retain(value),
            Self::BDAM => self.bdam = value,
            Self::BPCM => self.bpcm = value,
            Self::SR => self.sr = Status::from_word(value),
            Self::CAUSE => {
                let soft = (value >> 8) as u8 & Cause::SOFTWARE_INTERRUPTS;
                self.cause.interrupt_pending =
                    (self.cause.interrupt_pending & !Cause::SOFTWARE_INTERRUPTS) | soft;
            }
            Self::JUMPDEST | Self::BAD_VADDR | Self::EPC | Self::PRID => {
                log::trace!("Ignoring write to read-only cop0r{}", reg);
            }
            _ => return false,
        }
        true
    }
}

/// Exception cause codes for MIPS R3000A
///
/// These correspond to the exception codes stored in the CAUSE register
/// when a CPU exception occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExceptionCause {
    /// Interrupt (external or internal)
    Interrupt = 0,
    /// Address error on load or instruction fetch
    AddressErrorLoad = 4,
    /// Address error on store
    AddressErrorStore = 5,
    /// Bus error on instruction fetch
    InstructionBusError = 6,
    /// Bus error on data access
    DataBusError = 7,
    /// Syscall instruction executed
    Syscall = 8,
    /// Breakpoint instruction executed
    Breakpoint = 9,
    /// Reserved or illegal instruction
    ReservedInstruction = 10,
    /// Coprocessor unusable
    CoprocessorUnusable = 11,
    /// Arithmetic overflow
    Overflow = 12,
}
