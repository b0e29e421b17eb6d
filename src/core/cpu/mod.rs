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

use crate::core::config::CpuConfig;
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;
use crate::core::save_state::CpuState;

/// CPU (MIPS R3000A) emulation implementation
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Registers: 32 general-purpose registers + HI/LO
/// - One branch delay slot and one load delay slot
/// - Coprocessor 0 for exceptions, interrupts and debug breakpoints
///
/// # Example
/// ```
/// use psrx_cpu::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// assert_eq!(cpu.pc(), 0xBFC00000);
/// ```
pub struct CPU {
    /// General purpose registers (r0-r31)
    ///
    /// r0 is hardwired to always return 0
    regs: [u32; 32],

    /// Program counter
    ///
    /// While an instruction executes this already points at the following
    /// instruction (the delay slot, for a branch).
    pc: u32,

    /// Next PC (for delay slot handling)
    next_pc: u32,

    /// Address of the instruction currently executing
    current_pc: u32,

    /// HI register (multiplication/division result upper 32 bits)
    hi: u32,

    /// LO register (multiplication/division result lower 32 bits)
    lo: u32,

    /// Coprocessor 0 (System Control Unit)
    cop0: COP0,

    /// Coprocessor 2 collaborator
    cop2: Box<dyn Coprocessor2>,

    /// Load issued by the instruction executing now
    load_delay: Option<LoadDelay>,

    /// Load issued by the previous instruction
    ///
    /// Committed once the current instruction has executed, unless the
    /// current instruction writes the same register first.
    retiring_load: Option<LoadDelay>,

    /// Set by a branch/jump executing now: the next instruction is a delay slot
    branch_delay: bool,

    /// Set by a branch/jump executing now whose condition held
    branch_taken: bool,

    /// The instruction executing now sits in a delay slot
    in_delay_slot: bool,

    /// The branch owning the current delay slot was taken
    delay_slot_taken: bool,

    /// Current instruction
    current_instruction: Instruction,

    /// Raise ReservedInstruction on unimplemented encodings
    strict_decoding: bool,

    /// Last unimplemented encoding seen
    last_unimplemented: Option<UnimplementedInstruction>,

    /// Number of unimplemented encodings seen since reset
    unimplemented_count: u64,
}

/// Load delay management structure
///
/// The MIPS R3000A has a load delay slot - the result of a load instruction
/// cannot be used in the immediately following instruction. This structure
/// carries a staged register write until it retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadDelay {
    /// Target register
    pub reg: u8,
    /// Register value when the load was issued
    pub old: u32,
    /// Value to load
    pub value: u32,
}

/// An encoding the core decoded but does not execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnimplementedInstruction {
    /// Address of the instruction
    pub pc: u32,
    /// Raw encoding
    pub instruction: Instruction,
}

// Module declarations
mod cop0;
mod decode;
mod disassembler;
mod gte;
mod instructions;
#[cfg(test)]
mod tests;
mod tracer;

// Re-exports
pub use cop0::{Cause, DebugControl, ExceptionCause, Status};
use cop0::COP0;
pub use decode::{Cop0Function, CopOperation, Instruction, Opcode, SpecialFunction};
pub use disassembler::{register_name, Disassembler};
pub use gte::{Coprocessor2, GteStub};
pub use tracer::CpuTracer;

impl CPU {
    /// Reset vector (BIOS entry point)
    pub const RESET_VECTOR: u32 = 0xBFC0_0000;

    /// Create a new CPU instance with the default configuration
    ///
    /// The CPU is initialized with the following state:
    /// - All general purpose registers: 0
    /// - PC: 0xBFC00000 (BIOS entry point)
    /// - next_pc: 0xBFC00004
    /// - COP0 SR: 0x10400000
    /// - COP0 PRID: 0x00000002
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// assert_eq!(cpu.reg(0), 0);
    /// assert_eq!(cpu.status().word(), 0x10400000);
    /// ```
    pub fn new() -> Self {
        Self::with_config(&CpuConfig::default())
    }

    /// Create a new CPU instance from configuration
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::config::CpuConfig;
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let config = CpuConfig { prid: 0x00000001, strict_decoding: true };
    /// let cpu = CPU::with_config(&config);
    /// assert_eq!(cpu.read_cop0(15), Some(0x00000001));
    /// ```
    pub fn with_config(config: &CpuConfig) -> Self {
        Self {
            regs: [0u32; 32],
            pc: Self::RESET_VECTOR,
            next_pc: Self::RESET_VECTOR.wrapping_add(4),
            current_pc: Self::RESET_VECTOR,
            hi: 0,
            lo: 0,
            cop0: COP0::new(config.prid),
            cop2: Box::new(GteStub::new()),
            load_delay: None,
            retiring_load: None,
            branch_delay: false,
            branch_taken: false,
            in_delay_slot: false,
            delay_slot_taken: false,
            current_instruction: Instruction(0),
            strict_decoding: config.strict_decoding,
            last_unimplemented: None,
            unimplemented_count: 0,
        }
    }

    /// Reset CPU to initial state
    ///
    /// Resets all registers and state to initial values.
    /// This mimics the behavior of power-on or hardware reset. The
    /// coprocessor 2 collaborator is left as is.
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 42);
    /// cpu.reset(); // Return to initial state
    /// assert_eq!(cpu.reg(1), 0);
    /// ```
    pub fn reset(&mut self) {
        self.regs = [0u32; 32];
        self.pc = Self::RESET_VECTOR;
        self.next_pc = Self::RESET_VECTOR.wrapping_add(4);
        self.current_pc = Self::RESET_VECTOR;
        self.hi = 0;
        self.lo = 0;
        self.cop0.reset();
        self.load_delay = None;
        self.retiring_load = None;
        self.branch_delay = false;
        self.branch_taken = false;
        self.in_delay_slot = false;
        self.delay_slot_taken = false;
        self.current_instruction = Instruction(0);
        self.last_unimplemented = None;
        self.unimplemented_count = 0;
    }

    /// Read from general purpose register
    ///
    /// # Arguments
    /// - `index`: Register number (0-31)
    ///
    /// # Returns
    /// Register value. r0 always returns 0.
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let cpu = CPU::new();
    /// let value = cpu.reg(1);  // Get r1 value
    /// assert_eq!(cpu.reg(0), 0); // r0 is always 0
    /// ```
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        if index == 0 {
            0
        } else {
            self.regs[index as usize]
        }
    }

    /// Write to general purpose register
    ///
    /// A load retiring into the same register is dropped: the newer write
    /// wins.
    ///
    /// # Arguments
    /// - `index`: Register number (0-31)
    /// - `value`: Value to write
    ///
    /// # Note
    /// Writes to r0 are ignored (r0 is always 0).
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(1, 0x12345678);
    /// assert_eq!(cpu.reg(1), 0x12345678);
    ///
    /// // Writes to r0 are ignored
    /// cpu.set_reg(0, 0xDEADBEEF);
    /// assert_eq!(cpu.reg(0), 0);
    /// ```
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        if index != 0 {
            self.regs[index as usize] = value;
        }
        if matches!(self.retiring_load, Some(load) if load.reg == index) {
            self.retiring_load = None;
        }
    }

    /// Write to register with load delay
    ///
    /// # Behavior
    /// 1. A load already staged for a different register takes effect now;
    ///    one staged for the same register is replaced
    /// 2. A load retiring into the same register is dropped
    /// 3. The new value is staged (writes to r0 are never staged)
    ///
    /// # Arguments
    /// - `index`: Target register number (0-31)
    /// - `value`: Value to load
    ///
    /// # Example
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg_delayed(3, 100);
    /// // At this point, r3 does not yet have the value
    /// assert_eq!(cpu.reg(3), 0);
    ///
    /// // Staging another load makes the first one take effect
    /// cpu.set_reg_delayed(4, 200);
    /// assert_eq!(cpu.reg(3), 100);
    /// assert_eq!(cpu.reg(4), 0);
    /// ```
    pub fn set_reg_delayed(&mut self, index: u8, value: u32) {
        if let Some(pending) = self.load_delay.take() {
            if pending.reg != index {
                self.commit_load(pending);
            }
        }

        if matches!(self.retiring_load, Some(load) if load.reg == index) {
            self.retiring_load = None;
        }

        if index != 0 {
            self.load_delay = Some(LoadDelay {
                reg: index,
                old: self.reg(index),
                value,
            });
        }
    }

    /// Value of `index` as seen by LWL/LWR
    ///
    /// The merge uses the value still in flight from the previous load, so
    /// an LWL/LWR pair back to back composes one word.
    fn reg_for_merge(&self, index: u8) -> u32 {
        match self.retiring_load {
            Some(load) if load.reg == index => load.value,
            _ => self.reg(index),
        }
    }

    fn commit_load(&mut self, load: LoadDelay) {
        if load.reg != 0 {
            log::trace!(
                "load retire: r{} 0x{:08X} -> 0x{:08X}",
                load.reg,
                load.old,
                load.value
            );
            self.regs[load.reg as usize] = load.value;
        }
    }

    fn commit_retiring_load(&mut self) {
        if let Some(load) = self.retiring_load.take() {
            self.commit_load(load);
        }
    }

    /// Execute one instruction
    ///
    /// This is the main CPU execution step. It performs:
    /// 1. Pending interrupt check
    /// 2. Delay-slot bookkeeping
    /// 3. Execution breakpoint check
    /// 4. Instruction fetch and PC update
    /// 5. Instruction execution
    /// 6. Retirement of the previous instruction's load
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus for reading instructions and data
    ///
    /// # Returns
    ///
    /// Number of cycles consumed (currently always 1)
    ///
    /// # Errors
    ///
    /// Only bus contract violations are returned; architectural faults are
    /// handled as exceptions.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    /// use psrx_cpu::core::memory::MemoryBus;
    ///
    /// let mut cpu = CPU::new();
    /// let mut bus = MemoryBus::new();
    ///
    /// // BIOS is zeroed: executes a NOP
    /// let cycles = cpu.step(&mut bus).unwrap();
    /// assert_eq!(cycles, 1);
    /// assert_eq!(cpu.pc(), 0xBFC00004);
    /// ```
    pub fn step(&mut self, bus: &mut dyn Bus) -> Result<u32> {
        self.check_interrupts();

        // The previous instruction's load lands after this one executes
        self.retiring_load = self.load_delay.take();

        self.in_delay_slot = self.branch_delay;
        self.delay_slot_taken = self.branch_taken;
        self.branch_delay = false;
        self.branch_taken = false;

        let pc = self.pc;
        self.current_pc = pc;

        if self.cop0.dcic.code_breakpoints_enabled()
            && ((pc ^ self.cop0.bpc) & self.cop0.bpcm) == 0
        {
            self.enter_debug_break(DebugControl::CODE_BREAK);
            self.commit_retiring_load();
            return Ok(1);
        }

        // Update PC (delay slot handling)
        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        if self.fetch(bus, pc)? {
            self.execute_instruction(bus)?;
        }

        self.commit_retiring_load();

        // For now, all instructions take 1 cycle
        Ok(1)
    }

    /// Fetch the instruction at `pc` into `current_instruction`
    ///
    /// Returns `false` if the fetch faulted.
    fn fetch(&mut self, bus: &mut dyn Bus, pc: u32) -> Result<bool> {
        if pc & 0x3 != 0 {
            self.cop0.bad_vaddr = pc;
            self.signal_exception(ExceptionCause::AddressErrorLoad);
            return Ok(false);
        }

        match bus.read32(pc) {
            Ok(word) => {
                self.current_instruction = Instruction(word);
                Ok(true)
            }
            Err(EmulatorError::InvalidMemoryAccess { .. }) => {
                self.signal_exception(ExceptionCause::InstructionBusError);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Enter the general exception handler
    ///
    /// Records the faulting address in EPC, updates CAUSE, pushes the
    /// interrupt-enable/kernel-mode stack in SR and redirects execution to
    /// the exception vector (0x80000080, or 0xBFC00180 while BEV is set).
    ///
    /// For `Interrupt`, EPC is the instruction about to run; for every other
    /// cause it is the instruction that faulted. Either way, if that
    /// instruction is in a branch delay slot EPC points at the branch, CAUSE.BD
    /// is set and JUMPDEST receives the resolved branch target.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::{ExceptionCause, CPU};
    ///
    /// let mut cpu = CPU::new();
    /// cpu.signal_exception(ExceptionCause::Syscall);
    /// assert_eq!(cpu.pc(), 0xBFC00180); // BEV is set after reset
    /// assert_eq!(cpu.cause().excode, 8);
    /// ```
    pub fn signal_exception(&mut self, cause: ExceptionCause) {
        let (epc, in_delay_slot, jumpdest) = if cause == ExceptionCause::Interrupt {
            (self.pc, self.branch_delay, self.next_pc)
        } else {
            (self.current_pc, self.in_delay_slot, self.pc)
        };

        let handler = if self.cop0.sr.boot_exception {
            0xBFC0_0180
        } else {
            0x8000_0080
        };

        self.cop0.cause = Cause {
            excode: cause as u8,
            interrupt_pending: self.cop0.cause.interrupt_pending,
            ..Cause::default()
        };

        self.cop0.sr.enter_exception();

        self.cop0.epc = epc;
        if in_delay_slot {
            self.cop0.epc = epc.wrapping_sub(4);
            self.cop0.cause.branch_delay_slot = true;
            self.cop0.jumpdest = jumpdest;
        }

        log::debug!(
            "EXCEPTION: cause={:?}, EPC=0x{:08X}, handler=0x{:08X}, in_delay={} (taken={}), instruction={}",
            cause,
            self.cop0.epc,
            handler,
            in_delay_slot,
            self.delay_slot_taken,
            self.current_instruction
        );

        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
        self.branch_delay = false;
        self.branch_taken = false;
    }

    /// Enter the debug exception vector
    ///
    /// Used by BREAK and the hardware breakpoint unit. Sets the DCIC hit
    /// flags and jumps to 0x80000040 (0xBFC00140 while BEV is set). EPC,
    /// CAUSE and SR are not modified.
    fn enter_debug_break(&mut self, hits: DebugControl) {
        self.cop0.dcic |= DebugControl::ANY_BREAK | hits;

        let vector = if self.cop0.sr.boot_exception {
            0xBFC0_0140
        } else {
            0x8000_0040
        };

        log::debug!(
            "DEBUG BREAK: PC=0x{:08X}, DCIC=0x{:08X}, handler=0x{:08X}",
            self.current_pc,
            self.cop0.dcic.bits(),
            vector
        );

        self.pc = vector;
        self.next_pc = vector.wrapping_add(4);
        self.branch_delay = false;
        self.branch_taken = false;
    }

    /// Drive the external interrupt lines
    ///
    /// Bits 0-5 of `lines` appear in CAUSE.IP bits 10-15. The software
    /// interrupt bits (8-9) belong to MTC0 and are preserved.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_interrupt_pending(0x01);
    /// assert_eq!(cpu.cause().interrupt_pending, 0x04);
    /// assert_eq!(cpu.cause().word() & 0xFF00, 0x0400);
    /// ```
    pub fn set_interrupt_pending(&mut self, lines: u8) {
        let cause = &mut self.cop0.cause;
        cause.interrupt_pending =
            (cause.interrupt_pending & Cause::SOFTWARE_INTERRUPTS) | ((lines & 0x3F) << 2);
    }

    /// Check for pending interrupts and trigger if enabled
    ///
    /// An interrupt is taken when SR.IEc is set and a pending bit in
    /// CAUSE.IP is also set in SR.IM.
    ///
    /// # Returns
    ///
    /// true if an interrupt exception was entered
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_interrupt_pending(0x01);
    /// // Interrupts are disabled after reset
    /// assert!(!cpu.check_interrupts());
    /// ```
    pub fn check_interrupts(&mut self) -> bool {
        let sr = self.cop0.sr;
        if sr.interrupt_enable && (self.cop0.cause.interrupt_pending & sr.interrupt_mask) != 0 {
            self.signal_exception(ExceptionCause::Interrupt);
            true
        } else {
            false
        }
    }

    /// Record an encoding the core does not execute
    ///
    /// Logs it with its disassembly, then either continues (default) or
    /// raises ReservedInstruction when strict decoding is configured.
    fn unimplemented(&mut self, what: &str, field: u8) -> Result<()> {
        let instruction = self.current_instruction;
        let pc = self.current_pc;

        log::warn!(
            "Unimplemented {} 0x{:02X} at PC=0x{:08X}: {} ({})",
            what,
            field,
            pc,
            Disassembler::disassemble(instruction.0, pc),
            instruction
        );

        self.last_unimplemented = Some(UnimplementedInstruction { pc, instruction });
        self.unimplemented_count += 1;

        if self.strict_decoding {
            self.signal_exception(ExceptionCause::ReservedInstruction);
        }
        Ok(())
    }

    /// Get current PC value
    ///
    /// Between steps this is the address of the next instruction to execute.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn next_pc(&self) -> u32 {
        self.next_pc
    }

    /// Redirect execution to `addr`
    ///
    /// Drops any pending branch, as if `addr` had been reached sequentially.
    pub fn set_pc(&mut self, addr: u32) {
        self.pc = addr;
        self.next_pc = addr.wrapping_add(4);
        self.branch_delay = false;
        self.branch_taken = false;
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Instruction most recently fetched
    pub fn instruction(&self) -> Instruction {
        self.current_instruction
    }

    /// Check if the last executed instruction was in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.in_delay_slot
    }

    /// Load staged by the last executed instruction, if any
    pub fn pending_load(&self) -> Option<LoadDelay> {
        self.load_delay
    }

    pub fn status(&self) -> Status {
        self.cop0.sr
    }

    pub fn cause(&self) -> Cause {
        self.cop0.cause
    }

    pub fn epc(&self) -> u32 {
        self.cop0.epc
    }

    pub fn bad_vaddr(&self) -> u32 {
        self.cop0.bad_vaddr
    }

    pub fn dcic(&self) -> DebugControl {
        self.cop0.dcic
    }

    /// Read a COP0 register as MFC0 would
    ///
    /// Returns `None` for register numbers with no register behind them.
    pub fn read_cop0(&self, index: u8) -> Option<u32> {
        self.cop0.read(index)
    }

    /// Last unimplemented encoding seen since reset
    pub fn last_unimplemented(&self) -> Option<UnimplementedInstruction> {
        self.last_unimplemented
    }

    pub fn unimplemented_count(&self) -> u64 {
        self.unimplemented_count
    }

    /// Replace the coprocessor 2 collaborator
    pub fn set_coprocessor2(&mut self, cop2: Box<dyn Coprocessor2>) {
        self.cop2 = cop2;
    }

    pub fn coprocessor2(&self) -> &dyn Coprocessor2 {
        self.cop2.as_ref()
    }

    /// Capture the full CPU state
    ///
    /// Taken between steps, so at most one load is pending.
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::cpu::CPU;
    ///
    /// let mut cpu = CPU::new();
    /// cpu.set_reg(8, 0x1234);
    /// let state = cpu.snapshot();
    ///
    /// let mut other = CPU::new();
    /// other.restore(&state).unwrap();
    /// assert_eq!(other.reg(8), 0x1234);
    /// ```
    pub fn snapshot(&self) -> CpuState {
        let mut state = CpuState::new();
        state.regs = self.regs;
        state.pc = self.pc;
        state.next_pc = self.next_pc;
        state.current_pc = self.current_pc;
        state.hi = self.hi;
        state.lo = self.lo;
        state.load_delay = self.load_delay.map(|l| (l.reg, l.old, l.value));
        state.branch_delay = self.branch_delay;
        state.branch_taken = self.branch_taken;
        state.in_delay_slot = self.in_delay_slot;
        state.delay_slot_taken = self.delay_slot_taken;
        state.current_instruction = self.current_instruction.0;
        state.bpc = self.cop0.bpc;
        state.bda = self.cop0.bda;
        state.jumpdest = self.cop0.jumpdest;
        state.dcic = self.cop0.dcic.bits();
        state.bad_vaddr = self.cop0.bad_vaddr;
        state.bdam = self.cop0.bdam;
        state.bpcm = self.cop0.bpcm;
        state.sr = self.cop0.sr.word();
        state.cause = self.cop0.cause.word();
        state.epc = self.cop0.epc;
        state.prid = self.cop0.prid;
        state
    }

    /// Restore state captured by [`CPU::snapshot`]
    ///
    /// # Errors
    ///
    /// `IncompatibleSaveState` if the state was produced by a different
    /// format version.
    pub fn restore(&mut self, state: &CpuState) -> Result<()> {
        state.check_version()?;

        self.regs = state.regs;
        self.regs[0] = 0;
        self.pc = state.pc;
        self.next_pc = state.next_pc;
        self.current_pc = state.current_pc;
        self.hi = state.hi;
        self.lo = state.lo;
        self.load_delay = state
            .load_delay
            .map(|(reg, old, value)| LoadDelay { reg: reg & 0x1F, old, value });
        self.retiring_load = None;
        self.branch_delay = state.branch_delay;
        self.branch_taken = state.branch_taken;
        self.in_delay_slot = state.in_delay_slot;
        self.delay_slot_taken = state.delay_slot_taken;
        self.current_instruction = Instruction(state.current_instruction);
        self.cop0.bpc = state.bpc;
        self.cop0.bda = state.bda;
        self.cop0.jumpdest = state.jumpdest;
        self.cop0.dcic = DebugControl::from_bits_retain(state.dcic);
        self.cop0.bad_vaddr = state.bad_vaddr;
        self.cop0.bdam = state.bdam;
        self.cop0.bpcm = state.bpcm;
        self.cop0.sr = Status::from_word(state.sr);
        self.cop0.cause = Cause::from_word(state.cause);
        self.cop0.epc = state.epc;
        self.cop0.prid = state.prid;

        log::info!(
            "Restored CPU state saved at {} (PC=0x{:08X})",
            state.timestamp,
            self.pc
        );
        Ok(())
    }

    /// Dump all CPU registers for debugging
    ///
    /// Logs a formatted dump of all CPU state at `info` level:
    /// - Program counter (PC) and next PC
    /// - HI and LO registers
    /// - All 32 general-purpose registers, by ABI name
    /// - COP0 status registers (SR, CAUSE, EPC, BadVAddr, PRID)
    pub fn dump_registers(&self) {
        log::info!("PC: 0x{:08X}  Next PC: 0x{:08X}", self.pc, self.next_pc);
        log::info!("HI: 0x{:08X}  LO: 0x{:08X}", self.hi, self.lo);

        for row in 0..8u8 {
            let line = (0..4u8)
                .map(|col| {
                    let i = row * 4 + col;
                    format!("{:>4}: 0x{:08X}", register_name(i), self.reg(i))
                })
                .collect::<Vec<_>>()
                .join("  ");
            log::info!("{}", line);
        }

        log::info!(
            "SR: 0x{:08X}  CAUSE: 0x{:08X}  EPC: 0x{:08X}  BadVAddr: 0x{:08X}  PRID: 0x{:08X}",
            self.cop0.sr.word(),
            self.cop0.cause.word(),
            self.cop0.epc,
            self.cop0.bad_vaddr,
            self.cop0.prid
        );
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
