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

//! CPU execution tracer for debugging
//!
//! Logs CPU execution state to a file for analysis and debugging.

use super::{register_name, Disassembler, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CPU execution tracer
///
/// Records CPU state and instruction execution to a file for debugging purposes.
/// Each line in the trace file shows:
/// - Program counter
/// - Raw instruction encoding
/// - Disassembled instruction
/// - Values of selected registers
///
/// Call [`CpuTracer::trace`] before each [`CPU::step`] to log the
/// instruction about to execute.
///
/// # Example
/// ```no_run
/// use psrx_cpu::core::cpu::{CpuTracer, CPU};
/// use psrx_cpu::core::memory::MemoryBus;
///
/// let mut cpu = CPU::new();
/// let mut bus = MemoryBus::new();
/// let mut tracer = CpuTracer::new("trace.log").unwrap();
///
/// // Execute and trace
/// tracer.trace(&cpu, &mut bus).unwrap();
/// cpu.step(&mut bus).unwrap();
/// ```
pub struct CpuTracer {
    /// Enable/disable tracing
    enabled: bool,
    /// Output file handle
    output: BufWriter<File>,
    /// Lines written so far
    lines: u64,
}

impl CpuTracer {
    /// Registers shown by [`CpuTracer::trace`]: v0, v1, a0, a1
    pub const DEFAULT_REGS: [u8; 4] = [2, 3, 4, 5];

    /// Create a new CPU tracer
    ///
    /// Opens a file for writing trace output. If the file exists, it will be overwritten.
    ///
    /// # Errors
    ///
    /// `EmulatorError::Io` if file creation fails
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let output = BufWriter::new(File::create(path)?);
        Ok(Self {
            enabled: true,
            output,
            lines: 0,
        })
    }

    /// Enable or disable tracing
    ///
    /// When disabled, trace() calls will return immediately without writing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of trace lines written
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Trace current CPU state
    ///
    /// Writes a single line for the instruction at the CPU's PC, showing
    /// [`CpuTracer::DEFAULT_REGS`]. If tracing is disabled, this function
    /// returns immediately.
    ///
    /// The bus is only read. An address the bus cannot serve is written as
    /// `<fetch fault>` rather than failing the trace.
    pub fn trace(&mut self, cpu: &CPU, bus: &mut dyn Bus) -> Result<()> {
        self.trace_with_regs(cpu, bus, &Self::DEFAULT_REGS)
    }

    /// Trace with custom register selection
    ///
    /// Like `trace()`, but allows specifying which registers to display.
    ///
    /// # Arguments
    ///
    /// * `cpu` - CPU instance to trace
    /// * `bus` - Memory bus for fetching instructions
    /// * `regs` - Slice of register numbers to display (up to 8 registers)
    ///
    /// # Example
    /// ```no_run
    /// use psrx_cpu::core::cpu::{CpuTracer, CPU};
    /// use psrx_cpu::core::memory::MemoryBus;
    ///
    /// let cpu = CPU::new();
    /// let mut bus = MemoryBus::new();
    /// let mut tracer = CpuTracer::new("trace.log").unwrap();
    ///
    /// // Trace with registers t0, t1, t2
    /// tracer.trace_with_regs(&cpu, &mut bus, &[8, 9, 10]).unwrap();
    /// ```
    pub fn trace_with_regs(&mut self, cpu: &CPU, bus: &mut dyn Bus, regs: &[u8]) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let pc = cpu.pc();
        match bus.read32(pc) {
            Ok(instruction) => write!(
                self.output,
                "PC=0x{:08X} [0x{:08X}] {:30} |",
                pc,
                instruction,
                Disassembler::disassemble(instruction, pc)
            )?,
            Err(_) => write!(
                self.output,
                "PC=0x{:08X} [----------] {:30} |",
                pc, "<fetch fault>"
            )?,
        }

        for &reg in regs.iter().take(8) {
            write!(self.output, " {}={:08X}", register_name(reg), cpu.reg(reg & 0x1F))?;
        }

        writeln!(self.output)?;
        self.lines += 1;

        Ok(())
    }

    /// Flush the output buffer
    ///
    /// Forces any buffered trace data to be written to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }
}
