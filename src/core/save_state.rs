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

//! Save state serialization for the CPU core
//!
//! A [`CpuState`] captures everything needed to resume execution at an
//! instruction boundary: the register file, the PC pair, HI/LO, the pending
//! load, the delay-slot flags and the COP0 registers.
//!
//! # Save State Format
//!
//! Save states are serialized using bincode for efficient binary encoding.
//! COP0 SR, CAUSE and DCIC are stored as raw register words.
//!
//! # Version Compatibility
//!
//! Save states include a version number to ensure compatibility.
//! Loading a save state with a different version will fail with an error.
//!
//! # Example
//!
//! ```no_run
//! use psrx_cpu::core::cpu::CPU;
//! use psrx_cpu::core::save_state::CpuState;
//!
//! let mut cpu = CPU::new();
//! // ... run emulation ...
//!
//! // Save to file
//! cpu.snapshot().save_to_file("cpu.state").unwrap();
//!
//! // Later: load from file
//! let state = CpuState::load_from_file("cpu.state").unwrap();
//! cpu.restore(&state).unwrap();
//! ```

use crate::core::error::{EmulatorError, Result};
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Save state version for compatibility checking
///
/// This version number should be incremented whenever the save state format changes
/// in a way that breaks backward compatibility.
pub const SAVE_STATE_VERSION: u32 = 1;

/// CPU state (MIPS R3000A)
///
/// Captures all CPU registers and internal state including delay slots and
/// COP0. Produced by [`CPU::snapshot`](crate::core::cpu::CPU::snapshot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct CpuState {
    /// Version number for compatibility checking
    pub version: u32,

    /// Timestamp when the save state was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// General purpose registers (R0-R31)
    pub regs: [u32; 32],

    /// Program counter
    pub pc: u32,

    /// Next PC (for delay slot handling)
    pub next_pc: u32,

    /// Address of the last executed instruction
    pub current_pc: u32,

    /// HI register (multiplication/division result upper 32 bits)
    pub hi: u32,

    /// LO register (multiplication/division result lower 32 bits)
    pub lo: u32,

    /// Pending load (register index, previous value, loaded value)
    pub load_delay: Option<(u8, u32, u32)>,

    /// A branch executed last: the next instruction is its delay slot
    pub branch_delay: bool,
    pub branch_taken: bool,

    /// The last executed instruction was in a delay slot
    pub in_delay_slot: bool,
    pub delay_slot_taken: bool,

    /// Current instruction (for debugging)
    pub current_instruction: u32,

    // COP0 registers
    pub bpc: u32,
    pub bda: u32,
    pub jumpdest: u32,
    pub dcic: u32,
    pub bad_vaddr: u32,
    pub bdam: u32,
    pub bpcm: u32,
    pub sr: u32,
    pub cause: u32,
    pub epc: u32,
    pub prid: u32,
}

impl CpuState {
    /// Create an empty state stamped with the current version and time
    pub fn new() -> Self {
        Self {
            version: SAVE_STATE_VERSION,
            timestamp: Utc::now(),
            regs: [0u32; 32],
            pc: 0,
            next_pc: 0,
            current_pc: 0,
            hi: 0,
            lo: 0,
            load_delay: None,
            branch_delay: false,
            branch_taken: false,
            in_delay_slot: false,
            delay_slot_taken: false,
            current_instruction: 0,
            bpc: 0,
            bda: 0,
            jumpdest: 0,
            dcic: 0,
            bad_vaddr: 0,
            bdam: 0,
            bpcm: 0,
            sr: 0,
            cause: 0,
            epc: 0,
            prid: 0,
        }
    }

    /// Fail unless the state was written by this format version
    pub fn check_version(&self) -> Result<()> {
        if self.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::IncompatibleSaveState {
                expected: SAVE_STATE_VERSION,
                got: self.version,
            });
        }
        Ok(())
    }

    /// Serialize to bincode bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    /// Deserialize from bincode bytes and verify version compatibility
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (state, _): (CpuState, usize) = bincode::decode_from_slice(bytes, config::standard())?;
        state.check_version()?;
        Ok(state)
    }

    /// Save state to file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Serialization fails
    /// - File cannot be written
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.encode()?;
        std::fs::write(&path, encoded)?;
        log::info!("Saved CPU state to {}", path.as_ref().display());
        Ok(())
    }

    /// Load state from file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - Deserialization fails
    /// - Version is incompatible
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buffer = std::fs::read(path)?;
        Self::decode(&buffer)
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}
