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

//! Coprocessor 2 (GTE) interface
//!
//! The CPU decodes every COP2 encoding, moves operands and computes LWC2/SWC2
//! addresses, then hands the register traffic to a [`Coprocessor2`]
//! implementation. The geometry math itself lives outside this crate.

/// Register-level interface to Coprocessor 2
///
/// Register indices are always in `0..32`.
pub trait Coprocessor2 {
    /// Read a data register (MFC2, SWC2)
    fn read_data(&self, index: u8) -> u32;

    /// Write a data register (MTC2, LWC2)
    fn write_data(&mut self, index: u8, value: u32);

    /// Read a control register (CFC2)
    fn read_control(&self, index: u8) -> u32;

    /// Write a control register (CTC2)
    fn write_control(&mut self, index: u8, value: u32);

    /// Execute a command (low 25 bits of a COP2 command encoding)
    fn execute(&mut self, command: u32);
}

/// Register latch standing in for the GTE
///
/// Stores whatever is written and reads it back. Commands are logged and
/// counted but not computed.
///
/// # Example
///
/// ```
/// use psrx_cpu::core::cpu::{Coprocessor2, GteStub};
///
/// let mut gte = GteStub::new();
/// gte.write_data(9, 0x1234);
/// gte.execute(0x0018_0001); // RTPS
/// assert_eq!(gte.read_data(9), 0x1234);
/// assert_eq!(gte.last_command(), Some(0x0018_0001));
/// ```
#[derive(Debug, Clone)]
pub struct GteStub {
    data: [u32; 32],
    control: [u32; 32],
    last_command: Option<u32>,
    commands_executed: u64,
}

impl GteStub {
    pub fn new() -> Self {
        Self {
            data: [0u32; 32],
            control: [0u32; 32],
            last_command: None,
            commands_executed: 0,
        }
    }

    /// Most recent command passed to `execute`
    pub fn last_command(&self) -> Option<u32> {
        self.last_command
    }

    pub fn commands_executed(&self) -> u64 {
        self.commands_executed
    }
}

impl Default for GteStub {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor2 for GteStub {
    fn read_data(&self, index: u8) -> u32 {
        self.data[(index & 0x1F) as usize]
    }

    fn write_data(&mut self, index: u8, value: u32) {
        self.data[(index & 0x1F) as usize] = value;
    }

    fn read_control(&self, index: u8) -> u32 {
        self.control[(index & 0x1F) as usize]
    }

    fn write_control(&mut self, index: u8, value: u32) {
        self.control[(index & 0x1F) as usize] = value;
    }

    fn execute(&mut self, command: u32) {
        log::trace!(
            "GTE command 0x{:07X} (function 0x{:02X}) not computed",
            command,
            command & 0x3F
        );
        self.last_command = Some(command);
        self.commands_executed += 1;
    }
}
