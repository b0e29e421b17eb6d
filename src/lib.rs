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

//! PlayStation MIPS R3000A CPU core
//!
//! This library provides the PlayStation's main processor: the MIPS I
//! instruction set with its branch and load delay slots, Coprocessor 0
//! (exceptions, interrupts, debug breakpoints) and the register interface
//! to Coprocessor 2. Memory is reached through the [`core::memory::Bus`]
//! trait; [`core::memory::MemoryBus`] is a plain implementation of it.
//!
//! # Example
//!
//! ```
//! use psrx_cpu::core::cpu::CPU;
//! use psrx_cpu::core::memory::MemoryBus;
//!
//! let mut cpu = CPU::new();
//! let mut bus = MemoryBus::new();
//!
//! // ORI at, zero, 0x1234
//! bus.load_image(0xBFC0_0000, &0x3401_1234u32.to_le_bytes()).unwrap();
//!
//! // Execute one instruction
//! let cycles = cpu.step(&mut bus).unwrap();
//! assert_eq!(cycles, 1);
//! assert_eq!(cpu.reg(1), 0x1234);
//! ```

pub mod core;
