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

//! Memory bus interface and reference implementation
//!
//! The CPU never touches memory directly. Every fetch, load and store goes
//! through the [`Bus`] trait, so the core can be driven by a full system bus,
//! by [`MemoryBus`], or by a test double.
//!
//! # Memory Map
//!
//! | Physical Address Range | Region       | Size   | Access |
//! |------------------------|--------------|--------|--------|
//! | 0x00000000-0x007FFFFF  | RAM          | 2MB/8MB (mirrored) | R/W |
//! | 0x1F000000-0x1F7FFFFF  | Expansion 1  | 8MB    | R      |
//! | 0x1F800000-0x1F8003FF  | Scratchpad   | 1KB    | R/W    |
//! | 0x1F801000-0x1F802FFF  | I/O Ports    | 8KB    | R/W    |
//! | 0x1FA00000-0x1FBFFFFF  | Expansion 3  | 2MB    | R      |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS ROM     | 512KB  | R only |
//! | 0xFFFE0130             | Cache Control| 4B     | R/W    |
//!
//! # Example
//!
//! ```
//! use psrx_cpu::core::memory::{Bus, MemoryBus};
//!
//! let mut bus = MemoryBus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // Read from same location via different segment (should mirror)
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! ```

use crate::core::config::MemoryConfig;
use crate::core::error::{EmulatorError, Result};

mod region;
#[cfg(test)]
mod tests;

pub use region::{translate_address, MemoryRegion, Segment};

/// Bus interface consumed by the CPU
///
/// Implementations must resolve KUSEG/KSEG0/KSEG1 views of an address to the
/// same physical location. The CPU only issues naturally aligned accesses.
///
/// Returning [`EmulatorError::InvalidMemoryAccess`] signals that nothing
/// answered at the address; the CPU turns it into a bus error exception.
/// Any other error is treated as fatal.
pub trait Bus {
    /// Read a byte
    fn read8(&mut self, addr: u32) -> Result<u8>;
    /// Read a halfword (addr is 2-byte aligned)
    fn read16(&mut self, addr: u32) -> Result<u16>;
    /// Read a word (addr is 4-byte aligned)
    fn read32(&mut self, addr: u32) -> Result<u32>;
    /// Write a byte
    fn write8(&mut self, addr: u32, value: u8) -> Result<()>;
    /// Write a halfword (addr is 2-byte aligned)
    fn write16(&mut self, addr: u32, value: u16) -> Result<()>;
    /// Write a word (addr is 4-byte aligned)
    fn write32(&mut self, addr: u32, value: u32) -> Result<()>;
}

/// Flat memory bus with the PlayStation memory map
///
/// Peripheral registers are not emulated: the I/O window is a plain latch
/// that reads back what was last written.
pub struct MemoryBus {
    /// Main RAM
    ///
    /// Mirrored over physical 0x00000000-0x007FFFFF
    ram: Vec<u8>,

    /// Scratchpad (1KB fast RAM)
    scratchpad: [u8; 1024],

    /// BIOS ROM (512KB)
    ///
    /// Read-only for the CPU; filled through [`MemoryBus::load_image`]
    bios: Vec<u8>,

    /// I/O register window latch (8KB)
    io: Vec<u8>,

    /// Cache Control register
    cache_control: u32,
}

impl MemoryBus {
    /// BIOS size (512KB)
    const BIOS_SIZE: usize = 512 * 1024;

    /// I/O window size (8KB)
    const IO_SIZE: usize = 8 * 1024;

    /// Create a bus with 2MB of RAM
    ///
    /// All memory starts zeroed.
    pub fn new() -> Self {
        Self::with_config(&MemoryConfig::default())
    }

    /// Create a bus sized according to the memory configuration
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::config::{MemoryConfig, RamSize};
    /// use psrx_cpu::core::memory::{Bus, MemoryBus};
    ///
    /// let config = MemoryConfig { ram_size: RamSize::Dev8MB };
    /// let mut bus = MemoryBus::with_config(&config);
    /// bus.write32(0x80600000, 0xCAFEBABE).unwrap();
    /// assert_eq!(bus.read32(0x00600000).unwrap(), 0xCAFEBABE);
    /// ```
    pub fn with_config(config: &MemoryConfig) -> Self {
        Self {
            ram: vec![0u8; config.ram_size.bytes()],
            scratchpad: [0u8; 1024],
            bios: vec![0u8; Self::BIOS_SIZE],
            io: vec![0u8; Self::IO_SIZE],
            cache_control: 0,
        }
    }

    /// Reset the bus to initial state
    ///
    /// Clears RAM, scratchpad and the I/O latch. BIOS contents are preserved
    /// as they represent read-only ROM.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.scratchpad.fill(0);
        self.io.fill(0);
        self.cache_control = 0;
    }

    /// Copy a raw image into RAM or BIOS ROM
    ///
    /// This bypasses the ROM write protection, so it is the way to install a
    /// BIOS or a test program before execution starts.
    ///
    /// # Errors
    ///
    /// - `ImageTooLarge` if the image does not fit in the target region
    /// - `InvalidMemoryAccess` if `addr` is not in RAM or BIOS
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::memory::{Bus, MemoryBus};
    ///
    /// let mut bus = MemoryBus::new();
    /// bus.load_image(0xBFC00000, &[0x78, 0x56, 0x34, 0x12]).unwrap();
    /// assert_eq!(bus.read32(0xBFC00000).unwrap(), 0x12345678);
    /// ```
    pub fn load_image(&mut self, addr: u32, image: &[u8]) -> Result<()> {
        let paddr = translate_address(addr);
        let (target, offset) = match MemoryRegion::identify(paddr) {
            MemoryRegion::Ram => {
                let offset = paddr as usize & (self.ram.len() - 1);
                (&mut self.ram, offset)
            }
            MemoryRegion::Bios => {
                let offset = (paddr - MemoryRegion::BIOS_START) as usize;
                (&mut self.bios, offset)
            }
            _ => return Err(EmulatorError::InvalidMemoryAccess { address: addr }),
        };

        let end = offset + image.len();
        if end > target.len() {
            return Err(EmulatorError::ImageTooLarge {
                address: addr,
                size: image.len(),
            });
        }

        target[offset..end].copy_from_slice(image);
        log::debug!("Loaded {} bytes at 0x{:08X}", image.len(), addr);
        Ok(())
    }

    /// Read `N` little-endian bytes starting at `vaddr`
    fn read_bytes<const N: usize>(&self, vaddr: u32) -> Result<[u8; N]> {
        let paddr = translate_address(vaddr);
        let mut out = [0u8; N];

        match MemoryRegion::identify(paddr) {
            MemoryRegion::Ram => {
                let offset = paddr as usize & (self.ram.len() - 1);
                out.copy_from_slice(&self.ram[offset..offset + N]);
            }
            MemoryRegion::Scratchpad => {
                let offset = (paddr - MemoryRegion::SCRATCHPAD_START) as usize;
                out.copy_from_slice(&self.scratchpad[offset..offset + N]);
            }
            MemoryRegion::Bios => {
                let offset = (paddr - MemoryRegion::BIOS_START) as usize;
                out.copy_from_slice(&self.bios[offset..offset + N]);
            }
            MemoryRegion::Io => {
                let offset = (paddr - MemoryRegion::IO_START) as usize;
                out.copy_from_slice(&self.io[offset..offset + N]);
                log::trace!("I/O port read{} at 0x{:08X}", N * 8, paddr);
            }
            MemoryRegion::CacheControl => {
                let offset = (paddr - MemoryRegion::CACHE_CONTROL) as usize;
                out.copy_from_slice(&self.cache_control.to_le_bytes()[offset..offset + N]);
            }
            MemoryRegion::Expansion => {
                // No expansion ROM: the header area reads as zero so the BIOS
                // does not try to call into it, everything else is open bus
                let fill = if (0x1F00_0000..=0x1F00_00FF).contains(&paddr) {
                    0x00
                } else {
                    0xFF
                };
                out.fill(fill);
                log::trace!("Expansion region read{} at 0x{:08X}", N * 8, vaddr);
            }
            MemoryRegion::Unmapped => {
                return Err(EmulatorError::InvalidMemoryAccess { address: vaddr })
            }
        }

        Ok(out)
    }

    /// Write `N` little-endian bytes starting at `vaddr`
    fn write_bytes<const N: usize>(&mut self, vaddr: u32, bytes: [u8; N]) -> Result<()> {
        let paddr = translate_address(vaddr);

        match MemoryRegion::identify(paddr) {
            MemoryRegion::Ram => {
                let offset = paddr as usize & (self.ram.len() - 1);
                self.ram[offset..offset + N].copy_from_slice(&bytes);
            }
            MemoryRegion::Scratchpad => {
                let offset = (paddr - MemoryRegion::SCRATCHPAD_START) as usize;
                self.scratchpad[offset..offset + N].copy_from_slice(&bytes);
            }
            MemoryRegion::Io => {
                let offset = (paddr - MemoryRegion::IO_START) as usize;
                self.io[offset..offset + N].copy_from_slice(&bytes);
                log::trace!("I/O port write{} at 0x{:08X}", N * 8, paddr);
            }
            MemoryRegion::CacheControl => {
                let offset = (paddr - MemoryRegion::CACHE_CONTROL) as usize;
                let mut word = self.cache_control.to_le_bytes();
                word[offset..offset + N].copy_from_slice(&bytes);
                self.cache_control = u32::from_le_bytes(word);
                log::debug!("Cache control = 0x{:08X}", self.cache_control);
            }
            MemoryRegion::Bios | MemoryRegion::Expansion => {
                log::debug!("Ignoring write{} to ROM at 0x{:08X}", N * 8, vaddr);
            }
            MemoryRegion::Unmapped => {
                return Err(EmulatorError::InvalidMemoryAccess { address: vaddr })
            }
        }

        Ok(())
    }

    fn check_alignment(vaddr: u32, size: u8) -> Result<()> {
        if vaddr & (size as u32 - 1) != 0 {
            return Err(EmulatorError::UnalignedAccess {
                address: vaddr,
                size,
            });
        }
        Ok(())
    }
}

impl Bus for MemoryBus {
    fn read8(&mut self, addr: u32) -> Result<u8> {
        let [b] = self.read_bytes::<1>(addr)?;
        Ok(b)
    }

    fn read16(&mut self, addr: u32) -> Result<u16> {
        Self::check_alignment(addr, 2)?;
        Ok(u16::from_le_bytes(self.read_bytes::<2>(addr)?))
    }

    fn read32(&mut self, addr: u32) -> Result<u32> {
        Self::check_alignment(addr, 4)?;
        Ok(u32::from_le_bytes(self.read_bytes::<4>(addr)?))
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<()> {
        self.write_bytes(addr, [value])
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<()> {
        Self::check_alignment(addr, 2)?;
        self.write_bytes(addr, value.to_le_bytes())
    }

    fn write32(&mut self, addr: u32, value: u32) -> Result<()> {
        Self::check_alignment(addr, 4)?;
        self.write_bytes(addr, value.to_le_bytes())
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}
