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

//! Memory segment decoding and region identification
//!
//! The R3000A splits the 4GB virtual address space into four segments.
//! Without a TLB, KUSEG, KSEG0 and KSEG1 are all fixed windows onto the same
//! 512MB of physical address space; only the caching behavior differs.
//! KSEG2 is passed through unchanged (it only holds the cache control
//! register on the PlayStation).

/// Virtual address segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// 0x00000000-0x7FFFFFFF: user space, mapped, cached
    Kuseg,
    /// 0x80000000-0x9FFFFFFF: kernel space, unmapped, cached
    Kseg0,
    /// 0xA0000000-0xBFFFFFFF: kernel space, unmapped, uncached
    Kseg1,
    /// 0xC0000000-0xFFFFFFFF: kernel space, mapped, cached
    Kseg2,
}

impl Segment {
    /// Identify the segment an address belongs to
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::memory::Segment;
    ///
    /// assert_eq!(Segment::of(0x0000_1000), Segment::Kuseg);
    /// assert_eq!(Segment::of(0x8000_1000), Segment::Kseg0);
    /// assert_eq!(Segment::of(0xBFC0_0000), Segment::Kseg1);
    /// assert_eq!(Segment::of(0xFFFE_0130), Segment::Kseg2);
    /// ```
    pub fn of(vaddr: u32) -> Self {
        match vaddr >> 29 {
            0..=3 => Segment::Kuseg,
            4 => Segment::Kseg0,
            5 => Segment::Kseg1,
            _ => Segment::Kseg2,
        }
    }
}

/// Translate a virtual address to a physical address
///
/// KUSEG addresses above 512MB are masked down as well, matching the
/// PlayStation's behavior of mirroring the physical space there.
///
/// # Example
///
/// ```
/// use psrx_cpu::core::memory::translate_address;
///
/// assert_eq!(translate_address(0x0000_1234), 0x0000_1234);
/// assert_eq!(translate_address(0x8000_1234), 0x0000_1234);
/// assert_eq!(translate_address(0xA000_1234), 0x0000_1234);
/// assert_eq!(translate_address(0xFFFE_0130), 0xFFFE_0130);
/// ```
pub fn translate_address(vaddr: u32) -> u32 {
    match Segment::of(vaddr) {
        Segment::Kseg2 => vaddr,
        _ => vaddr & 0x1FFF_FFFF,
    }
}

/// Physical memory region
///
/// Used to identify which memory region an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    /// Main RAM (2MB, mirrored over the first 8MB)
    Ram,
    /// Expansion regions 1 and 3
    Expansion,
    /// Scratchpad (1KB)
    Scratchpad,
    /// Memory-mapped peripheral registers
    Io,
    /// BIOS ROM (512KB)
    Bios,
    /// Cache control register (0xFFFE0130)
    CacheControl,
    /// Nothing decodes here
    Unmapped,
}

impl MemoryRegion {
    pub(super) const RAM_START: u32 = 0x0000_0000;
    pub(super) const RAM_WINDOW_END: u32 = 0x007F_FFFF;

    pub(super) const EXP1_START: u32 = 0x1F00_0000;
    pub(super) const EXP1_END: u32 = 0x1F7F_FFFF;

    pub(super) const SCRATCHPAD_START: u32 = 0x1F80_0000;
    pub(super) const SCRATCHPAD_END: u32 = 0x1F80_03FF;

    pub(super) const IO_START: u32 = 0x1F80_1000;
    pub(super) const IO_END: u32 = 0x1F80_2FFF;

    pub(super) const EXP3_START: u32 = 0x1FA0_0000;
    pub(super) const EXP3_END: u32 = 0x1FBF_FFFF;

    pub(super) const BIOS_START: u32 = 0x1FC0_0000;
    pub(super) const BIOS_END: u32 = 0x1FC7_FFFF;

    pub(super) const CACHE_CONTROL: u32 = 0xFFFE_0130;

    /// Identify the region of a physical address
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::memory::MemoryRegion;
    ///
    /// assert_eq!(MemoryRegion::identify(0x0000_0000), MemoryRegion::Ram);
    /// assert_eq!(MemoryRegion::identify(0x1F80_1070), MemoryRegion::Io);
    /// assert_eq!(MemoryRegion::identify(0x1FC0_0000), MemoryRegion::Bios);
    /// assert_eq!(MemoryRegion::identify(0x1E00_0000), MemoryRegion::Unmapped);
    /// ```
    pub fn identify(paddr: u32) -> Self {
        match paddr {
            Self::RAM_START..=Self::RAM_WINDOW_END => MemoryRegion::Ram,
            Self::EXP1_START..=Self::EXP1_END => MemoryRegion::Expansion,
            Self::SCRATCHPAD_START..=Self::SCRATCHPAD_END => MemoryRegion::Scratchpad,
            Self::IO_START..=Self::IO_END => MemoryRegion::Io,
            Self::EXP3_START..=Self::EXP3_END => MemoryRegion::Expansion,
            Self::BIOS_START..=Self::BIOS_END => MemoryRegion::Bios,
            p if p & !0x3 == Self::CACHE_CONTROL => MemoryRegion::CacheControl,
            _ => MemoryRegion::Unmapped,
        }
    }
}
