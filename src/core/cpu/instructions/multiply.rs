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

use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Multiply/Divide Instructions ===
    //
    // Results land in HI/LO. None of these trap.

    /// MULT: Multiply (signed)
    ///
    /// Format: mult rs, rt
    /// Operation: HI:LO = rs * rt (64-bit signed product)
    pub(crate) fn op_mult(&mut self, rs: u8, rt: u8) -> Result<()> {
        let product = (self.reg(rs) as i32 as i64) * (self.reg(rt) as i32 as i64);
        self.set_hi_lo(product as u64);
        Ok(())
    }

    /// MULTU: Multiply Unsigned
    ///
    /// Format: multu rs, rt
    /// Operation: HI:LO = rs * rt (64-bit unsigned product)
    pub(crate) fn op_multu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let product = (self.reg(rs) as u64) * (self.reg(rt) as u64);
        self.set_hi_lo(product);
        Ok(())
    }

    fn set_hi_lo(&mut self, product: u64) {
        self.hi = (product >> 32) as u32;
        self.lo = product as u32;
    }

    /// DIV: Divide (signed)
    ///
    /// Format: div rs, rt
    /// Operation: LO = rs / rt (quotient), HI = rs % rt (remainder)
    ///
    /// # Special Cases
    ///
    /// * Division by zero: HI = rs, LO = 0xFFFFFFFF if rs >= 0, else 1
    /// * 0x80000000 / -1: LO = 0x80000000, HI = 0
    ///
    /// # Example
    ///
    /// ```text
    /// // 100 / 7 = 14 remainder 2
    /// div $at, $v0      # LO = 14, HI = 2
    /// ```
    pub(crate) fn op_div(&mut self, rs: u8, rt: u8) -> Result<()> {
        let numerator = self.reg(rs) as i32;
        let denominator = self.reg(rt) as i32;

        let (quotient, remainder) = if denominator == 0 {
            let quotient = if numerator >= 0 { -1 } else { 1 };
            (quotient, numerator)
        } else {
            // wrapping_* turn i32::MIN / -1 into (i32::MIN, 0)
            (
                numerator.wrapping_div(denominator),
                numerator.wrapping_rem(denominator),
            )
        };

        self.lo = quotient as u32;
        self.hi = remainder as u32;
        Ok(())
    }

    /// DIVU: Divide Unsigned
    ///
    /// Division by zero yields LO = 0xFFFFFFFF, HI = rs.
    pub(crate) fn op_divu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let numerator = self.reg(rs);
        let denominator = self.reg(rt);

        match (
            numerator.checked_div(denominator),
            numerator.checked_rem(denominator),
        ) {
            (Some(quotient), Some(remainder)) => {
                self.lo = quotient;
                self.hi = remainder;
            }
            _ => {
                self.lo = 0xFFFF_FFFF;
                self.hi = numerator;
            }
        }
        Ok(())
    }

    pub(crate) fn op_mfhi(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.hi);
        Ok(())
    }

    pub(crate) fn op_mflo(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.lo);
        Ok(())
    }

    pub(crate) fn op_mthi(&mut self, rs: u8) -> Result<()> {
        self.hi = self.reg(rs);
        Ok(())
    }

    pub(crate) fn op_mtlo(&mut self, rs: u8) -> Result<()> {
        self.lo = self.reg(rs);
        Ok(())
    }
}
