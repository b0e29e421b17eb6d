// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory Bus Tests
//!
//! - `basic`: read/write through the `Bus` trait, alignment, ROM protection
//! - `regions`: address translation, segment mirroring and region boundaries

use super::*;
