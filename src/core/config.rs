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

//! Core configuration
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields the stock PlayStation setup.
//!
//! ```toml
//! [cpu]
//! prid = 0x00000002
//! strict_decoding = false
//!
//! [memory]
//! ram_size = "2MB"
//! ```

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CPU core settings
    pub cpu: CpuConfig,
    /// Memory bus settings
    pub memory: MemoryConfig,
}

/// CPU core settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Value reported by the read-only PRID register (cop0r15)
    pub prid: u32,

    /// Raise ReservedInstruction for unimplemented encodings instead of
    /// logging them and continuing
    pub strict_decoding: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            prid: 0x0000_0002,
            strict_decoding: false,
        }
    }
}

/// Main RAM size
///
/// Retail units have 2MB; development units have 8MB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RamSize {
    #[default]
    #[serde(rename = "2MB")]
    Retail2MB,
    #[serde(rename = "8MB")]
    Dev8MB,
}

impl RamSize {
    /// Size in bytes
    pub fn bytes(self) -> usize {
        match self {
            RamSize::Retail2MB => 2 * 1024 * 1024,
            RamSize::Dev8MB => 8 * 1024 * 1024,
        }
    }
}

/// Memory bus settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Main RAM size
    pub ram_size: RamSize,
}

impl Config {
    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use psrx_cpu::core::config::{Config, RamSize};
    ///
    /// let config = Config::from_toml_str("[memory]\nram_size = \"8MB\"").unwrap();
    /// assert_eq!(config.memory.ram_size, RamSize::Dev8MB);
    /// assert!(!config.cpu.strict_decoding);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a config error if
    /// it is not valid TOML for this schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
