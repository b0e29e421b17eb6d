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

use clap::Parser;
use log::{error, info};
use psrx_cpu::core::config::Config;
use psrx_cpu::core::cpu::{CpuTracer, CPU};
use psrx_cpu::core::error::Result;
use psrx_cpu::core::memory::MemoryBus;
use std::path::PathBuf;

/// Run a raw MIPS image on the R3000A core
#[derive(Parser)]
#[command(name = "psrx-cpu")]
#[command(about = "PlayStation R3000A instruction core runner", long_about = None)]
struct Args {
    /// Raw image to load (a BIOS dump or a flat program)
    image: PathBuf,

    /// Virtual address the image is loaded at
    #[arg(long, default_value = "0xBFC00000", value_parser = parse_address)]
    load_address: u32,

    /// First instruction to execute (defaults to the load address)
    #[arg(long, value_parser = parse_address)]
    entry: Option<u32>,

    /// Number of instructions to execute
    #[arg(short = 'n', long, default_value = "100000")]
    steps: u64,

    /// TOML configuration file (overrides PSRX_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write an instruction trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Raise ReservedInstruction on unimplemented encodings
    #[arg(long)]
    strict: bool,
}

/// Parse a hex (`0x` prefixed) or decimal address
fn parse_address(text: &str) -> std::result::Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn load_config(args: &Args) -> Result<Config> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("PSRX_CONFIG").map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    if args.strict {
        config.cpu.strict_decoding = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("psrx-cpu v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut bus = MemoryBus::with_config(&config.memory);
    let image = std::fs::read(&args.image)?;
    bus.load_image(args.load_address, &image)?;
    info!(
        "Loaded {} ({} bytes) at 0x{:08X}",
        args.image.display(),
        image.len(),
        args.load_address
    );

    let mut cpu = CPU::with_config(&config.cpu);
    cpu.set_pc(args.entry.unwrap_or(args.load_address));

    let mut tracer = match &args.trace {
        Some(path) => {
            info!("Tracing to: {}", path.display());
            Some(CpuTracer::new(path)?)
        }
        None => None,
    };

    let log_interval = (args.steps / 10).max(1);
    let mut cycles = 0u64;

    for i in 0..args.steps {
        if i % log_interval == 0 && i > 0 {
            info!(
                "Progress: {}/{} instructions | PC: 0x{:08X}",
                i,
                args.steps,
                cpu.pc()
            );
        }

        if let Some(tracer) = tracer.as_mut() {
            tracer.trace(&cpu, &mut bus)?;
        }

        match cpu.step(&mut bus) {
            Ok(n) => cycles += u64::from(n),
            Err(e) => {
                error!("Error at PC=0x{:08X}: {}", cpu.pc(), e);
                error!("Instruction count: {}", i);
                cpu.dump_registers();
                return Err(e);
            }
        }
    }

    if let Some(tracer) = tracer.as_mut() {
        tracer.flush()?;
    }

    info!("Executed {} instructions ({} cycles)", args.steps, cycles);
    info!("Final PC: 0x{:08X}", cpu.pc());
    if cpu.unimplemented_count() > 0 {
        info!("Unimplemented encodings seen: {}", cpu.unimplemented_count());
    }
    cpu.dump_registers();

    Ok(())
}
