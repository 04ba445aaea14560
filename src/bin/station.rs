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
use station_core::core::error::Result;
use station_core::core::system::System;

/// PlayStation console core runner
#[derive(Parser)]
#[command(name = "station")]
#[command(about = "PlayStation console core", long_about = None)]
struct Args {
    /// Path to PlayStation BIOS file (e.g., SCPH1001.BIN)
    bios_file: String,

    /// Path to a PS-X EXE to side-load once the shell is reached
    #[arg(short = 'e', long)]
    exe: Option<String>,

    /// Number of frames to run
    #[arg(short = 'f', long, default_value = "60")]
    frames: u64,
}

fn main() -> Result<()> {
    // .env first, so RUST_LOG from there is honored
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("station v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut system = System::new();

    info!("Loading BIOS from: {}", args.bios_file);
    if let Err(e) = system.load_bios(&args.bios_file) {
        error!("Failed to load BIOS: {}", e);
        return Err(e);
    }

    if let Some(exe_path) = &args.exe {
        info!("Staging side-load: {}", exe_path);
        system.sideload_exe(exe_path)?;
    }

    info!("Starting emulation...");
    system.reset();

    let log_interval = (args.frames / 10).max(1);
    for frame in 0..args.frames {
        if let Err(e) = system.run_frame() {
            error!("Error at PC=0x{:08X}: {}", system.pc(), e);
            system.cpu().dump_registers();
            return Err(e);
        }

        if (frame + 1) % log_interval == 0 {
            info!(
                "Frame {}/{} | PC: 0x{:08X} | Cycles: {}",
                frame + 1,
                args.frames,
                system.pc(),
                system.cycles()
            );
        }
    }

    info!("Emulation completed");
    info!("Frames: {}", system.frames());
    info!("Total cycles: {}", system.cycles());
    info!("Final PC: 0x{:08X}", system.pc());

    Ok(())
}
