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

//! Whole-system boot and side-load tests using real files

use std::io::Write;

use station_core::core::error::EmulatorError;
use station_core::core::loader::Executable;
use station_core::core::system::System;

const BIOS_SIZE: usize = 512 * 1024;

/// Write a BIOS image whose entry code is the given program
fn write_bios_file(program: &[u32]) -> tempfile::NamedTempFile {
    let mut image = vec![0u8; BIOS_SIZE];
    for (index, &word) in program.iter().enumerate() {
        image[index * 4..index * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();
    file.flush().unwrap();
    file
}

/// Build a PS-X EXE image in memory
fn build_exe(pc: u32, gp: u32, load_address: u32, program: &[u32]) -> Vec<u8> {
    let mut bytes = vec![0u8; 0x800 + program.len() * 4];
    bytes[0..8].copy_from_slice(b"PS-X EXE");
    bytes[0x10..0x14].copy_from_slice(&pc.to_le_bytes());
    bytes[0x14..0x18].copy_from_slice(&gp.to_le_bytes());
    bytes[0x18..0x1C].copy_from_slice(&load_address.to_le_bytes());
    bytes[0x1C..0x20].copy_from_slice(&((program.len() * 4) as u32).to_le_bytes());
    for (index, &word) in program.iter().enumerate() {
        let offset = 0x800 + index * 4;
        bytes[offset..offset + 4].copy_from_slice(&word.to_le_bytes());
    }
    bytes
}

#[test]
fn test_bios_size_is_enforced() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0u8; 1024]).unwrap();
    file.flush().unwrap();

    let mut system = System::new();
    let result = system.load_bios(file.path().to_str().unwrap());

    assert!(matches!(
        result,
        Err(EmulatorError::InvalidBiosSize {
            expected: BIOS_SIZE,
            got: 1024
        })
    ));
}

#[test]
fn test_missing_bios_reports_path() {
    let mut system = System::new();
    assert!(matches!(
        system.load_bios("/nonexistent/bios.bin"),
        Err(EmulatorError::BiosNotFound(_))
    ));
}

#[test]
fn test_boot_runs_bios_code() {
    // Entry code: r1 = 0x42, then spin
    let bios = write_bios_file(&[
        0x24010042, // ADDIU r1, r0, 0x42
        0x0BF00001, // J 0xBFC00004
        0x00000000, // NOP
    ]);

    let mut system = System::new();
    system.load_bios(bios.path().to_str().unwrap()).unwrap();

    for _ in 0..8 {
        system.step().unwrap();
    }
    assert_eq!(system.cpu().reg(1), 0x42);
}

#[test]
fn test_sideload_injects_at_shell_entry() {
    // BIOS: jump straight to the shell entry point
    let bios = write_bios_file(&[
        0x3C018001, // LUI r1, 0x8001
        0x00200008, // JR  r1
        0x00000000, // NOP
    ]);

    // EXE: store a marker at 0x80000100, then spin
    let exe_bytes = build_exe(
        0x80010000,
        0x80020000,
        0x80010000,
        &[
            0x24020077, // ADDIU r2, r0, 0x77
            0x3C038000, // LUI   r3, 0x8000
            0xAC620100, // SW    r2, 0x100(r3)
            0x08004000, // J     0x80010000
            0x00000000, // NOP
        ],
    );
    let mut exe_file = tempfile::NamedTempFile::new().unwrap();
    exe_file.write_all(&exe_bytes).unwrap();
    exe_file.flush().unwrap();

    let mut system = System::new();
    system.load_bios(bios.path().to_str().unwrap()).unwrap();
    system
        .sideload_exe(exe_file.path().to_str().unwrap())
        .unwrap();

    for _ in 0..12 {
        system.step().unwrap();
    }

    assert_eq!(system.bus_mut().read32(0x80000100).unwrap(), 0x77);
    // GP was taken from the executable header
    assert_eq!(system.cpu().reg(28), 0x80020000);
}

#[test]
fn test_executable_loader_round_trip() {
    let bytes = build_exe(0x80010000, 0, 0x80010000, &[0x00000000]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let exe = Executable::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(exe.pc, 0x80010000);
    assert_eq!(exe.data.len(), 4);
}
