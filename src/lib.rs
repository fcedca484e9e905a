#![doc = r#"
cyclenes: a cycle-accurate NES core.

Every component advances one hardware cycle per call: the CPU runs instructions as
queues of per-cycle micro-operations, the PPU produces one dot per clock, and the
console interleaves them at the NTSC 3:1 ratio, with OAM DMA stealing CPU cycles.

Modules:
- cpu: 6502 micro-op scheduler, opcode table, ALU semantics, trace records
- ppu: 2C02 registers, background/sprite pipelines, per-dot renderer, master palette
- ppu_bus: trait for the PPU's 14-bit address space
- bus: CPU address map, RAM, nametable/palette storage, OAM DMA controller
- mapper: Mapper trait and NROM (mapper 0)
- cartridge: iNES v1 loader
- controller: standard controller shift register
- console: clock orchestrator
- error: error types

In tests, shared iNES builders and flat buses are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mapper;
pub mod ppu;
pub mod ppu_bus;

// Re-export commonly used types at the crate root for convenience.
pub use bus::Bus;
pub use cartridge::Cartridge;
pub use console::{Console, ConsoleConfig};
pub use cpu::{Cpu, CpuBus, TraceRecord};
pub use error::{CpuError, EmuError, RomError};
pub use ppu::Ppu;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
