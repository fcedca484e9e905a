/*!
Error types for the emulator core.

Taxonomy
- `CpuError`: fatal conditions raised while clocking the CPU. An opcode with no
  defined behavior halts the emulated session; it is never executed as a NOP.
- `RomError`: problems turning an iNES image into a cartridge.
- `EmuError`: umbrella returned by `Console` operations.

Engine contract violations (empty micro-op queue, an addressing mode asked for an
address it does not produce, out-of-range sprite or palette index) are panics, not
variants here.
*/

use thiserror::Error;

/// Fatal CPU conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unimplemented opcode ${opcode:02X} at ${address:04X}")]
    UnimplementedOpcode { opcode: u8, address: u16 },
}

/// Errors produced while parsing an iNES image.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("data too small for an iNES header")]
    TooSmall,
    #[error("invalid iNES header magic (expected NES<1A>)")]
    BadMagic,
    #[error("NES 2.0 images are not supported")]
    Ines2Unsupported,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
    #[error("truncated {section}: expected {expected} bytes, found {actual}")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("failed to read ROM image")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for console-level operations.
#[derive(Debug, Error)]
pub enum EmuError {
    #[error(transparent)]
    Cpu(#[from] CpuError),
    #[error(transparent)]
    Rom(#[from] RomError),
}
