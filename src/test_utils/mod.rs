//! Shared test fixtures: iNES image builders and flat memory buses.
//!
//! iNES header fields used by the builders:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = Flags 7 (NES 2.0 indicator, mapper high nibble)
//! - byte 8 = PRG RAM size in 8 KiB units
//!
//! `FlatBus` is a 64 KiB RAM with an access log, for CPU tests that assert on the
//! exact per-cycle bus traffic. `FlatPpuBus` is a flat 16 KiB PPU address space.

#![allow(dead_code)]

use crate::cpu::CpuBus;
use crate::ppu_bus::PpuBus;

/// Build a minimal iNES (v1) image. PRG is filled with 0xAA and CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(16 + 512 + prg_16k * 0x4000 + chr_8k * 0x2000);
    bytes.extend_from_slice(b"NES\x1A");
    bytes.extend_from_slice(&[prg_16k as u8, chr_8k as u8, flags6, flags7, prg_ram_8k]);
    bytes.extend_from_slice(&[0u8; 7]);
    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.resize(bytes.len() + prg_16k * 0x4000, 0xAA);
    bytes.resize(bytes.len() + chr_8k * 0x2000, 0xCC);
    bytes
}

/// Build an NROM-128 image with `prg` at $8000 (mirrored at $C000) and the given
/// (reset, nmi, irq) vectors, defaulting all three to $8000.
pub fn build_nrom_with_prg(prg: &[u8], chr_8k: usize, vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(prg.len() <= 0x4000 - 6, "program must leave room for the vectors");
    let mut rom = build_ines(1, chr_8k, 0, 0, 1, None);
    let bank = &mut rom[16..16 + 0x4000];
    bank[..prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors(bank, reset, nmi, irq);
    rom
}

/// Write NMI/RESET/IRQ vectors into the last six bytes of a PRG bank.
pub fn set_vectors(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = prg.len() - 6;
    prg[base..base + 2].copy_from_slice(&nmi.to_le_bytes());
    prg[base + 2..base + 4].copy_from_slice(&reset.to_le_bytes());
    prg[base + 4..base + 6].copy_from_slice(&irq.to_le_bytes());
}

/// One CPU bus cycle as seen by `FlatBus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u16, u8),
    Write(u16, u8),
}

impl Access {
    pub fn addr(&self) -> u16 {
        match *self {
            Access::Read(a, _) | Access::Write(a, _) => a,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Access::Write(..))
    }
}

/// 64 KiB of RAM behind the CPU, recording every access.
pub struct FlatBus {
    pub mem: Vec<u8>,
    pub log: Vec<Access>,
}

impl FlatBus {
    /// Memory filled with `fill`, reset vector pointing at `entry`.
    pub fn new(fill: u8, entry: u16) -> Self {
        let mut mem = vec![fill; 0x10000];
        mem[0xFFFC..0xFFFE].copy_from_slice(&entry.to_le_bytes());
        Self { mem, log: Vec::new() }
    }

    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn set_vector(&mut self, vector: u16, target: u16) {
        let at = vector as usize;
        self.mem[at..at + 2].copy_from_slice(&target.to_le_bytes());
    }
}

impl CpuBus for FlatBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.mem[addr as usize];
        self.log.push(Access::Read(addr, value));
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
        self.log.push(Access::Write(addr, value));
    }
}

/// Flat 16 KiB PPU address space with no mirroring.
pub struct FlatPpuBus {
    pub mem: Vec<u8>,
}

impl Default for FlatPpuBus {
    fn default() -> Self {
        Self { mem: vec![0; 0x4000] }
    }
}

impl PpuBus for FlatPpuBus {
    fn ppu_read(&self, addr: u16) -> u8 {
        self.mem[(addr & 0x3FFF) as usize]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.mem[(addr & 0x3FFF) as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(&rom[4..9], &[2, 1, 0x01, 0x00, 1]);
        assert_eq!(rom.len(), 16 + 2 * 0x4000 + 0x2000);
    }

    #[test]
    fn nrom_builder_places_program_and_vectors() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], 1, Some((0x8123, 0x8456, 0x8ABC)));
        assert_eq!(&rom[16..18], &[0xA9, 0x01]);
        assert_eq!(&rom[16 + 0x3FFA..16 + 0x4000], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn flat_bus_logs_in_order() {
        let mut bus = FlatBus::new(0xEA, 0x0200);
        bus.write(0x10, 7);
        assert_eq!(bus.read(0x10), 7);
        assert_eq!(bus.log, vec![Access::Write(0x10, 7), Access::Read(0x10, 7)]);
        assert_eq!(bus.read(0xFFFC), 0x00);
        assert_eq!(bus.read(0xFFFD), 0x02);
    }
}
