/*!
Cartridge interface: the `Mapper` trait and NROM (mapper 0).

Purpose:
- Decouple CPU/PPU address mapping from the console so the cartridge is an external
  collaborator seen only through this trait.
- Every access reports whether the cartridge claimed it. Unclaimed accesses fall through
  to the console's own devices (internal RAM, PPU registers, nametable VRAM, palette).

Semantics:
- All methods take full, unmasked addresses (CPU: 16-bit, PPU: already masked to 14 bits).
- `cpu_read`/`ppu_read` return `None` when the cartridge does not drive the data bus.
- `cpu_write`/`ppu_write` return `true` when the cartridge consumed the write.
- `mirroring` selects how the PPU's nametable window maps onto VRAM.
*/

/// Nametable arrangement selected by the cartridge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Common interface all cartridge mappers implement.
pub trait Mapper {
    /// Mapper numeric identifier (e.g., 0 for NROM).
    fn mapper_id(&self) -> u16;

    /// CPU-visible read; `None` when the address is not decoded by the cartridge.
    fn cpu_read(&mut self, addr: u16) -> Option<u8>;

    /// CPU-visible write; `true` when the cartridge claimed the address.
    fn cpu_write(&mut self, addr: u16, value: u8) -> bool;

    /// PPU-visible read; `None` when the address is not decoded by the cartridge.
    fn ppu_read(&self, addr: u16) -> Option<u8>;

    /// PPU-visible write; `true` when the cartridge claimed the address.
    fn ppu_write(&mut self, addr: u16, value: u8) -> bool;

    /// Current nametable mirroring.
    fn mirroring(&self) -> Mirroring;
}

/// NROM (mapper 0) implementation.
///
/// Features:
/// - PRG ROM: either 16 KiB (NROM-128) mirrored or 32 KiB (NROM-256) direct at $8000..=$FFFF.
/// - PRG RAM: optional (commonly 8 KiB) at $6000..=$7FFF, read/write if present.
/// - CHR: either ROM or RAM (8 KiB). If CHR RAM, PPU writes are allowed; otherwise ignored.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    /// Create a new NROM mapper.
    ///
    /// - `prg_rom`: PRG ROM bytes (16 KiB or 32 KiB typical)
    /// - `chr`: CHR ROM bytes, or CHR RAM buffer if `chr_is_ram` is true (typically 8 KiB)
    /// - `prg_ram_size`: size of PRG RAM in bytes (0 to disable)
    pub fn new(
        prg_rom: Vec<u8>,
        chr: Vec<u8>,
        chr_is_ram: bool,
        prg_ram_size: usize,
        mirroring: Mirroring,
    ) -> Self {
        Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            mirroring,
        }
    }

    #[inline]
    fn prg_rom_read(&self, addr: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0xFF;
        }
        let rel = addr.wrapping_sub(0x8000) as usize;
        self.prg_rom[rel % self.prg_rom.len()]
    }

    #[inline]
    fn prg_ram_index(&self, addr: u16) -> Option<usize> {
        if self.prg_ram.is_empty() {
            return None;
        }
        Some((addr as usize - 0x6000) % self.prg_ram.len())
    }

    /// Returns true if this is an NROM-128 (16 KiB PRG) ROM.
    pub fn is_nrom_128(&self) -> bool {
        self.prg_rom.len() == 16 * 1024
    }

    /// Returns true if CHR is RAM (writable).
    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

impl Mapper for Nrom {
    #[inline]
    fn mapper_id(&self) -> u16 {
        0
    }

    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF => self.prg_ram_index(addr).map(|i| self.prg_ram[i]),
            0x8000..=0xFFFF => Some(self.prg_rom_read(addr)),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => match self.prg_ram_index(addr) {
                Some(i) => {
                    self.prg_ram[i] = value;
                    true
                }
                None => false,
            },
            // No PRG registers on NROM: ROM writes are left to the console to report.
            _ => false,
        }
    }

    fn ppu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x0000..=0x1FFF if !self.chr.is_empty() => {
                Some(self.chr[addr as usize % self.chr.len()])
            }
            _ => None,
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x0000..=0x1FFF => {
                if self.chr_is_ram && !self.chr.is_empty() {
                    let len = self.chr.len();
                    self.chr[addr as usize % len] = value;
                }
                true
            }
            _ => false,
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
