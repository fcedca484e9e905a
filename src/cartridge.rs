/*!
Cartridge with iNES (v1) loader and Mapper integration (NROM/mapper 0).

Features:
- Parse iNES (v1) header from bytes or file path
- Extract PRG ROM, CHR (ROM or allocate CHR RAM when CHR size == 0), and PRG RAM size
- Determine mirroring, battery-backed RAM, mapper ID (supports mapper 0)
- Construct a concrete Mapper (NROM) and delegate CPU/PPU mapping through it

Notes:
- iNES 2.0 is detected and rejected with `RomError::Ines2Unsupported`.
- PRG RAM allocation policy:
  - If header byte 8 (PRG-RAM size in 8 KiB units) is 0, allocate 8 KiB by convention.
  - Otherwise allocate size_in_units * 8 KiB.
- Any other `Mapper` implementation can be wrapped with `Cartridge::from_mapper`.
*/

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::RomError;
use crate::mapper::{Mapper, Mirroring, Nrom};

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;

pub struct Cartridge {
    mapper: Box<dyn Mapper>,
    battery: bool,
    has_trainer: bool,
    prg_rom_len: usize,
    chr_len: usize,
    prg_ram_len: usize,
    chr_is_ram: bool,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("mapper_id", &self.mapper.mapper_id())
            .field("mirroring", &self.mapper.mirroring())
            .field("battery", &self.battery)
            .field("has_trainer", &self.has_trainer)
            .field("prg_rom_len", &self.prg_rom_len)
            .field("chr_len", &self.chr_len)
            .field("prg_ram_len", &self.prg_ram_len)
            .field("chr_is_ram", &self.chr_is_ram)
            .finish()
    }
}

impl Cartridge {
    // -------------- Construction --------------

    /// Load a cartridge from raw iNES bytes and construct a Mapper (NROM only).
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < HEADER_LEN {
            return Err(RomError::TooSmall);
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(RomError::BadMagic);
        }

        let prg_rom_len = data[4] as usize * PRG_UNIT;
        let chr_rom_len = data[5] as usize * CHR_UNIT;
        let flags6 = data[6];
        let flags7 = data[7];
        let prg_ram_units = data[8] as usize;

        // NES 2.0 if (flags7 & 0x0C) == 0x08
        if (flags7 & 0x0C) == 0x08 {
            return Err(RomError::Ines2Unsupported);
        }

        let mapper_id = (flags7 & 0xF0) as u16 | (flags6 >> 4) as u16;
        let mirroring = if flags6 & 0b0000_1000 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0b0000_0001 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let battery = flags6 & 0b0000_0010 != 0;
        let has_trainer = flags6 & 0b0000_0100 != 0;

        let mut offset = HEADER_LEN;
        if has_trainer {
            take(data, offset, TRAINER_LEN, "trainer")?;
            offset += TRAINER_LEN;
        }

        let prg_rom = take(data, offset, prg_rom_len, "PRG ROM")?.to_vec();
        offset += prg_rom_len;

        let chr_is_ram = chr_rom_len == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_UNIT]
        } else {
            take(data, offset, chr_rom_len, "CHR ROM")?.to_vec()
        };

        let chr_len = chr.len();
        let prg_ram_len = prg_ram_units.max(1) * 8 * 1024;

        let mapper: Box<dyn Mapper> = match mapper_id {
            0 => Box::new(Nrom::new(prg_rom, chr, chr_is_ram, prg_ram_len, mirroring)),
            other => return Err(RomError::UnsupportedMapper(other)),
        };

        debug!(
            mapper_id,
            prg_rom_len,
            chr_len,
            ?mirroring,
            "parsed iNES image"
        );

        Ok(Self {
            mapper,
            battery,
            has_trainer,
            prg_rom_len,
            chr_len,
            prg_ram_len,
            chr_is_ram,
        })
    }

    /// Load a cartridge from an iNES file (.nes).
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    /// Wrap an arbitrary mapper implementation (no iNES metadata).
    pub fn from_mapper(mapper: Box<dyn Mapper>) -> Self {
        Self {
            mapper,
            battery: false,
            has_trainer: false,
            prg_rom_len: 0,
            chr_len: 0,
            prg_ram_len: 0,
            chr_is_ram: false,
        }
    }

    // -------------- Accessors --------------

    pub fn mapper_id(&self) -> u16 {
        self.mapper.mapper_id()
    }

    pub fn battery_backed(&self) -> bool {
        self.battery
    }

    pub fn has_trainer(&self) -> bool {
        self.has_trainer
    }

    pub fn prg_rom_len(&self) -> usize {
        self.prg_rom_len
    }

    pub fn chr_len(&self) -> usize {
        self.chr_len
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    pub fn prg_ram_len(&self) -> usize {
        self.prg_ram_len
    }
}

impl Mapper for Cartridge {
    fn mapper_id(&self) -> u16 {
        self.mapper.mapper_id()
    }

    #[inline]
    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(addr)
    }

    #[inline]
    fn cpu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.cpu_write(addr, value)
    }

    #[inline]
    fn ppu_read(&self, addr: u16) -> Option<u8> {
        self.mapper.ppu_read(addr)
    }

    #[inline]
    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        self.mapper.ppu_write(addr, value)
    }

    fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }
}

fn take<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], RomError> {
    let available = data.len().saturating_sub(offset);
    if available < len {
        return Err(RomError::Truncated {
            section,
            expected: len,
            actual: available,
        });
    }
    Ok(&data[offset..offset + len])
}
