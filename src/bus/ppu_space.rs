#![doc = r#"
PPU address-space storage owned by the console: nametable VRAM and palette RAM.

Concepts
- Nametable mirroring is chosen by the cartridge (`Mapper::mirroring`). The backing
  store is 4 KiB so four-screen boards get real storage for all four tables; the
  two-table arrangements only ever touch the first 2 KiB.
- Palette addressing has special mirroring semantics ($3F10 mirrors $3F00).
- Pattern tables ($0000-$1FFF) live on the cartridge and are not stored here.

Both mapping helpers are pure and unit-tested in isolation.
"#]

use crate::mapper::Mirroring;

/// Size of the nametable backing store (four 1 KiB tables).
pub const VRAM_SIZE: usize = 0x1000;

/// Compute the palette RAM byte index (0..=31) for a PPU address in 0x3F00-0x3FFF.
///
/// - Mirror to 0x3F00-0x3F1F (mask lower 5 bits).
/// - $3F10/$3F14/$3F18/$3F1C mirror $3F00/$3F04/$3F08/$3F0C respectively.
#[inline]
pub fn map_palette_addr(addr: u16) -> usize {
    let mut idx = addr as usize & 0x1F;
    if idx >= 16 && (idx & 0x03) == 0 {
        idx -= 16;
    }
    idx
}

/// Compute the VRAM byte index for a PPU address in 0x2000-0x3EFF.
///
/// - Horizontal mirroring: tables (0,1) -> bank 0, (2,3) -> bank 1
/// - Vertical mirroring: tables (0,2) -> bank 0, (1,3) -> bank 1
/// - FourScreen: each table has its own bank
#[inline]
pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> usize {
    let a = addr.wrapping_sub(0x2000) & 0x0FFF;
    let table = (a / 0x0400) as usize;
    let offset = (a % 0x0400) as usize;
    let bank = match mirroring {
        Mirroring::Horizontal => table >> 1,
        Mirroring::Vertical => table & 1,
        Mirroring::FourScreen => table,
    };
    bank * 0x0400 + offset
}

// ----------------------------------------------------------------------------
// PPU address space container
// ----------------------------------------------------------------------------

/// Owns nametable and palette RAM and provides PPU-visible read/write helpers.
pub struct PpuAddressSpace {
    vram: [u8; VRAM_SIZE],
    palette: [u8; 32],
}

impl Default for PpuAddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl PpuAddressSpace {
    pub fn new() -> Self {
        Self {
            vram: [0; VRAM_SIZE],
            palette: [0; 32],
        }
    }

    /// Read from $2000-$3FFF. Pattern-table addresses read 0 (open cartridge bus).
    pub fn read(&self, addr: u16, mirroring: Mirroring) -> u8 {
        let a = addr & 0x3FFF;
        match a {
            0x0000..=0x1FFF => 0,
            0x2000..=0x3EFF => self.vram[map_nametable_addr(a, mirroring)],
            _ => self.palette[map_palette_addr(a)],
        }
    }

    /// Write to $2000-$3FFF. Pattern-table addresses are ignored.
    pub fn write(&mut self, addr: u16, value: u8, mirroring: Mirroring) {
        let a = addr & 0x3FFF;
        match a {
            0x0000..=0x1FFF => {}
            0x2000..=0x3EFF => self.vram[map_nametable_addr(a, mirroring)] = value,
            // Palette entries are 6 bits wide.
            _ => self.palette[map_palette_addr(a)] = value & 0x3F,
        }
    }

    pub fn palette(&self) -> &[u8; 32] {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_mirrors_backdrop_entries() {
        for (mirror, base) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            assert_eq!(map_palette_addr(mirror), map_palette_addr(base), "{mirror:04X}");
        }
        assert_eq!(map_palette_addr(0x3F11), 0x11, "$3F11 is its own entry");
        assert_eq!(map_palette_addr(0x3FE1), 0x01, "$3F20-$3FFF repeats every 32 bytes");
    }

    #[test]
    fn nametable_banks_follow_mirroring() {
        use Mirroring::*;
        assert_eq!(map_nametable_addr(0x2400, Horizontal), 0x0000);
        assert_eq!(map_nametable_addr(0x2800, Horizontal), 0x0400);
        assert_eq!(map_nametable_addr(0x2400, Vertical), 0x0400);
        assert_eq!(map_nametable_addr(0x2800, Vertical), 0x0000);
        assert_eq!(map_nametable_addr(0x2C05, FourScreen), 0x0C05);
        assert_eq!(map_nametable_addr(0x3005, Vertical), 0x0005, "$3000 mirrors $2000");
    }

    #[test]
    fn palette_writes_are_six_bits_and_aliased() {
        let mut space = PpuAddressSpace::new();
        space.write(0x3F10, 0xFF, Mirroring::Horizontal);
        assert_eq!(space.read(0x3F00, Mirroring::Horizontal), 0x3F);
        space.write(0x2001, 0x42, Mirroring::Vertical);
        assert_eq!(space.read(0x2801, Mirroring::Vertical), 0x42);
        assert_eq!(space.read(0x2401, Mirroring::Vertical), 0x00);
    }
}
