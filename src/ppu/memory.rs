#![doc = r#"
PPU memory submodule

Responsibilities
- OAM access: the OAMDATA port ($2004) used by the CPU and by OAM DMA, plus direct
  inspection helpers for tests and debuggers.

Behavior
- OAMDATA writes store at OAMADDR and increment it (wrapping at 256).
- Attribute bytes (OAMADDR % 4 == 2) have no storage for bits 2-4; they read back 0.
- OAMDATA reads do not increment. While visible-line rendering clears secondary OAM
  (cycles 1-64) the port reads $FF.
"#]

use super::Ppu;

/// One primary-OAM record as stored (no position bias applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub y: u8,
    pub tile: u8,
    pub attributes: u8,
    pub x: u8,
}

impl Ppu {
    /// $2004 write.
    pub fn write_oam_data(&mut self, value: u8) {
        let value = if self.oam_addr & 3 == 2 { value & 0xE3 } else { value };
        self.oam[self.oam_addr as usize] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// $2004 read.
    pub(in crate::ppu) fn read_oam_data(&self) -> u8 {
        if self.secondary_oam_clearing() {
            0xFF
        } else {
            self.oam[self.oam_addr as usize]
        }
    }

    #[inline]
    fn secondary_oam_clearing(&self) -> bool {
        (0..=239).contains(&self.scanline)
            && (1..=64).contains(&self.cycle)
            && self.mask.rendering_enabled()
    }

    /// Decoded record of sprite `index` (0..64).
    pub fn sprite(&self, index: usize) -> OamEntry {
        assert!(index < 64, "sprite index {index} out of range (0..64)");
        let base = index * 4;
        OamEntry {
            y: self.oam[base],
            tile: self.oam[base + 1],
            attributes: self.oam[base + 2],
            x: self.oam[base + 3],
        }
    }

    pub fn oam(&self) -> &[u8; 256] {
        &self.oam
    }

    /// The eight-record scratch buffer filled by sprite evaluation.
    pub fn secondary_oam(&self) -> &[u8; 32] {
        &self.secondary_oam
    }

    #[inline]
    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }
}
