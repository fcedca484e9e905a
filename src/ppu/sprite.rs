#![doc = r#"
PPU sprite fetch and scan-line cache

Responsibilities
- Cycles 257-320 of the pre-render and visible lines: one 8-cycle slot per secondary-OAM
  entry. Phase 7 of each slot reads the pattern low/high bytes for the row of that sprite
  on the next line and stores them, already horizontally flipped, in `SpriteSlot`.
- OAMADDR is forced to 0 on every one of these cycles.
- Produce the sprite pixel for screen column `x`: the first slot in secondary-OAM order
  with an opaque pixel at `x` wins.

Notes
- Slots past `eval.found` stay transparent. The pre-render line always fetches zero
  sprites, so line 0 never shows sprites.
"#]

use super::Ppu;
use super::registers::Control;
use crate::ppu_bus::PpuBus;

/// One entry of the scan-line cache.
#[derive(Debug, Clone, Copy, Default)]
pub(in crate::ppu) struct SpriteSlot {
    pub pattern_lo: u8,
    pub pattern_hi: u8,
    pub attributes: u8,
    pub x: u8,
    pub is_sprite_zero: bool,
}

impl SpriteSlot {
    /// 2-bit pixel at column offset `dx` (0..8). Patterns are stored MSB-left.
    #[inline]
    fn pixel(&self, dx: u8) -> u8 {
        let bit = 7 - dx;
        (((self.pattern_hi >> bit) & 1) << 1) | ((self.pattern_lo >> bit) & 1)
    }
}

/// Opaque sprite pixel chosen for a screen column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::ppu) struct SpritePixel {
    pub pixel: u8,
    /// Sprite palette 0-3.
    pub palette: u8,
    pub behind_background: bool,
    pub is_sprite_zero: bool,
}

impl Ppu {
    /// One cycle of sprite fetch, cycles 257-320.
    pub(in crate::ppu) fn sprite_fetch_cycle<B: PpuBus>(&mut self, bus: &B) {
        let c = self.cycle;
        if !(257..=320).contains(&c) {
            return;
        }
        self.oam_addr = 0;
        if c == 257 {
            self.slot_count = if self.scanline == -1 { 0 } else { self.eval.found };
        }
        if (c - 257) % 8 != 7 {
            return;
        }
        let i = usize::from((c - 257) / 8);
        if i >= usize::from(self.slot_count) {
            self.slots[i] = SpriteSlot::default();
            return;
        }

        let base = i * 4;
        let y = self.secondary_oam[base];
        let tile = self.secondary_oam[base + 1];
        let attributes = self.secondary_oam[base + 2];
        let x = self.secondary_oam[base + 3];

        let height = self.ctrl.sprite_height();
        let mut row = (self.scanline - i16::from(y)).clamp(0, height - 1) as u16;
        if attributes & 0x80 != 0 {
            row = height as u16 - 1 - row;
        }
        let addr = if height == 16 {
            let table = u16::from(tile & 1) * 0x1000;
            let top = u16::from(tile & 0xFE);
            let tile = if row >= 8 { top + 1 } else { top };
            table + tile * 16 + (row & 7)
        } else {
            let table = if self.ctrl.contains(Control::SPRITE_TABLE) { 0x1000 } else { 0 };
            table + u16::from(tile) * 16 + row
        };

        let mut lo = bus.ppu_read(addr);
        let mut hi = bus.ppu_read(addr + 8);
        if attributes & 0x40 != 0 {
            lo = lo.reverse_bits();
            hi = hi.reverse_bits();
        }
        self.slots[i] = SpriteSlot {
            pattern_lo: lo,
            pattern_hi: hi,
            attributes,
            x,
            is_sprite_zero: i == 0 && self.eval.sprite_zero_next,
        };
    }

    /// Winning sprite pixel at screen column `x`, if any slot is opaque there.
    pub(in crate::ppu) fn sprite_pixel(&self, x: u8) -> Option<SpritePixel> {
        self.slots[..usize::from(self.slot_count)]
            .iter()
            .find_map(|slot| {
                let dx = x.checked_sub(slot.x).filter(|&dx| dx < 8)?;
                let pixel = slot.pixel(dx);
                (pixel != 0).then_some(SpritePixel {
                    pixel,
                    palette: slot.attributes & 0x03,
                    behind_background: slot.attributes & 0x20 != 0,
                    is_sprite_zero: slot.is_sprite_zero,
                })
            })
    }
}
