#![doc = r#"
PPU background fetch pipeline

Responsibilities
- The 8-cycle nametable / attribute / pattern-low / pattern-high fetch cadence.
- Four 16-bit shift registers (pattern low/high, attribute low/high), reloaded from
  the "next tile" latches every 8 cycles and shifted once per cycle.
- Loopy scroll updates: coarse X every tile, Y at cycle 256, horizontal copy at
  257 and vertical copy across 280-304 of the pre-render line.

Windows
- Shifting and fetching run on cycles 2-257 and 321-337. The first two tiles of the
  next line are prefetched in 321-336, so the high bytes of the shifters hold the
  tile being drawn and the low bytes the one after it.
- The caller only invokes `background_cycle` on the pre-render and visible lines
  with rendering enabled (background or sprites), and before composing the dot's
  pixel: the pixel for cycle `c` is read after that cycle's shift.
"#]

use super::Ppu;
use crate::ppu_bus::PpuBus;

/// Shift registers and next-tile latches.
#[derive(Debug, Clone, Copy, Default)]
pub(in crate::ppu) struct BackgroundPipeline {
    pub next_tile: u8,
    pub next_attribute: u8,
    pub next_pattern_lo: u8,
    pub next_pattern_hi: u8,
    pub pattern_lo: u16,
    pub pattern_hi: u16,
    pub attribute_lo: u16,
    pub attribute_hi: u16,
}

impl BackgroundPipeline {
    #[inline]
    fn reload(&mut self) {
        self.pattern_lo = (self.pattern_lo & 0xFF00) | u16::from(self.next_pattern_lo);
        self.pattern_hi = (self.pattern_hi & 0xFF00) | u16::from(self.next_pattern_hi);
        let lo = if self.next_attribute & 0b01 != 0 { 0xFF } else { 0x00 };
        let hi = if self.next_attribute & 0b10 != 0 { 0xFF } else { 0x00 };
        self.attribute_lo = (self.attribute_lo & 0xFF00) | lo;
        self.attribute_hi = (self.attribute_hi & 0xFF00) | hi;
    }

    #[inline]
    fn shift(&mut self) {
        self.pattern_lo <<= 1;
        self.pattern_hi <<= 1;
        self.attribute_lo <<= 1;
        self.attribute_hi <<= 1;
    }

    /// (pixel 0-3, palette 0-3) at fine X offset `fine_x`.
    #[inline]
    pub fn pixel(&self, fine_x: u8) -> (u8, u8) {
        let bit = 0x8000u16 >> fine_x;
        let p0 = u8::from(self.pattern_lo & bit != 0);
        let p1 = u8::from(self.pattern_hi & bit != 0);
        let a0 = u8::from(self.attribute_lo & bit != 0);
        let a1 = u8::from(self.attribute_hi & bit != 0);
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }
}

impl Ppu {
    /// One cycle of background work on a rendering line.
    pub(in crate::ppu) fn background_cycle<B: PpuBus>(&mut self, bus: &B) {
        let c = self.cycle;
        if (2..=257).contains(&c) || (321..=337).contains(&c) {
            self.bg.shift();
            match (c - 1) % 8 {
                0 => {
                    self.bg.reload();
                    self.bg.next_tile = bus.ppu_read(0x2000 | (self.v.0 & 0x0FFF));
                }
                2 => {
                    let v = self.v;
                    let addr = 0x23C0
                        | (v.0 & 0x0C00)
                        | ((v.coarse_y() >> 2) << 3)
                        | (v.coarse_x() >> 2);
                    let mut attribute = bus.ppu_read(addr);
                    if v.coarse_y() & 0x02 != 0 {
                        attribute >>= 4;
                    }
                    if v.coarse_x() & 0x02 != 0 {
                        attribute >>= 2;
                    }
                    self.bg.next_attribute = attribute & 0x03;
                }
                4 => self.bg.next_pattern_lo = bus.ppu_read(self.background_pattern_address()),
                6 => self.bg.next_pattern_hi = bus.ppu_read(self.background_pattern_address() + 8),
                7 => self.increment_scroll_x(),
                _ => {}
            }
        }

        match c {
            256 => self.increment_scroll_y(),
            257 => self.transfer_address_x(),
            338 | 340 => {
                bus.ppu_read(0x2000 | (self.v.0 & 0x0FFF));
            }
            280..=304 if self.scanline == -1 => self.transfer_address_y(),
            _ => {}
        }
    }

    #[inline]
    fn background_pattern_address(&self) -> u16 {
        let table: u16 = if self.ctrl.contains(super::registers::Control::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        };
        table + u16::from(self.bg.next_tile) * 16 + self.v.fine_y()
    }

    fn increment_scroll_x(&mut self) {
        if self.v.coarse_x() == 31 {
            self.v.set_coarse_x(0);
            self.v.set_nametable_x(self.v.nametable_x() ^ 1);
        } else {
            self.v.set_coarse_x(self.v.coarse_x() + 1);
        }
    }

    fn increment_scroll_y(&mut self) {
        if self.v.fine_y() < 7 {
            self.v.set_fine_y(self.v.fine_y() + 1);
            return;
        }
        self.v.set_fine_y(0);
        match self.v.coarse_y() {
            29 => {
                self.v.set_coarse_y(0);
                self.v.set_nametable_y(self.v.nametable_y() ^ 1);
            }
            // Rows 30 and 31 hold attribute data; wrapping from them does not switch tables.
            31 => self.v.set_coarse_y(0),
            y => self.v.set_coarse_y(y + 1),
        }
    }

    #[inline]
    fn transfer_address_x(&mut self) {
        self.v.set_coarse_x(self.t.coarse_x());
        self.v.set_nametable_x(self.t.nametable_x());
    }

    #[inline]
    fn transfer_address_y(&mut self) {
        self.v.set_fine_y(self.t.fine_y());
        self.v.set_coarse_y(self.t.coarse_y());
        self.v.set_nametable_y(self.t.nametable_y());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::registers::{Mask, VramAddress};
    use crate::test_utils::FlatPpuBus;

    fn clock_until(ppu: &mut Ppu, bus: &FlatPpuBus, line: i16, cycle: u16) {
        while (ppu.scanline, ppu.cycle) != (line, cycle) {
            ppu.clock(bus);
        }
    }

    #[test]
    fn shifters_run_with_only_sprites_enabled() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_SPRITES;
        ppu.scanline = 0;
        ppu.cycle = 2;
        ppu.bg.pattern_lo = 0x0001;
        ppu.bg.attribute_hi = 0x0001;
        ppu.background_cycle(&FlatPpuBus::default());
        assert_eq!(ppu.bg.pattern_lo, 0x0002);
        assert_eq!(ppu.bg.attribute_hi, 0x0002);
    }

    #[test]
    fn pre_render_line_copies_t_into_v() {
        let bus = FlatPpuBus::default();
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND;
        ppu.scanline = -1;
        ppu.cycle = 0;
        ppu.t = VramAddress(0x3AA5);

        clock_until(&mut ppu, &bus, -1, 280);
        assert_eq!(ppu.v.coarse_x(), ppu.t.coarse_x(), "horizontal bits copied at 257");
        assert_ne!(ppu.v.coarse_y(), ppu.t.coarse_y(), "vertical bits not yet copied");

        clock_until(&mut ppu, &bus, -1, 305);
        assert_eq!(ppu.v, ppu.t, "vertical bits copied across 280-304");
    }

    #[test]
    fn visible_lines_copy_only_horizontal_bits() {
        let bus = FlatPpuBus::default();
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND;
        ppu.scanline = 5;
        ppu.cycle = 257;
        ppu.v = VramAddress(0x0000);
        ppu.t = VramAddress(0x7FFF);

        clock_until(&mut ppu, &bus, 5, 321);
        assert_eq!((ppu.v.coarse_x(), ppu.v.nametable_x()), (31, 1));
        assert_eq!(
            (ppu.v.fine_y(), ppu.v.coarse_y(), ppu.v.nametable_y()),
            (0, 0, 0),
            "no vertical copy outside the pre-render line"
        );
    }

    #[test]
    fn coarse_x_wrap_switches_horizontal_nametable() {
        let mut ppu = Ppu::new();
        ppu.v = VramAddress(31);
        ppu.increment_scroll_x();
        assert_eq!(ppu.v.coarse_x(), 0);
        assert_eq!(ppu.v.nametable_x(), 1);
    }

    #[test]
    fn y_increment_wraps_at_row_29_and_31() {
        let mut ppu = Ppu::new();
        ppu.v.set_fine_y(7);
        ppu.v.set_coarse_y(29);
        ppu.increment_scroll_y();
        assert_eq!((ppu.v.coarse_y(), ppu.v.nametable_y(), ppu.v.fine_y()), (0, 1, 0));

        ppu.v.set_fine_y(7);
        ppu.v.set_coarse_y(31);
        ppu.increment_scroll_y();
        assert_eq!((ppu.v.coarse_y(), ppu.v.nametable_y()), (0, 1), "row 31 wraps in place");

        ppu.v.set_fine_y(3);
        ppu.increment_scroll_y();
        assert_eq!(ppu.v.fine_y(), 4);
    }

    #[test]
    fn pipeline_pixel_follows_fine_x() {
        let mut bg = BackgroundPipeline {
            next_pattern_lo: 0b1000_0000,
            next_pattern_hi: 0b0100_0000,
            next_attribute: 0b10,
            ..BackgroundPipeline::default()
        };
        bg.reload();
        for _ in 0..8 {
            bg.shift();
        }
        assert_eq!(bg.pixel(0), (0b01, 0b10));
        assert_eq!(bg.pixel(1), (0b10, 0b10));
        assert_eq!(bg.pixel(2).0, 0);
    }
}
