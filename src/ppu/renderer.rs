#![doc = r#"
PPU renderer module

Responsibilities
- `Ppu::clock`: advance exactly one PPU cycle (dot). Invoked three times per CPU cycle by
  the console.
- Scanline/frame progression over 341 cycles x 262 lines (-1 = pre-render, 0-239
  visible, 240 post-render, 241-260 vblank), including the skipped (0,0) dot on odd
  frames while rendering.
- Status housekeeping: vblank + NMI request at (241,1); vblank, sprite-0 hit and
  overflow cleared at (-1,1).
- Pixel composition for cycles 1-256 of visible lines.

Submodules (structure overview)
- `registers.rs` - CPU-visible register semantics ($2000-$2007)
- `memory.rs` - OAMDATA port and OAM inspection
- `fetch.rs` - background fetch cadence, shift registers, loopy scroll updates
- `oam_eval.rs` - secondary OAM clear and the sprite evaluation machine
- `sprite.rs` - sprite pattern fetch and the scan-line cache
- `renderer.rs` - this module: timing orchestration and composition
"#]

use super::registers::{Control, Mask, Status};
use super::{Ppu, WIDTH};
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// Advance one PPU cycle. Returns `true` on the cycle that completes a frame
    /// (the back buffer has just become the front buffer).
    pub fn clock<B: PpuBus>(&mut self, bus: &B) -> bool {
        let rendering = self.mask.rendering_enabled();

        if self.scanline == 0 && self.cycle == 0 && self.odd_frame && rendering {
            self.cycle = 1;
        }

        if self.scanline == -1 && self.cycle == 1 {
            self.status
                .remove(Status::VBLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW);
            self.eval.found = 0;
            self.eval.sprite_zero_next = false;
        }

        if rendering && self.scanline < 240 {
            self.background_cycle(bus);
            if self.scanline >= 0 {
                self.sprite_eval_cycle();
            }
            self.sprite_fetch_cycle(bus);
        }

        if (0..240).contains(&self.scanline) && (1..=256).contains(&self.cycle) {
            self.render_pixel(bus);
        }

        if self.scanline == 241 && self.cycle == 1 {
            self.status.insert(Status::VBLANK);
            if self.ctrl.contains(Control::NMI_ENABLE) {
                self.nmi_requested = true;
            }
        }

        let frame_done = self.scanline == 260 && self.cycle == 340;
        if frame_done {
            std::mem::swap(&mut self.front, &mut self.back);
        }

        self.cycle += 1;
        if self.cycle > 340 {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline > 260 {
                self.scanline = -1;
                self.odd_frame = !self.odd_frame;
                self.frame_count += 1;
            }
        }
        frame_done
    }

    fn render_pixel<B: PpuBus>(&mut self, bus: &B) {
        let x = (self.cycle - 1) as u8;
        let index = self.scanline as usize * WIDTH + usize::from(x);

        if !self.mask.rendering_enabled() {
            self.back[index] = bus.ppu_read(0x3F00) & 0x3F;
            return;
        }

        let left_edge = x < 8;
        let (bg_pixel, bg_palette) = if self.mask.contains(Mask::SHOW_BACKGROUND)
            && !(left_edge && !self.mask.contains(Mask::SHOW_BACKGROUND_LEFT))
        {
            self.bg.pixel(self.fine_x)
        } else {
            (0, 0)
        };
        let sprite = if self.mask.contains(Mask::SHOW_SPRITES)
            && !(left_edge && !self.mask.contains(Mask::SHOW_SPRITES_LEFT))
        {
            self.sprite_pixel(x)
        } else {
            None
        };

        let (pixel, palette) = match (bg_pixel != 0, sprite) {
            (false, None) => (0, 0),
            (false, Some(s)) => (s.pixel, 4 + s.palette),
            (true, None) => (bg_pixel, bg_palette),
            (true, Some(s)) => {
                // Clipped layers were already made transparent above.
                if s.is_sprite_zero && x != 255 {
                    self.status.insert(Status::SPRITE_ZERO_HIT);
                }
                if s.behind_background {
                    (bg_pixel, bg_palette)
                } else {
                    (s.pixel, 4 + s.palette)
                }
            }
        };

        let addr = if pixel == 0 {
            0x3F00
        } else {
            0x3F00 + u16::from(palette) * 4 + u16::from(pixel)
        };
        let mut color = bus.ppu_read(addr) & 0x3F;
        if self.mask.contains(Mask::GRAYSCALE) {
            color &= 0x30;
        }
        self.back[index] = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::HEIGHT;
    use crate::test_utils::FlatPpuBus;

    /// Clock until a frame completes; returns the number of cycles taken.
    fn run_frame(ppu: &mut Ppu, bus: &FlatPpuBus) -> u32 {
        let mut cycles = 1;
        while !ppu.clock(bus) {
            cycles += 1;
        }
        cycles
    }

    fn run_until(ppu: &mut Ppu, bus: &FlatPpuBus, scanline: i16, cycle: u16) {
        while !(ppu.scanline == scanline && ppu.cycle == cycle) {
            ppu.clock(bus);
        }
    }

    /// Pattern tile 0 fully opaque (pixel value 1) everywhere; nametables all tile 0.
    fn solid_bus() -> FlatPpuBus {
        let mut bus = FlatPpuBus::default();
        for row in 0..8 {
            bus.mem[row] = 0xFF;
        }
        bus.mem[0x3F00] = 0x0F;
        bus.mem[0x3F01] = 0x16;
        bus.mem[0x3F11] = 0x2A;
        bus
    }

    #[test]
    fn frame_is_341_by_262_without_rendering() {
        let mut ppu = Ppu::new();
        let bus = FlatPpuBus::default();
        assert_eq!(run_frame(&mut ppu, &bus), 89_342);
        assert_eq!(run_frame(&mut ppu, &bus), 89_342, "no odd-frame skip while rendering is off");
        assert_eq!(ppu.frame_count(), 2);
    }

    #[test]
    fn odd_frames_are_one_cycle_shorter_while_rendering() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND;
        let bus = FlatPpuBus::default();
        assert_eq!(run_frame(&mut ppu, &bus), 89_342);
        assert_eq!(run_frame(&mut ppu, &bus), 89_341);
        assert_eq!(run_frame(&mut ppu, &bus), 89_342);
    }

    #[test]
    fn vblank_and_nmi_at_241_1_cleared_on_prerender() {
        let mut ppu = Ppu::new();
        ppu.ctrl = Control::NMI_ENABLE;
        let bus = FlatPpuBus::default();
        run_until(&mut ppu, &bus, 241, 1);
        assert!(!ppu.status.contains(Status::VBLANK));
        ppu.clock(&bus);
        assert!(ppu.status.contains(Status::VBLANK));
        assert!(ppu.take_nmi_request());
        assert!(!ppu.take_nmi_request(), "request is consumed");

        run_until(&mut ppu, &bus, -1, 2);
        assert!(!ppu.status.contains(Status::VBLANK));
    }

    #[test]
    fn disabled_rendering_shows_backdrop() {
        let mut ppu = Ppu::new();
        let mut bus = FlatPpuBus::default();
        bus.mem[0x3F00] = 0x21;
        run_frame(&mut ppu, &bus);
        assert_eq!(ppu.frame().len(), WIDTH * HEIGHT);
        assert!(ppu.frame().iter().all(|&c| c == 0x21));
    }

    #[test]
    fn background_left_clip_shows_backdrop_in_first_eight_columns() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND;
        let bus = solid_bus();
        run_frame(&mut ppu, &bus);
        let frame = ppu.frame();
        for y in [0, 100, 239] {
            let row = &frame[y * WIDTH..(y + 1) * WIDTH];
            assert!(row[..8].iter().all(|&c| c == 0x0F), "row {y} clipped");
            assert!(row[8..].iter().all(|&c| c == 0x16), "row {y} background");
        }
    }

    #[test]
    fn grayscale_masks_color_low_bits() {
        let mut ppu = Ppu::new();
        ppu.mask = Mask::SHOW_BACKGROUND | Mask::SHOW_BACKGROUND_LEFT | Mask::GRAYSCALE;
        let bus = solid_bus();
        run_frame(&mut ppu, &bus);
        assert_eq!(ppu.frame()[WIDTH * 50 + 20], 0x16 & 0x30);
    }

    fn sprite_zero_setup(mask: Mask, x: u8) -> (Ppu, FlatPpuBus) {
        let mut ppu = Ppu::new();
        ppu.mask = mask;
        ppu.oam = [0xFF; 256];
        ppu.oam[..4].copy_from_slice(&[30, 0, 0, x]);
        (ppu, solid_bus())
    }

    #[test]
    fn sprite_zero_hit_over_opaque_background() {
        let all = Mask::SHOW_BACKGROUND
            | Mask::SHOW_SPRITES
            | Mask::SHOW_BACKGROUND_LEFT
            | Mask::SHOW_SPRITES_LEFT;
        let (mut ppu, bus) = sprite_zero_setup(all, 0);
        run_until(&mut ppu, &bus, 31, 1);
        assert!(!ppu.status.contains(Status::SPRITE_ZERO_HIT), "sprite starts on line Y+1");
        ppu.clock(&bus);
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
        run_until(&mut ppu, &bus, 32, 0);
        assert_eq!(ppu.back[31 * WIDTH], 0x2A, "sprite drawn over background");
    }

    #[test]
    fn left_edge_clipping_suppresses_sprite_zero_hit() {
        let (mut ppu, bus) = sprite_zero_setup(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES, 0);
        run_until(&mut ppu, &bus, 240, 0);
        assert!(!ppu.status.contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn behind_background_sprite_still_hits() {
        let all = Mask::SHOW_BACKGROUND
            | Mask::SHOW_SPRITES
            | Mask::SHOW_BACKGROUND_LEFT
            | Mask::SHOW_SPRITES_LEFT;
        let (mut ppu, bus) = sprite_zero_setup(all, 40);
        ppu.oam[2] = 0x20;
        run_until(&mut ppu, &bus, 40, 0);
        assert!(ppu.status.contains(Status::SPRITE_ZERO_HIT));
        assert_eq!(ppu.back[35 * WIDTH + 44], 0x16, "background wins the pixel");
    }

    #[test]
    fn prerender_clears_sprite_flags() {
        let mut ppu = Ppu::new();
        ppu.status = Status::SPRITE_OVERFLOW | Status::SPRITE_ZERO_HIT;
        let bus = FlatPpuBus::default();
        ppu.clock(&bus);
        ppu.clock(&bus);
        assert!(ppu.status.is_empty());
    }
}
