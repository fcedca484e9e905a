#![doc = r#"
PPU registers module

Purpose
- CPU-visible register semantics for $2000-$2007: bit layouts, the loopy `v`/`t`
  scroll registers, the shared write toggle, the PPUDATA read buffer and the I/O latch.

Notes
- The bus mirrors $2000-$3FFF onto the 8-register window before calling in here;
  `cpu_read`/`cpu_write` take the register index (0..=7).
- PPUDATA ($2007) reads are buffered below $3F00. Palette reads return immediately
  and refill the buffer from the nametable underneath ($2F00-$2FFF).
- Every access drives the I/O latch; reads of write-only registers return it, and
  $2002's low five bits come from it.
"#]

use bitflags::bitflags;

use super::Ppu;
use crate::ppu_bus::PpuBus;

bitflags! {
    /// $2000 PPUCTRL
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Control: u8 {
        const NAMETABLE_X      = 0b0000_0001;
        const NAMETABLE_Y      = 0b0000_0010;
        const INCREMENT_32     = 0b0000_0100;
        const SPRITE_TABLE     = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16   = 0b0010_0000;
        const MASTER_SLAVE     = 0b0100_0000;
        const NMI_ENABLE       = 0b1000_0000;
    }
}

bitflags! {
    /// $2001 PPUMASK
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mask: u8 {
        const GRAYSCALE            = 0b0000_0001;
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        const SHOW_SPRITES_LEFT    = 0b0000_0100;
        const SHOW_BACKGROUND      = 0b0000_1000;
        const SHOW_SPRITES         = 0b0001_0000;
        const EMPHASIZE_RED        = 0b0010_0000;
        const EMPHASIZE_GREEN      = 0b0100_0000;
        const EMPHASIZE_BLUE       = 0b1000_0000;
    }
}

bitflags! {
    /// $2002 PPUSTATUS (upper three bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK          = 0b1000_0000;
    }
}

impl Control {
    #[inline]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) { 32 } else { 1 }
    }

    #[inline]
    pub fn sprite_height(self) -> i16 {
        if self.contains(Control::SPRITE_SIZE_16) { 16 } else { 8 }
    }
}

impl Mask {
    #[inline]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }
}

/// 15-bit VRAM address in loopy layout: `yyy NN YYYYY XXXXX`
/// (fine Y, nametable select, coarse Y, coarse X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VramAddress(pub u16);

impl VramAddress {
    #[inline]
    pub fn coarse_x(self) -> u16 {
        self.0 & 0x001F
    }

    #[inline]
    pub fn coarse_y(self) -> u16 {
        (self.0 >> 5) & 0x001F
    }

    #[inline]
    pub fn nametable_x(self) -> u16 {
        (self.0 >> 10) & 1
    }

    #[inline]
    pub fn nametable_y(self) -> u16 {
        (self.0 >> 11) & 1
    }

    #[inline]
    pub fn fine_y(self) -> u16 {
        (self.0 >> 12) & 0x0007
    }

    #[inline]
    pub fn set_coarse_x(&mut self, value: u16) {
        self.0 = (self.0 & !0x001F) | (value & 0x001F);
    }

    #[inline]
    pub fn set_coarse_y(&mut self, value: u16) {
        self.0 = (self.0 & !0x03E0) | ((value & 0x001F) << 5);
    }

    #[inline]
    pub fn set_nametable_x(&mut self, value: u16) {
        self.0 = (self.0 & !0x0400) | ((value & 1) << 10);
    }

    #[inline]
    pub fn set_nametable_y(&mut self, value: u16) {
        self.0 = (self.0 & !0x0800) | ((value & 1) << 11);
    }

    #[inline]
    pub fn set_fine_y(&mut self, value: u16) {
        self.0 = (self.0 & !0x7000) | ((value & 0x0007) << 12);
    }
}

impl Ppu {
    /// CPU read of register `reg` (0..=7), with side effects.
    pub fn cpu_read<B: PpuBus>(&mut self, reg: u16, bus: &mut B) -> u8 {
        let value = match reg & 7 {
            2 => {
                let result = (self.status.bits() & 0xE0) | (self.io_latch & 0x1F);
                self.status.remove(Status::VBLANK);
                self.write_toggle = false;
                result
            }
            4 => self.read_oam_data(),
            7 => self.read_data(bus),
            // Write-only registers float on the I/O latch.
            _ => self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// CPU write of register `reg` (0..=7).
    pub fn cpu_write<B: PpuBus>(&mut self, reg: u16, value: u8, bus: &mut B) {
        self.io_latch = value;
        match reg & 7 {
            0 => {
                let was_enabled = self.ctrl.contains(Control::NMI_ENABLE);
                self.ctrl = Control::from_bits_retain(value);
                self.t.set_nametable_x(u16::from(value));
                self.t.set_nametable_y(u16::from(value >> 1));
                if !was_enabled
                    && self.ctrl.contains(Control::NMI_ENABLE)
                    && self.status.contains(Status::VBLANK)
                {
                    self.nmi_requested = true;
                }
            }
            1 => self.mask = Mask::from_bits_retain(value),
            2 => {}
            3 => self.oam_addr = value,
            4 => self.write_oam_data(value),
            5 => {
                if !self.write_toggle {
                    self.fine_x = value & 0x07;
                    self.t.set_coarse_x(u16::from(value >> 3));
                } else {
                    self.t.set_fine_y(u16::from(value & 0x07));
                    self.t.set_coarse_y(u16::from(value >> 3));
                }
                self.write_toggle = !self.write_toggle;
            }
            6 => {
                if !self.write_toggle {
                    self.t.0 = (self.t.0 & 0x00FF) | (u16::from(value & 0x3F) << 8);
                } else {
                    self.t.0 = (self.t.0 & 0xFF00) | u16::from(value);
                    self.v = self.t;
                }
                self.write_toggle = !self.write_toggle;
            }
            _ => {
                bus.ppu_write(self.v.0 & 0x3FFF, value);
                self.increment_vram_address();
            }
        }
    }

    fn read_data<B: PpuBus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.v.0 & 0x3FFF;
        let value = if addr >= 0x3F00 {
            // Palette bytes are 6 bits; the top two come from the latch.
            self.read_buffer = bus.ppu_read(addr - 0x1000);
            (bus.ppu_read(addr) & 0x3F) | (self.io_latch & 0xC0)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = bus.ppu_read(addr);
            buffered
        };
        self.increment_vram_address();
        value
    }

    #[inline]
    fn increment_vram_address(&mut self) {
        self.v.0 = self.v.0.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
    }
}
