#![doc = r#"
Bus module: the CPU address map and the storage behind the PPU's address space.

Address map (CPU)
- $0000-$1FFF: 2 KiB internal RAM, mirrored every $0800
- $2000-$3FFF: PPU registers, mirrored every 8 bytes
- $4014: OAM DMA trigger (the console runs the transfer)
- $4016: controller strobe (write) / port 1 serial read
- $4017: port 2 serial read
- $4000-$4013, $4015: audio registers, not modeled (read 0, writes dropped)
- $4018-$FFFF: cartridge (`Mapper::cpu_read` / `cpu_write`); unclaimed reads give 0

Modules and responsibilities
- ram: `Ram`, internal work RAM with mirroring.
- ppu_space: `PpuAddressSpace`, nametable VRAM + palette RAM and their mirroring rules.
- interfaces: `PpuBusView`, the split borrow that lets the PPU run against cartridge CHR
  and `PpuAddressSpace` while the `Ppu` itself is borrowed mutably.
- dma: `DmaController` and the two traits it drives (`CpuMemory`, `OamWriter`), both
  implemented by `Bus`.
"#]

pub mod dma;
pub mod interfaces;
pub mod ppu_space;
pub mod ram;

pub use self::dma::{CpuMemory, DmaController, OamWriter};
pub use self::ppu_space::PpuAddressSpace;
pub use self::ram::Ram;

use tracing::{debug, trace, warn};

use self::interfaces::PpuBusView;
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::cpu::CpuBus;
use crate::mapper::Mapper;
use crate::ppu::Ppu;
use crate::ppu_bus::PpuBus;

/// Upper bits of $4016/$4017 reads come from the last byte on the data bus, which is
/// the high byte of the operand address ($40) for the usual `LDA $4016`.
const CONTROLLER_OPEN_BUS: u8 = 0x40;

pub struct Bus {
    ram: Ram,
    pub ppu: Ppu,
    ppu_space: PpuAddressSpace,
    controllers: [Controller; 2],
    cartridge: Option<Cartridge>,
    dma_request: Option<u8>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(),
            ppu: Ppu::new(),
            ppu_space: PpuAddressSpace::new(),
            controllers: [Controller::new(), Controller::new()],
            cartridge: None,
            dma_request: None,
        }
    }

    pub fn attach_cartridge(&mut self, cartridge: Cartridge) {
        debug!(
            mapper = cartridge.mapper_id(),
            prg_rom = cartridge.prg_rom_len(),
            chr = cartridge.chr_len(),
            chr_ram = cartridge.chr_is_ram(),
            mirroring = ?cartridge.mirroring(),
            "cartridge attached"
        );
        self.cartridge = Some(cartridge);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Advance the PPU one dot against cartridge CHR + internal VRAM.
    /// Returns `true` when a frame completed on this dot.
    #[inline]
    pub fn clock_ppu(&mut self) -> bool {
        let view = PpuBusView::from_parts(&mut self.ppu_space, self.cartridge.as_mut());
        self.ppu.clock(&view)
    }

    /// Page written to $4014 since the last call.
    #[inline]
    pub fn take_dma_request(&mut self) -> Option<u8> {
        self.dma_request.take()
    }

    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        &mut self.controllers[port]
    }

    /// Side-effect free read of the PPU address space (debugging and tests).
    pub fn ppu_peek(&mut self, addr: u16) -> u8 {
        PpuBusView::from_parts(&mut self.ppu_space, self.cartridge.as_mut()).ppu_read(addr)
    }

    pub fn ppu_space(&self) -> &PpuAddressSpace {
        &self.ppu_space
    }

    /// CPU-visible read with all device side effects.
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.read(addr),
            0x2000..=0x3FFF => {
                let mut view =
                    PpuBusView::from_parts(&mut self.ppu_space, self.cartridge.as_mut());
                self.ppu.cpu_read(addr & 0x0007, &mut view)
            }
            0x4016 => self.controllers[0].read() | CONTROLLER_OPEN_BUS,
            0x4017 => self.controllers[1].read() | CONTROLLER_OPEN_BUS,
            0x4000..=0x4015 => 0,
            _ => match self.cartridge.as_mut().and_then(|cart| cart.cpu_read(addr)) {
                Some(value) => value,
                None => {
                    trace!(addr = format_args!("${addr:04X}"), "unmapped CPU read");
                    0
                }
            },
        }
    }

    /// CPU-visible write with all device side effects.
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, value),
            0x2000..=0x3FFF => {
                let mut view =
                    PpuBusView::from_parts(&mut self.ppu_space, self.cartridge.as_mut());
                self.ppu.cpu_write(addr & 0x0007, value, &mut view);
            }
            0x4014 => self.dma_request = Some(value),
            0x4016 => {
                for pad in &mut self.controllers {
                    pad.write_strobe(value);
                }
            }
            0x4000..=0x4017 => {}
            _ => {
                let claimed = self
                    .cartridge
                    .as_mut()
                    .is_some_and(|cart| cart.cpu_write(addr, value));
                if claimed {
                    return;
                }
                if addr >= 0x8000 {
                    warn!(
                        addr = format_args!("${addr:04X}"),
                        value = format_args!("${value:02X}"),
                        "write ignored by ROM"
                    );
                } else {
                    trace!(addr = format_args!("${addr:04X}"), "unmapped CPU write");
                }
            }
        }
    }
}

impl CpuBus for Bus {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        Bus::read(self, addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        Bus::write(self, addr, value);
    }
}

impl CpuMemory for Bus {
    #[inline]
    fn cpu_read(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }
}

impl OamWriter for Bus {
    /// Same path as a CPU write to $2004.
    #[inline]
    fn write_oam_data(&mut self, value: u8) {
        self.ppu.write_oam_data(value);
    }
}
