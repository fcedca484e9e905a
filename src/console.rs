/*!
console - the clock orchestrator.

Purpose
- Own the CPU, the bus (PPU, RAM, controllers, cartridge) and the OAM DMA controller,
  and advance them with the NTSC ratio: one PPU dot per `tick`, one CPU-cycle slot
  every third tick.

Order of operations per tick
1. Clock the PPU one dot.
2. On every third tick, use the CPU-cycle slot:
   - while DMA is processing, the slot goes to one DMA micro-step and the CPU does not
     clock at all;
   - otherwise clock the CPU one cycle; a $4014 write during that cycle arms DMA for
     the following slots.
   The global CPU-cycle counter advances for both kinds of slot.
3. Forward a pending PPU NMI request to the CPU.

DMA
- Parity comes from the global CPU-cycle counter: reads on even slots, writes on odd
  slots, so a transfer steals 513 cycles when armed on an even cycle and 514 on an odd
  one.
- Bytes are written through the OAMDATA path and land at OAMADDR onwards.
*/

use tracing::debug;

use crate::bus::{Bus, DmaController};
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::cpu::{Cpu, TraceRecord};
use crate::error::EmuError;

/// PPU dots per CPU cycle.
pub const PPU_DOTS_PER_CPU_CYCLE: u64 = 3;

/// Library-level settings for a `Console`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleConfig {
    /// Start execution here instead of at the reset vector target.
    pub entry_point: Option<u16>,
    /// Record a `TraceRecord` at every instruction boundary.
    pub trace: bool,
}

pub struct Console {
    cpu: Cpu,
    bus: Bus,
    dma: DmaController,
    ticks: u64,
    cpu_cycles: u64,
}

impl Console {
    pub fn new(cartridge: Cartridge) -> Self {
        Self::with_config(cartridge, ConsoleConfig::default())
    }

    pub fn with_config(cartridge: Cartridge, config: ConsoleConfig) -> Self {
        let mut bus = Bus::new();
        bus.attach_cartridge(cartridge);
        let mut cpu = Cpu::new();
        cpu.set_tracing(config.trace);
        cpu.init_with_entry(config.entry_point);
        debug!(?config, "console powered on");
        Self {
            cpu,
            bus,
            dma: DmaController::new(),
            ticks: 0,
            cpu_cycles: 0,
        }
    }

    /// Advance one PPU dot. Returns `true` when this dot completed a frame.
    pub fn tick(&mut self) -> Result<bool, EmuError> {
        let frame_done = self.bus.clock_ppu();

        if self.ticks % PPU_DOTS_PER_CPU_CYCLE == 0 {
            if self.dma.is_processing() {
                self.dma.step(self.cpu_cycles & 1 == 1, &mut self.bus);
            } else {
                self.cpu.clock(&mut self.bus)?;
                if let Some(page) = self.bus.take_dma_request() {
                    self.dma.start(page);
                }
            }
            self.cpu_cycles += 1;
        }
        self.ticks += 1;

        if self.bus.ppu.take_nmi_request() {
            self.cpu.set_nmi();
        }
        Ok(frame_done)
    }

    /// Tick until the PPU completes a frame.
    pub fn run_frame(&mut self) -> Result<(), EmuError> {
        while !self.tick()? {}
        Ok(())
    }

    /// Last completed frame as palette indices (`ppu::WIDTH * ppu::HEIGHT`).
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu.frame()
    }

    pub fn take_trace(&mut self) -> Vec<TraceRecord> {
        self.cpu.take_trace()
    }

    /// Drive the shared IRQ line (level-sensitive).
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.cpu.set_irq_line(asserted);
    }

    pub fn controller_mut(&mut self, port: usize) -> &mut Controller {
        self.bus.controller_mut(port)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// PPU dots since power-on.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// CPU-cycle slots since power-on, including cycles stolen by DMA.
    #[inline]
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    #[inline]
    pub fn dma_active(&self) -> bool {
        self.dma.is_processing()
    }
}
