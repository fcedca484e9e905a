/*!
DmaController: cycle-accurate OAM DMA state machine.

Purpose
- Encapsulate the OAM DMA lifecycle and per-cycle micro-steps.
- Read from CPU memory and write to PPU OAM through two minimal traits. Both are
  implemented by `Bus`, so one `&mut` borrow of the bus serves the whole transfer.

Behavioral model
- Armed by a CPU write to $4014 (`start`). The orchestrator then calls `step` on every
  CPU-cycle slot instead of clocking the CPU, until `is_processing()` turns false.
- The first slots only wait for synchronization: the transfer proper begins on an even
  global CPU cycle, so one slot is spent when armed on an even cycle and two when armed
  on an odd one (513 or 514 stolen cycles in total).
- Then 256 pairs: on an even cycle read `(source_page << 8) | current_byte`, on the
  following odd cycle write the latched byte to OAMDATA ($2004) and advance.
- Byte `i` therefore lands at `OAM[(OAMADDR + i) & 0xFF]`, not at `OAM[i]`: the two only
  agree when OAMADDR is 0, and a non-zero OAMADDR wraps the page around OAM.
- Reads from CPU address space carry the same side-effects as CPU reads.
*/

use tracing::debug;

/// CPU-memory interface used by DMA to fetch source bytes.
/// Must behave exactly like CPU-visible reads (including any side-effects).
pub trait CpuMemory {
    fn cpu_read(&mut self, addr: u16) -> u8;
}

/// OAM write interface used by DMA.
/// Equivalent to writing $2004 (OAMDATA), which increments OAMADDR internally.
pub trait OamWriter {
    fn write_oam_data(&mut self, value: u8);
}

#[derive(Debug, Default)]
pub struct DmaController {
    processing: bool,
    synchronized: bool,
    current_byte: u8,
    source_page: u8,
    read_byte: u8,
}

impl DmaController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a transfer from `$XX00-$XXFF`.
    pub fn start(&mut self, source_page: u8) {
        debug!(source_page = format_args!("${source_page:02X}"), "OAM DMA armed");
        *self = Self {
            processing: true,
            source_page,
            ..Self::default()
        };
    }

    /// True while the transfer owns the CPU's cycles.
    #[inline]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Perform one stolen CPU cycle. `odd_cycle` is the parity of the global CPU cycle
    /// counter for this slot.
    pub fn step<B: CpuMemory + OamWriter>(&mut self, odd_cycle: bool, bus: &mut B) {
        if !self.processing {
            return;
        }

        if !self.synchronized {
            // Wait for an odd slot; the first read then lands on an even one.
            if odd_cycle {
                self.synchronized = true;
            }
            return;
        }

        if !odd_cycle {
            let addr = (u16::from(self.source_page) << 8) | u16::from(self.current_byte);
            self.read_byte = bus.cpu_read(addr);
        } else {
            bus.write_oam_data(self.read_byte);
            self.current_byte = self.current_byte.wrapping_add(1);
            if self.current_byte == 0 {
                self.processing = false;
                self.synchronized = false;
            }
        }
    }
}
