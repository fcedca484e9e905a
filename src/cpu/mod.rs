/*!
cpu::mod - Public façade for the 6502 CPU core.

The core is cycle-stepped: every `Cpu::clock` call performs exactly one bus cycle.
Instructions are queues of micro-operations rather than functions, so dummy reads,
dummy writes and page-crossing penalties appear on the bus at the cycle the real
chip produces them.

Submodules
- state: registers, status flags, operand latches
- step: micro-op vocabulary and queue entries
- table: 256-entry opcode decode
- addressing: per addressing mode sequence generators
- execute: instruction semantics (ALU, flags, stores)
- core: scheduler loop, interrupts, tracing
- trace: trace records (nestest layout)

Usage:
```rust,ignore
use cyclenes::cpu::Cpu;

let mut cpu = Cpu::new();
cpu.init();
cpu.clock(&mut bus)?;
```
*/

pub mod addressing;
pub mod core;
pub mod execute;
pub mod state;
pub mod step;
pub mod table;
pub mod trace;


pub use self::core::{Cpu, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
pub use self::state::{Latches, Registers, Status};
pub use self::trace::TraceRecord;

/// The CPU's view of the system bus. Every call is one bus cycle's access and may
/// have side effects (PPU registers, controller shift registers).
pub trait CpuBus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
}
