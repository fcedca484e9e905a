/*!
core::Cpu - The cycle-stepped 6502 core.

Scheduler
=========
The CPU owns a FIFO of `Step`s. Each `clock` call pops steps until one that costs a
cycle has run:

1. If the step is not free, flush any pending trace record.
2. If the step carries the increment flag, advance PC.
3. Perform its micro-ops in order.
4. Stop after a non-free step; chain into the next step after a free one.

Decoding happens inside `FetchOpcode`: the opcode is read, interrupts are polled, and
either the interrupt sequence or the instruction's own sequence is appended. The
queue therefore never drains while the CPU is running. An empty queue is a bug in
a sequence definition, not a runtime condition.

Delayed execution
=================
Instructions whose effect lands in registers (loads, ALU ops, flag ops, transfers)
end with `[.., FetchOpcode, Execute(op) free]`. The register update runs at the start
of the next clock, before the following instruction's second cycle. This is the
observable timing of the real chip, and it is why CLI, SEI and PLP take effect one
instruction late with respect to IRQ polling. RTI restores P before its fetch.

Interrupts
==========
`set_nmi` latches an edge; `set_irq_line` sets a level. Both are sampled only by
`FetchOpcode`. A taken interrupt discards the fetched opcode and schedules the
7-cycle push/vector sequence, ending in a fetch at the handler address.
*/

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::cpu::CpuBus;
use crate::cpu::execute;
use crate::cpu::state::{Latches, Registers, Status};
use crate::cpu::step::{FETCH, FETCH_AT_PC, Index, MicroOp, Step};
use crate::cpu::table;
use crate::cpu::trace::TraceRecord;
use crate::error::CpuError;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Fetch-time snapshot waiting for the registers to settle.
#[derive(Debug, Clone, Copy)]
struct PendingTrace {
    pc: u16,
    opcode: u8,
    cycle: u64,
}

#[derive(Debug, Clone)]
pub struct Cpu {
    pub(super) regs: Registers,
    pub(super) latches: Latches,
    pub(super) queue: VecDeque<Step>,
    opcode: u8,
    nmi_pending: bool,
    irq_line: bool,
    cycles: u64,
    halted: Option<CpuError>,
    tracing: bool,
    pending_trace: Option<PendingTrace>,
    trace_log: Vec<TraceRecord>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU with power-on registers and an empty queue. Call `init` before clocking.
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            latches: Latches::default(),
            queue: VecDeque::with_capacity(16),
            opcode: 0,
            nmi_pending: false,
            irq_line: false,
            cycles: 0,
            halted: None,
            tracing: false,
            pending_trace: None,
            trace_log: Vec::new(),
        }
    }

    /// Queue the power-on sequence: six idle cycles, the reset vector read, and the
    /// first opcode fetch (nine cycles in all).
    pub fn init(&mut self) {
        self.init_with_entry(None);
    }

    /// As `init`, but start executing at `entry` instead of the reset vector target.
    /// The vector is still read, so the bus sees the same accesses.
    pub fn init_with_entry(&mut self, entry: Option<u16>) {
        self.regs = Registers::default();
        self.latches = Latches::default();
        self.queue.clear();
        self.nmi_pending = false;
        self.halted = None;
        self.pending_trace = None;
        self.cycles = 0;

        for _ in 0..6 {
            self.queue.push_back(Step::cycle(MicroOp::Idle));
        }
        self.queue.push_back(Step::cycle(MicroOp::ReadVectorLo(RESET_VECTOR)));
        let mut jump = Step::pair(MicroOp::ReadVectorHi(RESET_VECTOR), MicroOp::JumpToEffective);
        if let Some(pc) = entry {
            jump = jump.then(MicroOp::SetPc(pc));
        }
        self.queue.push_back(jump);
        self.queue.push_back(FETCH_AT_PC);
        debug!(entry = ?entry.map(|pc| format!("${pc:04X}")), "CPU power-on sequence queued");
    }

    /// Advance exactly one CPU cycle.
    pub fn clock<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        if let Some(err) = self.halted {
            return Err(err);
        }
        loop {
            let Some(step) = self.queue.pop_front() else {
                unreachable!("CPU micro-op queue drained; every sequence must end in a fetch");
            };
            if !step.free {
                self.flush_trace();
            }
            if step.increment_pc {
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            for &op in step.actions() {
                self.perform(op, bus)?;
            }
            if !step.free {
                break;
            }
        }
        self.cycles += 1;
        Ok(())
    }

    /// Latch a non-maskable interrupt edge. Serviced at the next opcode fetch.
    pub fn set_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Drive the (level-sensitive) IRQ line.
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Decode `opcode` and append its micro-op sequence.
    pub fn execute_instruction(&mut self, opcode: u8) -> Result<(), CpuError> {
        let Some(instruction) = table::decode(opcode) else {
            let err = CpuError::UnimplementedOpcode {
                opcode,
                address: self.regs.pc,
            };
            debug!(%err, "CPU halted");
            self.halted = Some(err);
            return Err(err);
        };
        self.schedule(instruction);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    #[inline]
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[inline]
    pub(crate) fn latches(&self) -> &Latches {
        &self.latches
    }

    /// Cycles executed since `init`.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Last opcode decoded as an instruction.
    #[inline]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    #[inline]
    pub fn halted(&self) -> Option<CpuError> {
        self.halted
    }

    /// Steps currently queued.
    #[inline]
    pub(crate) fn queued_steps(&self) -> usize {
        self.queue.len()
    }

    pub fn set_tracing(&mut self, enabled: bool) {
        self.tracing = enabled;
        if !enabled {
            self.pending_trace = None;
        }
    }

    /// Drain the collected trace records.
    pub fn take_trace(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.trace_log)
    }

    fn flush_trace(&mut self) {
        let Some(pending) = self.pending_trace.take() else {
            return;
        };
        let record = TraceRecord {
            pc: pending.pc,
            opcode: pending.opcode,
            a: self.regs.a,
            x: self.regs.x,
            y: self.regs.y,
            p: self.regs.p.bits(),
            s: self.regs.s,
            cycle: pending.cycle,
        };
        trace!(target: "cyclenes::cpu", "{record}");
        self.trace_log.push(record);
    }

    // ---------------------------------------------------------------------
    // Micro-op interpreter
    // ---------------------------------------------------------------------

    #[inline]
    fn index(&self, index: Index) -> u8 {
        match index {
            Index::X => self.regs.x,
            Index::Y => self.regs.y,
        }
    }

    #[inline]
    fn stack_address(&self) -> u16 {
        0x0100 | u16::from(self.regs.s)
    }

    fn push<B: CpuBus>(&mut self, bus: &mut B, value: u8) {
        bus.write(self.stack_address(), value);
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    fn pull<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        bus.read(self.stack_address())
    }

    /// Correct high byte of `address + index` and whether it differs from the guess.
    fn fix_high(&mut self, index: Index) -> bool {
        let correct = self.latches.address().wrapping_add(u16::from(self.index(index)));
        let correct_hi = (correct >> 8) as u8;
        let crossed = correct_hi != self.latches.effective_address_hi;
        self.latches.effective_address_hi = correct_hi;
        crossed
    }

    fn fetch_opcode<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let address = self.regs.pc;
        let opcode = bus.read(address);

        if self.nmi_pending {
            self.nmi_pending = false;
            trace!(pc = format_args!("${address:04X}"), "NMI taken");
            self.schedule_interrupt(NMI_VECTOR);
            return Ok(());
        }
        if self.irq_line && !self.regs.p.contains(Status::IRQ_DISABLE) {
            trace!(pc = format_args!("${address:04X}"), "IRQ taken");
            self.schedule_interrupt(IRQ_VECTOR);
            return Ok(());
        }

        self.opcode = opcode;
        if self.tracing {
            self.pending_trace = Some(PendingTrace {
                pc: address,
                opcode,
                cycle: self.cycles,
            });
        }
        self.execute_instruction(opcode)
    }

    fn perform<B: CpuBus>(&mut self, op: MicroOp, bus: &mut B) -> Result<(), CpuError> {
        let pc = self.regs.pc;
        match op {
            MicroOp::Idle => {}

            MicroOp::FetchOpcode => return self.fetch_opcode(bus),
            MicroOp::ReadImmediate => self.latches.data = bus.read(pc),
            MicroOp::ReadAddressLo => {
                let lo = bus.read(pc);
                self.latches.address_lo = lo;
                self.latches.address_hi = 0;
                self.latches.set_effective_address(u16::from(lo));
            }
            MicroOp::ReadAddressHi => {
                self.latches.address_hi = bus.read(pc);
                self.latches.set_effective_address(self.latches.address());
            }
            MicroOp::DummyReadPc => {
                bus.read(pc);
            }
            MicroOp::DummyReadNext => {
                bus.read(pc.wrapping_add(1));
            }

            MicroOp::IndexZeroPage(index) => {
                bus.read(u16::from(self.latches.address_lo));
                let lo = self.latches.address_lo.wrapping_add(self.index(index));
                self.latches.set_effective_address(u16::from(lo));
            }
            MicroOp::IndexAbsolute(index) => {
                self.latches.effective_address_lo =
                    self.latches.address_lo.wrapping_add(self.index(index));
                self.latches.effective_address_hi = self.latches.address_hi;
            }
            MicroOp::IndexPointer => {
                bus.read(u16::from(self.latches.address_lo));
                self.latches.address_lo = self.latches.address_lo.wrapping_add(self.regs.x);
            }
            MicroOp::ReadPointerLo => {
                self.latches.effective_address_lo = bus.read(u16::from(self.latches.address_lo));
            }
            MicroOp::ReadPointerHi => {
                let ptr = self.latches.address_lo.wrapping_add(1);
                self.latches.effective_address_hi = bus.read(u16::from(ptr));
            }
            MicroOp::IndexIndirectY => {
                self.latches.address_lo = self.latches.effective_address_lo;
                self.latches.address_hi = self.latches.effective_address_hi;
                self.latches.effective_address_lo =
                    self.latches.effective_address_lo.wrapping_add(self.regs.y);
            }
            MicroOp::ReadSpeculative(index) => {
                self.latches.data = bus.read(self.latches.effective_address());
                if !self.fix_high(index) {
                    // Page was right: the retry read is not needed.
                    self.queue.pop_front();
                }
            }
            MicroOp::DummyReadFixHigh(index) => {
                bus.read(self.latches.effective_address());
                self.fix_high(index);
            }
            MicroOp::ReadIndirectLo => {
                self.latches.effective_address_lo = bus.read(self.latches.address());
            }
            MicroOp::ReadIndirectHi => {
                // The pointer's low byte wraps within its page.
                let addr = u16::from_le_bytes([
                    self.latches.address_lo.wrapping_add(1),
                    self.latches.address_hi,
                ]);
                self.latches.effective_address_hi = bus.read(addr);
            }

            MicroOp::ReadEffective => {
                self.latches.data = bus.read(self.latches.effective_address());
            }
            MicroOp::Store(m) => {
                let high_plus_one = self.latches.address_hi.wrapping_add(1);
                let value = execute::store_value(m, &mut self.regs, high_plus_one);
                if execute::corrupts_address_on_page_cross(m)
                    && self.latches.effective_address_hi != self.latches.address_hi
                {
                    self.latches.effective_address_hi = value;
                }
                bus.write(self.latches.effective_address(), value);
            }
            MicroOp::DummyWrite => {
                bus.write(self.latches.effective_address(), self.latches.data);
            }
            MicroOp::Modify(m) => {
                let value = execute::modify(m, &mut self.regs, self.latches.data);
                self.latches.data = value;
                bus.write(self.latches.effective_address(), value);
            }

            MicroOp::Execute(m) => {
                if m.access() == table::Access::Read {
                    execute::read(m, &mut self.regs, self.latches.data);
                } else {
                    execute::implied(m, &mut self.regs);
                }
            }
            MicroOp::ExecuteAccumulator(m) => execute::accumulator(m, &mut self.regs),

            MicroOp::JumpToAddress => self.regs.pc = self.latches.address(),
            MicroOp::JumpToEffective => self.regs.pc = self.latches.effective_address(),
            MicroOp::SetPc(target) => self.regs.pc = target,
            MicroOp::BranchCheck(m) => {
                if !execute::branch_taken(m, self.regs.p) {
                    self.queue.drain(..3);
                    self.queue.push_back(FETCH);
                }
            }
            MicroOp::BranchOffset => {
                let next = pc.wrapping_add(1);
                bus.read(next);
                let offset = self.latches.data as i8;
                let target = next.wrapping_add_signed(i16::from(offset));
                self.latches.set_effective_address(target);
                if target & 0xFF00 == next & 0xFF00 {
                    // Keep the same-page completion, drop the page-cross one.
                    self.queue.remove(1);
                } else {
                    self.queue.pop_front();
                }
            }
            MicroOp::BranchSamePage => {
                self.regs.pc = self.latches.effective_address();
                self.queue.push_back(FETCH_AT_PC);
            }
            MicroOp::BranchCrossPage => {
                let next = pc.wrapping_add(1);
                bus.read((next & 0xFF00) | u16::from(self.latches.effective_address_lo));
                self.regs.pc = self.latches.effective_address();
                self.queue.push_back(FETCH_AT_PC);
            }

            MicroOp::DummyReadStack => {
                bus.read(self.stack_address());
            }
            MicroOp::IncrementS => self.regs.s = self.regs.s.wrapping_add(1),
            MicroOp::PushPch => self.push(bus, (pc >> 8) as u8),
            MicroOp::PushPcl => self.push(bus, pc as u8),
            MicroOp::PushA => self.push(bus, self.regs.a),
            MicroOp::PushStatus { software } => {
                let value = if software {
                    self.regs.p.pushed_by_software()
                } else {
                    self.regs.p.pushed_by_interrupt()
                };
                self.push(bus, value);
            }
            MicroOp::PullA => {
                let value = self.pull(bus);
                self.regs.a = value;
                self.regs.p.set_zn(value);
            }
            MicroOp::PullStatus => {
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
            }
            MicroOp::PullData => self.latches.data = self.pull(bus),
            MicroOp::RestoreStatus => self.regs.p = Status::from_stack(self.latches.data),
            MicroOp::PullPcl => {
                let lo = self.pull(bus);
                self.regs.pc = (pc & 0xFF00) | u16::from(lo);
            }
            MicroOp::PullPch => {
                let hi = self.pull(bus);
                self.regs.pc = (pc & 0x00FF) | (u16::from(hi) << 8);
            }

            MicroOp::ReadVectorLo(vector) => {
                self.latches.effective_address_lo = bus.read(vector);
            }
            MicroOp::ReadVectorHi(vector) => {
                self.latches.effective_address_hi = bus.read(vector.wrapping_add(1));
                self.regs.p.insert(Status::IRQ_DISABLE);
            }
        }
        Ok(())
    }
}
