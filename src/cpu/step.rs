/*!
step.rs - The micro-operation vocabulary of the CPU scheduler.

A `Step` is one entry of the scheduler queue: at most three `MicroOp` actions run
in order, optionally after advancing PC. A step normally costs one clock cycle.
A `free` step costs nothing, and the scheduler runs the next step in the same call.

`MicroOp` is a closed set. Every action reads from and writes to the register file,
the latches, the bus, or (for branch and page-cross handling) the queue itself.
*/

use crate::cpu::table::Mnemonic;

/// Index register used by an indexed addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicroOp {
    /// Internal cycle with no bus activity of interest.
    #[default]
    Idle,

    // --- instruction stream ---
    /// Read the opcode at PC, poll interrupts, decode and enqueue.
    FetchOpcode,
    /// data <- [PC]
    ReadImmediate,
    /// address_lo <- [PC]; effective <- zero-page address
    ReadAddressLo,
    /// address_hi <- [PC]; effective <- address
    ReadAddressHi,
    /// Throw-away read at PC.
    DummyReadPc,
    /// Throw-away read of the byte after PC.
    DummyReadNext,

    // --- address formation ---
    /// Dummy read of the unindexed zero-page address, then add the index (page wraps).
    IndexZeroPage(Index),
    /// effective_lo <- address_lo + index (carry not yet applied).
    IndexAbsolute(Index),
    /// Dummy read of the pointer, then add X to it (page wraps).
    IndexPointer,
    /// effective_lo <- [pointer]
    ReadPointerLo,
    /// effective_hi <- [(pointer + 1) & 0xFF]
    ReadPointerHi,
    /// address <- effective (the base); effective_lo += Y (carry not yet applied).
    IndexIndirectY,
    /// Read assuming no page crossing. When the page is right, drop the retry step;
    /// otherwise fix the high byte and leave the retry queued.
    ReadSpeculative(Index),
    /// Dummy read at the unfixed address, then fix the high byte (stores and RMW).
    DummyReadFixHigh(Index),
    /// JMP (ind): effective_lo <- [address]
    ReadIndirectLo,
    /// JMP (ind): effective_hi <- [address_hi : address_lo + 1] (no carry into the page).
    ReadIndirectHi,

    // --- memory operations ---
    /// data <- [effective]
    ReadEffective,
    /// [effective] <- value produced by the operation
    Store(Mnemonic),
    /// [effective] <- data (read-modify-write writes the unmodified value first)
    DummyWrite,
    /// data <- op(data); [effective] <- data
    Modify(Mnemonic),

    // --- register-side operations ---
    /// Apply a read or implied operation to the registers.
    Execute(Mnemonic),
    /// Apply a shift/rotate to A.
    ExecuteAccumulator(Mnemonic),

    // --- control flow ---
    /// PC <- address
    JumpToAddress,
    /// PC <- effective
    JumpToEffective,
    /// PC <- fixed value (power-on entry point override).
    SetPc(u16),
    /// Branch condition: when not taken drop the three remaining branch steps and
    /// enqueue the next fetch.
    BranchCheck(Mnemonic),
    /// Dummy read, compute the target; keep exactly one of the two completion steps.
    BranchOffset,
    /// Taken, same page: PC <- target and fetch there.
    BranchSamePage,
    /// Taken, page crossed: dummy read at the unfixed target, PC <- target, fetch there.
    BranchCrossPage,

    // --- stack ---
    DummyReadStack,
    IncrementS,
    PushPch,
    PushPcl,
    PushA,
    /// Push P; `software` selects the BRK/PHP form (B set) over the interrupt form.
    PushStatus { software: bool },
    PullA,
    /// RTI: P <- [stack], effective immediately.
    PullStatus,
    /// PLP: data <- [stack]; P is restored by `RestoreStatus` after the next fetch.
    PullData,
    RestoreStatus,
    PullPcl,
    PullPch,

    // --- vectors ---
    /// effective_lo <- [vector]
    ReadVectorLo(u16),
    /// effective_hi <- [vector + 1]; set I
    ReadVectorHi(u16),
}

const MAX_ACTIONS: usize = 3;

/// One queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub increment_pc: bool,
    pub free: bool,
    actions: [MicroOp; MAX_ACTIONS],
    len: u8,
}

impl Step {
    /// A one-cycle step performing `op`.
    pub const fn cycle(op: MicroOp) -> Self {
        Self {
            increment_pc: false,
            free: false,
            actions: [op, MicroOp::Idle, MicroOp::Idle],
            len: 1,
        }
    }

    /// A one-cycle step performing `first` then `second`.
    pub const fn pair(first: MicroOp, second: MicroOp) -> Self {
        Self {
            increment_pc: false,
            free: false,
            actions: [first, second, MicroOp::Idle],
            len: 2,
        }
    }

    /// Append a further action.
    pub const fn then(mut self, op: MicroOp) -> Self {
        assert!((self.len as usize) < MAX_ACTIONS, "step action capacity exceeded");
        self.actions[self.len as usize] = op;
        self.len += 1;
        self
    }

    /// Advance PC before the actions run.
    pub const fn inc(mut self) -> Self {
        self.increment_pc = true;
        self
    }

    /// Do not consume a cycle; chain into the next step.
    pub const fn free(mut self) -> Self {
        self.free = true;
        self
    }

    #[inline]
    pub fn actions(&self) -> &[MicroOp] {
        &self.actions[..self.len as usize]
    }
}

/// Fetch of the next sequential opcode.
pub const FETCH: Step = Step::cycle(MicroOp::FetchOpcode).inc();
/// Fetch at PC as left by a control transfer.
pub const FETCH_AT_PC: Step = Step::cycle(MicroOp::FetchOpcode);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose_flags_and_actions() {
        let s = Step::pair(MicroOp::ReadAddressHi, MicroOp::JumpToAddress).inc();
        assert!(s.increment_pc);
        assert!(!s.free);
        assert_eq!(s.actions(), &[MicroOp::ReadAddressHi, MicroOp::JumpToAddress]);

        let s = s.then(MicroOp::SetPc(0xC000)).free();
        assert!(s.free);
        assert_eq!(s.actions().len(), 3);
    }

    #[test]
    fn sequential_and_transfer_fetches_differ_only_in_increment() {
        assert!(FETCH.increment_pc);
        assert!(!FETCH_AT_PC.increment_pc);
        assert_eq!(FETCH.actions(), FETCH_AT_PC.actions());
    }
}
