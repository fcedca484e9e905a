/*!
addressing.rs - Micro-op sequence generators.

`Cpu::schedule` turns a decoded (`Mnemonic`, `AddressingMode`) pair into queue
entries. The shape of the sequence depends on the addressing mode and on the access
class of the mnemonic:

- Read: the final memory read lands in the data latch, then the opcode fetch of the
  next instruction, then a free `Execute` that applies the operation.
- Write: the final step stores; indexed stores always spend the fix-up cycle.
- Read-modify-write: read, write back the unmodified byte, write the result.

Indexed reads speculate: the read at the uncorrected address is kept when the page
was right and the retry step is dropped, which is how the one-cycle page-crossing
penalty appears.

Cycle 1 of every instruction is the opcode fetch that decoded it, so the sequences
listed here start at cycle 2.
*/

use crate::cpu::core::{Cpu, IRQ_VECTOR};
use crate::cpu::step::{FETCH, FETCH_AT_PC, Index, MicroOp, Step};
use crate::cpu::table::{Access, AddressingMode, Instruction, Mnemonic};

use MicroOp::*;

impl Cpu {
    #[inline]
    fn enqueue(&mut self, step: Step) {
        self.queue.push_back(step);
    }

    fn enqueue_all(&mut self, steps: &[Step]) {
        self.queue.extend(steps.iter().copied());
    }

    /// Append the full sequence for `instruction`.
    pub(super) fn schedule(&mut self, instruction: Instruction) {
        let m = instruction.mnemonic;
        match instruction.mode {
            AddressingMode::Implied => self.schedule_implied(m),
            AddressingMode::Accumulator => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                FETCH,
                Step::cycle(ExecuteAccumulator(m)).free(),
            ]),
            AddressingMode::Immediate => {
                self.enqueue(Step::cycle(ReadImmediate).inc());
                self.finish_read(m);
            }
            AddressingMode::ZeroPage => {
                self.enqueue(Step::cycle(ReadAddressLo).inc());
                self.access(m);
            }
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
                let index = if instruction.mode == AddressingMode::ZeroPageX {
                    Index::X
                } else {
                    Index::Y
                };
                self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::cycle(IndexZeroPage(index)),
                ]);
                self.access(m);
            }
            AddressingMode::Absolute => match m {
                Mnemonic::Jmp => self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::pair(ReadAddressHi, JumpToAddress).inc(),
                    FETCH_AT_PC,
                ]),
                Mnemonic::Jsr => self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::cycle(DummyReadStack),
                    // PC now addresses the high operand byte; that is the return address.
                    Step::cycle(PushPch).inc(),
                    Step::cycle(PushPcl),
                    Step::pair(ReadAddressHi, JumpToAddress),
                    FETCH_AT_PC,
                ]),
                _ => {
                    self.enqueue_all(&[
                        Step::cycle(ReadAddressLo).inc(),
                        Step::cycle(ReadAddressHi).inc(),
                    ]);
                    self.access(m);
                }
            },
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                let index = if instruction.mode == AddressingMode::AbsoluteX {
                    Index::X
                } else {
                    Index::Y
                };
                self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::pair(ReadAddressHi, IndexAbsolute(index)).inc(),
                ]);
                self.indexed_access(m, index);
            }
            AddressingMode::Indirect => self.enqueue_all(&[
                Step::cycle(ReadAddressLo).inc(),
                Step::cycle(ReadAddressHi).inc(),
                Step::cycle(ReadIndirectLo),
                Step::pair(ReadIndirectHi, JumpToEffective),
                FETCH_AT_PC,
            ]),
            AddressingMode::IndirectX => {
                self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::cycle(IndexPointer),
                    Step::cycle(ReadPointerLo),
                    Step::cycle(ReadPointerHi),
                ]);
                self.access(m);
            }
            AddressingMode::IndirectY => {
                self.enqueue_all(&[
                    Step::cycle(ReadAddressLo).inc(),
                    Step::cycle(ReadPointerLo),
                    Step::pair(ReadPointerHi, IndexIndirectY),
                ]);
                self.indexed_access(m, Index::Y);
            }
            AddressingMode::Relative => self.enqueue_all(&[
                Step::pair(ReadImmediate, BranchCheck(m)).inc(),
                Step::cycle(BranchOffset),
                Step::cycle(BranchSamePage).free(),
                Step::cycle(BranchCrossPage),
            ]),
        }
    }

    /// Operand access once the effective address is final.
    fn access(&mut self, m: Mnemonic) {
        match m.access() {
            Access::Read => {
                self.enqueue(Step::cycle(ReadEffective));
                self.finish_read(m);
            }
            Access::Write => self.enqueue_all(&[Step::cycle(Store(m)), FETCH]),
            Access::ReadModifyWrite => self.enqueue_all(&[
                Step::cycle(ReadEffective),
                Step::cycle(DummyWrite),
                Step::cycle(Modify(m)),
                FETCH,
            ]),
            Access::None => unreachable!("{} has no memory operand", m.name()),
        }
    }

    /// Operand access when the high byte may still need a carry.
    fn indexed_access(&mut self, m: Mnemonic, index: Index) {
        match m.access() {
            Access::Read => {
                self.enqueue_all(&[
                    Step::cycle(ReadSpeculative(index)),
                    // Retry; removed by the speculative read when the page was right.
                    Step::cycle(ReadEffective),
                ]);
                self.finish_read(m);
            }
            Access::Write => self.enqueue_all(&[
                Step::cycle(DummyReadFixHigh(index)),
                Step::cycle(Store(m)),
                FETCH,
            ]),
            Access::ReadModifyWrite => self.enqueue_all(&[
                Step::cycle(DummyReadFixHigh(index)),
                Step::cycle(ReadEffective),
                Step::cycle(DummyWrite),
                Step::cycle(Modify(m)),
                FETCH,
            ]),
            Access::None => unreachable!("{} has no memory operand", m.name()),
        }
    }

    /// Next fetch, then the delayed register update.
    fn finish_read(&mut self, m: Mnemonic) {
        self.enqueue_all(&[FETCH, Step::cycle(Execute(m)).free()]);
    }

    fn schedule_implied(&mut self, m: Mnemonic) {
        match m {
            Mnemonic::Brk => self.enqueue_all(&[
                // Padding byte is read and skipped.
                Step::cycle(DummyReadPc).inc(),
                Step::cycle(PushPch).inc(),
                Step::cycle(PushPcl),
                Step::cycle(PushStatus { software: true }),
                Step::cycle(ReadVectorLo(IRQ_VECTOR)),
                Step::pair(ReadVectorHi(IRQ_VECTOR), JumpToEffective),
                FETCH_AT_PC,
            ]),
            Mnemonic::Rti => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                Step::pair(DummyReadStack, IncrementS),
                Step::pair(PullStatus, IncrementS),
                Step::pair(PullPcl, IncrementS),
                Step::cycle(PullPch),
                FETCH_AT_PC,
            ]),
            Mnemonic::Rts => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                Step::pair(DummyReadStack, IncrementS),
                Step::pair(PullPcl, IncrementS),
                Step::cycle(PullPch),
                // Reads the pulled address (JSR's last operand byte); the fetch skips it.
                Step::cycle(DummyReadPc),
                FETCH,
            ]),
            Mnemonic::Pha => self.enqueue_all(&[Step::cycle(DummyReadNext), Step::cycle(PushA), FETCH]),
            Mnemonic::Php => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                Step::cycle(PushStatus { software: true }),
                FETCH,
            ]),
            Mnemonic::Pla => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                Step::pair(DummyReadStack, IncrementS),
                Step::cycle(PullA),
                FETCH,
            ]),
            Mnemonic::Plp => self.enqueue_all(&[
                Step::cycle(DummyReadNext),
                Step::pair(DummyReadStack, IncrementS),
                Step::cycle(PullData),
                // The pulled I flag is not seen by this fetch's interrupt poll.
                FETCH,
                Step::cycle(RestoreStatus).free(),
            ]),
            _ => self.enqueue_all(&[Step::cycle(DummyReadNext), FETCH, Step::cycle(Execute(m)).free()]),
        }
    }

    /// Hardware interrupt entry, appended after the hijacked opcode fetch.
    pub(super) fn schedule_interrupt(&mut self, vector: u16) {
        self.enqueue_all(&[
            Step::cycle(DummyReadPc),
            Step::cycle(PushPch),
            Step::cycle(PushPcl),
            Step::cycle(PushStatus { software: false }),
            Step::cycle(ReadVectorLo(vector)),
            Step::pair(ReadVectorHi(vector), JumpToEffective),
            FETCH_AT_PC,
        ]);
    }
}
