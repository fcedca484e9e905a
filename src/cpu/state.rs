/*!
state.rs - 6502 architectural registers, status flags and internal latches.

Overview
========
`Registers` holds everything a program can observe: A, X, Y, S, P and PC.
`Latches` models the chip's internal operand wiring: every byte an addressing
sequence fetches is parked in one of these between cycles. Nothing about an
in-flight instruction lives anywhere else, and the latches are overwritten by the
next addressing sequence rather than cleared.

PC convention
=============
`pc` addresses the most recently consumed instruction-stream byte. A step that
consumes the next byte carries the "increment PC first" flag; a fetch that follows
a control transfer (JMP, JSR, RTI, interrupts, taken branches) reads at `pc`
unchanged.

6502 Status Register Bit Layout
===============================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
Bits 5 and 4 do not exist as storage. They only appear in the byte pushed by
PHP/BRK (both set) or by a hardware interrupt (B clear), and are forced back
to the fixed pattern whenever P is pulled.
*/

use bitflags::bitflags;

bitflags! {
    /// Processor status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const CARRY       = 0b0000_0001;
        const ZERO        = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL     = 0b0000_1000;
        const BREAK       = 0b0001_0000;
        const UNUSED      = 0b0010_0000;
        const OVERFLOW    = 0b0100_0000;
        const NEGATIVE    = 0b1000_0000;
    }
}

impl Status {
    /// Register value after power-on (I set, U reads as 1).
    pub const POWER_ON: Status = Status::IRQ_DISABLE.union(Status::UNUSED);

    /// Byte pushed by PHP and BRK.
    #[inline]
    pub fn pushed_by_software(self) -> u8 {
        (self | Status::BREAK | Status::UNUSED).bits()
    }

    /// Byte pushed by NMI and IRQ.
    #[inline]
    pub fn pushed_by_interrupt(self) -> u8 {
        ((self - Status::BREAK) | Status::UNUSED).bits()
    }

    /// Status restored by PLP/RTI from a stack byte.
    #[inline]
    pub fn from_stack(value: u8) -> Status {
        (Status::from_bits_retain(value) - Status::BREAK) | Status::UNUSED
    }

    /// Update Z and N from a result.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }
}

/// Programmer-visible register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: Status,
    pub pc: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: Status::POWER_ON,
            pc: 0,
        }
    }
}

/// Internal operand latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latches {
    pub data: u8,
    pub address_lo: u8,
    pub address_hi: u8,
    pub effective_address_lo: u8,
    pub effective_address_hi: u8,
}

impl Latches {
    #[inline]
    pub fn address(&self) -> u16 {
        u16::from_le_bytes([self.address_lo, self.address_hi])
    }

    #[inline]
    pub fn effective_address(&self) -> u16 {
        u16::from_le_bytes([self.effective_address_lo, self.effective_address_hi])
    }

    #[inline]
    pub fn set_effective_address(&mut self, addr: u16) {
        [self.effective_address_lo, self.effective_address_hi] = addr.to_le_bytes();
    }
}
