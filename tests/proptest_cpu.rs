//! Property-based tests for CPU invariants.
//!
//! Each case runs a short program from $0200 on a flat 64 KiB bus and inspects the
//! instruction-boundary trace: record `k` holds the registers as they were before
//! instruction `k`, so the effect of an instruction is read from the record after it.

use cyclenes::{Cpu, CpuBus, TraceRecord};
use proptest::prelude::*;

const CARRY: u8 = 0x01;
const ZERO: u8 = 0x02;
const OVERFLOW: u8 = 0x40;
const NEGATIVE: u8 = 0x80;

struct FlatMemory {
    data: Vec<u8>,
}

impl CpuBus for FlatMemory {
    fn read(&mut self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}

/// Run `program` (followed by NOPs) until `n` trace records exist.
fn run(program: &[u8], setup: impl FnOnce(&mut FlatMemory), n: usize) -> Vec<TraceRecord> {
    let mut mem = FlatMemory { data: vec![0; 0x10000] };
    setup(&mut mem);
    mem.data[0x0200..0x0200 + program.len()].copy_from_slice(program);
    mem.data[0x0200 + program.len()..0x0220 + program.len()].fill(0xEA);
    mem.data[0xFFFC] = 0x00;
    mem.data[0xFFFD] = 0x02;

    let mut cpu = Cpu::new();
    cpu.set_tracing(true);
    cpu.init();
    let mut records = Vec::new();
    for _ in 0..200 {
        if records.len() >= n {
            break;
        }
        cpu.clock(&mut mem).expect("program uses defined opcodes");
        records.extend(cpu.take_trace());
    }
    assert!(records.len() >= n, "only {} records", records.len());
    records
}

fn flags(p: u8) -> u8 {
    p & (CARRY | ZERO | OVERFLOW | NEGATIVE)
}

fn nz(value: u8) -> u8 {
    let mut p = 0;
    if value == 0 {
        p |= ZERO;
    }
    if value & 0x80 != 0 {
        p |= NEGATIVE;
    }
    p
}

fn adc_model(a: u8, b: u8, carry: bool) -> (u8, u8) {
    let sum = u16::from(a) + u16::from(b) + u16::from(carry);
    let result = sum as u8;
    let mut p = nz(result);
    if sum > 0xFF {
        p |= CARRY;
    }
    if (!(a ^ b) & (a ^ result) & 0x80) != 0 {
        p |= OVERFLOW;
    }
    (result, p)
}

fn sbc_model(a: u8, b: u8, carry: bool) -> (u8, u8) {
    let borrow = i16::from(!carry);
    let diff = i16::from(a) - i16::from(b) - borrow;
    let result = diff as u8;
    let mut p = nz(result);
    if diff >= 0 {
        p |= CARRY;
    }
    if ((a ^ b) & (a ^ result) & 0x80) != 0 {
        p |= OVERFLOW;
    }
    (result, p)
}

proptest! {
    /// ADC #imm matches the binary-mode reference for every A, operand and carry-in.
    #[test]
    fn prop_adc_matches_reference(a: u8, b: u8, carry: bool) {
        let set_carry = if carry { 0x38 } else { 0x18 };
        let recs = run(&[0xA9, a, set_carry, 0x69, b], |_| {}, 4);
        let (result, p) = adc_model(a, b, carry);
        prop_assert_eq!(recs[3].a, result);
        prop_assert_eq!(flags(recs[3].p), p, "ADC {:02X}+{:02X}+{}", a, b, carry as u8);
    }

    /// SBC #imm is ADC of the complement; $EB is the same instruction.
    #[test]
    fn prop_sbc_matches_reference(a: u8, b: u8, carry: bool, alias: bool) {
        let set_carry = if carry { 0x38 } else { 0x18 };
        let opcode = if alias { 0xEB } else { 0xE9 };
        let recs = run(&[0xA9, a, set_carry, opcode, b], |_| {}, 4);
        let (result, p) = sbc_model(a, b, carry);
        prop_assert_eq!(recs[3].a, result);
        prop_assert_eq!(flags(recs[3].p), p, "SBC {:02X}-{:02X} c={}", a, b, carry as u8);
    }

    /// PHA/PLA restores A and the stack pointer; PLA sets N/Z from the pulled value.
    #[test]
    fn prop_stack_round_trip(value: u8, clobber: u8) {
        let recs = run(&[0xA9, value, 0x48, 0xA9, clobber, 0x68], |_| {}, 5);
        prop_assert_eq!(recs[2].s, 0xFC, "PHA decremented S");
        prop_assert_eq!(recs[4].a, value);
        prop_assert_eq!(recs[4].s, recs[0].s);
        prop_assert_eq!(flags(recs[4].p) & (ZERO | NEGATIVE), nz(value));
    }

    /// PHP/PLP round-trips every flag the program can set; bits 4/5 are not stored.
    #[test]
    fn prop_status_round_trip(value: u8) {
        // LDA #value; PHA; PLP; PHP; PLA
        let recs = run(&[0xA9, value, 0x48, 0x28, 0x08, 0x68], |_| {}, 6);
        prop_assert_eq!(recs[3].p, (value & 0xCF) | 0x20, "PLP ignores B, forces bit 5");
        prop_assert_eq!(recs[5].a, value | 0x30, "PHP pushes B and bit 5 set");
    }

    /// LDA abs,X costs one extra cycle exactly when base + X leaves the base page.
    #[test]
    fn prop_absolute_x_page_cross_penalty(base in 0x0300u16..0xFF00, x: u8) {
        let [lo, hi] = base.to_le_bytes();
        let recs = run(&[0xA2, x, 0xBD, lo, hi], |_| {}, 3);
        let crossed = (base & 0xFF) + u16::from(x) > 0xFF;
        prop_assert_eq!(recs[2].cycle - recs[1].cycle, 4 + u64::from(crossed));
    }

    /// LDA (zp),Y costs one extra cycle exactly when the pointer + Y crosses a page.
    #[test]
    fn prop_indirect_y_page_cross_penalty(zp in 0x10u8..0xF0, pointer in 0x0300u16..0xFF00, y: u8) {
        let [lo, hi] = pointer.to_le_bytes();
        let recs = run(
            &[0xA0, y, 0xB1, zp],
            |mem| {
                mem.data[usize::from(zp)] = lo;
                mem.data[usize::from(zp) + 1] = hi;
            },
            3,
        );
        let crossed = (pointer & 0xFF) + u16::from(y) > 0xFF;
        prop_assert_eq!(recs[2].cycle - recs[1].cycle, 5 + u64::from(crossed));
    }

    /// Indexed stores never skip the fix-up cycle.
    #[test]
    fn prop_indexed_store_is_constant_time(base in 0x0300u16..0x0700, x: u8) {
        let [lo, hi] = base.to_le_bytes();
        let recs = run(&[0xA2, x, 0x9D, lo, hi], |_| {}, 3);
        prop_assert_eq!(recs[2].cycle - recs[1].cycle, 5);
    }
}
