/*!
execute.rs - Instruction semantics, independent of timing.

The scheduler decides *when* an operation happens; this module decides *what* it does
to the registers. Three entry points mirror the access classes of the decode table:

- `read`: a value arrives from memory (or the immediate byte) and updates registers.
- `modify`: a read-modify-write transform; returns the byte to write back. Combined
  undocumented forms (SLO, RRA, DCP...) also update A or flags from the result.
- `store_value`: the byte a store instruction puts on the bus.

`implied` covers register-only instructions and `accumulator` the A-register forms of
the shifts. Decimal mode is ignored by ADC/SBC, as on the NES's 2A03.
*/

use crate::cpu::state::{Registers, Status};
use crate::cpu::table::Mnemonic;

// ---------------------------------------------------------------------------
// Arithmetic / compare
// ---------------------------------------------------------------------------

#[inline]
fn adc(r: &mut Registers, v: u8) {
    let a = r.a;
    let sum16 = u16::from(a) + u16::from(v) + u16::from(r.p.contains(Status::CARRY));
    let result = sum16 as u8;
    r.p.set(Status::CARRY, sum16 > 0xFF);
    // Overflow: ( !(A ^ M) & (A ^ R) & 0x80 ) != 0
    r.p.set(Status::OVERFLOW, (!(a ^ v) & (a ^ result) & 0x80) != 0);
    r.a = result;
    r.p.set_zn(result);
}

#[inline]
fn sbc(r: &mut Registers, v: u8) {
    adc(r, v ^ 0xFF);
}

#[inline]
fn compare(r: &mut Registers, reg: u8, v: u8) {
    r.p.set(Status::CARRY, reg >= v);
    r.p.set_zn(reg.wrapping_sub(v));
}

// ---------------------------------------------------------------------------
// Shifts (shared by memory and accumulator forms)
// ---------------------------------------------------------------------------

#[inline]
fn asl(p: &mut Status, v: u8) -> u8 {
    p.set(Status::CARRY, v & 0x80 != 0);
    let r = v << 1;
    p.set_zn(r);
    r
}

#[inline]
fn lsr(p: &mut Status, v: u8) -> u8 {
    p.set(Status::CARRY, v & 0x01 != 0);
    let r = v >> 1;
    p.set_zn(r);
    r
}

#[inline]
fn rol(p: &mut Status, v: u8) -> u8 {
    let carry_in = u8::from(p.contains(Status::CARRY));
    p.set(Status::CARRY, v & 0x80 != 0);
    let r = (v << 1) | carry_in;
    p.set_zn(r);
    r
}

#[inline]
fn ror(p: &mut Status, v: u8) -> u8 {
    let carry_in = u8::from(p.contains(Status::CARRY)) << 7;
    p.set(Status::CARRY, v & 0x01 != 0);
    let r = (v >> 1) | carry_in;
    p.set_zn(r);
    r
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Apply a read-class operation to an operand byte.
pub fn read(m: Mnemonic, r: &mut Registers, v: u8) {
    use Mnemonic::*;
    match m {
        Lda => {
            r.a = v;
            r.p.set_zn(v);
        }
        Ldx => {
            r.x = v;
            r.p.set_zn(v);
        }
        Ldy => {
            r.y = v;
            r.p.set_zn(v);
        }
        Lax => {
            r.a = v;
            r.x = v;
            r.p.set_zn(v);
        }
        And => {
            r.a &= v;
            r.p.set_zn(r.a);
        }
        Ora => {
            r.a |= v;
            r.p.set_zn(r.a);
        }
        Eor => {
            r.a ^= v;
            r.p.set_zn(r.a);
        }
        Adc => adc(r, v),
        Sbc => sbc(r, v),
        Cmp => {
            let a = r.a;
            compare(r, a, v);
        }
        Cpx => {
            let x = r.x;
            compare(r, x, v);
        }
        Cpy => {
            let y = r.y;
            compare(r, y, v);
        }
        Bit => {
            r.p.set(Status::ZERO, r.a & v == 0);
            r.p.set(Status::NEGATIVE, v & 0x80 != 0);
            r.p.set(Status::OVERFLOW, v & 0x40 != 0);
        }
        Anc => {
            r.a &= v;
            r.p.set_zn(r.a);
            r.p.set(Status::CARRY, r.a & 0x80 != 0);
        }
        Alr => {
            r.a = lsr(&mut r.p, r.a & v);
        }
        Arr => {
            let carry_in = u8::from(r.p.contains(Status::CARRY)) << 7;
            let result = ((r.a & v) >> 1) | carry_in;
            r.a = result;
            r.p.set_zn(result);
            r.p.set(Status::CARRY, result & 0x40 != 0);
            r.p.set(Status::OVERFLOW, ((result >> 6) ^ (result >> 5)) & 1 != 0);
        }
        Axs => {
            let t = r.a & r.x;
            r.p.set(Status::CARRY, t >= v);
            r.x = t.wrapping_sub(v);
            r.p.set_zn(r.x);
        }
        Xaa => {
            r.a = (r.a | 0xEE) & r.x & v;
            r.p.set_zn(r.a);
        }
        Lxa => {
            let result = (r.a | 0xEE) & v;
            r.a = result;
            r.x = result;
            r.p.set_zn(result);
        }
        Las => {
            let result = v & r.s;
            r.a = result;
            r.x = result;
            r.s = result;
            r.p.set_zn(result);
        }
        Nop => {}
        other => unreachable!("{} is not a read operation", other.name()),
    }
}

/// Apply a read-modify-write operation; returns the byte written back.
pub fn modify(m: Mnemonic, r: &mut Registers, v: u8) -> u8 {
    use Mnemonic::*;
    match m {
        Asl => asl(&mut r.p, v),
        Lsr => lsr(&mut r.p, v),
        Rol => rol(&mut r.p, v),
        Ror => ror(&mut r.p, v),
        Inc => {
            let result = v.wrapping_add(1);
            r.p.set_zn(result);
            result
        }
        Dec => {
            let result = v.wrapping_sub(1);
            r.p.set_zn(result);
            result
        }
        Slo => {
            let result = asl(&mut r.p, v);
            r.a |= result;
            r.p.set_zn(r.a);
            result
        }
        Rla => {
            let result = rol(&mut r.p, v);
            r.a &= result;
            r.p.set_zn(r.a);
            result
        }
        Sre => {
            let result = lsr(&mut r.p, v);
            r.a ^= result;
            r.p.set_zn(r.a);
            result
        }
        Rra => {
            let result = ror(&mut r.p, v);
            adc(r, result);
            result
        }
        Dcp => {
            let result = v.wrapping_sub(1);
            let a = r.a;
            compare(r, a, result);
            result
        }
        Isb => {
            let result = v.wrapping_add(1);
            sbc(r, result);
            result
        }
        other => unreachable!("{} is not a read-modify-write operation", other.name()),
    }
}

/// Byte a store instruction writes. `high_plus_one` is the high byte of the base
/// address plus one, which the unstable SH*/TAS/AHX family ANDs into the value.
pub fn store_value(m: Mnemonic, r: &mut Registers, high_plus_one: u8) -> u8 {
    use Mnemonic::*;
    match m {
        Sta => r.a,
        Stx => r.x,
        Sty => r.y,
        Sax => r.a & r.x,
        Shy => r.y & high_plus_one,
        Shx => r.x & high_plus_one,
        Ahx => r.a & r.x & high_plus_one,
        Tas => {
            r.s = r.a & r.x;
            r.s & high_plus_one
        }
        other => unreachable!("{} is not a store operation", other.name()),
    }
}

/// Stores whose value also replaces the high address byte on a page crossing.
#[inline]
pub fn corrupts_address_on_page_cross(m: Mnemonic) -> bool {
    matches!(m, Mnemonic::Shy | Mnemonic::Shx | Mnemonic::Ahx | Mnemonic::Tas)
}

/// Register-only (implied) instructions.
pub fn implied(m: Mnemonic, r: &mut Registers) {
    use Mnemonic::*;
    match m {
        Clc => r.p.remove(Status::CARRY),
        Sec => r.p.insert(Status::CARRY),
        Cli => r.p.remove(Status::IRQ_DISABLE),
        Sei => r.p.insert(Status::IRQ_DISABLE),
        Cld => r.p.remove(Status::DECIMAL),
        Sed => r.p.insert(Status::DECIMAL),
        Clv => r.p.remove(Status::OVERFLOW),
        Tax => {
            r.x = r.a;
            r.p.set_zn(r.x);
        }
        Tay => {
            r.y = r.a;
            r.p.set_zn(r.y);
        }
        Txa => {
            r.a = r.x;
            r.p.set_zn(r.a);
        }
        Tya => {
            r.a = r.y;
            r.p.set_zn(r.a);
        }
        Tsx => {
            r.x = r.s;
            r.p.set_zn(r.x);
        }
        // TXS leaves the flags alone.
        Txs => r.s = r.x,
        Inx => {
            r.x = r.x.wrapping_add(1);
            r.p.set_zn(r.x);
        }
        Iny => {
            r.y = r.y.wrapping_add(1);
            r.p.set_zn(r.y);
        }
        Dex => {
            r.x = r.x.wrapping_sub(1);
            r.p.set_zn(r.x);
        }
        Dey => {
            r.y = r.y.wrapping_sub(1);
            r.p.set_zn(r.y);
        }
        Nop => {}
        other => unreachable!("{} is not an implied operation", other.name()),
    }
}

/// Accumulator forms of ASL/LSR/ROL/ROR.
pub fn accumulator(m: Mnemonic, r: &mut Registers) {
    let a = r.a;
    r.a = modify(m, r, a);
}

/// Condition tested by a branch mnemonic.
pub fn branch_taken(m: Mnemonic, p: Status) -> bool {
    use Mnemonic::*;
    match m {
        Bpl => !p.contains(Status::NEGATIVE),
        Bmi => p.contains(Status::NEGATIVE),
        Bvc => !p.contains(Status::OVERFLOW),
        Bvs => p.contains(Status::OVERFLOW),
        Bcc => !p.contains(Status::CARRY),
        Bcs => p.contains(Status::CARRY),
        Bne => !p.contains(Status::ZERO),
        Beq => p.contains(Status::ZERO),
        other => unreachable!("{} is not a branch", other.name()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn regs() -> Registers {
        Registers::default()
    }

    #[test]
    fn adc_overflow_and_carry() {
        let mut r = regs();
        r.a = 0x50;
        read(Mnemonic::Adc, &mut r, 0x50); // 0x50 + 0x50 = 0xA0 (signed overflow)
        assert!(r.p.contains(Status::OVERFLOW));
        assert!(!r.p.contains(Status::CARRY));
        r.a = 0xF0;
        read(Mnemonic::Adc, &mut r, 0x20); // 0xF0 + 0x20 = 0x110
        assert!(r.p.contains(Status::CARRY));
        assert_eq!(r.a, 0x10);
    }

    #[test]
    fn adc_ignores_decimal_flag() {
        let mut r = regs();
        r.p.insert(Status::DECIMAL);
        r.a = 0x09;
        read(Mnemonic::Adc, &mut r, 0x01);
        assert_eq!(r.a, 0x0A, "binary result even with D set");
    }

    #[test]
    fn sbc_basic() {
        let mut r = regs();
        r.a = 0x10;
        r.p.insert(Status::CARRY); // Set for pure subtraction
        read(Mnemonic::Sbc, &mut r, 0x01);
        assert_eq!(r.a, 0x0F);
        assert!(r.p.contains(Status::CARRY), "no borrow");
    }

    #[test]
    fn compare_sets_carry_on_greater_or_equal() {
        let mut r = regs();
        r.x = 0x40;
        read(Mnemonic::Cpx, &mut r, 0x40);
        assert!(r.p.contains(Status::CARRY) && r.p.contains(Status::ZERO));
        read(Mnemonic::Cpx, &mut r, 0x41);
        assert!(!r.p.contains(Status::CARRY));
        assert!(r.p.contains(Status::NEGATIVE));
    }

    #[test]
    fn bit_copies_operand_bits_into_n_and_v() {
        let mut r = regs();
        r.a = 0x01;
        read(Mnemonic::Bit, &mut r, 0xC0);
        assert!(r.p.contains(Status::NEGATIVE | Status::OVERFLOW | Status::ZERO));
    }

    #[test]
    fn rotate_through_carry() {
        let mut r = regs();
        r.a = 0x80;
        accumulator(Mnemonic::Rol, &mut r); // 0x80 -> sets carry, A becomes 0x00
        assert_eq!(r.a, 0x00);
        assert!(r.p.contains(Status::CARRY));
        assert!(r.p.contains(Status::ZERO));
        accumulator(Mnemonic::Ror, &mut r);
        assert_eq!(r.a, 0x80, "carry rotates back into bit 7");
    }

    #[test]
    fn combined_rmw_forms_update_accumulator() {
        let mut r = regs();
        r.a = 0x01;
        assert_eq!(modify(Mnemonic::Slo, &mut r, 0x40), 0x80);
        assert_eq!(r.a, 0x81);

        r.a = 0x05;
        assert_eq!(modify(Mnemonic::Dcp, &mut r, 0x06), 0x05);
        assert!(r.p.contains(Status::ZERO | Status::CARRY), "DCP compares A with the result");

        r.a = 0x10;
        r.p.insert(Status::CARRY);
        assert_eq!(modify(Mnemonic::Isb, &mut r, 0x00), 0x01);
        assert_eq!(r.a, 0x0F);
    }

    #[test]
    fn undocumented_immediates() {
        let mut r = regs();
        r.a = 0xFF;
        r.x = 0x0F;
        read(Mnemonic::Axs, &mut r, 0x01);
        assert_eq!(r.x, 0x0E);
        assert!(r.p.contains(Status::CARRY));

        r.a = 0x00;
        read(Mnemonic::Lxa, &mut r, 0x5A);
        assert_eq!((r.a, r.x), (0x4A, 0x4A), "(A | $EE) & imm");

        r.a = 0xFF;
        r.x = 0x33;
        read(Mnemonic::Xaa, &mut r, 0x0F);
        assert_eq!(r.a, 0x03);

        r.a = 0xFF;
        r.p.remove(Status::CARRY);
        read(Mnemonic::Arr, &mut r, 0xC0);
        assert_eq!(r.a, 0x60);
        assert!(r.p.contains(Status::CARRY), "C comes from bit 6");
        assert!(!r.p.contains(Status::OVERFLOW), "V is bit 6 xor bit 5");
    }

    #[test]
    fn unstable_stores_and_high_byte() {
        let mut r = regs();
        r.a = 0xFF;
        r.x = 0xF3;
        r.y = 0x7F;
        assert_eq!(store_value(Mnemonic::Sax, &mut r, 0), 0xF3);
        assert_eq!(store_value(Mnemonic::Shy, &mut r, 0x13), 0x13);
        assert_eq!(store_value(Mnemonic::Shx, &mut r, 0x13), 0x13);
        assert_eq!(store_value(Mnemonic::Tas, &mut r, 0x0F), 0x03);
        assert_eq!(r.s, 0xF3, "TAS loads S with A & X");
        assert!(corrupts_address_on_page_cross(Mnemonic::Ahx));
        assert!(!corrupts_address_on_page_cross(Mnemonic::Sta));
    }

    #[test]
    fn transfers_and_counters() {
        let mut r = regs();
        r.x = 0xFF;
        implied(Mnemonic::Inx, &mut r);
        assert_eq!(r.x, 0);
        assert!(r.p.contains(Status::ZERO));
        r.x = 0x80;
        implied(Mnemonic::Txs, &mut r);
        assert_eq!(r.s, 0x80);
        assert!(r.p.contains(Status::ZERO), "TXS does not touch flags");
        implied(Mnemonic::Tsx, &mut r);
        assert!(r.p.contains(Status::NEGATIVE));
    }

    #[test]
    fn branch_conditions() {
        let p = Status::CARRY | Status::ZERO;
        assert!(branch_taken(Mnemonic::Bcs, p));
        assert!(branch_taken(Mnemonic::Beq, p));
        assert!(!branch_taken(Mnemonic::Bne, p));
        assert!(branch_taken(Mnemonic::Bpl, p));
        assert!(branch_taken(Mnemonic::Bvc, p));
    }
}
