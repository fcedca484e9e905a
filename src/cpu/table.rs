/*!
table.rs - Opcode decode table.

Each of the 256 opcodes maps to a (`Mnemonic`, `AddressingMode`) pair, or to `None`
for the twelve JAM opcodes that lock the real chip. The scheduler builds an
instruction's micro-op sequence from the pair alone, so the cycle behavior of every
opcode follows from its addressing mode and from the access class of its mnemonic
(read, write, read-modify-write).

Undocumented opcodes are decoded like documented ones. Unstable variants
(XAA, LXA, AHX, SHX, SHY, TAS, LAS) use the commonly observed NES behavior.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // undocumented
    Ahx, Alr, Anc, Arr, Axs, Dcp, Isb, Las, Lax, Lxa, Rla, Rra, Sax, Shx,
    Shy, Slo, Sre, Tas, Xaa,
}

/// How an instruction touches its memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadModifyWrite,
    /// Implied, stack, branch and jump instructions.
    None,
}

impl Mnemonic {
    pub fn access(self) -> Access {
        use Mnemonic::*;
        match self {
            Adc | And | Bit | Cmp | Cpx | Cpy | Eor | Lda | Ldx | Ldy | Ora | Sbc | Nop | Lax
            | Anc | Alr | Arr | Axs | Xaa | Lxa | Las => Access::Read,
            Sta | Stx | Sty | Sax | Ahx | Shx | Shy | Tas => Access::Write,
            Asl | Lsr | Rol | Ror | Inc | Dec | Slo | Rla | Sre | Rra | Dcp | Isb => {
                Access::ReadModifyWrite
            }
            _ => Access::None,
        }
    }

    /// Upper-case assembler name.
    #[rustfmt::skip]
    pub fn name(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA", Ahx => "AHX", Alr => "ALR", Anc => "ANC", Arr => "ARR",
            Axs => "AXS", Dcp => "DCP", Isb => "ISB", Las => "LAS", Lax => "LAX",
            Lxa => "LXA", Rla => "RLA", Rra => "RRA", Sax => "SAX", Shx => "SHX",
            Shy => "SHY", Slo => "SLO", Sre => "SRE", Tas => "TAS", Xaa => "XAA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
}

/// Decode an opcode. `None` means the opcode halts the processor.
#[inline]
pub fn decode(opcode: u8) -> Option<Instruction> {
    OPCODES[opcode as usize]
}

macro_rules! op {
    ($m:ident, $mode:ident) => {
        Some(Instruction {
            mnemonic: Mnemonic::$m,
            mode: AddressingMode::$mode,
        })
    };
}

const JAM: Option<Instruction> = None;

#[rustfmt::skip]
static OPCODES: [Option<Instruction>; 256] = [
    // 0x00
    op!(Brk, Implied),   op!(Ora, IndirectX), JAM,                  op!(Slo, IndirectX),
    op!(Nop, ZeroPage),  op!(Ora, ZeroPage),  op!(Asl, ZeroPage),   op!(Slo, ZeroPage),
    op!(Php, Implied),   op!(Ora, Immediate), op!(Asl, Accumulator), op!(Anc, Immediate),
    op!(Nop, Absolute),  op!(Ora, Absolute),  op!(Asl, Absolute),   op!(Slo, Absolute),
    // 0x10
    op!(Bpl, Relative),  op!(Ora, IndirectY), JAM,                  op!(Slo, IndirectY),
    op!(Nop, ZeroPageX), op!(Ora, ZeroPageX), op!(Asl, ZeroPageX),  op!(Slo, ZeroPageX),
    op!(Clc, Implied),   op!(Ora, AbsoluteY), op!(Nop, Implied),    op!(Slo, AbsoluteY),
    op!(Nop, AbsoluteX), op!(Ora, AbsoluteX), op!(Asl, AbsoluteX),  op!(Slo, AbsoluteX),
    // 0x20
    op!(Jsr, Absolute),  op!(And, IndirectX), JAM,                  op!(Rla, IndirectX),
    op!(Bit, ZeroPage),  op!(And, ZeroPage),  op!(Rol, ZeroPage),   op!(Rla, ZeroPage),
    op!(Plp, Implied),   op!(And, Immediate), op!(Rol, Accumulator), op!(Anc, Immediate),
    op!(Bit, Absolute),  op!(And, Absolute),  op!(Rol, Absolute),   op!(Rla, Absolute),
    // 0x30
    op!(Bmi, Relative),  op!(And, IndirectY), JAM,                  op!(Rla, IndirectY),
    op!(Nop, ZeroPageX), op!(And, ZeroPageX), op!(Rol, ZeroPageX),  op!(Rla, ZeroPageX),
    op!(Sec, Implied),   op!(And, AbsoluteY), op!(Nop, Implied),    op!(Rla, AbsoluteY),
    op!(Nop, AbsoluteX), op!(And, AbsoluteX), op!(Rol, AbsoluteX),  op!(Rla, AbsoluteX),
    // 0x40
    op!(Rti, Implied),   op!(Eor, IndirectX), JAM,                  op!(Sre, IndirectX),
    op!(Nop, ZeroPage),  op!(Eor, ZeroPage),  op!(Lsr, ZeroPage),   op!(Sre, ZeroPage),
    op!(Pha, Implied),   op!(Eor, Immediate), op!(Lsr, Accumulator), op!(Alr, Immediate),
    op!(Jmp, Absolute),  op!(Eor, Absolute),  op!(Lsr, Absolute),   op!(Sre, Absolute),
    // 0x50
    op!(Bvc, Relative),  op!(Eor, IndirectY), JAM,                  op!(Sre, IndirectY),
    op!(Nop, ZeroPageX), op!(Eor, ZeroPageX), op!(Lsr, ZeroPageX),  op!(Sre, ZeroPageX),
    op!(Cli, Implied),   op!(Eor, AbsoluteY), op!(Nop, Implied),    op!(Sre, AbsoluteY),
    op!(Nop, AbsoluteX), op!(Eor, AbsoluteX), op!(Lsr, AbsoluteX),  op!(Sre, AbsoluteX),
    // 0x60
    op!(Rts, Implied),   op!(Adc, IndirectX), JAM,                  op!(Rra, IndirectX),
    op!(Nop, ZeroPage),  op!(Adc, ZeroPage),  op!(Ror, ZeroPage),   op!(Rra, ZeroPage),
    op!(Pla, Implied),   op!(Adc, Immediate), op!(Ror, Accumulator), op!(Arr, Immediate),
    op!(Jmp, Indirect),  op!(Adc, Absolute),  op!(Ror, Absolute),   op!(Rra, Absolute),
    // 0x70
    op!(Bvs, Relative),  op!(Adc, IndirectY), JAM,                  op!(Rra, IndirectY),
    op!(Nop, ZeroPageX), op!(Adc, ZeroPageX), op!(Ror, ZeroPageX),  op!(Rra, ZeroPageX),
    op!(Sei, Implied),   op!(Adc, AbsoluteY), op!(Nop, Implied),    op!(Rra, AbsoluteY),
    op!(Nop, AbsoluteX), op!(Adc, AbsoluteX), op!(Ror, AbsoluteX),  op!(Rra, AbsoluteX),
    // 0x80
    op!(Nop, Immediate), op!(Sta, IndirectX), op!(Nop, Immediate),  op!(Sax, IndirectX),
    op!(Sty, ZeroPage),  op!(Sta, ZeroPage),  op!(Stx, ZeroPage),   op!(Sax, ZeroPage),
    op!(Dey, Implied),   op!(Nop, Immediate), op!(Txa, Implied),    op!(Xaa, Immediate),
    op!(Sty, Absolute),  op!(Sta, Absolute),  op!(Stx, Absolute),   op!(Sax, Absolute),
    // 0x90
    op!(Bcc, Relative),  op!(Sta, IndirectY), JAM,                  op!(Ahx, IndirectY),
    op!(Sty, ZeroPageX), op!(Sta, ZeroPageX), op!(Stx, ZeroPageY),  op!(Sax, ZeroPageY),
    op!(Tya, Implied),   op!(Sta, AbsoluteY), op!(Txs, Implied),    op!(Tas, AbsoluteY),
    op!(Shy, AbsoluteX), op!(Sta, AbsoluteX), op!(Shx, AbsoluteY),  op!(Ahx, AbsoluteY),
    // 0xA0
    op!(Ldy, Immediate), op!(Lda, IndirectX), op!(Ldx, Immediate),  op!(Lax, IndirectX),
    op!(Ldy, ZeroPage),  op!(Lda, ZeroPage),  op!(Ldx, ZeroPage),   op!(Lax, ZeroPage),
    op!(Tay, Implied),   op!(Lda, Immediate), op!(Tax, Implied),    op!(Lxa, Immediate),
    op!(Ldy, Absolute),  op!(Lda, Absolute),  op!(Ldx, Absolute),   op!(Lax, Absolute),
    // 0xB0
    op!(Bcs, Relative),  op!(Lda, IndirectY), JAM,                  op!(Lax, IndirectY),
    op!(Ldy, ZeroPageX), op!(Lda, ZeroPageX), op!(Ldx, ZeroPageY),  op!(Lax, ZeroPageY),
    op!(Clv, Implied),   op!(Lda, AbsoluteY), op!(Tsx, Implied),    op!(Las, AbsoluteY),
    op!(Ldy, AbsoluteX), op!(Lda, AbsoluteX), op!(Ldx, AbsoluteY),  op!(Lax, AbsoluteY),
    // 0xC0
    op!(Cpy, Immediate), op!(Cmp, IndirectX), op!(Nop, Immediate),  op!(Dcp, IndirectX),
    op!(Cpy, ZeroPage),  op!(Cmp, ZeroPage),  op!(Dec, ZeroPage),   op!(Dcp, ZeroPage),
    op!(Iny, Implied),   op!(Cmp, Immediate), op!(Dex, Implied),    op!(Axs, Immediate),
    op!(Cpy, Absolute),  op!(Cmp, Absolute),  op!(Dec, Absolute),   op!(Dcp, Absolute),
    // 0xD0
    op!(Bne, Relative),  op!(Cmp, IndirectY), JAM,                  op!(Dcp, IndirectY),
    op!(Nop, ZeroPageX), op!(Cmp, ZeroPageX), op!(Dec, ZeroPageX),  op!(Dcp, ZeroPageX),
    op!(Cld, Implied),   op!(Cmp, AbsoluteY), op!(Nop, Implied),    op!(Dcp, AbsoluteY),
    op!(Nop, AbsoluteX), op!(Cmp, AbsoluteX), op!(Dec, AbsoluteX),  op!(Dcp, AbsoluteX),
    // 0xE0
    op!(Cpx, Immediate), op!(Sbc, IndirectX), op!(Nop, Immediate),  op!(Isb, IndirectX),
    op!(Cpx, ZeroPage),  op!(Sbc, ZeroPage),  op!(Inc, ZeroPage),   op!(Isb, ZeroPage),
    op!(Inx, Implied),   op!(Sbc, Immediate), op!(Nop, Implied),    op!(Sbc, Immediate),
    op!(Cpx, Absolute),  op!(Sbc, Absolute),  op!(Inc, Absolute),   op!(Isb, Absolute),
    // 0xF0
    op!(Beq, Relative),  op!(Sbc, IndirectY), JAM,                  op!(Isb, IndirectY),
    op!(Nop, ZeroPageX), op!(Sbc, ZeroPageX), op!(Inc, ZeroPageX),  op!(Isb, ZeroPageX),
    op!(Sed, Implied),   op!(Sbc, AbsoluteY), op!(Nop, Implied),    op!(Isb, AbsoluteY),
    op!(Nop, AbsoluteX), op!(Sbc, AbsoluteX), op!(Inc, AbsoluteX),  op!(Isb, AbsoluteX),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_twelve_opcodes_jam() {
        let jams: Vec<u8> = (0..=255u8).filter(|&op| decode(op).is_none()).collect();
        assert_eq!(
            jams,
            vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
        );
    }

    #[test]
    fn spot_check_documented_and_undocumented_rows() {
        let lda = decode(0xB1).unwrap();
        assert_eq!((lda.mnemonic, lda.mode), (Mnemonic::Lda, AddressingMode::IndirectY));
        let jmp = decode(0x6C).unwrap();
        assert_eq!((jmp.mnemonic, jmp.mode), (Mnemonic::Jmp, AddressingMode::Indirect));
        let sbc = decode(0xEB).unwrap();
        assert_eq!(sbc.mnemonic, Mnemonic::Sbc, "$EB is an SBC alias");
        let dcp = decode(0xC3).unwrap();
        assert_eq!((dcp.mnemonic, dcp.mode), (Mnemonic::Dcp, AddressingMode::IndirectX));
    }

    #[test]
    fn access_classes_match_mnemonic_kind() {
        assert_eq!(Mnemonic::Lda.access(), Access::Read);
        assert_eq!(Mnemonic::Sax.access(), Access::Write);
        assert_eq!(Mnemonic::Isb.access(), Access::ReadModifyWrite);
        assert_eq!(Mnemonic::Jsr.access(), Access::None);
        assert_eq!(Mnemonic::Nop.access(), Access::Read, "NOPs with operands read them");
    }

    #[test]
    fn store_and_read_opcodes_agree_on_index_register_for_x_family() {
        // STX/LDX/SAX/LAX index through Y where the rest of the row uses X.
        for op in [0x96u8, 0xB6, 0x97, 0xB7] {
            assert_eq!(decode(op).unwrap().mode, AddressingMode::ZeroPageY, "{op:02X}");
        }
        for op in [0xBEu8, 0xBF, 0x9E, 0x9F] {
            assert_eq!(decode(op).unwrap().mode, AddressingMode::AbsoluteY, "{op:02X}");
        }
    }
}
