use std::fmt;

use super::error::{Error, Result};
use super::opcode::Opcode;

/// A wrapper for addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single instruction from the CHIP-8 instruction set.
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register identifier
/// - PC: Program counter
/// - I: 16 bit register for memory address
/// - VN: One of the 16 available variables (register identifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,               // 00E0
    Return,                    // 00EE
    Goto(Addr),                // 1NNN
    Call(Addr),                // 2NNN
    IfRegEqConst(Reg, Const),  // 3XNN
    IfRegNeqConst(Reg, Const), // 4XNN
    IfRegEqReg(Reg, Reg),      // 5XY0
    SetRegToConst(Reg, Const), // 6XNN
    IncRegByConst(Reg, Const), // 7XNN
    SetRegToReg(Reg, Reg),     // 8XY0
    BitwiseOr(Reg, Reg),       // 8XY1
    BitwiseAnd(Reg, Reg),      // 8XY2
    BitwiseXor(Reg, Reg),      // 8XY3
    IncRegByReg(Reg, Reg),     // 8XY4
    DecRegByReg(Reg, Reg),     // 8XY5
    BitshiftRight(Reg),        // 8XY6
    SetVxVyMinusVx(Reg, Reg),  // 8XY7
    BitshiftLeft(Reg),         // 8XYE
    IfRegNeqReg(Reg, Reg),     // 9XY0
    SetI(Addr),                // ANNN
    SetPcToV0PlusAddr(Addr),   // BNNN
    SetVxRand(Reg, Const),     // CXNN
    Draw(Reg, Reg, Const),     // DXYN
    IfKeyEqVx(Reg),            // EX9E
    IfKeyNeqVx(Reg),           // EXA1
    SetRegToDelayTimer(Reg),   // FX07
    SetRegToGetKey(Reg),       // FX0A
    SetDelayTimerToReg(Reg),   // FX15
    SetSoundTimerToReg(Reg),   // FX18
    AddRegToI(Reg),            // FX1E
    SetIToSpriteAddrVx(Reg),   // FX29
    SetIToBcdOfReg(Reg),       // FX33
    RegDump(Reg),              // FX55
    RegLoad(Reg),              // FX65
}

impl Instruction {
    /// Decode an instruction word.
    ///
    /// Words that match none of the patterns are reported as
    /// [`Error::UnknownInstruction`] with `address` set to `0`;
    /// use [`Instruction::decode_at`] to record where the word was fetched from.
    pub fn decode(word: u16) -> Result<Instruction> {
        Instruction::decode_at(word, 0)
    }

    /// Decode an instruction word fetched from `address`.
    pub fn decode_at(word: u16, address: u16) -> Result<Instruction> {
        let opcode = Opcode::new(word);
        let x = Reg(opcode.x());
        let y = Reg(opcode.y());
        let nn = Const(opcode.nn());
        let nnn = Addr(opcode.nnn());

        let instruction = match opcode.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (1, _, _, _) => Instruction::Goto(nnn),
            (2, _, _, _) => Instruction::Call(nnn),
            (3, _, _, _) => Instruction::IfRegEqConst(x, nn),
            (4, _, _, _) => Instruction::IfRegNeqConst(x, nn),
            (5, _, _, 0) => Instruction::IfRegEqReg(x, y),
            (6, _, _, _) => Instruction::SetRegToConst(x, nn),
            (7, _, _, _) => Instruction::IncRegByConst(x, nn),
            (8, _, _, 0) => Instruction::SetRegToReg(x, y),
            (8, _, _, 1) => Instruction::BitwiseOr(x, y),
            (8, _, _, 2) => Instruction::BitwiseAnd(x, y),
            (8, _, _, 3) => Instruction::BitwiseXor(x, y),
            (8, _, _, 4) => Instruction::IncRegByReg(x, y),
            (8, _, _, 5) => Instruction::DecRegByReg(x, y),
            (8, _, _, 6) => Instruction::BitshiftRight(x),
            (8, _, _, 7) => Instruction::SetVxVyMinusVx(x, y),
            (8, _, _, 0xE) => Instruction::BitshiftLeft(x),
            (9, _, _, 0) => Instruction::IfRegNeqReg(x, y),
            (0xA, _, _, _) => Instruction::SetI(nnn),
            (0xB, _, _, _) => Instruction::SetPcToV0PlusAddr(nnn),
            (0xC, _, _, _) => Instruction::SetVxRand(x, nn),
            (0xD, _, _, n) => Instruction::Draw(x, y, Const(n)),
            (0xE, _, 9, 0xE) => Instruction::IfKeyEqVx(x),
            (0xE, _, 0xA, 1) => Instruction::IfKeyNeqVx(x),
            (0xF, _, 0, 7) => Instruction::SetRegToDelayTimer(x),
            (0xF, _, 0, 0xA) => Instruction::SetRegToGetKey(x),
            (0xF, _, 1, 5) => Instruction::SetDelayTimerToReg(x),
            (0xF, _, 1, 8) => Instruction::SetSoundTimerToReg(x),
            (0xF, _, 1, 0xE) => Instruction::AddRegToI(x),
            (0xF, _, 2, 9) => Instruction::SetIToSpriteAddrVx(x),
            (0xF, _, 3, 3) => Instruction::SetIToBcdOfReg(x),
            (0xF, _, 5, 5) => Instruction::RegDump(x),
            (0xF, _, 6, 5) => Instruction::RegLoad(x),
            _ => return Err(Error::UnknownInstruction { word, address }),
        };

        Ok(instruction)
    }
}

/// A listing of `program` as it would sit in memory from 0x200,
/// one instruction word per line. Words that don't decode are shown as data.
pub fn disassemble(program: &[u8]) -> String {
    let mut listing = String::new();
    for (offset, pair) in program.chunks(2).enumerate() {
        let address = 0x200 + offset * 2;
        let line = match *pair {
            [high, low] => {
                let word = Opcode::from_two_u8(high, low).word();
                match Instruction::decode(word) {
                    Ok(instruction) => format!("{:03X}: {:04X}  {}", address, word, instruction),
                    Err(_) => format!("{:03X}: {:04X}  DW {:#06x}", address, word, word),
                }
            }
            [byte] => format!("{:03X}: {:02X}    DB {:#04x}", address, byte, byte),
            _ => continue,
        };
        listing.push_str(&line);
        listing.push('\n');
    }
    listing
}

/// Conventional CHIP-8 assembler mnemonics.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Goto(Addr(a)) => write!(f, "JP {:#05x}", a),
            Call(Addr(a)) => write!(f, "CALL {:#05x}", a),
            IfRegEqConst(Reg(x), Const(n)) => write!(f, "SE V{:X}, {:#04x}", x, n),
            IfRegNeqConst(Reg(x), Const(n)) => write!(f, "SNE V{:X}, {:#04x}", x, n),
            IfRegEqReg(Reg(x), Reg(y)) => write!(f, "SE V{:X}, V{:X}", x, y),
            SetRegToConst(Reg(x), Const(n)) => write!(f, "LD V{:X}, {:#04x}", x, n),
            IncRegByConst(Reg(x), Const(n)) => write!(f, "ADD V{:X}, {:#04x}", x, n),
            SetRegToReg(Reg(x), Reg(y)) => write!(f, "LD V{:X}, V{:X}", x, y),
            BitwiseOr(Reg(x), Reg(y)) => write!(f, "OR V{:X}, V{:X}", x, y),
            BitwiseAnd(Reg(x), Reg(y)) => write!(f, "AND V{:X}, V{:X}", x, y),
            BitwiseXor(Reg(x), Reg(y)) => write!(f, "XOR V{:X}, V{:X}", x, y),
            IncRegByReg(Reg(x), Reg(y)) => write!(f, "ADD V{:X}, V{:X}", x, y),
            DecRegByReg(Reg(x), Reg(y)) => write!(f, "SUB V{:X}, V{:X}", x, y),
            BitshiftRight(Reg(x)) => write!(f, "SHR V{:X}", x),
            SetVxVyMinusVx(Reg(x), Reg(y)) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            BitshiftLeft(Reg(x)) => write!(f, "SHL V{:X}", x),
            IfRegNeqReg(Reg(x), Reg(y)) => write!(f, "SNE V{:X}, V{:X}", x, y),
            SetI(Addr(a)) => write!(f, "LD I, {:#05x}", a),
            SetPcToV0PlusAddr(Addr(a)) => write!(f, "JP V0, {:#05x}", a),
            SetVxRand(Reg(x), Const(n)) => write!(f, "RND V{:X}, {:#04x}", x, n),
            Draw(Reg(x), Reg(y), Const(n)) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            IfKeyEqVx(Reg(x)) => write!(f, "SKP V{:X}", x),
            IfKeyNeqVx(Reg(x)) => write!(f, "SKNP V{:X}", x),
            SetRegToDelayTimer(Reg(x)) => write!(f, "LD V{:X}, DT", x),
            SetRegToGetKey(Reg(x)) => write!(f, "LD V{:X}, K", x),
            SetDelayTimerToReg(Reg(x)) => write!(f, "LD DT, V{:X}", x),
            SetSoundTimerToReg(Reg(x)) => write!(f, "LD ST, V{:X}", x),
            AddRegToI(Reg(x)) => write!(f, "ADD I, V{:X}", x),
            SetIToSpriteAddrVx(Reg(x)) => write!(f, "LD F, V{:X}", x),
            SetIToBcdOfReg(Reg(x)) => write!(f, "LD B, V{:X}", x),
            RegDump(Reg(x)) => write!(f, "LD [I], V{:X}", x),
            RegLoad(Reg(x)) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
