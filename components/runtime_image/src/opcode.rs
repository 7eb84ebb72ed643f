//! Opcodes written into the runtime image
//!
//! A small accumulator-machine vocabulary. Only the byte encoding matters:
//! the image demonstrates storage allocation and backpatching, it is not
//! meant to be executed.

use std::fmt;

/// Instruction opcodes emitted by the code generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Load the accumulator with a constant
    LoadAccConst,
    /// Load the accumulator from memory
    LoadAccMem,
    /// Store the accumulator to memory
    StoreAcc,
    /// Add memory to the accumulator
    AddWithCarry,
    /// Load the X register with a constant
    LoadXConst,
    /// Load the X register from memory
    LoadXMem,
    /// Load the Y register with a constant
    LoadYConst,
    /// Load the Y register from memory
    LoadYMem,
    /// No operation
    Nop,
    /// Break (end of program)
    Break,
    /// Compare memory to the X register, setting the Z flag
    CompareX,
    /// Branch n bytes if the Z flag is clear
    BranchNotEqual,
    /// System call (print the Y register, mode in X)
    SystemCall,
}

impl Opcode {
    /// Encoded byte value
    pub fn byte(&self) -> u8 {
        match self {
            Opcode::LoadAccConst => 0xA9,
            Opcode::LoadAccMem => 0xAD,
            Opcode::StoreAcc => 0x8D,
            Opcode::AddWithCarry => 0x6D,
            Opcode::LoadXConst => 0xA2,
            Opcode::LoadXMem => 0xAE,
            Opcode::LoadYConst => 0xA0,
            Opcode::LoadYMem => 0xAC,
            Opcode::Nop => 0xEA,
            Opcode::Break => 0x00,
            Opcode::CompareX => 0xEC,
            Opcode::BranchNotEqual => 0xD0,
            Opcode::SystemCall => 0xFF,
        }
    }

    /// Number of operand bytes following the opcode
    pub fn operand_len(&self) -> usize {
        match self {
            Opcode::LoadAccConst
            | Opcode::LoadXConst
            | Opcode::LoadYConst
            | Opcode::BranchNotEqual => 1,
            Opcode::LoadAccMem
            | Opcode::StoreAcc
            | Opcode::AddWithCarry
            | Opcode::LoadXMem
            | Opcode::LoadYMem
            | Opcode::CompareX => 2,
            Opcode::Nop | Opcode::Break | Opcode::SystemCall => 0,
        }
    }

    /// Check if this opcode takes a memory address operand
    pub fn takes_address(&self) -> bool {
        self.operand_len() == 2
    }

    /// Assembler mnemonic
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::LoadAccConst | Opcode::LoadAccMem => "LDA",
            Opcode::StoreAcc => "STA",
            Opcode::AddWithCarry => "ADC",
            Opcode::LoadXConst | Opcode::LoadXMem => "LDX",
            Opcode::LoadYConst | Opcode::LoadYMem => "LDY",
            Opcode::Nop => "NOP",
            Opcode::Break => "BRK",
            Opcode::CompareX => "CPX",
            Opcode::BranchNotEqual => "BNE",
            Opcode::SystemCall => "SYS",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.byte())
    }
}
