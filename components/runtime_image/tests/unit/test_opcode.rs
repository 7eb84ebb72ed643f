//! Tests for the Opcode enum

use runtime_image::Opcode;

#[test]
fn test_memory_opcodes_encode() {
    assert_eq!(Opcode::LoadAccMem.byte(), 0xAD);
    assert_eq!(Opcode::StoreAcc.byte(), 0x8D);
    assert_eq!(Opcode::AddWithCarry.byte(), 0x6D);
    assert_eq!(Opcode::LoadXMem.byte(), 0xAE);
    assert_eq!(Opcode::LoadYMem.byte(), 0xAC);
    assert_eq!(Opcode::CompareX.byte(), 0xEC);
}

#[test]
fn test_constant_opcodes_encode() {
    assert_eq!(Opcode::LoadAccConst.byte(), 0xA9);
    assert_eq!(Opcode::LoadXConst.byte(), 0xA2);
    assert_eq!(Opcode::LoadYConst.byte(), 0xA0);
}

#[test]
fn test_control_opcodes_encode() {
    assert_eq!(Opcode::Break.byte(), 0x00);
    assert_eq!(Opcode::BranchNotEqual.byte(), 0xD0);
    assert_eq!(Opcode::SystemCall.byte(), 0xFF);
    assert_eq!(Opcode::Nop.byte(), 0xEA);
}

#[test]
fn test_mnemonics_share_register() {
    assert_eq!(Opcode::LoadXConst.mnemonic(), Opcode::LoadXMem.mnemonic());
    assert_eq!(Opcode::LoadAccConst.mnemonic(), "LDA");
}
