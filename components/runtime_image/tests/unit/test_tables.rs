//! Tests for TempTable and JumpTable working with the image

use core_types::Type;
use runtime_image::{format_address, JumpTable, Opcode, RuntimeImage, SlotKind, TempTable};

#[test]
fn test_placeholder_matches_address_until_patched() {
    let mut temps = TempTable::new();
    let entry = temps.allocate("a", Type::Boolean, SlotKind::Variable, 0, 0);
    assert_eq!(entry.placeholder(), "T0 XX");
    assert!(!entry.is_resolved());
}

#[test]
fn test_levels_and_scopes_are_kept() {
    let mut temps = TempTable::new();
    temps.allocate("a", Type::Int, SlotKind::Variable, 3, 2);
    let entry = &temps.entries()[0];
    assert_eq!(entry.scope, 3);
    assert_eq!(entry.level, 2);
    assert_eq!(entry.name, "a");
}

#[test]
fn test_two_pass_resolution() {
    let mut image = RuntimeImage::new();
    let mut temps = TempTable::new();
    let a = temps
        .allocate("a", Type::Int, SlotKind::Variable, 0, 0)
        .placeholder();
    let s = temps
        .allocate("s", Type::String, SlotKind::Variable, 0, 0)
        .placeholder();

    image.write_opcode(Opcode::LoadAccConst).unwrap();
    image.write_hex(0).unwrap();
    image.write_opcode(Opcode::StoreAcc).unwrap();
    image.write_symbolic(&a).unwrap();
    image.write_opcode(Opcode::StoreAcc).unwrap();
    image.write_symbolic(&s).unwrap();
    image.write_opcode(Opcode::Break).unwrap();

    let code_end = image.reserve_static(temps.static_size()).unwrap();
    assert_eq!(code_end, 9);
    let resolved: Vec<(String, String)> = temps
        .entries()
        .iter()
        .map(|e| (e.placeholder(), format_address(code_end + e.offset - 1)))
        .collect();
    for (placeholder, address) in resolved {
        image.backpatch(&mut temps, &placeholder, &address).unwrap();
    }

    assert_eq!(temps.entries()[0].address, "09 00");
    assert_eq!(temps.entries()[1].address, "0A 00");
    assert_eq!(image.cell_at(3), "09");
    assert_eq!(image.cell_at(6), "0A");
    assert!(temps.is_resolved());
}

#[test]
fn test_jump_table_resolution_through_image() {
    let mut image = RuntimeImage::new();
    let mut jumps = JumpTable::new();
    let first = jumps.allocate();
    let second = jumps.allocate();
    image.write_symbolic(&first).unwrap();
    image.write_symbolic(&second).unwrap();
    image.patch_jump(&mut jumps, &second, 3).unwrap();
    assert_eq!(image.cell_at(1), "03");
    assert_eq!(image.cell_at(0), "J0");
    assert!(!jumps.is_resolved());
}
