//! Tests for RuntimeImage

use runtime_image::{ImageError, Opcode, RuntimeImage, COLUMNS, IMAGE_SIZE, ROWS};

#[test]
fn test_image_dimensions() {
    let image = RuntimeImage::new();
    assert_eq!(image.rows().len(), ROWS);
    assert!(image.rows().iter().all(|r| r.len() == COLUMNS));
    assert_eq!(IMAGE_SIZE, 256);
}

#[test]
fn test_sequential_writes_advance_cursor() {
    let mut image = RuntimeImage::new();
    image.write_opcode(Opcode::LoadAccConst).unwrap();
    image.write_hex(0x05).unwrap();
    image.write_opcode(Opcode::Break).unwrap();
    assert_eq!(image.cursor(), 3);
    assert_eq!(image.cell(0, 0), "A9");
    assert_eq!(image.cell(0, 1), "05");
    assert_eq!(image.cell(0, 2), "00");
}

#[test]
fn test_current_address_format() {
    let mut image = RuntimeImage::new();
    for _ in 0..0x1A {
        image.write_opcode(Opcode::Nop).unwrap();
    }
    assert_eq!(image.current_address(), "1A 00");
}

#[test]
fn test_symbolic_write_fills_two_cells() {
    let mut image = RuntimeImage::new();
    image.write_symbolic("T4 XX").unwrap();
    assert_eq!(image.cell(0, 0), "T4");
    assert_eq!(image.cell(0, 1), "XX");
    assert_eq!(image.cursor(), 2);
}

#[test]
fn test_code_cannot_run_into_strings() {
    let mut image = RuntimeImage::new();
    image.allocate_string(&"b".repeat(253)).unwrap();
    assert_eq!(image.heap_start(), 2);
    image.write_opcode(Opcode::Nop).unwrap();
    image.write_opcode(Opcode::Nop).unwrap();
    assert!(matches!(
        image.write_opcode(Opcode::Nop),
        Err(ImageError::Overflow(_))
    ));
    // The string storage is untouched
    assert_eq!(image.cell_at(2), "62");
}

#[test]
fn test_string_that_does_not_fit() {
    let mut image = RuntimeImage::new();
    let result = image.allocate_string(&"c".repeat(IMAGE_SIZE));
    assert!(matches!(result, Err(ImageError::Overflow(_))));
    assert!(image.overflowed());
}

#[test]
fn test_dump_has_one_line_per_row() {
    let image = RuntimeImage::new();
    let dump = image.dump();
    assert_eq!(dump.lines().count(), ROWS);
    assert_eq!(dump.lines().next(), Some("00 00 00 00 00 00 00 00"));
}
