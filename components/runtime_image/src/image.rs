//! Runtime image - the fixed 256-byte memory grid code is emitted into
//!
//! Code grows upward from address 00 through a sequential write cursor,
//! string constants grow downward from the top of the image, and static
//! variable storage sits directly after the code once it is reserved.

use crate::error::{ImageError, ImageResult};
use crate::jump_table::JumpTable;
use crate::opcode::Opcode;
use crate::temp_table::TempTable;
use serde::Serialize;
use std::collections::HashMap;

/// Rows in the image grid
pub const ROWS: usize = 32;
/// Columns (bytes) per row
pub const COLUMNS: usize = 8;
/// Total bytes in the image
pub const IMAGE_SIZE: usize = ROWS * COLUMNS;
/// Initial content of every cell
pub const EMPTY_CELL: &str = "00";

/// Fixed-size two-dimensional byte grid with a write cursor.
///
/// Cells hold two-character strings: either a hex byte or one half of a
/// symbolic placeholder such as `T0 XX` or `J1`. Every placeholder write is
/// indexed so backpatching rewrites exactly the cells that hold it.
///
/// # Examples
///
/// ```
/// use runtime_image::{Opcode, RuntimeImage};
///
/// let mut image = RuntimeImage::new();
/// image.write_opcode(Opcode::LoadAccConst).unwrap();
/// image.write_hex(0x07).unwrap();
/// assert_eq!(image.cell(0, 0), "A9");
/// assert_eq!(image.current_address(), "02 00");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeImage {
    rows: Vec<Vec<String>>,
    #[serde(skip)]
    row: usize,
    #[serde(skip)]
    column: usize,
    #[serde(skip)]
    heap_start: usize,
    #[serde(skip)]
    placeholders: HashMap<String, Vec<usize>>,
    #[serde(skip)]
    strings: HashMap<String, u8>,
    #[serde(skip)]
    overflowed: bool,
}

impl RuntimeImage {
    /// Create an image with every cell set to `00`
    pub fn new() -> Self {
        Self {
            rows: vec![vec![EMPTY_CELL.to_string(); COLUMNS]; ROWS],
            row: 0,
            column: 0,
            heap_start: IMAGE_SIZE,
            placeholders: HashMap::new(),
            strings: HashMap::new(),
            overflowed: false,
        }
    }

    /// Linear index of the write cursor
    pub fn cursor(&self) -> usize {
        self.row * COLUMNS + self.column
    }

    /// Row and column of the write cursor
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    /// Lowest address used by string constants (`IMAGE_SIZE` when none)
    pub fn heap_start(&self) -> usize {
        self.heap_start
    }

    /// True once any write or allocation has been dropped for lack of space
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// The cursor address formatted like a resolved temp address (`LL HH`)
    pub fn current_address(&self) -> String {
        format_address(self.cursor())
    }

    /// Cell content at `row`, `column`
    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row % ROWS][column % COLUMNS]
    }

    /// Cell content at a linear index
    pub fn cell_at(&self, index: usize) -> &str {
        self.cell(index / COLUMNS, index % COLUMNS)
    }

    /// The whole grid, row by row
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn set(&mut self, index: usize, value: &str) {
        self.rows[index / COLUMNS][index % COLUMNS] = value.to_string();
    }

    fn overflow(&mut self, what: String) -> ImageError {
        if !self.overflowed {
            log::warn!("runtime image overflow: {}", what);
        }
        self.overflowed = true;
        ImageError::Overflow(what)
    }

    /// Write one cell at the cursor and advance, wrapping to the next row.
    ///
    /// Writing into string storage or past the last cell is reported as
    /// [`ImageError::Overflow`] and the write is dropped.
    pub fn write_byte(&mut self, byte: &str) -> ImageResult<()> {
        let index = self.cursor();
        if index >= self.heap_start {
            return Err(self.overflow(format!("no room for byte {} at {:02X}", byte, index)));
        }
        log::trace!("{:02X}: {}", index, byte);
        self.set(index, byte);
        self.column += 1;
        if self.column == COLUMNS {
            self.column = 0;
            self.row += 1;
        }
        Ok(())
    }

    /// Write a byte value as two hex digits
    pub fn write_hex(&mut self, value: u8) -> ImageResult<()> {
        self.write_byte(&format!("{:02X}", value))
    }

    /// Write an opcode byte
    pub fn write_opcode(&mut self, opcode: Opcode) -> ImageResult<()> {
        self.write_byte(&opcode.to_string())
    }

    /// Write a symbolic address (`T0 XX` fills two cells, `J0` one) and
    /// remember where it went.
    ///
    /// Nothing is written unless every cell of the placeholder fits.
    pub fn write_symbolic(&mut self, symbol: &str) -> ImageResult<()> {
        let start = self.cursor();
        let parts: Vec<&str> = symbol.split_whitespace().collect();
        if start + parts.len() > self.heap_start {
            return Err(self.overflow(format!("no room for {} at {:02X}", symbol, start)));
        }
        for part in parts {
            self.write_byte(part)?;
        }
        self.placeholders
            .entry(symbol.to_string())
            .or_default()
            .push(start);
        Ok(())
    }

    /// Write directly to a two-hex-digit address without moving the cursor
    pub fn write_at(&mut self, address: &str, byte: &str) -> ImageResult<()> {
        let index = parse_address(address)?;
        self.set(index, byte);
        Ok(())
    }

    /// Read the cell at a two-hex-digit address
    pub fn read_at(&self, address: &str) -> ImageResult<&str> {
        Ok(self.cell_at(parse_address(address)?))
    }

    /// Cell indices where `symbol` has been written and not yet patched
    pub fn occurrences(&self, symbol: &str) -> &[usize] {
        self.placeholders
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Place a NUL-terminated string at the top of free memory and return
    /// its address. Identical strings share storage.
    pub fn allocate_string(&mut self, value: &str) -> ImageResult<u8> {
        if let Some(&address) = self.strings.get(value) {
            return Ok(address);
        }
        let needed = value.len() + 1;
        if self.heap_start < needed || self.heap_start - needed < self.cursor() {
            return Err(self.overflow(format!("no room for string \"{}\"", value)));
        }
        let start = self.heap_start - needed;
        for (i, byte) in value.bytes().enumerate() {
            self.set(start + i, &format!("{:02X}", byte));
        }
        self.set(start + value.len(), EMPTY_CELL);
        self.heap_start = start;

        // start < IMAGE_SIZE, so it fits in one byte
        let address = start as u8;
        self.strings.insert(value.to_string(), address);
        log::debug!("stored \"{}\" at {:02X}", value, address);
        Ok(address)
    }

    /// Reserve `size` bytes of static storage directly after the code and
    /// return the first address.
    pub fn reserve_static(&mut self, size: usize) -> ImageResult<usize> {
        let start = self.cursor();
        if start + size > self.heap_start {
            return Err(self.overflow(format!(
                "{} bytes of static storage do not fit between {:02X} and {:02X}",
                size, start, self.heap_start
            )));
        }
        Ok(start)
    }

    /// Rewrite every recorded occurrence of a temp placeholder with its
    /// resolved address and store the address in the temp table entry.
    ///
    /// Returns the number of occurrences patched.
    pub fn backpatch(
        &mut self,
        temps: &mut TempTable,
        placeholder: &str,
        resolved: &str,
    ) -> ImageResult<usize> {
        let resolved_cells: Vec<&str> = resolved.split_whitespace().collect();
        for cell in &resolved_cells {
            validate_hex(cell)?;
        }
        let entry = temps
            .by_placeholder_mut(placeholder)
            .ok_or_else(|| ImageError::UnknownSymbol(placeholder.to_string()))?;

        let patched = self.rewrite(placeholder, &resolved_cells);
        entry.address = resolved.to_string();
        log::debug!("backpatched {} -> {} ({} occurrences)", placeholder, resolved, patched);
        Ok(patched)
    }

    /// Rewrite every occurrence of a jump placeholder with `length` and
    /// record the length in the jump table.
    pub fn patch_jump(&mut self, jumps: &mut JumpTable, tag: &str, length: u8) -> ImageResult<usize> {
        if !jumps.resolve(tag, length) {
            return Err(ImageError::UnknownSymbol(tag.to_string()));
        }
        let value = format!("{:02X}", length);
        let patched = self.rewrite(tag, &[value.as_str()]);
        log::debug!("backpatched {} -> {} ({} occurrences)", tag, value, patched);
        Ok(patched)
    }

    fn rewrite(&mut self, symbol: &str, replacement: &[&str]) -> usize {
        let symbol_cells: Vec<&str> = symbol.split_whitespace().collect();
        let starts = self.placeholders.remove(symbol).unwrap_or_default();
        let mut patched = 0;
        for start in starts {
            let mut wrote = false;
            for (i, value) in replacement.iter().enumerate() {
                let index = start + i;
                if index >= IMAGE_SIZE {
                    break;
                }
                if symbol_cells.get(i).map_or(false, |c| self.cell_at(index) == *c) {
                    self.set(index, value);
                    wrote = true;
                }
            }
            if wrote {
                patched += 1;
            }
        }
        patched
    }

    /// Render the grid as `ROWS` lines of space-separated cells
    pub fn dump(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for RuntimeImage {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a linear index as a little-endian two-byte address (`LL HH`)
pub fn format_address(index: usize) -> String {
    format!("{:02X} {:02X}", index & 0xFF, (index >> 8) & 0xFF)
}

fn validate_hex(cell: &str) -> ImageResult<u8> {
    if cell.len() != 2 {
        return Err(ImageError::InvalidAddress(cell.to_string()));
    }
    u8::from_str_radix(cell, 16).map_err(|_| ImageError::InvalidAddress(cell.to_string()))
}

fn parse_address(address: &str) -> ImageResult<usize> {
    validate_hex(address).map(usize::from)
}
