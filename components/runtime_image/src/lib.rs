//! Runtime image system for the block-language compiler
//!
//! This crate provides the storage the code generator emits into, and the
//! bookkeeping tables that let it emit symbolic placeholders first and
//! resolve them once final addresses and branch lengths are known.
//!
//! # Features
//!
//! - Fixed 32×8 byte grid with a wrapping write cursor
//! - Downward-growing string storage at the top of the image
//! - Temp table of symbolic storage slots (`T0 XX`, `T1 XX`, ...)
//! - Jump table of forward branch lengths (`J0`, `J1`, ...)
//! - Index-based backpatching of every placeholder occurrence
//!
//! # Example
//!
//! ```
//! use core_types::Type;
//! use runtime_image::{Opcode, RuntimeImage, SlotKind, TempTable};
//!
//! let mut image = RuntimeImage::new();
//! let mut temps = TempTable::new();
//!
//! // Allocate storage for `int x` and store 1 into it
//! let slot = temps.allocate("x", Type::Int, SlotKind::Variable, 0, 0).placeholder();
//! image.write_opcode(Opcode::LoadAccConst).unwrap();
//! image.write_hex(1).unwrap();
//! image.write_opcode(Opcode::StoreAcc).unwrap();
//! image.write_symbolic(&slot).unwrap();
//! image.write_opcode(Opcode::Break).unwrap();
//!
//! // Resolve the placeholder once the code size is known
//! let address = image.current_address();
//! image.backpatch(&mut temps, &slot, &address).unwrap();
//! assert_eq!(temps.entries()[0].address, "06 00");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod image;
pub mod jump_table;
pub mod opcode;
pub mod temp_table;

// Re-export main types at crate root
pub use error::{ImageError, ImageResult};
pub use image::{format_address, RuntimeImage, COLUMNS, EMPTY_CELL, IMAGE_SIZE, ROWS};
pub use jump_table::{JumpTable, JumpTableEntry};
pub use opcode::Opcode;
pub use temp_table::{SlotKind, TempTable, TempTableEntry, PLACEHOLDER_HIGH};
