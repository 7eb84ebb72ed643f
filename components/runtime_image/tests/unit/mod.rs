//! Unit tests for the runtime image system

mod test_image;
mod test_opcode;
mod test_tables;
