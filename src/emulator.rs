//! The CHIP-8 interpreter proper, plus the types a host needs to drive it.

#[allow(clippy::module_inception)]
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod opcode;
pub mod output;

pub use self::emulator::Emulator;
pub use self::error::{Error, Result};
