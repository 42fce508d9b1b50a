//! Everything that can go wrong while loading or running a program.
//!
//! None of these leave the emulator half-updated: the operation that
//! returned the error did not change any state.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The fetched word is not one of the 35 CHIP-8 instructions.
    #[error("unknown instruction {word:#06x} at {address:#05x}")]
    UnknownInstruction { word: u16, address: u16 },

    /// The program does not fit in program space.
    #[error("program is {size} bytes, but only {max} bytes fit in memory")]
    LoadTooLarge { size: usize, max: usize },

    /// A fetch, draw, BCD store or register block transfer
    /// would touch memory past the last address.
    #[error("access of {len} bytes at {address:#05x} is outside memory")]
    OutOfBounds { address: usize, len: usize },

    /// A call with all 16 stack entries in use.
    #[error("stack overflow when calling from {address:#05x}")]
    StackOverflow { address: u16 },

    /// A return with an empty stack.
    #[error("stack underflow when returning from {address:#05x}")]
    StackUnderflow { address: u16 },

    /// A register used as a keypad index holds a value above 0xF.
    #[error("key {key:#04x} is not on the keypad")]
    InvalidKey { key: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_include_offending_values() {
        let error = Error::UnknownInstruction {
            word: 0x5AB1,
            address: 0x204,
        };
        assert_eq!(error.to_string(), "unknown instruction 0x5ab1 at 0x204");

        let error = Error::LoadTooLarge { size: 3585, max: 3584 };
        assert_eq!(
            error.to_string(),
            "program is 3585 bytes, but only 3584 bytes fit in memory"
        );
    }
}
