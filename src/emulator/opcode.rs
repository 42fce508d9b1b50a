/// A fetched 16-bit instruction word, with accessors for the
/// fields the instruction set is described in terms of.
///
/// Writing the word as `0xKXYN`, the fields are
/// - `kind`: the top nibble, selects the instruction group
/// - `x`: bits 8-11, usually a register
/// - `y`: bits 4-7, usually a register
/// - `n`: bits 0-3
/// - `nn`: bits 0-7
/// - `nnn`: bits 0-11, usually an address
///
/// Each accessor is a pure function of the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {
    pub fn new(word: u16) -> Opcode {
        Opcode(word)
    }

    /// Combine two bytes in big-endian order, as they are laid out in memory.
    pub fn from_two_u8(high: u8, low: u8) -> Opcode {
        Opcode(((high as u16) << 8) | low as u16)
    }

    pub fn word(self) -> u16 {
        self.0
    }

    pub fn kind(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn nn(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// All four nibbles, most significant first. Handy for matching.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (self.kind(), self.x(), self.y(), self.n())
    }
}
