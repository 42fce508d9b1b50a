//! The CHIP-8 virtual machine as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::emulator::error::{Error, Result};
use crate::emulator::input::Keypad;
use crate::emulator::instruction::*;
use crate::emulator::opcode::Opcode;
use crate::emulator::output::Framebuffer;

pub const MEM_SIZE: usize = 4096;
pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const PC_START: u16 = 0x200;
pub const FONT_ADDR: u16 = 0x050;
pub const FONT_GLYPH_SIZE: u16 = 5;
/// The largest program `load` accepts.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - PC_START as usize;

const FLAG: usize = 0xF;
const ADDR_MASK: u16 = 0x0FFF;
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Borrow `len` bytes of memory starting at `address`.
fn region(memory: &[u8], address: usize, len: usize) -> Result<&[u8]> {
    memory
        .get(address..address + len)
        .ok_or(Error::OutOfBounds { address, len })
}

/// Like `region`, but only program space is writable.
fn region_mut(memory: &mut [u8], address: usize, len: usize) -> Result<&mut [u8]> {
    if address < PC_START as usize {
        return Err(Error::OutOfBounds { address, len });
    }
    memory
        .get_mut(address..address + len)
        .ok_or(Error::OutOfBounds { address, len })
}

#[derive(Clone)]
pub struct Emulator {
    memory: [u8; MEM_SIZE],
    registers: [u8; NUM_REGISTERS],
    delay_timer: u8,
    sound_timer: u8,
    i: u16,
    program_counter: u16,
    stack_pointer: u8,
    stack: [u16; STACK_SIZE],
    screen: Framebuffer,
    keypad: Keypad,

    // Register waiting for a key press, see `Instruction::SetRegToGetKey`
    awaiting_key: Option<Reg>,
    redraw: bool,
    rng: StdRng,
}

impl fmt::Display for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.screen)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Create a new emulator with the font loaded and everything else zeroed.
    pub fn new() -> Emulator {
        Emulator::with_rng(StdRng::from_entropy())
    }

    /// Create a new emulator whose random instructions
    /// produce the same sequence on every run.
    pub fn with_seed(seed: u64) -> Emulator {
        Emulator::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Emulator {
        let mut memory = [0; MEM_SIZE];
        let font_start = FONT_ADDR as usize;
        memory[font_start..font_start + FONT.len()].copy_from_slice(&FONT);

        Emulator {
            memory,
            registers: [0; NUM_REGISTERS],
            delay_timer: 0,
            sound_timer: 0,
            i: 0,
            program_counter: PC_START,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            screen: Framebuffer::new(),
            keypad: Keypad::new(),
            awaiting_key: None,
            redraw: false,
            rng,
        }
    }

    /// Return to the freshly constructed state. The random source is kept.
    pub fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Emulator::with_rng(rng);
    }

    /// Copy a program into memory at 0x200.
    ///
    /// Programs larger than `MAX_PROGRAM_SIZE` are rejected
    /// without touching memory.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::LoadTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let start = PC_START as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
        log::debug!("Loaded {} bytes at {:#05x}", program.len(), start);
        Ok(())
    }

    /// Perform a single cycle: fetch the instruction at the program counter,
    /// advance past it, execute it, then count both timers down by one.
    ///
    /// If anything fails the emulator is left as it was before the call,
    /// so the host can decide to halt, skip the instruction, or retry.
    pub fn cycle(&mut self) -> Result<()> {
        if let Some(Reg(x)) = self.awaiting_key {
            if let Some(key) = self.keypad.first_pressed() {
                log::debug!("Got key {:X}, resuming", key);
                self.registers[x as usize] = key;
                self.awaiting_key = None;
            }
            self.tick_timers();
            return Ok(());
        }

        let address = self.program_counter;
        let (word, instruction) = self.fetch()?;
        log::trace!("{:#05x}: {:04X} {}", address, word, instruction);

        self.program_counter += 2;
        if let Err(error) = self.execute_at(instruction, address) {
            self.program_counter = address;
            return Err(error);
        }

        self.tick_timers();
        Ok(())
    }

    /// Read and decode the instruction at the program counter.
    fn fetch(&self) -> Result<(u16, Instruction)> {
        let address = self.program_counter;
        let bytes = region(&self.memory, address as usize, 2)?;
        let word = Opcode::from_two_u8(bytes[0], bytes[1]).word();
        Ok((word, Instruction::decode_at(word, address)?))
    }

    fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Move the program counter past the current instruction without running it.
    /// Useful for continuing after an unknown instruction.
    pub fn skip_instruction(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    /// Execute a single instruction, without fetching or touching the timers.
    pub fn execute_single(&mut self, instruction: Instruction) -> Result<()> {
        self.execute_at(instruction, self.program_counter)
    }

    /// Execute `instruction`, which was fetched from `address`.
    /// Every branch validates before it mutates anything.
    fn execute_at(&mut self, instruction: Instruction, address: u16) -> Result<()> {
        match instruction {
            Instruction::ClearScreen => {
                self.screen.clear();
                self.redraw = true;
            }

            // Return to the previous call site via the stack.
            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Err(Error::StackUnderflow { address });
                }
                self.stack_pointer -= 1;
                self.program_counter = self.stack[self.stack_pointer as usize];
            }

            Instruction::Goto(Addr(addr)) => {
                self.program_counter = addr & ADDR_MASK;
            }

            // Store the return address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                if self.stack_pointer as usize >= STACK_SIZE {
                    return Err(Error::StackOverflow { address });
                }
                self.stack[self.stack_pointer as usize] = self.program_counter;
                self.stack_pointer += 1;
                self.program_counter = addr & ADDR_MASK;
            }

            Instruction::IfRegEqConst(Reg(x), Const(n)) => {
                self.skip_if(self.registers[x as usize] == n);
            }

            Instruction::IfRegNeqConst(Reg(x), Const(n)) => {
                self.skip_if(self.registers[x as usize] != n);
            }

            Instruction::IfRegEqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.registers[x as usize] == self.registers[y as usize]);
            }

            Instruction::SetRegToConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = n;
            }

            // Wraps, and leaves VF alone
            Instruction::IncRegByConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(n);
            }

            Instruction::SetRegToReg(Reg(x), Reg(y)) => {
                self.registers[x as usize] = self.registers[y as usize];
            }

            Instruction::BitwiseOr(Reg(x), Reg(y)) => {
                self.registers[x as usize] |= self.registers[y as usize];
            }

            Instruction::BitwiseAnd(Reg(x), Reg(y)) => {
                self.registers[x as usize] &= self.registers[y as usize];
            }

            Instruction::BitwiseXor(Reg(x), Reg(y)) => {
                self.registers[x as usize] ^= self.registers[y as usize];
            }

            // The flag is always written last, so it survives when x is VF.
            Instruction::IncRegByReg(Reg(x), Reg(y)) => {
                let (sum, carry) =
                    self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.set_with_flag(x, sum, carry);
            }

            Instruction::DecRegByReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.set_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
            }

            Instruction::BitshiftRight(Reg(x)) => {
                let vx = self.registers[x as usize];
                self.set_with_flag(x, vx >> 1, vx & 0x01 != 0);
            }

            Instruction::SetVxVyMinusVx(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.set_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
            }

            Instruction::BitshiftLeft(Reg(x)) => {
                let vx = self.registers[x as usize];
                self.set_with_flag(x, vx << 1, vx & 0x80 != 0);
            }

            Instruction::IfRegNeqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.registers[x as usize] != self.registers[y as usize]);
            }

            Instruction::SetI(Addr(addr)) => {
                self.i = addr & ADDR_MASK;
            }

            // Only the operand is masked, a jump past the end of memory
            // fails on the next fetch.
            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                self.program_counter = self.registers[0] as u16 + (addr & ADDR_MASK);
            }

            Instruction::SetVxRand(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.rng.gen::<u8>() & n;
            }

            // XOR the sprite at I onto the screen. Pixels past an edge wrap
            // around to the other side.
            Instruction::Draw(Reg(x), Reg(y), Const(sprite_height)) => {
                let x_coord = self.registers[x as usize] as usize;
                let y_coord = self.registers[y as usize] as usize;
                let sprite = region(&self.memory, self.i as usize, sprite_height as usize)?;

                let mut any_collisions = false;
                for (row, &bits) in sprite.iter().enumerate() {
                    for column in 0..8 {
                        if bits & (0x80 >> column) != 0 {
                            any_collisions |= self.screen.toggle(x_coord + column, y_coord + row);
                        }
                    }
                }

                self.registers[FLAG] = any_collisions as u8;
                self.redraw = true;
            }

            Instruction::IfKeyEqVx(Reg(x)) => {
                let pressed = self.keypad.is_pressed(self.registers[x as usize])?;
                self.skip_if(pressed);
            }

            Instruction::IfKeyNeqVx(Reg(x)) => {
                let pressed = self.keypad.is_pressed(self.registers[x as usize])?;
                self.skip_if(!pressed);
            }

            Instruction::SetRegToDelayTimer(Reg(x)) => {
                self.registers[x as usize] = self.delay_timer;
            }

            // Take a key that is already down, or wait for one in the following cycles.
            Instruction::SetRegToGetKey(Reg(x)) => match self.keypad.first_pressed() {
                Some(key) => self.registers[x as usize] = key,
                None => {
                    log::debug!("Waiting for a key press into V{:X}", x);
                    self.awaiting_key = Some(Reg(x));
                }
            },

            Instruction::SetDelayTimerToReg(Reg(x)) => {
                self.delay_timer = self.registers[x as usize];
            }

            Instruction::SetSoundTimerToReg(Reg(x)) => {
                self.sound_timer = self.registers[x as usize];
            }

            // I stays inside the 12-bit address space, VF is untouched.
            Instruction::AddRegToI(Reg(x)) => {
                self.i = self.i.wrapping_add(self.registers[x as usize] as u16) & ADDR_MASK;
            }

            // Each glyph is 5 bytes, only the low nibble selects one.
            Instruction::SetIToSpriteAddrVx(Reg(x)) => {
                let digit = (self.registers[x as usize] & 0x0F) as u16;
                self.i = FONT_ADDR + digit * FONT_GLYPH_SIZE;
            }

            Instruction::SetIToBcdOfReg(Reg(x)) => {
                let value = self.registers[x as usize];
                let digits = region_mut(&mut self.memory, self.i as usize, 3)?;
                digits.copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                let count = x as usize + 1;
                let target = region_mut(&mut self.memory, self.i as usize, count)?;
                target.copy_from_slice(&self.registers[..count]);
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                let count = x as usize + 1;
                let source = region(&self.memory, self.i as usize, count)?;
                self.registers[..count].copy_from_slice(source);
            }
        };

        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    fn set_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.registers[x as usize] = value;
        self.registers[FLAG] = flag as u8;
    }

    /// Press or release a key on the keypad.
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        self.keypad.set(key, pressed)
    }

    pub fn release_all_keys(&mut self) {
        self.keypad.release_all();
    }

    /// Whether the screen changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    /// Whether a `LD Vx, K` is blocking until a key is pressed.
    pub fn is_awaiting_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    /// The host should sound a tone while this holds.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }
}
