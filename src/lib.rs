/*!

A CHIP-8 virtual machine as specified at https://en.wikipedia.org/wiki/CHIP-8.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <program>`.
The keys 1234, QWER, ASDF and ZXCV make up the keypad, but which ones to use depend on the CHIP-8 program.
Press Esc to quit.

For a quick look without a terminal UI, `cargo run --bin no_frontend -- <program> --max-cycles 1000`
runs the program headless and prints the screen at the end,
and `--disassemble` lists the program instead of running it.

# Library

The main way of running a program is to load instructions as bytes and call `cycle` once per tick.

```rust
use chip8_vm::emulator::Emulator;

let mut emulator = Emulator::new();

// Load a program at address 0x200: V0 = 5, then V0 += 3.
emulator.load(&[0x60, 0x05, 0x70, 0x03]).unwrap();
emulator.cycle().unwrap();
emulator.cycle().unwrap();

assert_eq!(emulator.registers()[0], 8);
assert_eq!(emulator.program_counter(), 0x204);
```

Alternatively, you can experiment by executing instructions manually.

```rust
use chip8_vm::emulator::Emulator;
use chip8_vm::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new();

emulator.execute_single(Instruction::ClearScreen).unwrap();
emulator.execute_single(Instruction::SetRegToConst(Reg(0xA), Const(35))).unwrap();
emulator.execute_single(Instruction::SetRegToReg(Reg(0xB), Reg(0xA))).unwrap();
emulator.execute_single(Instruction::Goto(Addr(0x250))).unwrap();

assert_eq!(emulator.registers()[0xB], 35);
```

## Input and output

The emulator owns its keypad and framebuffer. Between cycles the host presses and
releases keys with `set_key`, and when `take_redraw` says the screen changed it
hands `framebuffer()` to something implementing `EmulatorOutput`.

```rust
use chip8_vm::emulator::Emulator;
use chip8_vm::emulator::output::{DummyOutput, EmulatorOutput};

let mut emulator = Emulator::new();
let mut output = DummyOutput::new();

emulator.load(&[0x00, 0xE0]).unwrap();
emulator.set_key(0x5, true).unwrap();
emulator.cycle().unwrap();

if emulator.take_redraw() {
    output.refresh(emulator.framebuffer());
}
assert_eq!(output.refreshes(), 1);
```

Errors (unknown instructions, out of bounds accesses, stack misuse) are returned
from `cycle` without changing any state, so the host decides whether to stop,
`skip_instruction`, or carry on.
*/

pub mod emulator;
pub mod options;
