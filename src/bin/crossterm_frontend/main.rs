use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip8_vm::emulator::output::EmulatorOutput;
use chip8_vm::emulator::Emulator;
use chip8_vm::options::Opt;

mod crossterm_io;
mod key_buffer;
mod key_manager;

use crossterm_io::CrosstermOutput;
use key_manager::KeyManager;

/// How long a key counts as held after the terminal reports a press.
const KEY_HOLD: Duration = Duration::from_millis(150);

fn main() -> Result<(), Box<dyn Error>> {
    // Get configuration and read input file.
    // Logs go to stderr, redirect it to keep them off the screen.
    let opt = Opt::from_args();
    opt.init_logger();
    log::info!("Executing {:?}", &opt.input);
    let program = std::fs::read(&opt.input)?;

    // Load instructions into emulator memory
    let mut emulator = match opt.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    emulator.load(&program)?;

    let key_manager = KeyManager::new(KEY_HOLD);
    let mut output = CrosstermOutput::new()?;
    let mut cycles: u64 = 0;
    let mut halted = None;

    // Start execution
    while !key_manager.quit_requested() && opt.max_cycles.map_or(true, |max| cycles < max) {
        let started = Instant::now();

        for (key, &held) in key_manager.held_keys().iter().enumerate() {
            emulator.set_key(key as u8, held)?;
        }

        if let Err(error) = emulator.cycle() {
            if let Err(error) = opt.on_unknown.recover(&mut emulator, error) {
                halted = Some(error);
                break;
            }
        }
        cycles += 1;

        if emulator.take_redraw() {
            output.refresh(emulator.framebuffer());
        }

        if let Some(rest) = opt.cycle_duration().checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    // Give the terminal back before reporting anything
    drop(output);
    drop(key_manager);
    log::info!("Stopped after {} cycles", cycles);

    match halted {
        Some(error) => {
            log::error!("Halted: {}", error);
            Err(error.into())
        }
        None => Ok(()),
    }
}
