use std::io;
use std::time::Instant;

use structopt::StructOpt;

use chip8_vm::emulator::instruction::disassemble;
use chip8_vm::emulator::output::{DummyOutput, EmulatorOutput};
use chip8_vm::emulator::Emulator;
use chip8_vm::options::Opt;

fn main() -> io::Result<()> {
    // Get configuration and read input file
    let opt = Opt::from_args();
    opt.init_logger();
    log::info!("Executing {:?}", &opt.input);
    let program = std::fs::read(&opt.input)?;

    if opt.disassemble {
        print!("{}", disassemble(&program));
        return Ok(());
    }

    let mut emulator = match opt.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    emulator
        .load(&program)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    let mut output = DummyOutput::new();
    let mut cycles: u64 = 0;
    let mut halted = None;

    while opt.max_cycles.map_or(true, |max| cycles < max) {
        let started = Instant::now();

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
            std::thread::sleep(rest);
        }
    }

    print!("{}", emulator);
    log::info!(
        "Ran {} cycles, {} screen updates",
        cycles,
        output.refreshes()
    );

    match halted {
        Some(error) => {
            log::error!("Halted: {}", error);
            Err(io::Error::new(io::ErrorKind::Other, error))
        }
        None => Ok(()),
    }
}
