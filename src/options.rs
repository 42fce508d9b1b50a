//! Command line options shared by the frontends.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use structopt::StructOpt;

use crate::emulator::{Emulator, Error};

/// What a frontend does when the program hits an unknown instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnUnknown {
    /// Stop running the program.
    Halt,
    /// Log it, step over it and keep going.
    Skip,
}

impl FromStr for OnUnknown {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "halt" => Ok(OnUnknown::Halt),
            "skip" => Ok(OnUnknown::Skip),
            other => Err(format!("expected `halt` or `skip`, got `{}`", other)),
        }
    }
}

impl OnUnknown {
    /// Apply the policy to an error returned from `Emulator::cycle`.
    /// Gives the error back if the program should stop.
    pub fn recover(self, emulator: &mut Emulator, error: Error) -> Result<(), Error> {
        if self == OnUnknown::Skip && matches!(error, Error::UnknownInstruction { .. }) {
            log::warn!("{}, skipping it", error);
            emulator.skip_instruction();
            return Ok(());
        }
        Err(error)
    }
}

/// The program options.
#[derive(StructOpt, Debug)]
pub struct Opt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    pub input: PathBuf,

    /// Cycles per second. Timers count down once per cycle.
    #[structopt(short, long, default_value = "60")]
    pub rate: u32,

    /// Stop after this many cycles
    #[structopt(long)]
    pub max_cycles: Option<u64>,

    /// Seed for the random number instruction
    #[structopt(long)]
    pub seed: Option<u64>,

    /// What to do on an unknown instruction: halt or skip
    #[structopt(long, default_value = "halt")]
    pub on_unknown: OnUnknown,

    /// Print a listing of the program instead of running it
    #[structopt(long)]
    pub disassemble: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Opt {
    /// How long one cycle should take.
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_secs(1) / self.rate.max(1)
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Set up `env_logger` at the level asked for with `-v`.
    /// `RUST_LOG` can still narrow it down per module.
    pub fn init_logger(&self) {
        let filters = std::env::var("RUST_LOG").ok();
        self.logger(filters.as_deref()).init();
    }

    fn logger(&self, filters: Option<&str>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(self.log_level());
        if let Some(filters) = filters {
            builder.parse_filters(filters);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let opt = Opt::from_iter(&["chip8", "game.ch8"]);
        assert_eq!(opt.input, PathBuf::from("game.ch8"));
        assert_eq!(opt.rate, 60);
        assert_eq!(opt.max_cycles, None);
        assert_eq!(opt.on_unknown, OnUnknown::Halt);
        assert_eq!(opt.log_level(), LevelFilter::Warn);
        assert!(!opt.disassemble);
    }

    #[test]
    fn all_options() {
        let opt = Opt::from_iter(&[
            "chip8",
            "game.ch8",
            "--rate",
            "500",
            "--max-cycles",
            "10",
            "--seed",
            "3",
            "--on-unknown",
            "skip",
            "-vv",
        ]);
        assert_eq!(opt.rate, 500);
        assert_eq!(opt.cycle_duration(), Duration::from_millis(2));
        assert_eq!(opt.max_cycles, Some(10));
        assert_eq!(opt.seed, Some(3));
        assert_eq!(opt.on_unknown, OnUnknown::Skip);
        assert_eq!(opt.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn skip_steps_over_unknown_instructions_only() {
        let mut emulator = Emulator::new();
        emulator.load(&[0xFF, 0xFF, 0x00, 0xEE]).unwrap();

        let error = emulator.cycle().unwrap_err();
        assert_eq!(OnUnknown::Skip.recover(&mut emulator, error), Ok(()));
        assert_eq!(emulator.program_counter(), 0x202);

        let error = emulator.cycle().unwrap_err();
        assert_eq!(
            OnUnknown::Skip.recover(&mut emulator, error.clone()),
            Err(error)
        );
        assert_eq!(emulator.program_counter(), 0x202);
    }

    #[test]
    fn halt_gives_every_error_back() {
        let mut emulator = Emulator::new();
        emulator.load(&[0xFF, 0xFF]).unwrap();
        let error = emulator.cycle().unwrap_err();
        assert_eq!(
            OnUnknown::Halt.recover(&mut emulator, error.clone()),
            Err(error)
        );
        assert_eq!(emulator.program_counter(), 0x200);
    }

    #[test]
    fn logger_follows_verbosity() {
        let opt = Opt::from_iter(&["chip8", "game.ch8", "-v"]);
        assert_eq!(opt.logger(None).build().filter(), LevelFilter::Info);
    }

    #[test]
    fn logger_filters_override_verbosity() {
        let opt = Opt::from_iter(&["chip8", "game.ch8"]);
        let logger = opt.logger(Some("trace")).build();
        assert_eq!(logger.filter(), LevelFilter::Trace);
    }

    #[test]
    fn bad_policy_is_rejected() {
        assert!(Opt::from_iter_safe(&["chip8", "game.ch8", "--on-unknown", "ignore"]).is_err());
    }
}
