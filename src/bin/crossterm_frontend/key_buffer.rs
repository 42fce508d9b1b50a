use chip8_vm::emulator::input::NUM_KEYS;
use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

/// A thread-safe record of when each keypad key was last pressed.
///
/// Terminals report key presses but not releases, so a key counts as
/// held until `hold` has passed since its last press.
/// Wrap it in an `std::sync::Arc` to share it with the event listener.
pub struct KeyBuffer {
    hold: Duration,
    presses: Mutex<[Option<Instant>; NUM_KEYS]>,
}

impl KeyBuffer {
    pub fn new(hold: Duration) -> KeyBuffer {
        KeyBuffer {
            hold,
            presses: Mutex::new([None; NUM_KEYS]),
        }
    }

    /// Record a press of `key`. Keys outside the keypad are ignored.
    pub fn push(&self, key: u8) {
        let mut presses = self.presses.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = presses.get_mut(key as usize) {
            *slot = Some(Instant::now());
        }
    }

    /// Which keys count as held right now.
    pub fn held(&self) -> [bool; NUM_KEYS] {
        let presses = self.presses.lock().unwrap_or_else(PoisonError::into_inner);
        let mut held = [false; NUM_KEYS];
        for (held, pressed_at) in held.iter_mut().zip(presses.iter()) {
            *held = pressed_at.map_or(false, |at| at.elapsed() < self.hold);
        }
        held
    }
}
