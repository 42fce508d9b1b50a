use super::key_buffer::KeyBuffer;
use chip8_vm::emulator::input::NUM_KEYS;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A struct for managing keypresses that will automatically
/// start a thread that grabs keypresses.
pub struct KeyManager {
    stop: Arc<Mutex<bool>>,
    quit: Arc<Mutex<bool>>,
    key_buffer: Arc<KeyBuffer>,
    event_listener: Option<JoinHandle<()>>,
}

impl KeyManager {
    /// Start the event listener thread. Keys count as held for `hold` after each press.
    pub fn new(hold: Duration) -> KeyManager {
        let stop = Arc::new(Mutex::new(false));
        let quit = Arc::new(Mutex::new(false));
        let key_buffer = Arc::new(KeyBuffer::new(hold));
        let event_listener = event_listener(stop.clone(), quit.clone(), key_buffer.clone());
        KeyManager {
            stop,
            quit,
            key_buffer,
            event_listener: Some(event_listener),
        }
    }

    /// The keypad keys currently held
    pub fn held_keys(&self) -> [bool; NUM_KEYS] {
        self.key_buffer.held()
    }

    /// Whether Esc or Ctrl-C was pressed
    pub fn quit_requested(&self) -> bool {
        *self.quit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for KeyManager {
    fn drop(&mut self) {
        // Tell the event listener to stop, and wait for it
        *self.stop.lock().unwrap_or_else(PoisonError::into_inner) = true;
        if let Some(handle) = self.event_listener.take() {
            if handle.join().is_err() {
                log::warn!("Key event listener panicked");
            }
        }
    }
}

/// The conventional layout, with the keypad
/// ```text
/// 1 2 3 C
/// 4 5 6 D
/// 7 8 9 E
/// A 0 B F
/// ```
/// on the keys 1234, QWER, ASDF and ZXCV.
pub fn key_to_u8(key: KeyCode) -> Option<u8> {
    let c = match key {
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };
    let index = match c {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xC,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xD,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xE,
        'z' => 0xA,
        'x' => 0x0,
        'c' => 0xB,
        'v' => 0xF,
        _ => return None,
    };
    Some(index)
}

fn is_quit(event: &KeyEvent) -> bool {
    event.code == KeyCode::Esc
        || (event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL))
}

/// Starts a thread that listens for key events and pushes them to the key buffer.
fn event_listener(
    stop: Arc<Mutex<bool>>,
    quit: Arc<Mutex<bool>>,
    key_buffer: Arc<KeyBuffer>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        // Check the shared data, and possibly stop
        if *stop.lock().unwrap_or_else(PoisonError::into_inner) {
            break;
        }

        match poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(error) => {
                log::warn!("Could not poll for events: {}", error);
                break;
            }
        }

        // Investigate the event
        match read() {
            Ok(Event::Key(key_event)) if is_quit(&key_event) => {
                *quit.lock().unwrap_or_else(PoisonError::into_inner) = true;
            }
            Ok(Event::Key(key_event)) => {
                log::debug!("Got key {:?}", key_event);
                if let Some(key) = key_to_u8(key_event.code) {
                    key_buffer.push(key);
                }
            }
            Ok(_) => {}
            Err(error) => {
                log::warn!("Could not read event: {}", error);
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_covers_every_key_once() {
        let mut seen = [false; NUM_KEYS];
        for c in "1234qwerasdfzxcv".chars() {
            let key = key_to_u8(KeyCode::Char(c)).unwrap();
            assert!(!seen[key as usize], "{} mapped twice", key);
            seen[key as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(key_to_u8(KeyCode::Char('p')), None);
        assert_eq!(key_to_u8(KeyCode::Enter), None);
        assert_eq!(key_to_u8(KeyCode::Char('Q')), Some(0x4));
    }
}
