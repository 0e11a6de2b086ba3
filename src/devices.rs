use crate::definitions::{display, keyboard};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will present all the pixels, row by row
    fn display(&mut self, pixels: &[[bool; display::WIDTH]]);
}

/// A single change of a host key, identified by its host key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(char),
    Released(char),
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the host keyboard
pub trait KeyboardCommands {
    /// Returns every key event since the last poll, oldest first.
    fn poll(&mut self) -> Vec<KeyEvent>;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the sound output
pub trait SoundCommands {
    /// Turns the tone on or off.
    fn set_tone(&mut self, on: bool);
}

/// Stores which of the chip keys are currently held down.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Releases every key.
    pub fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    /// Will set the value of the given key, returns `false` if there is no such key.
    pub fn set_key(&mut self, key: usize, to: bool) -> bool {
        match self.keys.get_mut(key) {
            Some(entry) => {
                *entry = to;
                true
            }
            None => false,
        }
    }

    /// Will toggle the given key
    pub fn toggle_key(&mut self, key: usize) -> bool {
        let current = self.is_pressed(key);
        self.set_key(key, !current)
    }

    /// Overwrites all keys at once.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keys.copy_from_slice(keys);
    }

    /// Unknown keys are never pressed.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_release() {
        let mut kb = Keyboard::new();
        assert!(kb.set_key(0xA, true));
        assert!(kb.is_pressed(0xA));
        assert!(!kb.is_pressed(0xB));

        // pressing a second key keeps the first one held
        assert!(kb.set_key(0xB, true));
        assert!(kb.is_pressed(0xA));

        assert!(kb.set_key(0xA, false));
        assert!(!kb.is_pressed(0xA));
        assert!(kb.is_pressed(0xB));
    }

    #[test]
    fn test_unknown_key() {
        let mut kb = Keyboard::new();
        assert!(!kb.set_key(keyboard::SIZE, true));
        assert!(!kb.is_pressed(keyboard::SIZE));
        assert_eq!(kb.get_keys(), &[false; keyboard::SIZE]);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut kb = Keyboard::new();
        kb.toggle_key(3);
        assert!(kb.is_pressed(3));
        kb.toggle_key(3);
        assert!(!kb.is_pressed(3));

        let mut keys = [false; keyboard::SIZE];
        for (index, key) in keys.iter_mut().enumerate() {
            *key = index % 2 != 0;
        }
        kb.set_mult(&keys);
        assert_eq!(kb.get_keys(), &keys);

        kb.reset();
        assert_eq!(kb.get_keys(), &[false; keyboard::SIZE]);
    }
}
