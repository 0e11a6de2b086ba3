//! The fixed translation between host keys and the chip keys.
//!
//! The hex keypad is laid over the left four alphanumeric columns.
//! ```text
//! |1|2|3|C|      |1|2|3|4|
//! |4|5|6|D|  ->  |Q|W|E|R|
//! |7|8|9|E|  ->  |A|S|D|F|
//! |A|0|B|F|      |Z|X|C|V|
//! ```
use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::definitions::keyboard::{HOST_LAYOUT, LAYOUT};

static LAYOUT_MAP: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    HOST_LAYOUT
        .iter()
        .flatten()
        .copied()
        .zip(LAYOUT.iter().flatten().copied())
        .collect()
});

/// Maps a host key onto the chip key value, case is ignored.
///
/// # Example
/// ```rust
/// # use chip::keymap;
/// assert_eq!(keymap::to_chip('x'), Some(0x0));
/// assert_eq!(keymap::to_chip('V'), Some(0xF));
/// assert_eq!(keymap::to_chip('p'), None);
/// ```
pub fn to_chip(host: char) -> Option<u8> {
    LAYOUT_MAP.get(&host.to_ascii_lowercase()).copied()
}

/// Maps a chip key value back onto its host key.
pub fn to_host(key: u8) -> Option<char> {
    LAYOUT_MAP
        .iter()
        .find(|(_, value)| **value == key)
        .map(|(host, _)| *host)
}
