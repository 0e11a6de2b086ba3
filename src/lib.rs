//! A chip8 execution engine, the host is responsible for the window, the input and the sound.
pub mod chip8;
pub mod definitions;
pub mod devices;
pub mod keymap;
pub mod opcode;
pub mod resources;
pub mod timer;

mod error;
mod runner;

// reexporting for convinience
pub use error::*;
pub use runner::*;
