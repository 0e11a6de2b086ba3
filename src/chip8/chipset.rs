use {
    crate::{
        definitions::{cpu, display, keyboard, memory, timer},
        devices::Keyboard,
        keymap,
        opcode::{ChipOpcodes, Opcode, OpcodeStatus},
        resources::Rom,
        timer::{Clock, SystemClock, Timer},
        OpcodeError, ProcessError, StackError,
    },
    rand::RngCore,
};

/// The two states of the tick driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Every tick fetches and executes a single opcode.
    Running,
    /// An `FX0A` is pending, ticks only run the timers until a key is pressed.
    WaitingForKey,
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last opcode fetched, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Box<[u8; memory::SIZE]>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// Points at the slot of the last pushed return address, [`EMPTY`](cpu::stack::EMPTY) if
    /// there is none.
    pub(super) stack_pointer: u8,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: [u16; cpu::stack::SIZE],
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`, stored row by row.
    pub(super) display: Box<[[bool; display::WIDTH]; display::HEIGHT]>,
    /// The currently held keys.
    pub(super) keyboard: Keyboard,
    /// The register an `FX0A` is waiting to fill, the keyboard wait latch.
    pub(super) waiting_register: Option<usize>,
    /// Set whenever the display content changed.
    pub(super) redraw: bool,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    /// The time source of both timers.
    pub(super) clock: Box<dyn Clock + Send>,
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSet {
    /// will create a new chipset object
    pub fn new() -> Self {
        Self::with_sources(Box::new(rand::rngs::OsRng), Box::new(SystemClock))
    }

    /// will create a new chipset object with the given random source and clock
    pub fn with_sources(rng: Box<dyn RngCore + Send>, clock: Box<dyn Clock + Send>) -> Self {
        // initialize all the memory with 0
        let mut ram = Box::new([0; memory::SIZE]);

        // load fonts
        let font = usize::from(display::fontset::LOCATION);
        ram[font..(font + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        Self {
            name: String::new(),
            opcode: 0,
            memory: ram,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack_pointer: cpu::stack::EMPTY,
            stack: [0; cpu::stack::SIZE],
            delay_timer: Timer::new(timer::INTERVAL),
            sound_timer: Timer::new(timer::INTERVAL),
            display: Box::new([[false; display::WIDTH]; display::HEIGHT]),
            keyboard: Keyboard::new(),
            waiting_register: None,
            redraw: false,
            rng,
            clock,
        }
    }

    /// will create a new chipset object with the rom already loaded
    pub fn with_rom(rom: &Rom) -> Result<Self, ProcessError> {
        let mut chip = Self::new();
        chip.load_program(rom.get_data())?;
        chip.name = rom.get_name().to_string();
        Ok(chip)
    }

    /// Copies the program verbatim into memory starting at the program counter start.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), ProcessError> {
        if program.len() > cpu::PROGRAM_MAX_SIZE {
            return Err(ProcessError::ProgramTooLarge {
                len: program.len(),
                max: cpu::PROGRAM_MAX_SIZE,
            });
        }
        let start = usize::from(cpu::PROGRAM_COUNTER);
        self.memory[start..(start + program.len())].copy_from_slice(program);
        log::info!("loaded a program of {} bytes", program.len());
        Ok(())
    }

    /// will advance the program by a single step
    ///
    /// While the chipset waits for a key nothing is fetched and
    /// [`WaitForKeyboard`](OpcodeStatus::WaitForKeyboard) is returned. Stack overflows and
    /// invalid machine states are returned as errors, it is up to the caller to stop.
    pub fn tick(&mut self) -> Result<OpcodeStatus, ProcessError> {
        self.decay_timers();

        if self.waiting_register.is_some() {
            return Ok(OpcodeStatus::WaitForKeyboard);
        }

        self.opcode = self.fetch();
        log::debug!("pc {:#06X} opcode {:#06X}", self.program_counter, self.opcode);

        let status = self.dispatch(self.opcode);
        match status {
            OpcodeStatus::IncrementPC => self.step(),
            OpcodeStatus::NotIncrementPC | OpcodeStatus::WaitForKeyboard => {}
            OpcodeStatus::NotImplemented => {
                log::warn!(
                    "skipping the unsupported opcode {:#06X} at {:#06X}",
                    self.opcode,
                    self.program_counter
                );
                self.step();
            }
            OpcodeStatus::StackOverflow => {
                log::error!("stack overflow at {:#06X}", self.program_counter);
                return Err(StackError::Full.into());
            }
            OpcodeStatus::Error => {
                let err = OpcodeError::InvalidOpcode(self.opcode);
                log::error!("{} at {:#06X}", err, self.program_counter);
                return Err(err.into());
            }
        }
        Ok(status)
    }

    /// Decrements both timers by the intervals elapsed since their last decrement.
    pub fn decay_timers(&mut self) {
        let now = self.clock.now();
        self.delay_timer.decay(now);
        self.sound_timer.decay(now);
    }

    /// The state the tick driver is in.
    pub fn state(&self) -> DriverState {
        if self.waiting_register.is_some() {
            DriverState::WaitingForKey
        } else {
            DriverState::Running
        }
    }

    /// Marks the chip key as held, resolves a pending `FX0A` with it.
    ///
    /// Returns `false` if the value is not a chip key.
    pub fn press_key(&mut self, key: u8) -> bool {
        if !self.keyboard.set_key(usize::from(key), true) {
            return false;
        }

        if let Some(register) = self.waiting_register.take() {
            log::debug!("key {:#X} resolves the wait for V{:X}", key, register);
            self.registers[register] = key;
            // the FX0A is done, continue with the next instruction
            self.step();
        }
        true
    }

    /// Marks the chip key as released.
    pub fn release_key(&mut self, key: u8) -> bool {
        self.keyboard.set_key(usize::from(key), false)
    }

    /// Checks if the chip key is currently held.
    pub fn is_key_down(&self, key: u8) -> bool {
        self.keyboard.is_pressed(usize::from(key))
    }

    /// [`press_key`](ChipSet::press_key) with a host key, unknown keys are ignored.
    pub fn host_key_down(&mut self, host: char) -> bool {
        keymap::to_chip(host).map_or(false, |key| self.press_key(key))
    }

    /// [`release_key`](ChipSet::release_key) with a host key, unknown keys are ignored.
    pub fn host_key_up(&mut self, host: char) -> bool {
        keymap::to_chip(host).map_or(false, |key| self.release_key(key))
    }

    /// [`is_key_down`](ChipSet::is_key_down) with a host key.
    pub fn is_host_key_down(&self, host: char) -> bool {
        keymap::to_chip(host).map_or(false, |key| self.is_key_down(key))
    }

    /// Will write keyboard data into interncal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// Returns if the display changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// name of the loaded rom
    pub fn name(&self) -> &str {
        &self.name
    }

    /// the last fetched opcode
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory[..]
    }

    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// the register a pending `FX0A` will write to
    pub fn waiting_register(&self) -> Option<usize> {
        self.waiting_register
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return a immutable slice of the current display configuration
    pub fn get_display(&self) -> &[[bool; display::WIDTH]] {
        &self.display[..]
    }

    /// Reads the two bytes at the program counter, wrapping at the end of memory.
    pub(super) fn fetch(&self) -> Opcode {
        let high = self.read_memory(self.program_counter);
        let low = self.read_memory(self.program_counter.wrapping_add(1));
        Opcode::from_be_bytes([high, low])
    }

    pub(super) fn read_memory(&self, address: u16) -> u8 {
        self.memory[usize::from(address & memory::ADDRESS_MASK)]
    }

    pub(super) fn write_memory(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address & memory::ADDRESS_MASK)] = value;
    }

    /// Moves the program counter to the next opcode.
    pub(super) fn step(&mut self) {
        self.program_counter = self
            .program_counter
            .wrapping_add(memory::opcodes::SIZE);
    }

    /// Will push the pointer to the stack, the stack pointer
    /// is moved before the write.
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        if self.stack_pointer != cpu::stack::EMPTY
            && self.stack_pointer & cpu::stack::MASK == cpu::stack::FULL
        {
            return Err(StackError::Full);
        }
        self.stack_pointer = self.stack_pointer.wrapping_add(1) & cpu::stack::MASK;
        self.stack[usize::from(self.stack_pointer)] = pointer;
        Ok(())
    }

    /// Will pop from the stack, the stack pointer
    /// is moved after the read. An empty stack is not guarded, the slot
    /// under the masked pointer is read and the pointer keeps wrapping.
    pub(super) fn pop_stack(&mut self) -> u16 {
        let pointer = self.stack[usize::from(self.stack_pointer & cpu::stack::MASK)];
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
        pointer
    }
}
