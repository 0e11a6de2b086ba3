use crate::{
    chip8::{ChipSet, DriverState},
    definitions::{cpu, timer},
    devices::{DisplayCommands, KeyEvent, KeyboardCommands, SoundCommands},
    opcode::OpcodeStatus,
    ProcessError,
};

/// How the [`Runner`](Runner) splits the execution into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// the maximum amount of ticks executed per frame
    pub cycles_per_frame: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cycles_per_frame: (cpu::HERTZ / timer::HERTZ) as usize,
        }
    }
}

/// What happened during a single frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// the amount of opcodes executed
    pub executed: usize,
    /// if the display was handed to the host
    pub redrawn: bool,
    /// if the frame ended while waiting for a key
    pub waiting: bool,
}

/// Drives a [`ChipSet`](ChipSet) against the host collaborators, one frame at a time.
pub struct Runner {
    chip: ChipSet,
    config: RunnerConfig,
    tone: bool,
}

impl Runner {
    pub fn new(chip: ChipSet, config: RunnerConfig) -> Self {
        Self {
            chip,
            config,
            tone: false,
        }
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    /// Will run a single frame.
    ///
    /// The host input is forwarded first, then up to
    /// [`cycles_per_frame`](RunnerConfig::cycles_per_frame) opcodes are executed. The frame ends
    /// early while a key is awaited. A changed display is presented once at the end and the tone
    /// follows the sound timer. Errors stop the frame and are left to the caller.
    pub fn frame<D, K, S>(
        &mut self,
        display: &mut D,
        keyboard: &mut K,
        sound: &mut S,
    ) -> Result<Frame, ProcessError>
    where
        D: DisplayCommands + ?Sized,
        K: KeyboardCommands + ?Sized,
        S: SoundCommands + ?Sized,
    {
        for event in keyboard.poll() {
            match event {
                KeyEvent::Pressed(host) => self.chip.host_key_down(host),
                KeyEvent::Released(host) => self.chip.host_key_up(host),
            };
        }

        let mut frame = Frame::default();
        for _ in 0..self.config.cycles_per_frame {
            if self.chip.tick()? == OpcodeStatus::WaitForKeyboard {
                break;
            }
            frame.executed += 1;
        }
        // the timers keep running even if nothing was executed
        self.chip.decay_timers();
        frame.waiting = self.chip.state() == DriverState::WaitingForKey;

        if self.chip.take_redraw() {
            display.display(self.chip.get_display());
            frame.redrawn = true;
        }

        let tone = self.chip.get_sound_timer() > 0;
        if tone != self.tone {
            log::debug!("tone {}", if tone { "on" } else { "off" });
            sound.set_tone(tone);
            self.tone = tone;
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use mockall::predicate;

    use super::*;
    use crate::{
        devices::{MockDisplayCommands, MockKeyboardCommands, MockSoundCommands},
        timer::MockClock,
    };

    const LOOP: [u8; 2] = [0x12, 0x00];

    fn runner(program: &[u8]) -> Runner {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(Instant::now());
        let mut chip = ChipSet::with_sources(
            Box::new(rand::rngs::mock::StepRng::new(0, 1)),
            Box::new(clock),
        );
        chip.load_program(program).expect("the program fits");
        Runner::new(chip, RunnerConfig::default())
    }

    fn no_input() -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_poll().returning(Vec::new);
        keyboard
    }

    #[test]
    fn test_default_config() {
        assert_eq!(RunnerConfig::default().cycles_per_frame, 8);
    }

    #[test]
    fn test_frame_runs_all_cycles() {
        let mut runner = runner(&LOOP);
        let mut display = MockDisplayCommands::new();
        display.expect_display().never();
        let mut sound = MockSoundCommands::new();
        sound.expect_set_tone().never();

        let frame = runner
            .frame(&mut display, &mut no_input(), &mut sound)
            .expect("the loop never fails");
        assert_eq!(
            frame,
            Frame {
                executed: 8,
                redrawn: false,
                waiting: false,
            }
        );
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER);
    }

    #[test]
    fn test_frame_presents_display_once() {
        // clear the screen twice, then loop
        let mut runner = runner(&[0x00, 0xE0, 0x00, 0xE0, 0x12, 0x04]);
        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .withf(|pixels| pixels.len() == crate::definitions::display::HEIGHT)
            .times(1)
            .return_const(());
        let mut sound = MockSoundCommands::new();

        let frame = runner
            .frame(&mut display, &mut no_input(), &mut sound)
            .expect("no errors");
        assert!(frame.redrawn);
    }

    #[test]
    fn test_frame_stops_while_waiting() {
        // wait for a key in V1, then loop
        let mut runner = runner(&[0xF1, 0x0A, 0x12, 0x02]);
        let mut display = MockDisplayCommands::new();
        let mut sound = MockSoundCommands::new();

        let frame = runner
            .frame(&mut display, &mut no_input(), &mut sound)
            .expect("no errors");
        assert_eq!(frame.executed, 0);
        assert!(frame.waiting);

        let mut events = vec![KeyEvent::Pressed('w')];
        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_poll()
            .returning(move || std::mem::take(&mut events));

        let frame = runner
            .frame(&mut display, &mut keyboard, &mut sound)
            .expect("no errors");
        assert!(!frame.waiting);
        assert_eq!(frame.executed, 8);
        assert_eq!(runner.chip().registers()[1], 0x5);
        assert!(runner.chip().is_host_key_down('w'));
    }

    #[test]
    fn test_released_keys_are_forwarded() {
        let mut runner = runner(&LOOP);
        runner.chip_mut().press_key(0xF);

        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_poll()
            .times(1)
            .returning(|| vec![KeyEvent::Released('v'), KeyEvent::Pressed('p')]);

        runner
            .frame(
                &mut MockDisplayCommands::new(),
                &mut keyboard,
                &mut MockSoundCommands::new(),
            )
            .expect("no errors");
        assert!(!runner.chip().is_key_down(0xF));
    }

    #[test]
    fn test_tone_follows_sound_timer() {
        // V0 = 0x10, sound timer = V0, loop
        let mut runner = runner(&[0x60, 0x10, 0xF0, 0x18, 0x12, 0x04]);
        let mut display = MockDisplayCommands::new();
        let mut sound = MockSoundCommands::new();
        sound
            .expect_set_tone()
            .with(predicate::eq(true))
            .times(1)
            .return_const(());

        // the tone is only switched on change
        for _ in 0..3 {
            runner
                .frame(&mut display, &mut no_input(), &mut sound)
                .expect("no errors");
        }
        assert_eq!(runner.chip().get_sound_timer(), 0x10);
    }

    #[test]
    fn test_errors_stop_the_frame() {
        // a sub routine calling itself until the stack is full
        let mut runner = runner(&[0x22, 0x00]);
        runner.config = RunnerConfig {
            cycles_per_frame: 32,
        };
        let result = runner.frame(
            &mut MockDisplayCommands::new(),
            &mut no_input(),
            &mut MockSoundCommands::new(),
        );
        assert_eq!(result, Err(ProcessError::Stack(crate::StackError::Full)));
        assert_eq!(runner.chip().stack_pointer(), cpu::stack::FULL);
    }

    #[test]
    fn test_return_without_call_keeps_running() {
        // return without a call, the empty slot sends the program into the zeroed low memory
        let mut runner = runner(&[0x00, 0xEE]);
        let frame = runner
            .frame(
                &mut MockDisplayCommands::new(),
                &mut no_input(),
                &mut MockSoundCommands::new(),
            )
            .expect("an empty return is not an error");
        assert_eq!(frame.executed, 8);
        assert_eq!(runner.chip().stack_pointer(), 0xFE);
    }
}
