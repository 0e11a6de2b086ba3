use crate::{
    definitions::{cpu, display, memory},
    opcode::{ChipOpcodes, Opcode, OpcodeStatus, OpcodeTrait},
};

use super::ChipSet;

impl ChipSet {
    /// Skips the next opcode if the condition holds, the regular step is left
    /// to the tick driver.
    fn skip_next_if(&mut self, cond: bool) -> OpcodeStatus {
        if cond {
            self.step();
        }
        OpcodeStatus::IncrementPC
    }

    /// Places the program counter so that the following regular step lands on `address`.
    fn jump_to(&mut self, address: u16) -> OpcodeStatus {
        self.program_counter = address.wrapping_sub(memory::opcodes::SIZE);
        OpcodeStatus::IncrementPC
    }
}

impl ChipOpcodes for ChipSet {
    fn zero(&mut self, opcode: Opcode) -> OpcodeStatus {
        match opcode {
            0x00E0 => {
                // 00E0
                // clear display
                for row in self.display.iter_mut() {
                    row.fill(false);
                }
                self.redraw = true;
                OpcodeStatus::IncrementPC
            }
            0x00EE => {
                // 00EE
                // Return from sub routine => pop from stack, the address is the one of the call
                // so the regular step moves past it
                let pc = self.pop_stack();
                log::debug!("return to {:#06X}", pc);
                self.program_counter = pc;
                OpcodeStatus::IncrementPC
            }
            _ => OpcodeStatus::NotImplemented,
        }
    }

    fn one(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 1NNN
        // Jumps to address NNN.
        self.jump_to(opcode.nnn())
    }

    fn two(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 2NNN
        // Calls subroutine at NNN, the address of the call itself is saved
        match self.push_stack(self.program_counter) {
            Ok(_) => {
                log::debug!("call {:#06X} from {:#06X}", opcode.nnn(), self.program_counter);
                self.program_counter = opcode.nnn();
                OpcodeStatus::NotIncrementPC
            }
            Err(_) => OpcodeStatus::StackOverflow,
        }
    }

    fn three(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 3XNN
        // Skips the next instruction if VX equals NN.
        let (x, kk) = opcode.xkk();
        self.skip_next_if(self.registers[x] == kk)
    }

    fn four(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 4XNN
        // Skips the next instruction if VX doesn't equal NN.
        let (x, kk) = opcode.xkk();
        self.skip_next_if(self.registers[x] != kk)
    }

    fn five(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 5XY0
        // Skips the next instruction if VX equals VY.
        match opcode.xyn() {
            (x, y, 0) => self.skip_next_if(self.registers[x] == self.registers[y]),
            _ => OpcodeStatus::NotImplemented,
        }
    }

    fn six(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 6XNN
        // Sets VX to NN.
        let (x, kk) = opcode.xkk();
        self.registers[x] = kk;
        OpcodeStatus::IncrementPC
    }

    fn seven(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 7XNN
        // Adds NN to VX. (Carry flag is not changed)
        let (x, kk) = opcode.xkk();
        self.registers[x] = self.registers[x].wrapping_add(kk);
        OpcodeStatus::IncrementPC
    }

    fn eight(&mut self, opcode: Opcode) -> OpcodeStatus {
        let (x, y, n) = opcode.xyn();
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is calculated from the operands and written last, so that it
        // survives a destination of VF
        let flag = match n {
            0x0 => {
                // 8XY0
                // Sets VX to the value of VY.
                self.registers[x] = vy;
                None
            }
            0x1 => {
                // 8XY1
                // Sets VX to VX or VY. (Bitwise OR operation)
                self.registers[x] = vx | vy;
                None
            }
            0x2 => {
                // 8XY2
                // Sets VX to VX and VY. (Bitwise AND operation)
                self.registers[x] = vx & vy;
                None
            }
            0x3 => {
                // 8XY3
                // Sets VX to VX xor VY.
                self.registers[x] = vx ^ vy;
                None
            }
            0x4 => {
                // 8XY4
                // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
                let (res, carry) = vx.overflowing_add(vy);
                self.registers[x] = res;
                Some(carry)
            }
            0x5 => {
                // 8XY5
                // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                self.registers[x] = vx.wrapping_sub(vy);
                Some(vx >= vy)
            }
            0x6 => {
                // 8XY6
                // Stores VY shifted right by one in VX, VF gets the bit shifted out.
                self.registers[x] = vy >> 1;
                Some(vy & 0x01 == 0x01)
            }
            0x7 => {
                // 8XY7
                // Sets VY to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
                // isn't.
                self.registers[y] = vy.wrapping_sub(vx);
                Some(vy >= vx)
            }
            0xE => {
                // 8XYE
                // Stores VY shifted left by one in VX, VF gets the bit shifted out.
                const SHIFT_SIGNIFICANT: u8 = 7;
                const AND_SIGNIFICANT: u8 = 1 << SHIFT_SIGNIFICANT;
                self.registers[x] = vy << 1;
                Some(vy & AND_SIGNIFICANT == AND_SIGNIFICANT)
            }
            _ => return OpcodeStatus::NotImplemented,
        };

        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = u8::from(flag);
        }
        OpcodeStatus::IncrementPC
    }

    fn nine(&mut self, opcode: Opcode) -> OpcodeStatus {
        // 9XY0
        // Skips the next instruction if VX doesn't equal VY.
        match opcode.xyn() {
            (x, y, 0) => self.skip_next_if(self.registers[x] != self.registers[y]),
            _ => OpcodeStatus::NotImplemented,
        }
    }

    fn a(&mut self, opcode: Opcode) -> OpcodeStatus {
        // ANNN
        // Sets I to the address NNN.
        self.index_register = opcode.nnn();
        OpcodeStatus::IncrementPC
    }

    fn b(&mut self, opcode: Opcode) -> OpcodeStatus {
        // BNNN
        // Jumps to the address NNN plus V0.
        let v0 = u16::from(self.registers[0]);
        self.jump_to(opcode.nnn().wrapping_add(v0))
    }

    fn c(&mut self, opcode: Opcode) -> OpcodeStatus {
        // CXNN
        // Sets VX to the result of a bitwise and operation on a random number (Typically: 0 to 255)
        // and NN.
        let (x, kk) = opcode.xkk();
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.rng.fill_bytes(&mut rand);
        self.registers[x] = kk & rand[0];
        OpcodeStatus::IncrementPC
    }

    fn d(&mut self, opcode: Opcode) -> OpcodeStatus {
        // DXYN
        // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
        // pixels. Rows and columns leaving the screen wrap around to the other side.
        // see https://tobiasvl.github.io/blog/write-a-chip-8-emulator/
        const BYTE: usize = 8;

        let (reg_x, reg_y, n) = opcode.xyn();
        let coorx = usize::from(self.registers[reg_x]) % display::WIDTH;
        let coory = usize::from(self.registers[reg_y]) % display::HEIGHT;

        let mut collision = false;
        for i in 0..n {
            let row = self.read_memory(self.index_register.wrapping_add(u16::from(i)));
            let y = (coory + usize::from(i)) % display::HEIGHT;

            for j in 0..BYTE {
                let mask = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let x = (coorx + j) % display::WIDTH;
                let spixel = self.display[y][x];
                collision |= spixel;
                self.display[y][x] = !spixel;
            }
        }

        self.registers[cpu::register::LAST] = u8::from(collision);
        self.redraw = true;
        OpcodeStatus::IncrementPC
    }

    fn e(&mut self, opcode: Opcode) -> OpcodeStatus {
        let (x, kk) = opcode.xkk();
        let key = self.registers[x] & 0xF;
        match kk {
            // EX9E
            // Skips the next instruction if the key stored in VX is pressed.
            0x9E => self.skip_next_if(self.is_key_down(key)),
            // EXA1
            // Skips the next instruction if the key stored in VX isn't pressed.
            0xA1 => self.skip_next_if(!self.is_key_down(key)),
            _ => OpcodeStatus::NotImplemented,
        }
    }

    fn f(&mut self, opcode: Opcode) -> OpcodeStatus {
        let (x, kk) = opcode.xkk();
        match kk {
            0x07 => {
                // FX07
                // Sets VX to the value of the delay timer.
                self.registers[x] = self.get_delay_timer();
            }
            0x0A => {
                // FX0A
                // A key press is awaited, and then stored in VX. The program counter stays
                // on this opcode until the key arrives.
                log::debug!("waiting for a key for V{:X}", x);
                self.waiting_register = Some(x);
                return OpcodeStatus::WaitForKeyboard;
            }
            0x15 => {
                // FX15
                // Sets the delay timer to VX.
                let now = self.clock.now();
                self.delay_timer.set_value(self.registers[x], now);
            }
            0x18 => {
                // FX18
                // Sets the sound timer to VX.
                let now = self.clock.now();
                self.sound_timer.set_value(self.registers[x], now);
            }
            0x1E => {
                // FX1E
                // Adds VX to I. VF is not affected.
                self.index_register = self
                    .index_register
                    .wrapping_add(u16::from(self.registers[x]));
            }
            0x29 => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font.
                let val = u16::from(self.registers[x] & 0xF);
                self.index_register =
                    display::fontset::LOCATION + display::fontset::GLYPH_SIZE * val;
            }
            0x33 => {
                // FX33
                // Stores the binary-coded decimal representation of VX, with the most significant
                // of three digits at the address in I, the middle digit at I plus 1, and the least
                // significant digit at I plus 2.
                let i = self.index_register;
                let r = self.registers[x];

                self.write_memory(i, r / 100); // 246u8 / 100 => 2
                self.write_memory(i.wrapping_add(1), r / 10 % 10); // 246u8 / 10 => 24 % 10 => 4
                self.write_memory(i.wrapping_add(2), r % 10); // 246u8 % 10 => 6
            }
            0x55 => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I. The offset from I
                // is increased by 1 for each value written, but I itself is left unmodified.
                for offset in 0..=x {
                    let value = self.registers[offset];
                    self.write_memory(self.index_register.wrapping_add(offset as u16), value);
                }
            }
            0x65 => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I. The
                // offset from I is increased by 1 for each value written, but I itself is left
                // unmodified.
                for offset in 0..=x {
                    self.registers[offset] =
                        self.read_memory(self.index_register.wrapping_add(offset as u16));
                }
            }
            _ => return OpcodeStatus::NotImplemented,
        }
        OpcodeStatus::IncrementPC
    }
}
