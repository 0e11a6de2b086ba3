//! Opcode abstractions, functionality and constants.
use crate::OpcodeError;

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// the size of a single nibble
const NIBBLE_SIZE: u16 = BYTE_SIZE / 2;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the opcode family, the most significant nibble `T___`
    fn t(&self) -> u8;

    /// the address `_NNN`
    fn nnn(&self) -> u16;

    /// the immediate byte `__KK`
    fn kk(&self) -> u8;

    /// the last nibble `___N`
    fn n(&self) -> u8;

    /// the first register index `_X__`
    fn x(&self) -> usize;

    /// the second register index `__Y_`
    fn y(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXKK`
    fn xkk(&self) -> (usize, u8) {
        (self.x(), self.kk())
    }

    /// this is an opcode extractor for the opcode type `TXYT`
    fn xy(&self) -> (usize, usize) {
        (self.x(), self.y())
    }

    /// this is an opcode extractor for the opcode type `TXYN`
    fn xyn(&self) -> (usize, usize, u8) {
        (self.x(), self.y(), self.n())
    }
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE_SIZE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.kk(), 0xDA);
    /// ```
    fn kk(&self) -> u8 {
        (self & OPCODE_MASK_00FF) as u8
    }

    fn n(&self) -> u8 {
        (self & OPCODE_MASK_000F) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }

    fn y(&self) -> usize {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        ((self & MASK) >> NIBBLE_SIZE) as usize
    }
}

/// The signal every opcode handler reports back to the tick driver.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeStatus {
    /// The program counter shall move to the next instruction.
    IncrementPC,
    /// The handler already placed the program counter.
    NotIncrementPC,
    /// The sub opcode inside of the family is unknown, execution may continue past it.
    NotImplemented,
    /// A call was attempted while all stack slots are in use.
    StackOverflow,
    /// Execution is suspended until a key press resolves the pending register.
    WaitForKeyboard,
    /// The opcode can not be executed in the current machine state.
    Error,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// [`dispatch`](ChipOpcodes::dispatch) only looks at the family nibble, every handler decodes its
/// own operands.
pub trait ChipOpcodes {
    /// Selects the handler by the most significant nibble of the opcode.
    fn dispatch(&mut self, opcode: Opcode) -> OpcodeStatus {
        match opcode.t() {
            0x0 => self.zero(opcode),
            0x1 => self.one(opcode),
            0x2 => self.two(opcode),
            0x3 => self.three(opcode),
            0x4 => self.four(opcode),
            0x5 => self.five(opcode),
            0x6 => self.six(opcode),
            0x7 => self.seven(opcode),
            0x8 => self.eight(opcode),
            0x9 => self.nine(opcode),
            0xA => self.a(opcode),
            0xB => self.b(opcode),
            0xC => self.c(opcode),
            0xD => self.d(opcode),
            0xE => self.e(opcode),
            0xF => self.f(opcode),
            _ => OpcodeStatus::Error,
        }
    }

    /// A multiuse opcode base for type `0NNN`
    ///
    /// - `0NNN` - Call     -                       - Calls machine code routine ([RCA 1802](https://en.wikipedia.org/wiki/RCA_1802) for COSMAC VIP) at address `NNN`. Not supported.
    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn zero(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn one(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn two(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `3XNN` - Cond    - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    fn three(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn' t equal `NN`.
    fn four(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn five(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    fn six(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    fn seven(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// A mutiuse opcode base for type `8XYT` (T is a sub obcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx=Vy>>1`            - Stores the least significant bit of `VY` in `VF` and the shifted `VY` in `VX`.
    /// - `8XY7` - Math     - `Vy=Vy-Vx`            - Sets `VY` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx=Vy<<1`            - Stores the most significant bit of `VY` in `VF` and the shifted `VY` in `VX`.
    fn eight(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn nine(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `ANNN` - MEM    - `I = NNN`             - Sets `I` to the address `NNN`.
    fn a(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `BNNN` - Flow    - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn b(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to the result of a bitwise and operation on a random number and `NN`.
    fn c(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels. Each row of `8` pixels is read as bit-coded starting from memory location `I`; `I` value doesn’t change after the execution of this instruction. `VF` is set to `1` if any screen pixels are flipped from set to unset when the sprite is drawn, and to `0` if that doesn’t happen
    fn d(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn e(&mut self, opcode: Opcode) -> OpcodeStatus;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`.
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the sprite for the character in `VX`.
    /// - `FX33` - BCD      - `set_BCD(Vx)`         - Stores the hundreds, tens and ones digit of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`. `I` itself is left unmodified.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`. `I` itself is left unmodified.
    fn f(&mut self, opcode: Opcode) -> OpcodeStatus;
}

/// Translates an opcode into its assembler mnemonic, unknown opcodes are rendered as `???`.
///
/// # Example
/// ```rust
/// # use chip::opcode::mnemonic;
/// assert_eq!(mnemonic(0x6520), "LD V5, 0x20");
/// assert_eq!(mnemonic(0x8127), "SUBN V1, V2");
/// assert_eq!(mnemonic(0xF30A), "LD V3, K");
/// ```
pub fn mnemonic(opcode: Opcode) -> String {
    let (x, y, n) = opcode.xyn();
    let kk = opcode.kk();
    let nnn = opcode.nnn();

    match (opcode.t(), n) {
        (0x0, _) => match opcode {
            0x00E0 => "CLS".to_string(),
            0x00EE => "RET".to_string(),
            _ => format!("SYS {:#05X}", nnn),
        },
        (0x1, _) => format!("JP {:#05X}", nnn),
        (0x2, _) => format!("CALL {:#05X}", nnn),
        (0x3, _) => format!("SE V{:X}, {:#04X}", x, kk),
        (0x4, _) => format!("SNE V{:X}, {:#04X}", x, kk),
        (0x5, 0x0) => format!("SE V{:X}, V{:X}", x, y),
        (0x6, _) => format!("LD V{:X}, {:#04X}", x, kk),
        (0x7, _) => format!("ADD V{:X}, {:#04X}", x, kk),
        (0x8, sub) => {
            let name = match sub {
                0x0 => "LD",
                0x1 => "OR",
                0x2 => "AND",
                0x3 => "XOR",
                0x4 => "ADD",
                0x5 => "SUB",
                0x6 => "SHR",
                0x7 => "SUBN",
                0xE => "SHL",
                _ => return "???".to_string(),
            };
            format!("{} V{:X}, V{:X}", name, x, y)
        }
        (0x9, 0x0) => format!("SNE V{:X}, V{:X}", x, y),
        (0xA, _) => format!("LD I, {:#05X}", nnn),
        (0xB, _) => format!("JP V0, {:#05X}", nnn),
        (0xC, _) => format!("RND V{:X}, {:#04X}", x, kk),
        (0xD, _) => format!("DRW V{:X}, V{:X}, {:#03X}", x, y, n),
        (0xE, _) => match kk {
            0x9E => format!("SKP V{:X}", x),
            0xA1 => format!("SKNP V{:X}", x),
            _ => "???".to_string(),
        },
        (0xF, _) => match kk {
            0x07 => format!("LD V{:X}, DT", x),
            0x0A => format!("LD V{:X}, K", x),
            0x15 => format!("LD DT, V{:X}", x),
            0x18 => format!("LD ST, V{:X}", x),
            0x1E => format!("ADD I, V{:X}", x),
            0x29 => format!("LD F, V{:X}", x),
            0x33 => format!("LD B, V{:X}", x),
            0x55 => format!("LD [I], V{:X}", x),
            0x65 => format!("LD V{:X}, [I]", x),
            _ => "???".to_string(),
        },
        _ => "???".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_extraction() {
        let opcode: Opcode = 0xD12F;
        assert_eq!(opcode.t(), 0xD);
        assert_eq!(opcode.x(), 0x1);
        assert_eq!(opcode.y(), 0x2);
        assert_eq!(opcode.n(), 0xF);
        assert_eq!(opcode.kk(), 0x2F);
        assert_eq!(opcode.nnn(), 0x12F);
        assert_eq!(opcode.xkk(), (0x1, 0x2F));
        assert_eq!(opcode.xy(), (0x1, 0x2));
    }

    #[test]
    fn test_build_opcode_out_of_bounds() {
        let data = [0x12, 0x34, 0x56];
        assert_eq!(build_opcode(&data, 0), Ok(0x1234));
        assert_eq!(
            build_opcode(&data, 2),
            Err(OpcodeError::MemoryInvalid { pointer: 2, len: 3 })
        );
    }

    /// A minimal opcode table that records which handler was selected.
    struct Recorder {
        called: Vec<u8>,
    }

    macro_rules! record {
        ($($name:ident => $family:literal),+ $(,)?) => {
            $(
                fn $name(&mut self, _: Opcode) -> OpcodeStatus {
                    self.called.push($family);
                    OpcodeStatus::IncrementPC
                }
            )+
        };
    }

    impl ChipOpcodes for Recorder {
        record!(
            zero => 0x0, one => 0x1, two => 0x2, three => 0x3,
            four => 0x4, five => 0x5, six => 0x6, seven => 0x7,
            eight => 0x8, nine => 0x9, a => 0xA, b => 0xB,
            c => 0xC, d => 0xD, e => 0xE, f => 0xF,
        );
    }

    #[test]
    fn test_dispatch_by_family() {
        let mut recorder = Recorder { called: Vec::new() };
        for family in 0..=0xFu16 {
            let opcode = family << 12 | 0x0ABC;
            assert_eq!(recorder.dispatch(opcode), OpcodeStatus::IncrementPC);
        }
        let expected: Vec<u8> = (0..=0xF).collect();
        assert_eq!(recorder.called, expected);
    }

    #[test]
    fn test_mnemonics() {
        let tests = [
            (0x00E0, "CLS"),
            (0x00EE, "RET"),
            (0x0123, "SYS 0x123"),
            (0x1234, "JP 0x234"),
            (0x2ABC, "CALL 0xABC"),
            (0x3A12, "SE VA, 0x12"),
            (0x4B01, "SNE VB, 0x01"),
            (0x5120, "SE V1, V2"),
            (0x5121, "???"),
            (0x6520, "LD V5, 0x20"),
            (0x7005, "ADD V0, 0x05"),
            (0x8120, "LD V1, V2"),
            (0x8121, "OR V1, V2"),
            (0x8122, "AND V1, V2"),
            (0x8123, "XOR V1, V2"),
            (0x8124, "ADD V1, V2"),
            (0x8125, "SUB V1, V2"),
            (0x8126, "SHR V1, V2"),
            (0x8127, "SUBN V1, V2"),
            (0x812E, "SHL V1, V2"),
            (0x8128, "???"),
            (0x9120, "SNE V1, V2"),
            (0xA222, "LD I, 0x222"),
            (0xB222, "JP V0, 0x222"),
            (0xC1FF, "RND V1, 0xFF"),
            (0xD125, "DRW V1, V2, 0x5"),
            (0xE19E, "SKP V1"),
            (0xE1A1, "SKNP V1"),
            (0xE111, "???"),
            (0xF107, "LD V1, DT"),
            (0xF10A, "LD V1, K"),
            (0xF115, "LD DT, V1"),
            (0xF118, "LD ST, V1"),
            (0xF11E, "ADD I, V1"),
            (0xF129, "LD F, V1"),
            (0xF133, "LD B, V1"),
            (0xF155, "LD [I], V1"),
            (0xF165, "LD V1, [I]"),
            (0xF1AA, "???"),
        ];
        for (opcode, expected) in tests {
            assert_eq!(mnemonic(opcode), expected, "opcode {:#06X}", opcode);
        }
    }
}
