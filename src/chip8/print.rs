//! The pretty print implementation of the [`ChipSet`](super::ChipSet), it dumps the whole machine
//! state in hexadecimal tables.

use std::fmt::{self, Write};

use num_traits::Unsigned;
use once_cell::sync::Lazy;

use super::ChipSet;
use crate::{
    definitions::memory,
    opcode::{self, Opcode},
};

/// The amount of entries printed per row, has to be bigger than two
const HEX_PRINT_STEP: usize = 8;

/// The amount of memory bytes covered by a single row
const MEMORY_ROW: usize = HEX_PRINT_STEP * memory::opcodes::SIZE as usize;

const INDENT: &str = "\t\t";

/// Marks rows that only contain zeros
const FILLER_BASE: &str = "...";

/// The width of a single formatted integer
static INTEGER_LEN: Lazy<usize> = Lazy::new(|| {
    let mut line = String::new();
    match integer(&mut line, 0u8) {
        Ok(()) => line.len(),
        Err(_) => 0,
    }
});

/// The line printed in place of memory rows that only contain zeros.
static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
    let zero = format!("{:#06X}", 0u16);
    // a full row minus the two outer cells, centered around the filler
    let gap = (zero.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1) - FILLER_BASE.len()) / 2;
    let gap = " ".repeat(gap);
    format!("{zero}{gap}{FILLER_BASE}{gap}{zero}")
});

/// will format all unsigned integer types to the same width
fn integer<T>(line: &mut String, data: T) -> fmt::Result
where
    T: fmt::UpperHex + Unsigned + Copy,
{
    write!(line, "{:#06X}", data)
}

/// will format the location prefix of a row
fn range(line: &mut String, from: usize, to: usize) -> fmt::Result {
    write!(line, "{:#06X} - {:#06X} :", from, to)
}

/// pads the word to the width of an integer so that boolean columns line up
fn boolean(value: bool) -> String {
    let mut word = value.to_string();
    while word.len() < *INTEGER_LEN {
        word.push(' ');
    }
    word
}

/// Prints the data in rows of [`HEX_PRINT_STEP`](HEX_PRINT_STEP) entries, every row is prefixed
/// with the index range it covers.
fn table<T>(out: &mut String, data: &[T], cell: impl Fn(&T) -> String) -> fmt::Result {
    for (row, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
        let from = row * HEX_PRINT_STEP;
        out.push_str(INDENT);
        range(out, from, from + chunk.len() - 1)?;

        let cells: Vec<String> = chunk.iter().map(&cell).collect();
        writeln!(out, " {}", cells.join(" ").trim_end())?;
    }
    Ok(())
}

/// A row of the memory dump, `None` if all the opcodes in it are zero.
struct MemoryRow {
    from: usize,
    to: usize,
    opcodes: Option<Vec<Opcode>>,
}

/// Prints the raw memory as opcodes, neighbouring rows of zeros are merged into one.
fn memory_table(out: &mut String, memory: &[u8]) -> fmt::Result {
    let mut rows: Vec<MemoryRow> = Vec::with_capacity(memory.len() / MEMORY_ROW);

    for (index, chunk) in memory.chunks(MEMORY_ROW).enumerate() {
        let from = index * MEMORY_ROW;
        let to = from + chunk.len() - 1;

        let opcodes: Vec<Opcode> = (0..chunk.len())
            .step_by(memory::opcodes::SIZE as usize)
            .filter_map(|pointer| opcode::build_opcode(chunk, pointer).ok())
            .collect();

        if opcodes.iter().any(|opcode| *opcode != 0) {
            rows.push(MemoryRow {
                from,
                to,
                opcodes: Some(opcodes),
            });
            continue;
        }

        match rows.last_mut() {
            Some(last) if last.opcodes.is_none() => last.to = to,
            _ => rows.push(MemoryRow {
                from,
                to,
                opcodes: None,
            }),
        }
    }

    for row in rows {
        out.push_str(INDENT);
        range(out, row.from, row.to)?;
        out.push(' ');

        match row.opcodes {
            Some(opcodes) => {
                let cells: Vec<String> = opcodes.iter().map(|op| format!("{:#06X}", op)).collect();
                out.push_str(&cells.join(" "));
            }
            None => out.push_str(&ZERO_FILLER),
        }
        out.push('\n');
    }
    Ok(())
}

/// a single indented value line
fn value<T>(out: &mut String, data: T) -> fmt::Result
where
    T: fmt::UpperHex + Unsigned + Copy,
{
    out.push_str(INDENT);
    integer(out, data)?;
    out.push('\n');
    Ok(())
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        writeln!(out, "Chipset {{")?;

        writeln!(out, "\tProgram Name :\n{}{}", INDENT, self.name)?;

        writeln!(out, "\tOpcode :")?;
        out.push_str(INDENT);
        integer(&mut out, self.opcode)?;
        writeln!(out, " {}", opcode::mnemonic(self.opcode))?;

        writeln!(out, "\tProgram Counter :")?;
        value(&mut out, self.program_counter)?;
        writeln!(out, "\tIndex Register :")?;
        value(&mut out, self.index_register)?;
        writeln!(out, "\tStack Pointer :")?;
        value(&mut out, self.stack_pointer)?;
        writeln!(out, "\tDelay Timer :")?;
        value(&mut out, self.get_delay_timer())?;
        writeln!(out, "\tSound Timer :")?;
        value(&mut out, self.get_sound_timer())?;

        writeln!(out, "\tMemory :")?;
        memory_table(&mut out, &self.memory[..])?;

        writeln!(out, "\tKeyboard :")?;
        table(&mut out, self.get_keyboard(), |key| boolean(*key))?;

        writeln!(out, "\tStack :")?;
        table(&mut out, &self.stack, |entry| format!("{:#06X}", entry))?;
        writeln!(out, "\tRegister :")?;
        table(&mut out, &self.registers, |entry| format!("{:#06X}", entry))?;

        out.push('}');
        write!(f, "{}", out)
    }
}
