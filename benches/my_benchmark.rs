use chip::{chip8::ChipSet, resources::Rom};
use criterion::{criterion_group, criterion_main, Criterion};

/// Counts V0 up, draws its font glyph and jumps back to the start.
const COUNTER: [u8; 12] = [
    0x70, 0x01, // ADD V0, 0x01
    0xF0, 0x29, // LD F, V0
    0xD1, 0x25, // DRW V1, V2, 0x5
    0x00, 0xE0, // CLS
    0x60, 0x00, // LD V0, 0x00
    0x12, 0x00, // JP 0x200
];

static BASE_ROM: once_cell::sync::Lazy<Rom> =
    once_cell::sync::Lazy::new(|| Rom::new("COUNTER", COUNTER.to_vec()));

/// will setup the default configured chip
fn get_default_chip() -> ChipSet {
    ChipSet::with_rom(&BASE_ROM).expect("The benchmark rom fits into memory.")
}

pub fn tick_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("tick_bench", |b| {
        b.iter(|| {
            for _ in 0..COUNTER.len() / 2 {
                let _ = chip.tick();
            }
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, tick_bench, print_bench);
criterion_main!(benches);
