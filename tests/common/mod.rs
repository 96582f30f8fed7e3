#![allow(dead_code)]

use hackvm::{
    emulator::{ram, Emulator},
    hack, Translation, Translator,
};

pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

pub const STACK_BASE: u16 = 256;

/// The RAM setup the standard test scripts use.
pub const REGISTERS: [(usize, u16); 5] = [
    (SP, STACK_BASE),
    (LCL, 300),
    (ARG, 400),
    (THIS, 3000),
    (THAT, 3010),
];

pub fn translate(unit: &str, source: &str) -> Translation {
    Translator::new(unit)
        .translate_source(source)
        .expect("could not translate the program")
}

pub fn assemble(assembly: &str) -> hack::Image {
    hack::Program::parse(assembly)
        .expect("could not parse the generated assembly")
        .assemble()
        .expect("could not assemble the generated assembly")
}

pub fn execute(image: hack::Image) -> Emulator<Vec<u16>> {
    let mut memory = ram();

    for (address, value) in REGISTERS.iter() {
        memory[*address] = *value;
    }

    let mut emulator = Emulator::new(image.words, memory);

    emulator.run(100_000).expect("the program did not halt");

    emulator
}

/// Translates, assembles and runs VM source.
pub fn run(unit: &str, source: &str) -> Emulator<Vec<u16>> {
    let translation = translate(unit, source);
    execute(assemble(&translation.to_string()))
}

/// The stack contents from bottom to top, as signed values.
pub fn stack(emulator: &Emulator<Vec<u16>>) -> Vec<i16> {
    let sp = emulator.memory[SP] as usize;

    emulator.memory[STACK_BASE as usize..sp]
        .iter()
        .map(|word| *word as i16)
        .collect()
}

/// VM commands that push `value`, which may be negative.
pub fn push_value(value: i16) -> String {
    if value < 0 {
        format!("push constant {}\nneg\n", -(value as i32))
    } else {
        format!("push constant {}\n", value)
    }
}
