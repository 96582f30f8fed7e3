mod common;

use hackvm::{
    emulator::{ram, Emulator},
    hack, Translator,
};

use slog::{o, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

fn logger() -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, o!())
}

#[test]
fn test_pointer_test_with_logging() {
    let logger = logger();

    let translation = Translator::with_logger("PointerTest", logger.clone())
        .translate_source(include_str!("PointerTest.vm"))
        .expect("could not translate the program");

    let image = hack::Program::parse(&translation.to_string())
        .expect("could not parse the generated assembly")
        .assemble_with_logger(logger.clone())
        .expect("could not assemble the generated assembly");

    let mut memory = ram();
    for (address, value) in common::REGISTERS.iter() {
        memory[*address] = *value;
    }

    let mut emulator = Emulator::with_logger(image.words, memory, logger);

    while !emulator.halted {
        emulator.step().expect("could not execute the instruction");
    }

    assert_eq!(common::stack(&emulator), vec![6084]);
}
