use std::fs;
use std::path::Path;
use std::process::exit;

use clap::{App, Arg, ArgMatches};
use itertools::Itertools;
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use hackvm::{
    emulator::{ram, Emulator, EmulatorError, OutOfBounds},
    error::CompilationError,
    hack::{self, AssembleError},
    Translator,
};

/// Initial values of `SP`, `LCL`, `ARG`, `THIS` and `THAT`.
const REGISTERS: [(u16, u16); 5] = [(0, 256), (1, 300), (2, 400), (3, 3000), (4, 3010)];

const STACK_BASE: u16 = 256;

enum Error {
    IO(std::io::Error),
    Translation(CompilationError),
    Parse(String),
    Assembly(AssembleError),
    Execution(EmulatorError<OutOfBounds>),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<CompilationError> for Error {
    fn from(e: CompilationError) -> Error {
        Error::Translation(e)
    }
}

impl From<AssembleError> for Error {
    fn from(e: AssembleError) -> Error {
        Error::Assembly(e)
    }
}

impl From<EmulatorError<OutOfBounds>> for Error {
    fn from(e: EmulatorError<OutOfBounds>) -> Error {
        Error::Execution(e)
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("hackvm-run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility for translating and executing VM and Hack assembly programs")
        .arg(
            Arg::with_name("source")
                .help("File containing VM code (.vm) or symbolic assembly (.asm)")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("cycles")
                .help("Maximum number of instructions to execute")
                .long("cycles")
                .short("c")
                .takes_value(true)
                .default_value("100000"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Enables verbose logging")
                .long("verbose")
                .short("v"),
        )
        .get_matches()
}

fn main() {
    let args = parse_arguments();

    let logger = if args.is_present("verbose") {
        let decorator = TermDecorator::new().build();
        let drain = FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!())
    } else {
        Logger::root(Discard, o!())
    };

    let cycles = match args.value_of("cycles").map(str::parse::<usize>) {
        Some(Ok(cycles)) => cycles,
        _ => {
            eprintln!("--cycles expects a non-negative number");
            exit(2);
        }
    };

    let source = args.value_of("source").unwrap_or_default();

    let result = match run(Path::new(source), cycles, logger) {
        Ok(()) => return,
        Err(err) => err,
    };

    match result {
        Error::IO(io) => eprintln!("IO error: {}", io),
        Error::Translation(err) => eprintln!("Translation error {}", err),
        Error::Parse(err) => eprintln!("Parse error {}", err),
        Error::Assembly(err) => eprintln!("Assembly error {}", err),
        Error::Execution(err) => eprintln!("Execution error: {}", err),
    }

    exit(1);
}

fn run(path: &Path, cycles: usize, logger: Logger) -> Result<(), Error> {
    let file = fs::read_to_string(path)?;

    let assembly = if path.extension().map_or(false, |ext| ext == "vm") {
        let unit = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Translator::with_logger(unit, logger.clone())
            .translate_source(&file)?
            .to_string()
    } else {
        file
    };

    let program = hack::Program::parse(&assembly).map_err(|err| Error::Parse(err.to_string()))?;
    let image = program.assemble_with_logger(logger.clone())?;

    let mut memory = ram();
    for (address, value) in REGISTERS.iter() {
        memory[*address as usize] = *value;
    }

    let mut emulator = Emulator::with_logger(image.words, memory, logger);
    let executed = emulator.run(cycles)?;

    let sp = emulator.memory[0];
    let stack = (STACK_BASE..sp.max(STACK_BASE))
        .filter_map(|address| emulator.memory.get(address as usize))
        .map(|word| *word as i16)
        .join(" ");

    println!("executed {} instructions", executed);
    println!("SP = {}", sp);
    println!("stack: [{}]", stack);

    Ok(())
}
