use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use hackvm::{error::CompilationError, Translator};

enum Error {
    IO(PathBuf, std::io::Error),
    Translation(PathBuf, CompilationError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IO(path, err) => write!(f, "{}: {}", path.display(), err),
            Error::Translation(path, err) => write!(f, "{}: {}", path.display(), err),
        }
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("hackvm-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translates VM code into Hack symbolic assembly")
        .arg(
            Arg::with_name("source")
                .help("File containing VM code")
                .value_name("SOURCE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .help("Where to write the assembly. Defaults to SOURCE with the extension .asm")
                .value_name("OUTPUT")
                .index(2),
        )
        .arg(
            Arg::with_name("annotate")
                .help("Precedes the code of every command with the command as a comment")
                .long("annotate")
                .short("a"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Enables verbose logging")
                .long("verbose")
                .short("v"),
        )
        .get_matches()
}

/// The name of the source unit, used for `static` symbols.
fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("Main"))
}

fn translate(source: &Path, output: &Path, annotate: bool, logger: Logger) -> Result<(), Error> {
    let input = fs::read_to_string(source).map_err(|err| Error::IO(source.to_owned(), err))?;

    let translation = Translator::with_logger(unit_name(source), logger)
        .annotate(annotate)
        .translate_source(&input)
        .map_err(|err| Error::Translation(source.to_owned(), err))?;

    fs::write(output, translation.to_string()).map_err(|err| Error::IO(output.to_owned(), err))
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

    // SOURCE is required, clap exits before this point without it.
    let source = PathBuf::from(args.value_of("source").unwrap_or_default());

    let output = match args.value_of("output") {
        Some(output) => PathBuf::from(output),
        None => source.with_extension("asm"),
    };

    if let Err(err) = translate(&source, &output, args.is_present("annotate"), logger) {
        eprintln!("{}", err);
        exit(1);
    }
}
