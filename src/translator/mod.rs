//! Translation of VM commands into Hack assembly.
//!
//! A [Translator] holds everything that outlives a single command: the label allocator and the
//! name of the source unit being translated. Each command becomes a [Fragment], and a whole
//! [vm::Program](crate::vm::Program) becomes a [Translation].

pub mod arithmetic;
pub mod pop;
pub mod push;
pub mod segment;

use std::fmt;

use slog::{debug, o, trace, Discard, Logger};

use crate::error::{CompilationError, Error};
use crate::hack::Instruction;
use crate::source_map::SourceMap;
use crate::symbol::SymbolAllocator;
use crate::vm::parser::parse_words;
use crate::vm::{Command, Program, Segment};

/// Failure to translate a well formed command.
#[derive(Clone, Debug, PartialEq)]
pub enum TranslateError {
    /// The segment has no base address, so the general push and pop templates do not apply.
    NotOffsetAddressable(Segment),

    /// There is no storage behind the `constant` segment to pop into.
    PopConstant,

    /// The unit name cannot prefix a `static` symbol.
    InvalidUnit(String),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TranslateError::NotOffsetAddressable(segment) => {
                write!(f, "segment '{}' is not addressed by base and offset", segment)
            }
            TranslateError::PopConstant => write!(f, "cannot pop into the constant segment"),
            TranslateError::InvalidUnit(unit) => write!(
                f,
                "unit name '{}' cannot be used in static symbols, expected letters, digits, '_', \
                 '.' or ':', not starting with a digit",
                unit
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

/// The symbol of `static offset` in source unit `unit`.
pub fn static_symbol(unit: &str, offset: u16) -> String {
    format!("{}.{}", unit, offset)
}

/// True if `unit` followed by `.N` is a symbol the assembler accepts.
///
/// `$` is refused so that statics never meet the `<op>$true.N` labels of comparisons.
pub fn is_unit_name(unit: &str) -> bool {
    let mut chars = unit.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || "_.:".contains(c) => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || "_.:".contains(c))
}

/// The code generated for one command.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    /// Rendered as a `//` line before the instructions.
    pub comment: Option<String>,
    pub instructions: Vec<Instruction>,
}

impl Fragment {
    /// Number of ROM words the fragment occupies once assembled.
    pub fn rom_size(&self) -> usize {
        self.instructions.iter().filter(|ins| ins.is_real()).count()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref comment) = self.comment {
            writeln!(f, "// {}", comment)?;
        }

        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }

        Ok(())
    }
}

/// The output for a whole source unit.
#[derive(Clone, Debug, Default)]
pub struct Translation {
    pub fragments: Vec<Fragment>,
    pub source_map: SourceMap,
}

impl Translation {
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.fragments.iter().flat_map(|fragment| fragment.instructions.iter())
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for fragment in &self.fragments {
            write!(f, "{}", fragment)?;
        }

        Ok(())
    }
}

/// A translation session.
#[derive(Debug)]
pub struct Translator {
    allocator: SymbolAllocator,
    unit: String,
    annotate: bool,
    logger: Logger,
}

impl Translator {
    /// Creates a translator for the source unit `unit`, whose name prefixes all `static` symbols.
    pub fn new<S: Into<String>>(unit: S) -> Translator {
        Translator::with_logger(unit, None)
    }

    pub fn with_logger<S, L>(unit: S, logger: L) -> Translator
    where
        S: Into<String>,
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "translation"));

        Translator {
            allocator: SymbolAllocator::new(),
            unit: unit.into(),
            annotate: false,
            logger,
        }
    }

    /// Replaces the label allocator, e.g. with one that starts at a known index.
    pub fn with_allocator(mut self, allocator: SymbolAllocator) -> Translator {
        self.allocator = allocator;
        self
    }

    /// Makes every fragment start with a comment holding the command.
    pub fn annotate(mut self, annotate: bool) -> Translator {
        self.annotate = annotate;
        self
    }

    /// Switches to another source unit. Labels stay unique across units.
    pub fn set_unit<S: Into<String>>(&mut self, unit: S) {
        self.unit = unit.into();
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn allocator(&self) -> &SymbolAllocator {
        &self.allocator
    }

    /// Translates a single command.
    pub fn translate(&self, command: &Command) -> Result<Fragment, TranslateError> {
        if let Command::Push(Segment::Static, _) | Command::Pop(Segment::Static, _) = *command {
            if !is_unit_name(&self.unit) {
                return Err(TranslateError::InvalidUnit(self.unit.clone()));
            }
        }

        let instructions = match *command {
            Command::Arithmetic(op) => arithmetic::translate(op, &self.allocator),
            Command::Push(segment, offset) => push::translate(segment, offset, &self.unit)?,
            Command::Pop(segment, offset) => pop::translate(segment, offset, &self.unit)?,
        };

        let comment = if self.annotate {
            Some(command.to_string())
        } else {
            None
        };

        Ok(Fragment {
            comment,
            instructions,
        })
    }

    /// Translates a command given as separate words, e.g. `["push", "constant", "7"]`.
    pub fn translate_words<S: AsRef<str>>(&self, words: &[S]) -> Result<String, Error> {
        let command = parse_words(words)?;
        Ok(self.translate(&command)?.to_string())
    }

    /// Translates every command of `program` in order, stopping at the first failure.
    pub fn translate_program(&self, program: &Program) -> Result<Translation, CompilationError> {
        let logger = self.logger.new(o!("unit" => self.unit.clone()));

        let mut fragments = Vec::with_capacity(program.commands.len());
        let mut source_map = Vec::new();
        let mut address = 0;

        for entry in &program.commands {
            trace!(logger, "translate command"; "line" => entry.line, "command" => %entry.command);

            let fragment = self
                .translate(&entry.command)
                .map_err(|err| CompilationError::new(entry.line, &entry.text, err))?;

            let size = fragment.rom_size();
            source_map.extend((address..address + size).map(|addr| (addr, entry.line)));
            address += size;

            fragments.push(fragment);
        }

        debug!(logger, "translated unit";
            "commands" => program.commands.len(),
            "instructions" => address,
            "labels" => self.allocator.peek()
        );

        Ok(Translation {
            fragments,
            source_map: source_map.into_iter().collect(),
        })
    }

    /// Parses and translates VM source text.
    pub fn translate_source(&self, source: &str) -> Result<Translation, CompilationError> {
        let program = Program::parse(source)?;
        self.translate_program(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::{BinaryOp, Comparison, Operator};

    #[test]
    fn test_translate_words() {
        let translator = Translator::new("Main");

        assert_eq!(
            translator.translate_words(&["push", "constant", "7"]).unwrap(),
            "@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n"
        );
        assert_eq!(
            translator.translate_words(&["NEG"]).unwrap(),
            "@SP\nAM=M-1\nM=-M\n@SP\nM=M+1\n"
        );
    }

    #[test]
    fn test_translate_words_errors() {
        let translator = Translator::new("Main");

        let err = translator.translate_words(&["push", "locl", "0"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown segment 'locl', did you mean 'local'?");

        assert!(translator.translate_words(&["pop", "constant", "0"]).is_err());
        assert!(translator.translate_words(&["call", "f", "0"]).is_err());
    }

    #[test]
    fn test_pop_constant_is_an_error() {
        let translator = Translator::new("Main");
        let command = Command::Pop(Segment::Constant, 1);

        assert_eq!(translator.translate(&command), Err(TranslateError::PopConstant));
    }

    #[test]
    fn test_annotate() {
        let translator = Translator::new("Main").annotate(true);
        let fragment = translator
            .translate(&Command::Arithmetic(Operator::Binary(BinaryOp::Add)))
            .unwrap();

        assert_eq!(fragment.comment.as_deref(), Some("add"));
        assert!(fragment.to_string().starts_with("// add\n@SP\n"));
    }

    #[test]
    fn test_static_follows_unit() {
        let mut translator = Translator::new("Foo");
        let command = Command::Pop(Segment::Static, 3);

        let foo = translator.translate(&command).unwrap();
        translator.set_unit("Bar");
        let bar = translator.translate(&command).unwrap();

        assert_eq!(foo.instructions[4], Instruction::at("Foo.3"));
        assert_eq!(bar.instructions[4], Instruction::at("Bar.3"));
    }

    #[test]
    fn test_unit_names() {
        assert!(is_unit_name("Main"));
        assert!(is_unit_name("_private.vm:2"));
        assert!(!is_unit_name(""));
        assert!(!is_unit_name("my-file"));
        assert!(!is_unit_name("1st"));
        assert!(!is_unit_name("eq$true"));
        assert!(!is_unit_name("Ünit"));
    }

    #[test]
    fn test_invalid_unit_only_affects_statics() {
        let mut translator = Translator::new("my-file");

        assert_eq!(
            translator.translate(&Command::Pop(Segment::Static, 0)),
            Err(TranslateError::InvalidUnit("my-file".into()))
        );
        assert!(translator.translate(&Command::Push(Segment::Local, 0)).is_ok());

        translator.set_unit("1st");
        assert_eq!(
            translator.translate(&Command::Push(Segment::Static, 2)),
            Err(TranslateError::InvalidUnit("1st".into()))
        );

        translator.set_unit("First");
        assert!(translator.translate(&Command::Push(Segment::Static, 2)).is_ok());
    }

    #[test]
    fn test_labels_unique_across_units() {
        let mut translator =
            Translator::new("Foo").with_allocator(SymbolAllocator::starting_at(10));
        let command = Command::Arithmetic(Operator::Compare(Comparison::Eq));

        let first = translator.translate(&command).unwrap();
        translator.set_unit("Bar");
        let second = translator.translate(&command).unwrap();

        assert_eq!(first.instructions[14], Instruction::label("eq$true.10"));
        assert_eq!(second.instructions[14], Instruction::label("eq$true.11"));
    }

    #[test]
    fn test_translate_program() {
        let source = "push constant 7\n\n// comment\npush constant 8\nadd\n";
        let translation = Translator::new("Main").translate_source(source).unwrap();

        assert_eq!(translation.fragments.len(), 3);
        assert_eq!(translation.instructions().count(), 7 + 7 + 9);
        assert_eq!(translation.source_map.get_source_line(0), Some(1));
        assert_eq!(translation.source_map.get_source_line(7), Some(4));
        assert_eq!(translation.source_map.get_source_line(22), Some(5));
        assert_eq!(translation.source_map.get_source_line(23), None);
    }

    #[test]
    fn test_source_map_skips_labels() {
        let source = "push constant 1\npush constant 2\nlt\nnot\n";
        let translation = Translator::new("Main").translate_source(source).unwrap();

        // lt occupies 16 words, its label does not count.
        assert_eq!(translation.source_map.addresses_of(3), (14..30).collect::<Vec<_>>());
        assert_eq!(translation.source_map.get_source_line(30), Some(4));
    }

    #[test]
    fn test_translate_program_stops_at_first_error() {
        let source = "push constant 1\npop constant 0\npush heap 1\n";
        let err = Translator::new("Main").translate_source(source).unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.text, "pop constant 0");
    }
}
