use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use slog::{debug, o, trace, Discard, Logger};

use crate::error::VerboseParseError;

use super::instruction::{encode_compute, Address, Instruction};
use super::parser::{parse_line, ErrorKind};

/// Address of the first RAM word handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

/// Base address of the memory mapped screen. Variables must stay below it.
pub const SCREEN: u16 = 16384;

/// Number of words in instruction memory.
pub const ROM_SIZE: usize = 1 << 15;

lazy_static! {
    /// Symbols every program can refer to without defining them.
    pub static ref PREDEFINED: HashMap<&'static str, u16> = {
        let mut symbols = HashMap::new();

        symbols.insert("SP", 0);
        symbols.insert("LCL", 1);
        symbols.insert("ARG", 2);
        symbols.insert("THIS", 3);
        symbols.insert("THAT", 4);
        symbols.insert("SCREEN", SCREEN);
        symbols.insert("KBD", 24576);

        const REGISTERS: [&str; 16] = [
            "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7",
            "R8", "R9", "R10", "R11", "R12", "R13", "R14", "R15",
        ];

        for (index, register) in REGISTERS.iter().enumerate() {
            symbols.insert(*register, index as u16);
        }

        symbols
    };
}

/// An instruction and the number of the line it was parsed from.
#[derive(Clone, Debug, PartialEq)]
pub struct InstructionEntry {
    pub instruction: Instruction,
    pub line: usize,
}

/// A parsed symbolic assembly program.
#[derive(Debug, Default, Clone)]
pub struct Program {
    pub instructions: Vec<InstructionEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssembleError {
    /// A label was bound twice, or shadows a predefined symbol.
    DuplicateLabel { label: String, line: usize },

    /// The program does not fit in instruction memory.
    RomOverflow { size: usize },

    /// More variables than there are free RAM words below `SCREEN`.
    OutOfVariables { symbol: String, line: usize },
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssembleError::DuplicateLabel { label, line } => {
                write!(f, "at line {}: label '{}' is already defined", line, label)
            }
            AssembleError::RomOverflow { size } => write!(
                f,
                "program has {} instructions but only {} fit in memory",
                size, ROM_SIZE
            ),
            AssembleError::OutOfVariables { symbol, line } => {
                write!(f, "at line {}: no free memory for variable '{}'", line, symbol)
            }
        }
    }
}

impl std::error::Error for AssembleError {}

/// An assembled program.
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// Machine words, loaded into instruction memory from address 0.
    pub words: Vec<u16>,

    /// ROM addresses of all labels.
    pub labels: HashMap<String, u16>,

    /// RAM addresses assigned to variables, in order of first use.
    pub variables: HashMap<String, u16>,
}

impl Program {
    /// Parses a symbolic assembly program. Blank lines and `//` comments are allowed.
    pub fn parse(input: &str) -> Result<Program, VerboseParseError<ErrorKind>> {
        let mut instructions = Vec::new();

        for (index, text) in input.lines().enumerate() {
            let line = index + 1;

            match parse_line(text) {
                Ok(Some(instruction)) => instructions.push(InstructionEntry { instruction, line }),
                Ok(None) => {}
                Err(err) => return Err(err.verbose(text, line)),
            }
        }

        Ok(Program { instructions })
    }

    /// Resolves all symbols and encodes the program.
    pub fn assemble(&self) -> Result<Image, AssembleError> {
        self.assemble_with_logger(None)
    }

    pub fn assemble_with_logger<L>(&self, logger: L) -> Result<Image, AssembleError>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "assembly"));

        let size = self.instructions.iter().filter(|entry| entry.instruction.is_real()).count();

        if size > ROM_SIZE {
            return Err(AssembleError::RomOverflow { size });
        }

        let mut labels = HashMap::new();
        let mut address = 0u16;

        for entry in &self.instructions {
            match entry.instruction {
                Instruction::Label(ref label) => {
                    if PREDEFINED.contains_key(label.as_str()) || labels.contains_key(label) {
                        return Err(AssembleError::DuplicateLabel {
                            label: label.clone(),
                            line: entry.line,
                        });
                    }

                    trace!(logger, "bind label"; "label" => label, "address" => address);
                    labels.insert(label.clone(), address);
                }
                _ => address += 1,
            }
        }

        let mut variables = HashMap::new();
        let mut next_variable = VARIABLE_BASE;
        let mut words = Vec::with_capacity(size);

        for entry in &self.instructions {
            let word = match entry.instruction {
                Instruction::Label(_) => continue,
                Instruction::Address(Address::Constant(value)) => value,
                Instruction::Address(Address::Symbol(ref symbol)) => {
                    if let Some(value) = PREDEFINED.get(symbol.as_str()) {
                        *value
                    } else if let Some(value) = labels.get(symbol) {
                        *value
                    } else if let Some(value) = variables.get(symbol) {
                        *value
                    } else {
                        if next_variable >= SCREEN {
                            return Err(AssembleError::OutOfVariables {
                                symbol: symbol.clone(),
                                line: entry.line,
                            });
                        }

                        trace!(logger, "allocate variable";
                            "symbol" => symbol,
                            "address" => next_variable
                        );
                        variables.insert(symbol.clone(), next_variable);
                        next_variable += 1;
                        next_variable - 1
                    }
                }
                Instruction::Compute { dest, comp, jump } => encode_compute(dest, comp, jump),
            };

            words.push(word);
        }

        debug!(logger, "assembled program";
            "words" => words.len(),
            "labels" => labels.len(),
            "variables" => variables.len()
        );

        Ok(Image {
            words,
            labels,
            variables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTDOWN: &str = "// Counts R0 down to zero.
@3
D=A
@R0
M=D
(LOOP)
  @R0
  MD=M-1
  @LOOP
  D;JGT
(END)
  @END
  0;JMP
";

    #[test]
    fn test_parse_program() {
        let program = Program::parse(COUNTDOWN).unwrap();

        assert_eq!(program.instructions.len(), 12);
        assert_eq!(program.instructions[0].line, 2);
        assert_eq!(program.instructions[4].instruction, Instruction::label("LOOP"));
    }

    #[test]
    fn test_parse_error_location() {
        let err = Program::parse("@SP\nAM=M-1\nD=Q\n").unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_assemble_labels() {
        let image = Program::parse(COUNTDOWN).unwrap().assemble().unwrap();

        assert_eq!(image.words.len(), 10);
        assert_eq!(image.labels["LOOP"], 4);
        assert_eq!(image.labels["END"], 8);
        assert_eq!(image.words[2], 0); // @R0
        assert_eq!(image.words[6], 4); // @LOOP
        assert_eq!(image.words[8], 8); // @END
        assert!(image.variables.is_empty());
    }

    #[test]
    fn test_assemble_variables() {
        let source = "@Foo.3\nM=0\n@Bar.3\nM=0\n@Foo.3\nD=M\n";
        let image = Program::parse(source).unwrap().assemble().unwrap();

        assert_eq!(image.variables["Foo.3"], 16);
        assert_eq!(image.variables["Bar.3"], 17);
        assert_eq!(image.words[4], 16);
    }

    #[test]
    fn test_duplicate_label() {
        let err = Program::parse("(X)\n@X\n(X)\n").unwrap().assemble().unwrap_err();
        assert_eq!(err, AssembleError::DuplicateLabel { label: "X".into(), line: 3 });

        let err = Program::parse("(SP)\n").unwrap().assemble().unwrap_err();
        assert_eq!(err, AssembleError::DuplicateLabel { label: "SP".into(), line: 1 });
    }
}
