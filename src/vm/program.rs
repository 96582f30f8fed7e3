use crate::error::CompilationError;

use super::command::Command;
use super::parser::parse_line;

/// A parsed command and the source line it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandEntry {
    pub command: Command,
    /// 1-based line number in the source file.
    pub line: usize,
    pub text: String,
}

/// The commands of one source unit, in source order.
#[derive(Debug, Default, Clone)]
pub struct Program {
    pub commands: Vec<CommandEntry>,
}

/// Iterates over the lines of `input` that can hold a command, numbered from 1.
///
/// Blank lines and lines that only hold a comment are skipped, but still counted.
pub fn source_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
}

impl Program {
    /// Parses VM source, stopping at the first malformed line.
    pub fn parse(input: &str) -> Result<Program, CompilationError> {
        let commands = source_lines(input)
            .map(|(line, text)| {
                parse_line(text)
                    .map(|command| CommandEntry {
                        command,
                        line,
                        text: text.to_string(),
                    })
                    .map_err(|err| CompilationError::new(line, text, err))
            })
            .collect::<Result<_, _>>()?;

        Ok(Program { commands })
    }

    /// Parses VM source and reports every malformed line instead of only the first one.
    pub fn parse_verbose(input: &str) -> Result<Program, Vec<CompilationError>> {
        let mut commands = Vec::new();
        let mut errors = Vec::new();

        for (line, text) in source_lines(input) {
            match parse_line(text) {
                Ok(command) => commands.push(CommandEntry {
                    command,
                    line,
                    text: text.to_string(),
                }),
                Err(err) => errors.push(CompilationError::new(line, text, err)),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Program { commands })
    }

    /// Net change of the stack depth after running every command once.
    pub fn stack_effect(&self) -> i32 {
        self.commands.iter().map(|entry| entry.command.stack_effect()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::vm::command::{BinaryOp, Operator, Segment};
    use crate::vm::parser::ErrorKind;

    const SIMPLE_ADD: &str = "// Pushes and adds two constants.\n\
                              \n\
                              push constant 7\n\
                              push constant 8   // second operand\n\
                              \r\n\
                              add\n";

    #[test]
    fn test_source_lines() {
        let lines: Vec<_> = source_lines(SIMPLE_ADD).map(|(n, _)| n).collect();
        assert_eq!(lines, vec![3, 4, 6]);
    }

    #[test]
    fn test_parse_program() {
        let program = Program::parse(SIMPLE_ADD).unwrap();

        let commands: Vec<_> = program
            .commands
            .iter()
            .map(|entry| (entry.line, entry.command))
            .collect();

        assert_eq!(
            commands,
            vec![
                (3, Command::Push(Segment::Constant, 7)),
                (4, Command::Push(Segment::Constant, 8)),
                (6, Command::Arithmetic(Operator::Binary(BinaryOp::Add))),
            ]
        );
        assert_eq!(program.stack_effect(), 1);
    }

    #[test]
    fn test_parse_stops_at_first_error() {
        let source = "push constant 1\n\npop locl 0\npush heap 2\n";

        let err = Program::parse(source).unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.text, "pop locl 0");
        assert_eq!(err.column(), Some(5));
        match err.error {
            Error::Parse(ref err) => assert_eq!(
                err.kind,
                ErrorKind::UnknownSegment { word: "locl".into(), suggestion: Some("local") }
            ),
            ref other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "error at line 3, column 5: unknown segment 'locl', did you mean 'local'?\n\
             \x20 | pop locl 0"
        );
    }

    #[test]
    fn test_parse_verbose_collects_errors() {
        let source = "push constant 1\n\npop locl 0\npush heap 2\nadd\n";

        let errors = Program::parse_verbose(source).unwrap_err();
        let lines: Vec<_> = errors.iter().map(|err| err.line).collect();

        assert_eq!(lines, vec![3, 4]);
    }
}
