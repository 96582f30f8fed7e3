//! [Emulator] for executing [assembled programs](crate::hack::Image).

use std::convert::TryFrom;
use std::fmt;

use slog::{o, trace, Discard, Logger};

use crate::hack::instruction::{Address, Instruction, InvalidInstruction, Jump};

/// Number of words in data memory.
pub const RAM_SIZE: usize = 1 << 15;

/// Contains the registers of the Hack CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// The Program Counter stores the address of the next instruction to be executed.
    pub pc: u16,

    /// The address register. Also selects the memory word `M`.
    pub a: u16,

    /// The data register.
    pub d: u16,
}

/// Trait for implementing the data memory of a Hack CPU.
pub trait Memory {
    /// Error type returned by all methods of this trait.
    type Error;

    /// Fetch the data word from the specified address.
    fn read(&self, addr: u16) -> Result<u16, Self::Error>;

    /// Overwrite the data word in the specified address.
    ///
    /// # Returns
    /// A memory error if the operation cannot be performed.
    fn write(&mut self, addr: u16, data: u16) -> Result<(), Self::Error>;
}

/// An access outside of the memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfBounds {
    pub address: u16,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "memory access out of bounds at address {}", self.address)
    }
}

impl Memory for Vec<u16> {
    type Error = OutOfBounds;

    fn read(&self, addr: u16) -> Result<u16, OutOfBounds> {
        self.get(addr as usize).copied().ok_or(OutOfBounds { address: addr })
    }

    fn write(&mut self, addr: u16, data: u16) -> Result<(), OutOfBounds> {
        match self.get_mut(addr as usize) {
            Some(word) => {
                *word = data;
                Ok(())
            }
            None => Err(OutOfBounds { address: addr }),
        }
    }
}

/// A zeroed data memory of the standard size.
pub fn ram() -> Vec<u16> {
    vec![0; RAM_SIZE]
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmulatorError<E> {
    Memory(E),
    InvalidInstruction { pc: u16, error: InvalidInstruction },
    /// The program was still running after the given number of cycles.
    CycleLimit(usize),
}

impl<E: fmt::Display> fmt::Display for EmulatorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmulatorError::Memory(err) => write!(f, "{}", err),
            EmulatorError::InvalidInstruction { pc, error } => {
                write!(f, "at address {}: {}", pc, error)
            }
            EmulatorError::CycleLimit(cycles) => {
                write!(f, "program did not halt within {} cycles", cycles)
            }
        }
    }
}

impl<E> From<E> for EmulatorError<E> {
    fn from(err: E) -> EmulatorError<E> {
        EmulatorError::Memory(err)
    }
}

/// Emulates the Hack CPU: a read only instruction memory, a data memory and the registers.
#[derive(Clone, Debug)]
pub struct Emulator<Mem> {
    /// The program being executed.
    pub rom: Vec<u16>,

    /// The data memory of the emulated machine. Implements [Memory].
    pub memory: Mem,

    /// The registers of the CPU.
    pub context: Context,

    /// True once the program has run past its last instruction or entered its halt loop.
    pub halted: bool,

    /// Number of instructions executed so far.
    pub cycles: usize,

    logger: Logger,
}

impl<Mem> Emulator<Mem>
where
    Mem: Memory,
{
    /// Create a new emulator.
    ///
    /// # Parameters
    /// - `rom`: The machine words of the program.
    /// - `memory`: A [Memory] object holding the initial data.
    pub fn new(rom: Vec<u16>, memory: Mem) -> Emulator<Mem> {
        Emulator::with_logger(rom, memory, None)
    }

    pub fn with_logger<L>(rom: Vec<u16>, memory: Mem, logger: L) -> Emulator<Mem>
    where
        L: Into<Option<Logger>>,
    {
        let logger = logger
            .into()
            .unwrap_or(Logger::root(Discard, o!()))
            .new(o!("stage" => "emulation"));

        Emulator {
            rom,
            memory,
            context: Context::default(),
            halted: false,
            cycles: 0,
            logger,
        }
    }

    /// Fetches the instruction from the address pointed by the Program Counter register.
    ///
    /// Returns `None` when the Program Counter is past the end of the program.
    pub fn get_current_instruction(
        &self,
    ) -> Result<Option<Instruction>, EmulatorError<Mem::Error>> {
        let pc = self.context.pc;

        match self.rom.get(pc as usize) {
            None => Ok(None),
            Some(word) => Instruction::try_from(*word)
                .map(Some)
                .map_err(|error| EmulatorError::InvalidInstruction { pc, error }),
        }
    }

    /// True if jumping from the current instruction to `target` loops forever: either a jump to
    /// itself or the `(END) @END 0;JMP` idiom.
    fn is_halt_loop(&self, target: u16) -> bool {
        let pc = self.context.pc;

        target == pc
            || (target.wrapping_add(1) == pc && self.rom.get(target as usize) == Some(&target))
    }

    /// Executes a single instruction and advances the Program Counter.
    ///
    /// # Errors
    /// Returns an error if the instruction cannot be decoded or accesses memory that does not
    /// exist.
    pub fn step(&mut self) -> Result<(), EmulatorError<Mem::Error>> {
        if self.halted {
            return Ok(());
        }

        let ins = match self.get_current_instruction()? {
            Some(ins) => ins,
            None => {
                trace!(self.logger, "halt"; "reason" => "end of program", "pc" => self.context.pc);
                self.halted = true;
                return Ok(());
            }
        };

        trace!(self.logger, "step";
            "pc" => self.context.pc,
            "instruction" => %ins,
            "a" => self.context.a,
            "d" => self.context.d
        );

        self.cycles += 1;

        match ins {
            Instruction::Address(Address::Constant(value)) => {
                self.context.a = value;
                self.context.pc = self.context.pc.wrapping_add(1);
            }
            Instruction::Compute { dest, comp, jump } => {
                let a = self.context.a;

                let m = if comp.reads_memory() {
                    self.memory.read(a)?
                } else {
                    0
                };

                let value = comp.evaluate(self.context.d, a, m);

                if dest.m {
                    self.memory.write(a, value)?;
                }

                if dest.a {
                    self.context.a = value;
                }

                if dest.d {
                    self.context.d = value;
                }

                match jump {
                    Some(jump) if jump.holds(value) => {
                        if jump == Jump::Always && self.is_halt_loop(a) {
                            trace!(self.logger, "halt";
                                "reason" => "halt loop",
                                "pc" => self.context.pc
                            );
                            self.halted = true;
                        }

                        self.context.pc = a;
                    }
                    _ => self.context.pc = self.context.pc.wrapping_add(1),
                }
            }
            // Decoding never yields symbols or labels.
            Instruction::Address(Address::Symbol(_)) | Instruction::Label(_) => {
                self.context.pc = self.context.pc.wrapping_add(1);
            }
        }

        Ok(())
    }

    /// Executes the program until it halts.
    ///
    /// # Returns
    /// The number of instructions executed by this call.
    ///
    /// # Errors
    /// [EmulatorError::CycleLimit] if the program has not halted after `max_cycles` instructions.
    pub fn run(&mut self, max_cycles: usize) -> Result<usize, EmulatorError<Mem::Error>> {
        let start = self.cycles;

        while !self.halted {
            if self.cycles - start >= max_cycles {
                return Err(EmulatorError::CycleLimit(max_cycles));
            }

            self.step()?;
        }

        Ok(self.cycles - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hack::Program;

    fn emulator(source: &str) -> Emulator<Vec<u16>> {
        let image = Program::parse(source).unwrap().assemble().unwrap();
        Emulator::new(image.words, ram())
    }

    #[test]
    fn test_run_to_end() {
        let mut emu = emulator("@7\nD=A\n@8\nD=D+A\n@R0\nM=D\n");

        assert_eq!(emu.run(100), Ok(6));
        assert!(emu.halted);
        assert_eq!(emu.memory[0], 15);
    }

    #[test]
    fn test_halt_loop() {
        let mut emu = emulator("@3\nD=A\n@R1\nM=D\n(END)\n@END\n0;JMP\n");

        assert_eq!(emu.run(100), Ok(6));
        assert_eq!(emu.memory[1], 3);
    }

    #[test]
    fn test_loop() {
        let source = "@3\nD=A\n@R0\nM=D\n(LOOP)\n@R1\nM=M+1\n@R0\nMD=M-1\n@LOOP\nD;JGT\n";
        let mut emu = emulator(source);

        emu.run(1000).unwrap();
        assert_eq!(emu.memory[0], 0);
        assert_eq!(emu.memory[1], 3);
    }

    #[test]
    fn test_cycle_limit() {
        let mut emu = emulator("(LOOP)\n@R0\nM=M+1\n@LOOP\n0;JMP\n");

        assert_eq!(emu.run(50), Err(EmulatorError::CycleLimit(50)));
    }

    #[test]
    fn test_write_uses_old_a() {
        let mut emu = emulator("@100\nAM=A+1\n");

        emu.run(10).unwrap();
        assert_eq!(emu.memory[100], 101);
        assert_eq!(emu.context.a, 101);
    }

    #[test]
    fn test_out_of_bounds() {
        let image = Program::parse("@20\nM=1\n").unwrap().assemble().unwrap();
        let mut emu = Emulator::new(image.words, vec![0u16; 10]);

        assert_eq!(emu.run(10), Err(EmulatorError::Memory(OutOfBounds { address: 20 })));
    }

    #[test]
    fn test_program_counter_wraps() {
        // Every word is `@0`, so the last address is followed by the first.
        let mut emu = Emulator::new(vec![0u16; 1 << 16], ram());
        emu.context.pc = u16::max_value();

        emu.step().unwrap();
        assert_eq!(emu.context.pc, 0);
        assert!(!emu.halted);
    }

    #[test]
    fn test_invalid_instruction() {
        let mut emu = Emulator::new(vec![0b1000_0000_0000_0000], ram());

        match emu.step() {
            Err(EmulatorError::InvalidInstruction { pc: 0, .. }) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
