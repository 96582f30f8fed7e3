//! Types for representing Hack instructions and their parts.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// The operand of an A-instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// A literal value in `0..=32767`.
    Constant(u16),
    /// A label, a predefined symbol or a variable.
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Constant(value) => write!(f, "{}", value),
            Address::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// Registers written by a C-instruction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    pub const NONE: Dest = Dest { a: false, d: false, m: false };
    pub const A: Dest = Dest { a: true, d: false, m: false };
    pub const D: Dest = Dest { a: false, d: true, m: false };
    pub const M: Dest = Dest { a: false, d: false, m: true };
    pub const AM: Dest = Dest { a: true, d: false, m: true };

    pub fn is_empty(&self) -> bool {
        !(self.a || self.d || self.m)
    }

    /// The three destination bits, `A` being the most significant.
    pub fn bits(&self) -> u16 {
        (self.a as u16) << 2 | (self.d as u16) << 1 | self.m as u16
    }

    pub fn from_bits(bits: u16) -> Dest {
        Dest {
            a: bits & 0b100 != 0,
            d: bits & 0b010 != 0,
            m: bits & 0b001 != 0,
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.a {
            write!(f, "A")?;
        }
        if self.m {
            write!(f, "M")?;
        }
        if self.d {
            write!(f, "D")?;
        }
        Ok(())
    }
}

impl FromStr for Dest {
    type Err = ();

    /// Accepts the registers in any order, each at most once.
    fn from_str(input: &str) -> Result<Dest, ()> {
        let mut dest = Dest::NONE;

        for c in input.chars() {
            let flag = match c {
                'A' => &mut dest.a,
                'D' => &mut dest.d,
                'M' => &mut dest.m,
                _ => return Err(()),
            };

            if *flag {
                return Err(());
            }

            *flag = true;
        }

        if dest.is_empty() {
            return Err(());
        }

        Ok(dest)
    }
}

/// The computations the ALU can perform.
///
/// Variants mentioning `M` read `RAM[A]` in place of `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,
}

impl Comp {
    pub const ALL: [Comp; 28] = [
        Comp::Zero,
        Comp::One,
        Comp::MinusOne,
        Comp::D,
        Comp::A,
        Comp::NotD,
        Comp::NotA,
        Comp::NegD,
        Comp::NegA,
        Comp::DPlusOne,
        Comp::APlusOne,
        Comp::DMinusOne,
        Comp::AMinusOne,
        Comp::DPlusA,
        Comp::DMinusA,
        Comp::AMinusD,
        Comp::DAndA,
        Comp::DOrA,
        Comp::M,
        Comp::NotM,
        Comp::NegM,
        Comp::MPlusOne,
        Comp::MMinusOne,
        Comp::DPlusM,
        Comp::DMinusM,
        Comp::MMinusD,
        Comp::DAndM,
        Comp::DOrM,
    ];

    /// True if the computation reads `RAM[A]`.
    pub fn reads_memory(&self) -> bool {
        match self {
            Comp::M
            | Comp::NotM
            | Comp::NegM
            | Comp::MPlusOne
            | Comp::MMinusOne
            | Comp::DPlusM
            | Comp::DMinusM
            | Comp::MMinusD
            | Comp::DAndM
            | Comp::DOrM => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::MinusOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::DPlusA => "D+A",
            Comp::DMinusA => "D-A",
            Comp::AMinusD => "A-D",
            Comp::DAndA => "D&A",
            Comp::DOrA => "D|A",
            Comp::M => "M",
            Comp::NotM => "!M",
            Comp::NegM => "-M",
            Comp::MPlusOne => "M+1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusM => "D+M",
            Comp::DMinusM => "D-M",
            Comp::MMinusD => "M-D",
            Comp::DAndM => "D&M",
            Comp::DOrM => "D|M",
        }
    }

    /// The seven bit `a cccccc` field of the machine encoding.
    pub fn bits(&self) -> u16 {
        let control = match self {
            Comp::Zero => 0b101010,
            Comp::One => 0b111111,
            Comp::MinusOne => 0b111010,
            Comp::D => 0b001100,
            Comp::A | Comp::M => 0b110000,
            Comp::NotD => 0b001101,
            Comp::NotA | Comp::NotM => 0b110001,
            Comp::NegD => 0b001111,
            Comp::NegA | Comp::NegM => 0b110011,
            Comp::DPlusOne => 0b011111,
            Comp::APlusOne | Comp::MPlusOne => 0b110111,
            Comp::DMinusOne => 0b001110,
            Comp::AMinusOne | Comp::MMinusOne => 0b110010,
            Comp::DPlusA | Comp::DPlusM => 0b000010,
            Comp::DMinusA | Comp::DMinusM => 0b010011,
            Comp::AMinusD | Comp::MMinusD => 0b000111,
            Comp::DAndA | Comp::DAndM => 0b000000,
            Comp::DOrA | Comp::DOrM => 0b010101,
        };

        (self.reads_memory() as u16) << 6 | control
    }

    pub fn from_bits(bits: u16) -> Option<Comp> {
        Comp::ALL.iter().copied().find(|comp| comp.bits() == bits)
    }

    /// Runs the ALU.
    ///
    /// # Parameters
    /// - `d`: Value of the `D` register.
    /// - `a`: Value of the `A` register.
    /// - `m`: Value of `RAM[A]`. Only read by the `M` variants.
    pub fn evaluate(&self, d: u16, a: u16, m: u16) -> u16 {
        let y = if self.reads_memory() { m } else { a };

        match self {
            Comp::Zero => 0,
            Comp::One => 1,
            Comp::MinusOne => 0xFFFF,
            Comp::D => d,
            Comp::A | Comp::M => y,
            Comp::NotD => !d,
            Comp::NotA | Comp::NotM => !y,
            Comp::NegD => d.wrapping_neg(),
            Comp::NegA | Comp::NegM => y.wrapping_neg(),
            Comp::DPlusOne => d.wrapping_add(1),
            Comp::APlusOne | Comp::MPlusOne => y.wrapping_add(1),
            Comp::DMinusOne => d.wrapping_sub(1),
            Comp::AMinusOne | Comp::MMinusOne => y.wrapping_sub(1),
            Comp::DPlusA | Comp::DPlusM => d.wrapping_add(y),
            Comp::DMinusA | Comp::DMinusM => d.wrapping_sub(y),
            Comp::AMinusD | Comp::MMinusD => y.wrapping_sub(d),
            Comp::DAndA | Comp::DAndM => d & y,
            Comp::DOrA | Comp::DOrM => d | y,
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comp {
    type Err = ();

    /// Accepts the canonical spelling and the commuted spelling of `+`, `&` and `|`.
    fn from_str(input: &str) -> Result<Comp, ()> {
        let canonical = match input {
            "A+D" => "D+A",
            "M+D" => "D+M",
            "A&D" => "D&A",
            "M&D" => "D&M",
            "A|D" => "D|A",
            "M|D" => "D|M",
            other => other,
        };

        Comp::ALL
            .iter()
            .copied()
            .find(|comp| comp.as_str() == canonical)
            .ok_or(())
    }
}

/// Condition under which a C-instruction jumps to `ROM[A]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    Greater,
    Equal,
    GreaterEqual,
    Less,
    NotEqual,
    LessEqual,
    Always,
}

impl Jump {
    pub fn bits(&self) -> u16 {
        match self {
            Jump::Greater => 0b001,
            Jump::Equal => 0b010,
            Jump::GreaterEqual => 0b011,
            Jump::Less => 0b100,
            Jump::NotEqual => 0b101,
            Jump::LessEqual => 0b110,
            Jump::Always => 0b111,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Jump> {
        match bits {
            0b001 => Some(Jump::Greater),
            0b010 => Some(Jump::Equal),
            0b011 => Some(Jump::GreaterEqual),
            0b100 => Some(Jump::Less),
            0b101 => Some(Jump::NotEqual),
            0b110 => Some(Jump::LessEqual),
            0b111 => Some(Jump::Always),
            _ => None,
        }
    }

    /// Decides the jump from the ALU output, read as a signed word.
    pub fn holds(&self, value: u16) -> bool {
        let value = value as i16;

        match self {
            Jump::Greater => value > 0,
            Jump::Equal => value == 0,
            Jump::GreaterEqual => value >= 0,
            Jump::Less => value < 0,
            Jump::NotEqual => value != 0,
            Jump::LessEqual => value <= 0,
            Jump::Always => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Jump::Greater => "JGT",
            Jump::Equal => "JEQ",
            Jump::GreaterEqual => "JGE",
            Jump::Less => "JLT",
            Jump::NotEqual => "JNE",
            Jump::LessEqual => "JLE",
            Jump::Always => "JMP",
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Jump {
    type Err = ();

    fn from_str(input: &str) -> Result<Jump, ()> {
        (1..=7)
            .filter_map(Jump::from_bits)
            .find(|jump| jump.as_str() == input)
            .ok_or(())
    }
}

/// A line of Hack symbolic assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `@value`: load `value` into `A`.
    Address(Address),

    /// `dest=comp;jump`
    Compute {
        dest: Dest,
        comp: Comp,
        jump: Option<Jump>,
    },

    /// `(NAME)`: binds `NAME` to the address of the next instruction. Occupies no ROM.
    Label(String),
}

impl Instruction {
    /// `@symbol`
    pub fn at<S: Into<String>>(symbol: S) -> Instruction {
        Instruction::Address(Address::Symbol(symbol.into()))
    }

    /// `@value`
    pub fn constant(value: u16) -> Instruction {
        Instruction::Address(Address::Constant(value))
    }

    /// `dest=comp`
    pub fn assign(dest: Dest, comp: Comp) -> Instruction {
        Instruction::Compute {
            dest,
            comp,
            jump: None,
        }
    }

    /// `comp;jump`
    pub fn jump(comp: Comp, jump: Jump) -> Instruction {
        Instruction::Compute {
            dest: Dest::NONE,
            comp,
            jump: Some(jump),
        }
    }

    /// `(name)`
    pub fn label<S: Into<String>>(name: S) -> Instruction {
        Instruction::Label(name.into())
    }

    /// True for instructions that occupy a ROM word.
    pub fn is_real(&self) -> bool {
        match self {
            Instruction::Label(_) => false,
            _ => true,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Address(address) => write!(f, "@{}", address),
            Instruction::Label(label) => write!(f, "({})", label),
            Instruction::Compute { dest, comp, jump } => {
                if !dest.is_empty() {
                    write!(f, "{}=", dest)?;
                }

                write!(f, "{}", comp)?;

                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }

                Ok(())
            }
        }
    }
}

/// A machine word that is not a valid instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidInstruction(pub u16);

impl fmt::Display for InvalidInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid instruction word {:016b}", self.0)
    }
}

/// Encodes a C-instruction. A-instructions are plain values and need no encoding.
pub fn encode_compute(dest: Dest, comp: Comp, jump: Option<Jump>) -> u16 {
    0b111 << 13 | comp.bits() << 6 | dest.bits() << 3 | jump.map(|j| j.bits()).unwrap_or(0)
}

impl TryFrom<u16> for Instruction {
    type Error = InvalidInstruction;

    fn try_from(word: u16) -> Result<Instruction, InvalidInstruction> {
        if word & 0x8000 == 0 {
            return Ok(Instruction::constant(word));
        }

        if word & 0xE000 != 0xE000 {
            return Err(InvalidInstruction(word));
        }

        let comp = Comp::from_bits((word >> 6) & 0x7F).ok_or(InvalidInstruction(word))?;

        Ok(Instruction::Compute {
            dest: Dest::from_bits((word >> 3) & 0b111),
            comp,
            jump: Jump::from_bits(word & 0b111),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Instruction::at("SP").to_string(), "@SP");
        assert_eq!(Instruction::constant(17).to_string(), "@17");
        assert_eq!(Instruction::assign(Dest::AM, Comp::MMinusOne).to_string(), "AM=M-1");
        assert_eq!(Instruction::jump(Comp::D, Jump::Equal).to_string(), "D;JEQ");
        assert_eq!(Instruction::label("eq$true.0").to_string(), "(eq$true.0)");

        let amd = Dest { a: true, d: true, m: true };
        assert_eq!(Instruction::assign(amd, Comp::Zero).to_string(), "AMD=0");
    }

    #[test]
    fn test_dest_from_str() {
        assert_eq!("AM".parse(), Ok(Dest::AM));
        assert_eq!("MA".parse(), Ok(Dest::AM));
        assert_eq!("D".parse(), Ok(Dest::D));
        assert_eq!("DD".parse::<Dest>(), Err(()));
        assert_eq!("".parse::<Dest>(), Err(()));
    }

    #[test]
    fn test_comp_aliases() {
        assert_eq!("M+D".parse(), Ok(Comp::DPlusM));
        assert_eq!("D+M".parse(), Ok(Comp::DPlusM));
        assert_eq!("A&D".parse(), Ok(Comp::DAndA));
        assert_eq!("M-D".parse(), Ok(Comp::MMinusD));
        assert_eq!("D*M".parse::<Comp>(), Err(()));
    }

    #[test]
    fn test_comp_bits_unique() {
        for comp in Comp::ALL.iter() {
            assert_eq!(Comp::from_bits(comp.bits()), Some(*comp));
        }
    }

    #[test]
    fn test_encode() {
        // D=M+1 in the reference encoding
        assert_eq!(encode_compute(Dest::D, Comp::MPlusOne, None), 0b1111_1101_1101_0000);
        // 0;JMP
        assert_eq!(
            encode_compute(Dest::NONE, Comp::Zero, Some(Jump::Always)),
            0b1110_1010_1000_0111
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(Instruction::try_from(21), Ok(Instruction::constant(21)));
        assert_eq!(
            Instruction::try_from(0b1111_1100_1000_1000),
            Ok(Instruction::assign(Dest::M, Comp::MMinusOne))
        );
        assert_eq!(
            Instruction::try_from(0b1100_0000_0000_0000),
            Err(InvalidInstruction(0b1100_0000_0000_0000))
        );
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(Comp::MMinusD.evaluate(3, 0, 7), 4);
        assert_eq!(Comp::MMinusD.evaluate(7, 0, 3), 0xFFFC);
        assert_eq!(Comp::NegM.evaluate(0, 0, 1), 0xFFFF);
        assert_eq!(Comp::NotA.evaluate(0, 0, 5), 0xFFFF);
        assert_eq!(Comp::DPlusA.evaluate(0x7FFF, 1, 0), 0x8000);
    }

    #[test]
    fn test_jump_holds() {
        assert!(Jump::Less.holds(0xFFFF));
        assert!(!Jump::Greater.holds(0x8000));
        assert!(Jump::Equal.holds(0));
        assert!(Jump::GreaterEqual.holds(0));
    }
}
