//! A crate for translating the stack based VM language of the Hack platform into Hack symbolic
//! assembly.
//!
//! Currently this crate provides the functionality to:
//! - Parse `.vm` files containing arithmetic, logical, `push` and `pop` commands.
//! - Translate them into `.asm` files containing Hack symbolic assembly.
//! - Assemble symbolic assembly into Hack machine words.
//! - Execute machine words on an emulated Hack CPU.
//!
//! # Unimplemented stuff
//! - Program flow commands (`label`, `goto`, `if-goto`)
//! - Function commands (`function`, `call`, `return`) and the bootstrap code
//!
//! # Example
//! ```
//! use hackvm::{
//!     emulator::{ram, Emulator},
//!     hack,
//!     translator::Translator,
//! };
//!
//! fn main() {
//!     let vm_source = r#"
//!         // 7 - 3
//!         push constant 7
//!         push constant 3
//!         sub
//!     "#;
//!
//!     // Translate the VM code into symbolic assembly for the source unit `Main`.
//!     let translation = Translator::new("Main")
//!         .translate_source(vm_source)
//!         .expect("could not translate the program");
//!
//!     // Assemble the symbolic assembly into machine words.
//!     let image = hack::Program::parse(&translation.to_string())
//!         .expect("could not parse the generated assembly")
//!         .assemble()
//!         .expect("could not assemble the generated assembly");
//!
//!     // Set up the stack pointer and run the program.
//!     let mut memory = ram();
//!     memory[0] = 256;
//!
//!     let mut emulator = Emulator::new(image.words, memory);
//!     emulator.run(1000).expect("the program did not halt");
//!
//!     assert_eq!(emulator.memory[0], 257);
//!     assert_eq!(emulator.memory[256], 4);
//! }
//! ```
//!
//! # Executables
//!
//! ## `hackvm-translate`
//!
//! Translates `Foo.vm` into `Foo.asm`, or into the path given as the second argument.
//!
//! ```text
//! $ hackvm-translate StackTest.vm
//! $ hackvm-translate --annotate StackTest.vm /tmp/out.asm
//! ```
//!
//! ## `hackvm-run`
//!
//! Translates, assembles and runs a `.vm` or `.asm` file and prints the stack.
pub mod emulator;
pub mod error;
pub mod hack;
pub mod source_map;
pub mod symbol;
pub mod translator;
pub mod vm;

pub use symbol::{Label, SymbolAllocator};
pub use translator::{Fragment, Translation, Translator};
