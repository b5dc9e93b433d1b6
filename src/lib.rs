/*!

  The Tsvetok Virtual Machine (TVM) executes "intcode", programs given as flat sequences of signed
  integers that share memory with their data. Alongside the engine sit an assembler that compiles
  a line oriented mnemonic language into intcode and a disassembler that goes the other way.

  ```
  use tvm::{assemble, Tvm};

  let program = assemble("add $0, $0, $0\nhlt").unwrap();
  let mut machine = Tvm::new(program);
  machine.execute().unwrap();
  assert_eq!(machine.copy_memory()[0], 2);
  ```

*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod error;
pub mod io;
pub mod memory;
pub mod operand;
pub mod operations;
pub mod registers;
pub mod tvm;

/// The machine's word: every memory cell, register, parameter and I/O value.
pub type Word = i64;

pub use crate::bytecode::{assemble, disassemble, parse_intcode};
pub use crate::error::{AssemblyError, VmError};
pub use crate::io::{InputChannel, OutputChannel};
pub use crate::tvm::{MachineState, Tvm};
