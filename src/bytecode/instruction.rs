use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::operand::ParamFormat;
use crate::registers::register_name;
use crate::Word;

/// The maximum number of parameters any instruction can carry.
pub const MAX_PARAMS: usize = 3;

/**
  Opcodes of the virtual machine.

  The discriminant is the opcode proper, i.e. the two least significant decimal digits of an
  instruction word. The `strum` name of each variant is its assembly mnemonic, which is also how
  operations are named in error messages.

  Opcode 7 is deliberately left unassigned.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(to_string = "add")]
  Add           = 1,  // add( read, read, write )
  #[strum(to_string = "mlt")]
  Multiply      = 2,  // mlt( read, read, write )
  #[strum(to_string = "in")]
  Input         = 3,  // in( write )
  #[strum(to_string = "out")]
  Output        = 4,  // out( read )
  #[strum(to_string = "seq")]
  SetIfEqual    = 5,  // seq( read, read, write )
  #[strum(to_string = "jit")]
  JumpIfTrue    = 6,  // jit( read, read )
  #[strum(to_string = "slt")]
  SetIfLessThan = 8,  // slt( read, read, write )
  #[strum(to_string = "hlt")]
  Halt          = 9,  // hlt
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Looks up the operation for the opcode of a raw instruction word.
  pub fn from_word(word: Word) -> Option<Operation> {
    // Negative words leave a negative remainder, which is never an opcode.
    u8::try_from(word % 100)
      .ok()
      .and_then(|code| Operation::try_from(code).ok())
  }

  /// The number of parameter slots following the instruction word.
  pub fn arity(&self) -> usize {
    match self {
      | Operation::Add
      | Operation::Multiply
      | Operation::SetIfEqual
      | Operation::SetIfLessThan => 3,
      Operation::JumpIfTrue      => 2,
      | Operation::Input
      | Operation::Output        => 1,
      Operation::Halt            => 0,
    }
  }

  /// The instruction's total length in words, opcode included.
  pub fn width(&self) -> usize {
    self.arity() + 1
  }
}

/// A single parameter in its unencoded form: the format and the raw slot value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Param {
  pub format: ParamFormat,
  pub value: Word,
}

impl Param {
  pub fn address(value: Word) -> Param {
    Param { format: ParamFormat::Address, value }
  }

  pub fn immediate(value: Word) -> Param {
    Param { format: ParamFormat::Immediate, value }
  }

  pub fn register(value: Word) -> Param {
    Param { format: ParamFormat::Register, value }
  }
}

impl Display for Param {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.format {
      ParamFormat::Address   => write!(f, "${}", self.value),
      ParamFormat::Immediate => write!(f, "{}", self.value),
      ParamFormat::Register  => {
        match usize::try_from(self.value).ok().and_then(register_name) {
          Some(name) => write!(f, "{}", name),
          // Not expressible in assembly; shown so that listings stay informative.
          None       => write!(f, "r?{}", self.value),
        }
      }
    }
  }
}

/// Holds the unencoded components of an instruction: the operation and its parameters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub operation: Operation,
  pub params: Vec<Param>,
}

impl Instruction {
  pub fn new(operation: Operation, params: Vec<Param>) -> Instruction {
    Instruction { operation, params }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.params.is_empty() {
      true  => write!(f, "{}", self.operation),
      false => {
        write!(
          f,
          "{} {}",
          self.operation,
          self.params
              .iter()
              .map(Param::to_string)
              .collect::<Vec<String>>()
              .join(", ")
        )
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn mnemonics_round_trip(){
    for operation in Operation::iter() {
      assert_eq!(Operation::from_str(&operation.to_string()), Ok(operation));
    }
  }

  #[test]
  fn opcode_from_word(){
    assert_eq!(Operation::from_word(21201), Some(Operation::Add));
    assert_eq!(Operation::from_word(9), Some(Operation::Halt));
    assert_eq!(Operation::from_word(1108), Some(Operation::SetIfLessThan));
    assert_eq!(Operation::from_word(7), None);
    assert_eq!(Operation::from_word(0), None);
    assert_eq!(Operation::from_word(-1234), None);
  }

  #[test]
  fn display_instruction(){
    let instruction = Instruction::new(
      Operation::Add,
      vec![Param::immediate(-3), Param::address(4), Param::register(13)]
    );
    assert_eq!(instruction.to_string(), "add -3, $4, la");
    assert_eq!(Instruction::new(Operation::Halt, vec![]).to_string(), "hlt");
  }
}
