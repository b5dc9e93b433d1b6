/*!
  Error types for the machine and the assembler.

  Every `VmError` is fatal to the current run. Callers branch on the variant, so contextual data is
  carried in fields rather than baked into a message.
*/

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::bytecode::Operation;
use crate::Word;

/// Whether a failed access was a read or a write.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Access {
  Read,
  Write
}

impl Display for Access {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Access::Read  => write!(f, "read"),
      Access::Write => write!(f, "write"),
    }
  }
}

/// Errors raised while decoding or executing intcode.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum VmError {
  /// No operation matches the two low digits of the instruction word.
  #[error("no operation found for opcode \"{word}\" at address {address}")]
  UnknownOpcode { word: Word, address: usize },

  /// A format digit outside {0, 1, 2}.
  #[error("unknown parameter format '{format}' for parameter {position}")]
  UnknownParamFormat { format: Word, position: usize },

  #[error("cannot have more than three params for any operation (requested parameter {position})")]
  TooManyParams { position: usize },

  /// A write target was given in immediate format.
  #[error("invalid output parameter for {operation} operation")]
  InvalidOutputParam { operation: Operation },

  #[error("cannot {access} memory at address '{address}' (memory is of size '{size}')")]
  MemoryOutOfRange { access: Access, address: Word, size: usize },

  #[error("cannot {access} register '{index}' (register file is of size '{size}')")]
  RegisterOutOfRange { access: Access, index: Word, size: usize },

  /// Only the jump operation may write the last-address register.
  #[error("attempted to write to last address register '{}'", crate::registers::LAST_ADDRESS)]
  LastAddressWrite,

  /// The input channel had nothing to give.
  #[error("input channel has no value available")]
  InputUnavailable,

  /// The machine already stopped on an error and cannot be resumed.
  #[error("machine has failed and cannot continue")]
  MachineFailed,
}

/// What went wrong on a line of assembly.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AssemblyErrorKind {
  #[error("unknown instruction '{0}'")]
  UnknownOperation(String),

  #[error("unknown parameter format '{0}'")]
  UnknownParamFormat(String),

  #[error("invalid register param '{0}'")]
  InvalidRegister(String),

  #[error("cannot have more than three params for any operation")]
  TooManyParams,

  #[error("{operation} requires {expected} parameters but was given {given}")]
  WrongArity { operation: Operation, expected: usize, given: usize },

  #[error("malformed line '{0}'")]
  Syntax(String),
}

/// An assembly failure, tagged with the 1-based source line it came from.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("error on line {line}: {kind}")]
pub struct AssemblyError {
  pub line: usize,
  pub kind: AssemblyErrorKind,
}

impl AssemblyError {
  pub fn new(line: usize, kind: AssemblyErrorKind) -> AssemblyError {
    AssemblyError { line, kind }
  }
}
