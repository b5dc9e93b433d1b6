/*!
  This module is responsible for the encoding and decoding of instruction words.

  ```text
    word = opcode + 100 * f0 + 1_000 * f1 + 10_000 * f2
  ```
  where `opcode` is two decimal digits and `fk` is the format digit of parameter `k`. The top
  position is read as `word / 10_000` with no modulo, so anything above the third parameter's digit
  makes that format invalid rather than wrapping around.
*/

use super::{Operation, Instruction, Param, MAX_PARAMS};
use crate::error::VmError;
use crate::operand::ParamFormat;
use crate::Word;

const OPCODE_RADIX: Word = 100;

/// Extracts the format of parameter `position` from an instruction word.
pub fn param_format(word: Word, position: usize) -> Result<ParamFormat, VmError> {
  let digit =
    match position {
      0 => (word / 100) % 10,
      1 => (word / 1_000) % 10,
      2 => word / 10_000,
      _ => return Err(VmError::TooManyParams { position }),
    };
  ParamFormat::from_digit(digit, position)
}

/// A decoded instruction word: the operation and the formats of the parameters it uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Decoded {
  pub word: Word,
  pub operation: Operation,
  formats: [ParamFormat; MAX_PARAMS],
}

impl Decoded {
  /// The format of parameter `position`, which must be below the operation's arity.
  pub fn format(&self, position: usize) -> ParamFormat {
    self.formats[position]
  }

  pub fn formats(&self) -> &[ParamFormat] {
    &self.formats[..self.operation.arity()]
  }
}

/**
  Decodes the instruction word found at `address`. Only the format digits of parameters the
  operation actually takes are inspected.
*/
pub fn decode_word(word: Word, address: usize) -> Result<Decoded, VmError> {
  let operation = Operation::from_word(word).ok_or(VmError::UnknownOpcode { word, address })?;

  let mut formats = [ParamFormat::Address; MAX_PARAMS];
  for (position, format) in formats.iter_mut().enumerate().take(operation.arity()) {
    *format = param_format(word, position)?;
  }

  Ok(Decoded { word, operation, formats })
}

/// Folds a parameter's format into the instruction word.
pub fn add_param_format(word: Word, format: ParamFormat, position: usize) -> Result<Word, VmError> {
  if position >= MAX_PARAMS {
    return Err(VmError::TooManyParams { position });
  }
  let multiplier = OPCODE_RADIX * (10 as Word).pow(position as u32);
  Ok(word + format.digit() * multiplier)
}

/// Encodes the instruction as its word followed by one word per parameter.
pub fn encode_instruction(instruction: &Instruction) -> Result<Vec<Word>, VmError> {
  let mut word = instruction.operation.code() as Word;
  for (position, param) in instruction.params.iter().enumerate() {
    word = add_param_format(word, param.format, position)?;
  }

  let mut intcode = Vec::with_capacity(instruction.params.len() + 1);
  intcode.push(word);
  intcode.extend(instruction.params.iter().map(|p| p.value));
  Ok(intcode)
}

/**
  Decodes the complete instruction starting at `address` in `program`, or `None` if the word there
  is not a valid instruction or its parameters run past the end of the program.
*/
pub fn try_decode_instruction(program: &[Word], address: usize) -> Option<Instruction> {
  let word = *program.get(address)?;
  let decoded = decode_word(word, address).ok()?;
  let values = program.get(address + 1..address + decoded.operation.width())?;

  let params =
    decoded.formats()
           .iter()
           .zip(values)
           .map(|(&format, &value)| Param { format, value })
           .collect();

  Some(Instruction::new(decoded.operation, params))
}
