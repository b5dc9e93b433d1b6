//! Parameter formats and the operand resolver.

use std::fmt::{Display, Formatter};

use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::Operation;
use crate::error::VmError;
use crate::memory::Memory;
use crate::registers::RegisterFile;
use crate::Word;

/// How a parameter's slot value is interpreted.
#[derive(TryFromPrimitive, IntoPrimitive, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum ParamFormat {
  /// The slot holds an index into memory.
  Address   = 0,
  /// The slot holds the value itself.
  Immediate = 1,
  /// The slot holds an index into the register file.
  Register  = 2,
}

impl ParamFormat {
  /// Converts a decoded format digit, failing for anything outside {0, 1, 2}.
  pub fn from_digit(digit: Word, position: usize) -> Result<ParamFormat, VmError> {
    u8::try_from(digit)
      .ok()
      .and_then(|d| ParamFormat::try_from(d).ok())
      .ok_or(VmError::UnknownParamFormat { format: digit, position })
  }

  pub fn digit(&self) -> Word {
    Into::<u8>::into(*self) as Word
  }

  pub fn is_writable(&self) -> bool {
    !matches!(self, ParamFormat::Immediate)
  }
}

impl Display for ParamFormat {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ParamFormat::Address   => write!(f, "address"),
      ParamFormat::Immediate => write!(f, "immediate"),
      ParamFormat::Register  => write!(f, "register"),
    }
  }
}

/**
  A resolved parameter. `address` is the raw value found in the parameter's slot; `value` is what
  that slot means under `format`. For immediates the two are equal.
*/
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Operand {
  pub format: ParamFormat,
  pub address: Word,
  pub value: Word,
}

/// A resolved write target: where the result of an operation goes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Target {
  Memory(Word),
  Register(Word),
}

/// Reads the parameter in `slot` and resolves its value according to `format`.
pub fn resolve(
    memory    : &Memory,
    registers : &RegisterFile,
    format    : ParamFormat,
    slot      : usize
  ) -> Result<Operand, VmError>
{
  let address = memory.get(slot as Word)?;
  let value =
    match format {
      ParamFormat::Immediate => address,
      ParamFormat::Address   => memory.get(address)?,
      ParamFormat::Register  => registers.get(address)?,
    };

  Ok(Operand { format, address, value })
}

/**
  Reads the parameter in `slot` as a write target without dereferencing it. Immediates cannot be
  written to, so `operation` is reported as having an invalid output parameter.
*/
pub fn resolve_target(
    memory    : &Memory,
    format    : ParamFormat,
    slot      : usize,
    operation : Operation
  ) -> Result<Target, VmError>
{
  let address = memory.get(slot as Word)?;
  if !format.is_writable() {
    return Err(VmError::InvalidOutputParam { operation });
  }
  match format {
    ParamFormat::Register => Ok(Target::Register(address)),
    _                     => Ok(Target::Memory(address)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Access;

  fn fixture() -> (Memory, RegisterFile) {
    let memory = Memory::new(vec![7, 2, 40, 3]);
    let mut registers = RegisterFile::new();
    registers.set(3, -5).unwrap();
    (memory, registers)
  }

  #[test]
  fn digits(){
    assert_eq!(ParamFormat::from_digit(0, 0), Ok(ParamFormat::Address));
    assert_eq!(ParamFormat::from_digit(1, 1), Ok(ParamFormat::Immediate));
    assert_eq!(ParamFormat::from_digit(2, 2), Ok(ParamFormat::Register));
    assert_eq!(
      ParamFormat::from_digit(3, 2),
      Err(VmError::UnknownParamFormat { format: 3, position: 2 })
    );
    assert_eq!(
      ParamFormat::from_digit(-1, 0),
      Err(VmError::UnknownParamFormat { format: -1, position: 0 })
    );
  }

  #[test]
  fn resolve_each_format(){
    let (memory, registers) = fixture();

    let immediate = resolve(&memory, &registers, ParamFormat::Immediate, 1).unwrap();
    assert_eq!(immediate, Operand { format: ParamFormat::Immediate, address: 2, value: 2 });

    let address = resolve(&memory, &registers, ParamFormat::Address, 1).unwrap();
    assert_eq!(address.address, 2);
    assert_eq!(address.value, 40);

    let register = resolve(&memory, &registers, ParamFormat::Register, 3).unwrap();
    assert_eq!(register.address, 3);
    assert_eq!(register.value, -5);
  }

  #[test]
  fn resolve_out_of_range(){
    let (memory, registers) = fixture();

    // Slot itself is outside memory.
    assert_eq!(
      resolve(&memory, &registers, ParamFormat::Immediate, 4),
      Err(VmError::MemoryOutOfRange { access: Access::Read, address: 4, size: 4 })
    );
    // Slot holds 40, which is outside memory.
    assert_eq!(
      resolve(&memory, &registers, ParamFormat::Address, 2),
      Err(VmError::MemoryOutOfRange { access: Access::Read, address: 40, size: 4 })
    );
    // Slot holds 40, which is outside the register file.
    assert!(matches!(
      resolve(&memory, &registers, ParamFormat::Register, 2),
      Err(VmError::RegisterOutOfRange { index: 40, .. })
    ));
  }

  #[test]
  fn targets(){
    let (memory, _) = fixture();
    assert_eq!(
      resolve_target(&memory, ParamFormat::Address, 2, Operation::Add),
      Ok(Target::Memory(40))
    );
    assert_eq!(
      resolve_target(&memory, ParamFormat::Register, 3, Operation::Add),
      Ok(Target::Register(3))
    );
    assert_eq!(
      resolve_target(&memory, ParamFormat::Immediate, 3, Operation::Multiply),
      Err(VmError::InvalidOutputParam { operation: Operation::Multiply })
    );
  }
}
