/*!
  The register file.

  Fourteen word-sized registers. By convention the reserved registers `r0`–`r4` are preserved
  across jumps and the temporaries `t0`–`t7` are not; nothing enforces this. Register 13, `la`,
  holds the address the most recent taken jump would otherwise have continued at. It defaults to 0,
  is readable by everything, and is writable only through `RegisterFile::commit_last_address`,
  which only the jump operation uses.

  Register names live in a bijective table so that the assembler (name to index) and the machine's
  display and disassembly (index to name) always agree.
*/

use bimap::BiMap;

use crate::error::{Access, VmError};
use crate::Word;

pub const REGISTER_COUNT: usize = 14;

pub const RESERVED_0: usize = 0;
pub const RESERVED_4: usize = 4;
pub const TEMPORARY_0: usize = 5;
pub const TEMPORARY_7: usize = 12;
pub const LAST_ADDRESS: usize = 13;

lazy_static! {
  static ref REGISTER_NAMES: BiMap<&'static str, usize> = {
    let mut names = BiMap::new();
    for (idx, name) in ["r0", "r1", "r2", "r3", "r4"].iter().enumerate() {
      names.insert(*name, RESERVED_0 + idx);
    }
    for (idx, name) in ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"].iter().enumerate() {
      names.insert(*name, TEMPORARY_0 + idx);
    }
    names.insert("la", LAST_ADDRESS);
    names
  };
}

/// Returns the register index for an assembly register name such as `t3`.
pub fn register_index(name: &str) -> Option<usize> {
  REGISTER_NAMES.get_by_left(name).copied()
}

/// Returns the assembly name of the register at `index`.
pub fn register_name(index: usize) -> Option<&'static str> {
  REGISTER_NAMES.get_by_right(&index).copied()
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterFile {
  registers: [Word; REGISTER_COUNT],
}

impl RegisterFile {
  pub fn new() -> RegisterFile {
    RegisterFile { registers: [0; REGISTER_COUNT] }
  }

  fn index(index: Word, access: Access) -> Result<usize, VmError> {
    usize::try_from(index)
      .ok()
      .filter(|&idx| idx < REGISTER_COUNT)
      .ok_or(VmError::RegisterOutOfRange { access, index, size: REGISTER_COUNT })
  }

  pub fn get(&self, index: Word) -> Result<Word, VmError> {
    let idx = RegisterFile::index(index, Access::Read)?;
    Ok(self.registers[idx])
  }

  /// Fails exactly when `set` would. The last-address register is checked first and always refused.
  pub fn check_writable(&self, index: Word) -> Result<usize, VmError> {
    if index == LAST_ADDRESS as Word {
      return Err(VmError::LastAddressWrite);
    }
    RegisterFile::index(index, Access::Write)
  }

  pub fn set(&mut self, index: Word, value: Word) -> Result<(), VmError> {
    let idx = self.check_writable(index)?;
    self.registers[idx] = value;
    Ok(())
  }

  pub fn last_address(&self) -> Word {
    self.registers[LAST_ADDRESS]
  }

  /// The sole write path to `la`, reserved for the jump operation.
  pub(crate) fn commit_last_address(&mut self, value: Word) {
    self.registers[LAST_ADDRESS] = value;
  }

  /// A copy of every register, indexed as in the machine.
  pub fn snapshot(&self) -> [Word; REGISTER_COUNT] {
    self.registers
  }
}
