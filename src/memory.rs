//! Main memory: the program store and the data store in one fixed-size array of words.

use crate::error::{Access, VmError};
use crate::Word;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Word>,
}

impl Memory {
  /// Takes ownership of `program` as the initial memory image. The size never changes afterwards.
  pub fn new(program: Vec<Word>) -> Memory {
    Memory { cells: program }
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  fn index(&self, address: Word, access: Access) -> Result<usize, VmError> {
    usize::try_from(address)
      .ok()
      .filter(|&idx| idx < self.cells.len())
      .ok_or(VmError::MemoryOutOfRange { access, address, size: self.cells.len() })
  }

  /// Fails exactly when `get` or `set` at `address` would, without touching memory.
  pub fn check(&self, address: Word, access: Access) -> Result<(), VmError> {
    self.index(address, access).map(|_| ())
  }

  pub fn get(&self, address: Word) -> Result<Word, VmError> {
    let idx = self.index(address, Access::Read)?;
    Ok(self.cells[idx])
  }

  pub fn set(&mut self, address: Word, value: Word) -> Result<(), VmError> {
    let idx = self.index(address, Access::Write)?;
    self.cells[idx] = value;
    Ok(())
  }

  /// A deep copy of the current contents.
  pub fn snapshot(&self) -> Vec<Word> {
    self.cells.clone()
  }

  pub(crate) fn as_slice(&self) -> &[Word] {
    &self.cells
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn get_and_set(){
    let mut memory = Memory::new(vec![1, 2, 3]);
    assert_eq!(memory.get(2), Ok(3));
    memory.set(0, 42).unwrap();
    assert_eq!(memory.get(0), Ok(42));
    assert_eq!(memory.len(), 3);
  }

  #[test]
  fn bounds(){
    let mut memory = Memory::new(vec![1, 2, 3]);
    assert_eq!(
      memory.get(3),
      Err(VmError::MemoryOutOfRange { access: Access::Read, address: 3, size: 3 })
    );
    assert_eq!(
      memory.get(-1),
      Err(VmError::MemoryOutOfRange { access: Access::Read, address: -1, size: 3 })
    );
    assert_eq!(
      memory.set(10, 0),
      Err(VmError::MemoryOutOfRange { access: Access::Write, address: 10, size: 3 })
    );
    // No growth on a failed write.
    assert_eq!(memory.len(), 3);
  }

  #[test]
  fn check_matches_access(){
    let memory = Memory::new(vec![1, 2, 3]);
    assert_eq!(memory.check(2, Access::Write), Ok(()));
    assert_eq!(
      memory.check(3, Access::Write),
      Err(VmError::MemoryOutOfRange { access: Access::Write, address: 3, size: 3 })
    );
  }

  #[test]
  fn snapshot_is_detached(){
    let mut memory = Memory::new(vec![5, 6]);
    let mut copy = memory.snapshot();
    copy[0] = 99;
    assert_eq!(memory.get(0), Ok(5));
    memory.set(1, 7).unwrap();
    assert_eq!(copy[1], 6);
  }

  #[test]
  fn empty_memory(){
    let memory = Memory::new(vec![]);
    assert!(memory.is_empty());
    assert!(memory.get(0).is_err());
  }
}
