/*!
  The operation set.

  Each operation is a handler over an explicit `Context` holding the machine's memory, registers,
  program counter and channels. A handler resolves everything it reads and validates its write
  target before it mutates anything, so an instruction that fails leaves the machine exactly as it
  found it. On success it reports how the machine should continue.
*/

use crate::bytecode::{Decoded, Operation};
use crate::error::{Access, VmError};
use crate::io::{InputChannel, OutputChannel};
use crate::memory::Memory;
use crate::operand::{resolve, resolve_target, Operand, Target};
use crate::registers::RegisterFile;
use crate::Word;

/// Everything an operation may touch.
pub struct Context<'a> {
  pub memory          : &'a mut Memory,
  pub registers       : &'a mut RegisterFile,
  pub program_counter : usize,
  pub input           : &'a mut dyn InputChannel,
  pub output          : &'a mut dyn OutputChannel,
}

/// What the machine does after an operation completes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
  /// Continue at the given program counter.
  Continue(usize),
  Halt,
}

impl<'a> Context<'a> {
  fn read(&self, decoded: &Decoded, position: usize) -> Result<Operand, VmError> {
    resolve(
      &*self.memory,
      &*self.registers,
      decoded.format(position),
      self.program_counter + 1 + position
    )
  }

  /// Resolves a write target and checks that writing it would succeed.
  fn target(&self, decoded: &Decoded, position: usize) -> Result<Target, VmError> {
    let target = resolve_target(
      &*self.memory,
      decoded.format(position),
      self.program_counter + 1 + position,
      decoded.operation
    )?;

    match target {
      Target::Memory(address) => self.memory.check(address, Access::Write)?,
      Target::Register(index) => { self.registers.check_writable(index)?; }
    }
    Ok(target)
  }

  fn write(&mut self, target: Target, value: Word) -> Result<(), VmError> {
    match target {
      Target::Memory(address)  => self.memory.set(address, value),
      Target::Register(index)  => self.registers.set(index, value),
    }
  }

  fn next(&self, operation: Operation) -> Step {
    Step::Continue(self.program_counter + operation.width())
  }
}

/// Executes the decoded instruction at the context's program counter.
pub fn execute(decoded: &Decoded, ctx: &mut Context<'_>) -> Result<Step, VmError> {
  match decoded.operation {
    Operation::Add           => binary(decoded, ctx, |lhs, rhs| lhs.wrapping_add(rhs)),
    Operation::Multiply      => binary(decoded, ctx, |lhs, rhs| lhs.wrapping_mul(rhs)),
    Operation::SetIfEqual    => binary(decoded, ctx, |lhs, rhs| (lhs == rhs) as Word),
    Operation::SetIfLessThan => binary(decoded, ctx, |lhs, rhs| (lhs < rhs) as Word),
    Operation::Input         => input(decoded, ctx),
    Operation::Output        => output(decoded, ctx),
    Operation::JumpIfTrue    => jump_if_true(decoded, ctx),
    Operation::Halt          => Ok(Step::Halt),
  }
}

/// add, mlt, seq and slt: two reads and a write.
fn binary<F>(decoded: &Decoded, ctx: &mut Context<'_>, op: F) -> Result<Step, VmError>
  where F: Fn(Word, Word) -> Word
{
  let lhs    = ctx.read(decoded, 0)?;
  let rhs    = ctx.read(decoded, 1)?;
  let target = ctx.target(decoded, 2)?;

  ctx.write(target, op(lhs.value, rhs.value))?;
  Ok(ctx.next(decoded.operation))
}

fn input(decoded: &Decoded, ctx: &mut Context<'_>) -> Result<Step, VmError> {
  // Validate the target before consuming input.
  let target = ctx.target(decoded, 0)?;
  let value  = ctx.input.receive_input().ok_or(VmError::InputUnavailable)?;

  ctx.write(target, value)?;
  Ok(ctx.next(decoded.operation))
}

fn output(decoded: &Decoded, ctx: &mut Context<'_>) -> Result<Step, VmError> {
  let operand = ctx.read(decoded, 0)?;
  ctx.output.emit_output(operand.value);
  Ok(ctx.next(decoded.operation))
}

/**
  Jumps to the second parameter when the first is non-zero. A taken jump records the fallthrough
  address in the last-address register, the only write that register ever accepts.
*/
fn jump_if_true(decoded: &Decoded, ctx: &mut Context<'_>) -> Result<Step, VmError> {
  let condition   = ctx.read(decoded, 0)?;
  let destination = ctx.read(decoded, 1)?;
  let fallthrough = ctx.program_counter + decoded.operation.width();

  if condition.value == 0 {
    return Ok(Step::Continue(fallthrough));
  }

  // Only a negative target is unrepresentable as a program counter. A target past the end of
  // memory is taken and then fails on the next fetch.
  let next =
    usize::try_from(destination.value)
      .map_err(|_| VmError::MemoryOutOfRange {
        access  : Access::Read,
        address : destination.value,
        size    : ctx.memory.len()
      })?;

  ctx.registers.commit_last_address(fallthrough as Word);
  Ok(Step::Continue(next))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::decode_word;
  use crate::io::{DiscardOutput, NoInput};
  use crate::registers::LAST_ADDRESS;

  fn run_one(memory: &mut Memory, registers: &mut RegisterFile) -> Result<Step, VmError> {
    let decoded = decode_word(memory.get(0)?, 0)?;
    let mut input  = NoInput;
    let mut output = DiscardOutput;
    let mut ctx = Context {
      memory,
      registers,
      program_counter : 0,
      input           : &mut input,
      output          : &mut output,
    };
    execute(&decoded, &mut ctx)
  }

  #[test]
  fn comparisons(){
    for (program, expected) in [
      (vec![1105, 3, 3, 0],  1),
      (vec![1105, 3, 4, 0],  0),
      (vec![1108, -1, 0, 0], 1),
      (vec![1108, 0, 0, 0],  0),
      (vec![1108, 5, 2, 0],  0),
    ] {
      let mut memory    = Memory::new(program);
      let mut registers = RegisterFile::new();
      assert_eq!(run_one(&mut memory, &mut registers), Ok(Step::Continue(4)));
      assert_eq!(memory.get(0), Ok(expected));
    }
  }

  #[test]
  fn arithmetic_wraps(){
    let mut memory    = Memory::new(vec![1102, Word::MAX, 2, 0]);
    let mut registers = RegisterFile::new();
    run_one(&mut memory, &mut registers).unwrap();
    assert_eq!(memory.get(0), Ok(Word::MAX.wrapping_mul(2)));
  }

  #[test]
  fn failed_write_leaves_state(){
    // Third parameter points past the end of memory.
    let mut memory    = Memory::new(vec![1101, 1, 2, 10]);
    let mut registers = RegisterFile::new();
    assert!(matches!(
      run_one(&mut memory, &mut registers),
      Err(VmError::MemoryOutOfRange { access: Access::Write, address: 10, .. })
    ));
    assert_eq!(memory.snapshot(), vec![1101, 1, 2, 10]);
  }

  #[test]
  fn input_checks_target_first(){
    let mut memory    = Memory::new(vec![103, 0]);
    let mut registers = RegisterFile::new();
    assert_eq!(
      run_one(&mut memory, &mut registers),
      Err(VmError::InvalidOutputParam { operation: Operation::Input })
    );

    let mut memory = Memory::new(vec![3, 0]);
    assert_eq!(run_one(&mut memory, &mut registers), Err(VmError::InputUnavailable));
  }

  #[test]
  fn targets_checked_before_write(){
    let mut registers = RegisterFile::new();
    for (program, expected) in [
      (vec![203, 13], VmError::LastAddressWrite),
      (vec![203, 14], VmError::RegisterOutOfRange { access: Access::Write, index: 14, size: 14 }),
      (vec![3, 99],   VmError::MemoryOutOfRange { access: Access::Write, address: 99, size: 2 }),
    ] {
      let mut memory = Memory::new(program);
      assert_eq!(run_one(&mut memory, &mut registers), Err(expected));
    }
  }

  #[test]
  fn negative_jump_target(){
    let mut memory    = Memory::new(vec![1106, 1, -4]);
    let mut registers = RegisterFile::new();
    assert!(matches!(
      run_one(&mut memory, &mut registers),
      Err(VmError::MemoryOutOfRange { address: -4, .. })
    ));
    assert_eq!(registers.get(LAST_ADDRESS as Word), Ok(0));
  }

  #[test]
  fn halt(){
    let mut memory    = Memory::new(vec![9]);
    let mut registers = RegisterFile::new();
    assert_eq!(run_one(&mut memory, &mut registers), Ok(Step::Halt));
  }
}
