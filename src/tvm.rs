//! Structures and functions for the Tsvetok Virtual Machine, the machine that executes intcode.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::{decode_word, try_decode_instruction};
use crate::error::VmError;
use crate::io::{DiscardOutput, InputChannel, NoInput, OutputChannel};
use crate::memory::Memory;
use crate::operations::{execute, Context, Step};
use crate::registers::{register_name, RegisterFile, REGISTER_COUNT};
use crate::Word;

/// The machine's life cycle. `Halted` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MachineState {
  Running,
  Halted,
  Failed
}

impl Display for MachineState {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      MachineState::Running => write!(f, "Running"),
      MachineState::Halted  => write!(f, "Halted"),
      MachineState::Failed  => write!(f, "Failed"),
    }
  }
}

/**
  The Tsvetok Virtual Machine (TVM).

  The machine owns its memory, which holds the program, and its register file. Input and output
  go through the channels `I` and `O`. By default the machine has no input to give and discards
  its output.
*/
pub struct Tvm<I = NoInput, O = DiscardOutput> {

  // Memory Stores
  memory    : Memory,       // Program and data
  registers : RegisterFile, // r0–r4, t0–t7, la

  // Control //
  program_counter : usize,        // Start of the next instruction
  state           : MachineState,
  steps           : u64,          // Instructions completed

  // Channels //
  input  : I,
  output : O,

}

impl Tvm {
  /// A machine running `program`, with no input and discarded output.
  pub fn new(program: Vec<Word>) -> Tvm {
    Tvm::with_io(program, NoInput, DiscardOutput)
  }
}

impl<I, O> Tvm<I, O> {

  // region Construction and accessors

  pub fn with_io(program: Vec<Word>, input: I, output: O) -> Tvm<I, O> {
    Tvm {
      memory          :  Memory::new(program),
      registers       :  RegisterFile::new(),
      program_counter :  0,
      state           :  MachineState::Running,
      steps           :  0,
      input,
      output,
    }
  }

  /// Replaces the input channel.
  pub fn with_input<J>(self, input: J) -> Tvm<J, O> {
    Tvm {
      memory          :  self.memory,
      registers       :  self.registers,
      program_counter :  self.program_counter,
      state           :  self.state,
      steps           :  self.steps,
      input,
      output          :  self.output,
    }
  }

  /// Replaces the output channel.
  pub fn with_output<P>(self, output: P) -> Tvm<I, P> {
    Tvm {
      memory          :  self.memory,
      registers       :  self.registers,
      program_counter :  self.program_counter,
      state           :  self.state,
      steps           :  self.steps,
      input           :  self.input,
      output,
    }
  }

  pub fn program_counter(&self) -> usize {
    self.program_counter
  }

  pub fn state(&self) -> MachineState {
    self.state
  }

  /// The number of instructions executed so far, the halt included.
  pub fn steps(&self) -> u64 {
    self.steps
  }

  pub fn memory_value(&self, address: Word) -> Result<Word, VmError> {
    self.memory.get(address)
  }

  pub fn register_value(&self, index: Word) -> Result<Word, VmError> {
    self.registers.get(index)
  }

  /// A copy of the current memory. Writing to it does not affect the machine.
  pub fn copy_memory(&self) -> Vec<Word> {
    self.memory.snapshot()
  }

  /// A copy of the current register file.
  pub fn copy_registers(&self) -> [Word; REGISTER_COUNT] {
    self.registers.snapshot()
  }

  pub fn input(&self) -> &I {
    &self.input
  }

  pub fn output(&self) -> &O {
    &self.output
  }

  /// Consumes the machine, giving back its channels.
  pub fn into_io(self) -> (I, O) {
    (self.input, self.output)
  }

  // endregion

  // region Display methods

  fn make_table<T> (labels: Vec<String>, values: &[T], highlight: Option<usize>) -> Table
    where T: Display
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, (label, value)) in labels.iter().zip(values.iter()).enumerate() {
      match highlight == Some(i) {

        true  => {
          table.add_row(row![r->format!("* --> {} =", label), format!("{}", value)]);
        }

        false => {
          table.add_row(row![r->format!("{} =", label), format!("{}", value)]);
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

}

impl<I: InputChannel, O: OutputChannel> Tvm<I, O> {

  // region Execution

  /**
    Runs the machine until it halts or fails. There is no step limit: a program that never halts
    runs until it strays outside memory.

    Executing a machine that has already halted does nothing. Executing a machine that has failed
    returns `VmError::MachineFailed`.
  */
  pub fn execute(&mut self) -> Result<(), VmError> {
    while self.step()? == MachineState::Running {}
    Ok(())
  }

  /// Executes a single instruction and reports the resulting state.
  pub fn step(&mut self) -> Result<MachineState, VmError> {
    match self.state {
      MachineState::Halted  => return Ok(MachineState::Halted),
      MachineState::Failed  => return Err(VmError::MachineFailed),
      MachineState::Running => {}
    }

    match self.cycle() {

      Ok(Step::Continue(next)) => {
        self.steps += 1;
        self.program_counter = next;
      }

      Ok(Step::Halt) => {
        self.steps += 1;
        self.state = MachineState::Halted;
        tracing::debug!(pc = self.program_counter, steps = self.steps, "halted");
      }

      Err(error) => {
        self.state = MachineState::Failed;
        tracing::debug!(pc = self.program_counter, steps = self.steps, %error, "failed");
        return Err(error);
      }

    }

    #[cfg(feature = "trace_computation")]
    tracing::trace!("\n{}", self);

    Ok(self.state)
  }

  /// Fetch, decode and execute the instruction at the program counter.
  fn cycle(&mut self) -> Result<Step, VmError> {
    let word    = self.memory.get(self.program_counter as Word)?;
    let decoded = decode_word(word, self.program_counter)?;

    if tracing::enabled!(tracing::Level::TRACE) {
      match try_decode_instruction(self.memory.as_slice(), self.program_counter) {
        Some(instruction) => tracing::trace!(pc = self.program_counter, "{}", instruction),
        None              => tracing::trace!(pc = self.program_counter, word, "truncated instruction"),
      }
    }

    let mut ctx = Context {
      memory          : &mut self.memory,
      registers       : &mut self.registers,
      program_counter : self.program_counter,
      input           : &mut self.input,
      output          : &mut self.output,
    };

    execute(&decoded, &mut ctx)
  }

  // endregion

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<I, O> Display for Tvm<I, O> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let memory_labels =
      (0..self.memory.len()).map(|i| format!("M[{}]", i)).collect();
    let register_labels =
      (0..REGISTER_COUNT)
        .map(|i| format!("{}", register_name(i).unwrap_or("?")))
        .collect();

    let registers = self.registers.snapshot();
    let m_table = Tvm::<I, O>::make_table(
      memory_labels, self.memory.as_slice(), Some(self.program_counter)
    );
    let r_table = Tvm::<I, O>::make_table(register_labels, &registers, None);

    let mut combined_table = table!([m_table, r_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(
      f,
      "State: {}\tPC: {}\tSteps: {}\n{}",
      self.state, self.program_counter, self.steps, combined_table
    )
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  proptest! {
    #[test]
    fn random_programs_never_panic(program in prop::collection::vec(-30000i64..30000, 1..64)) {
      let original_len = program.len();
      let mut machine = Tvm::new(program);
      for _ in 0..256 {
        match machine.step() {
          Ok(MachineState::Running) => continue,
          _                         => break,
        }
      }
      prop_assert_eq!(machine.copy_memory().len(), original_len);
    }

    #[test]
    fn immediate_and_address_operands_agree(a in any::<i64>(), b in any::<i64>(), op in prop::sample::select(vec![1i64, 2, 5, 8])) {
      let immediate = Tvm::new(vec![1100 + op, a, b, 0, 9]);
      let address   = Tvm::new(vec![op, 5, 6, 0, 9, a, b]);
      let mut results = vec![];
      for mut machine in [immediate, address] {
        machine.execute().unwrap();
        results.push(machine.memory_value(0).unwrap());
      }
      prop_assert_eq!(results[0], results[1]);
    }

    #[test]
    fn failures_leave_memory_untouched(word in 0i64..100_000, a in -10i64..10, b in -10i64..10, c in -10i64..10) {
      let program = vec![word, a, b, c];
      let mut machine = Tvm::new(program.clone());
      if machine.step().is_err() {
        prop_assert_eq!(machine.copy_memory(), program);
        prop_assert_eq!(machine.state(), MachineState::Failed);
      }
    }
  }
}
