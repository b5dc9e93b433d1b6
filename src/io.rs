/*!
  Input and output channels.

  The machine talks to the outside world only through these two capabilities, invoked
  synchronously by the `in` and `out` operations. Buffering and blocking are up to the
  implementation; the machine simply waits for each call to return.
*/

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::Word;

/// An external source of words.
pub trait InputChannel {
  /// Produces the next word, or `None` if nothing is available.
  fn receive_input(&mut self) -> Option<Word>;
}

/// An external sink for words.
pub trait OutputChannel {
  fn emit_output(&mut self, value: Word);
}

impl<T: InputChannel + ?Sized> InputChannel for &mut T {
  fn receive_input(&mut self) -> Option<Word> {
    (**self).receive_input()
  }
}

impl<T: OutputChannel + ?Sized> OutputChannel for &mut T {
  fn emit_output(&mut self, value: Word) {
    (**self).emit_output(value)
  }
}

impl<T: InputChannel + ?Sized> InputChannel for Box<T> {
  fn receive_input(&mut self) -> Option<Word> {
    (**self).receive_input()
  }
}

impl<T: OutputChannel + ?Sized> OutputChannel for Box<T> {
  fn emit_output(&mut self, value: Word) {
    (**self).emit_output(value)
  }
}

/// A channel with nothing to give. The default input of a machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputChannel for NoInput {
  fn receive_input(&mut self) -> Option<Word> {
    None
  }
}

/// Drops everything. The default output of a machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardOutput;

impl OutputChannel for DiscardOutput {
  fn emit_output(&mut self, _value: Word) {}
}

/// Pre-supplied input, consumed front to back.
impl InputChannel for VecDeque<Word> {
  fn receive_input(&mut self) -> Option<Word> {
    self.pop_front()
  }
}

/// Collects output in emission order.
impl OutputChannel for Vec<Word> {
  fn emit_output(&mut self, value: Word) {
    self.push(value)
  }
}

/// Adapts a closure as an input channel.
pub struct InputFn<F>(pub F);

impl<F: FnMut() -> Option<Word>> InputChannel for InputFn<F> {
  fn receive_input(&mut self) -> Option<Word> {
    (self.0)()
  }
}

/// Adapts a closure as an output channel.
pub struct OutputFn<F>(pub F);

impl<F: FnMut(Word)> OutputChannel for OutputFn<F> {
  fn emit_output(&mut self, value: Word) {
    (self.0)(value)
  }
}

/**
  Reads one word per line from a buffered reader, skipping blank lines. End of input, a read error
  or an unparsable line all mean no input is available; the latter two are logged.
*/
pub struct LineInput<R> {
  reader: R,
  line: String,
}

impl<R: BufRead> LineInput<R> {
  pub fn new(reader: R) -> LineInput<R> {
    LineInput { reader, line: String::new() }
  }
}

impl<R: BufRead> InputChannel for LineInput<R> {
  fn receive_input(&mut self) -> Option<Word> {
    loop {
      self.line.clear();
      match self.reader.read_line(&mut self.line) {
        Ok(0) => return None,
        Ok(_) => {
          let text = self.line.trim();
          if text.is_empty() {
            continue;
          }
          return match text.parse::<Word>() {
            Ok(value) => Some(value),
            Err(e) => {
              tracing::error!("cannot read '{}' as input: {}", text, e);
              None
            }
          };
        }
        Err(e) => {
          tracing::error!("failed to read input: {}", e);
          return None;
        }
      }
    }
  }
}

/// Writes one word per line.
pub struct LineOutput<W> {
  writer: W,
}

impl<W: Write> LineOutput<W> {
  pub fn new(writer: W) -> LineOutput<W> {
    LineOutput { writer }
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> OutputChannel for LineOutput<W> {
  fn emit_output(&mut self, value: Word) {
    // Output is fire-and-forget for the machine, so a broken sink is only reported.
    if let Err(e) = writeln!(self.writer, "{}", value).and_then(|_| self.writer.flush()) {
      tracing::error!("failed to write output {}: {}", value, e);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn queue_and_collector(){
    let mut input: VecDeque<Word> = vec![3, -4].into();
    assert_eq!(input.receive_input(), Some(3));
    assert_eq!(input.receive_input(), Some(-4));
    assert_eq!(input.receive_input(), None);

    let mut output: Vec<Word> = Vec::new();
    output.emit_output(1);
    output.emit_output(2);
    assert_eq!(output, vec![1, 2]);
  }

  #[test]
  fn closures(){
    let mut next: Word = 0;
    let mut input = InputFn(|| { next += 1; Some(next) });
    assert_eq!(input.receive_input(), Some(1));
    assert_eq!(input.receive_input(), Some(2));

    let mut seen = vec![];
    {
      let mut output = OutputFn(|v: Word| seen.push(v * 10));
      output.emit_output(4);
    }
    assert_eq!(seen, vec![40]);
  }

  #[test]
  fn lines(){
    let mut input = LineInput::new("12\n\n  -7 \nnope\n".as_bytes());
    assert_eq!(input.receive_input(), Some(12));
    assert_eq!(input.receive_input(), Some(-7));
    assert_eq!(input.receive_input(), None);

    let mut output = LineOutput::new(Vec::new());
    output.emit_output(5);
    output.emit_output(-6);
    assert_eq!(String::from_utf8(output.into_inner()).unwrap(), "5\n-6\n");
  }

  #[test]
  fn defaults(){
    assert_eq!(NoInput.receive_input(), None);
    DiscardOutput.emit_output(1);
  }
}
