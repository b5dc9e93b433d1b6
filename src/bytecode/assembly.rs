/*!
  The human readable textual form of intcode is called assembly. This module leverages the
  `strum` derives of `Operation` to read and write mnemonics, and `nom` to split lines.

  Assembly is line oriented:
  ```text
    <line>       ::= <ws>* [ <mnemonic> ( <separator> <param> )* ] <ws>* [ ',' ] <ws>* [ <comment> ]
    <separator>  ::= <ws>* ',' <ws>* | <ws>+
    <param>      ::= '$' <integer>             ; address
                   | [ 'i' ] <integer>         ; immediate
                   | r0..r4 | t0..t7 | la     ; register
    <comment>    ::= '#' .*
  ```
  Every error carries the 1-based number of the source line it came from.
*/

use std::fmt::{Display, Formatter, Write};
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::is_not,
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    i64 as signed_word,
    not_line_ending,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_opt, opt, recognize},
  multi::{many0, separated_list0},
  sequence::{pair, preceded, terminated, tuple},
  IResult
};

use super::{encode_instruction, try_decode_instruction, Instruction, Operation, Param, MAX_PARAMS};
use crate::error::{AssemblyError, AssemblyErrorKind};
use crate::registers::register_index;
use crate::Word;

/// One assembled line: the instruction and where it came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Statement {
  pub line: usize,
  pub instruction: Instruction,
}

impl Display for Statement {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.instruction)
  }
}

// region Line parsers

fn comment_p(input: &str) -> IResult<&str, &str> {
  preceded(one_char('#'), not_line_ending)(input)
}

fn separator_p(input: &str) -> IResult<&str, &str> {
  alt((recognize(tuple((space0, one_char(','), space0))), space1))(input)
}

/// Whatever follows the last token: whitespace, a stray trailing comma, and a comment.
fn trailer_p(input: &str) -> IResult<&str, ()> {
  map(tuple((space0, opt(one_char(',')), space0, opt(comment_p))), |_| ())(input)
}

fn token_p(input: &str) -> IResult<&str, &str> {
  is_not(" \t,#")(input)
}

/// Splits a line into its mnemonic and raw parameter tokens. Blank and comment lines give `None`.
fn line_p(input: &str) -> IResult<&str, Option<(&str, Vec<&str>)>> {
  all_consuming(terminated(
    opt(preceded(space0, pair(alpha1, many0(preceded(separator_p, token_p))))),
    trailer_p
  ))(input)
}

fn param_p(input: &str) -> IResult<&str, Param> {
  alt((
    map(preceded(one_char('$'), signed_word), Param::address),
    map(preceded(opt(one_char('i')), signed_word), Param::immediate),
    map_opt(alphanumeric1, |name: &str| {
      register_index(name).map(|idx| Param::register(idx as Word))
    }),
  ))(input)
}

fn intcode_line_p(input: &str) -> IResult<&str, Vec<Word>> {
  all_consuming(terminated(
    preceded(space0, separated_list0(separator_p, signed_word)),
    trailer_p
  ))(input)
}

// endregion

fn looks_like_register(token: &str) -> bool {
  token.starts_with('r') || token.starts_with('t') || token == "la"
}

fn classify_param(token: &str) -> Result<Param, AssemblyErrorKind> {
  match all_consuming(param_p)(token) {
    Ok((_, param))                       => Ok(param),
    Err(_) if looks_like_register(token) => Err(AssemblyErrorKind::InvalidRegister(token.to_string())),
    Err(_)                               => Err(AssemblyErrorKind::UnknownParamFormat(token.to_string())),
  }
}

/// Parses assembly text into statements, stopping at the first error.
pub fn parse_assembly(text: &str) -> Result<Vec<Statement>, AssemblyError> {
  let mut statements = Vec::new();

  for (idx, source_line) in text.lines().enumerate() {
    let line  = idx + 1;
    let error = move |kind| AssemblyError::new(line, kind);

    let (mnemonic, tokens) =
      match line_p(source_line) {
        Ok((_, Some(parts))) => parts,
        Ok((_, None))        => continue,
        Err(_)               => {
          return Err(error(AssemblyErrorKind::Syntax(source_line.trim().to_string())));
        }
      };

    let operation =
      Operation::from_str(mnemonic)
        .map_err(|_| error(AssemblyErrorKind::UnknownOperation(mnemonic.to_string())))?;

    if tokens.len() > MAX_PARAMS {
      return Err(error(AssemblyErrorKind::TooManyParams));
    }
    if tokens.len() != operation.arity() {
      return Err(error(AssemblyErrorKind::WrongArity {
        operation,
        expected: operation.arity(),
        given: tokens.len()
      }));
    }

    let params =
      tokens.iter()
            .map(|token| classify_param(token))
            .collect::<Result<Vec<Param>, _>>()
            .map_err(error)?;

    statements.push(Statement { line, instruction: Instruction::new(operation, params) });
  } // end for

  Ok(statements)
}

/// Assembles text into intcode.
pub fn assemble(text: &str) -> Result<Vec<Word>, AssemblyError> {
  let statements = parse_assembly(text)?;
  let mut intcode = Vec::new();

  for statement in &statements {
    let words =
      encode_instruction(&statement.instruction)
        .map_err(|_| AssemblyError::new(statement.line, AssemblyErrorKind::TooManyParams))?;
    intcode.extend(words);
  }

  tracing::debug!("assembled {} instructions into {} words", statements.len(), intcode.len());
  Ok(intcode)
}

/// Reads intcode text: integers separated by commas and/or whitespace, `#` comments allowed.
pub fn parse_intcode(text: &str) -> Result<Vec<Word>, AssemblyError> {
  let mut intcode = Vec::new();

  for (idx, source_line) in text.lines().enumerate() {
    match intcode_line_p(source_line) {
      Ok((_, words)) => intcode.extend(words),
      Err(_)         => {
        return Err(AssemblyError::new(
          idx + 1,
          AssemblyErrorKind::Syntax(source_line.trim().to_string())
        ));
      }
    }
  }

  Ok(intcode)
}

/**
  Renders a program as an assembly listing, one instruction per line prefixed by its address.
  Words that do not start a complete, valid instruction are listed as data and skipped one at a
  time.
*/
pub fn disassemble(program: &[Word]) -> String {
  let mut out = String::new();
  let mut address = 0;

  while address < program.len() {
    match try_decode_instruction(program, address) {
      Some(instruction) => {
        let _ = writeln!(out, "{:04}: {}", address, instruction);
        address += instruction.operation.width();
      }
      None => {
        let _ = writeln!(out, "{:04}: {}  # data", address, program[address]);
        address += 1;
      }
    }
  }

  out
}
