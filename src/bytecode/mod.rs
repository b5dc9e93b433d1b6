/*!

  Programs are flat sequences of signed words ("intcode") and live in the same memory as their
  data. An instruction is one instruction word followed by one word per parameter:

  ```text
    [instruction word][param 0][param 1][param 2]
  ```

  The instruction word is read in decimal. Its two least significant digits select the operation
  and each following digit gives the format of one parameter, first parameter lowest:

  ```text
    f2 f1 f0 o o
  ```

  A format is one of address (0), immediate (1) or register (2). So `1102` is `mlt` with two
  immediate inputs writing to a memory address, and `21201` is `add` reading a register and an
  immediate and writing a register.

  The textual form of intcode is assembly. Each line holds one instruction, a mnemonic followed by
  its parameters written as `$N` (address), `N` or `iN` (immediate) or a register name
  (`r0`–`r4`, `t0`–`t7`, `la`).

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble, disassemble, parse_assembly, parse_intcode, Statement};
pub use binary::{
  add_param_format, decode_word, encode_instruction, param_format, try_decode_instruction, Decoded
};
pub use instruction::{Instruction, Operation, Param, MAX_PARAMS};
