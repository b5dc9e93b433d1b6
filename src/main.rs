use std::collections::VecDeque;
use std::error::Error;
use std::fs;
use std::io::{self as stdio, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use tvm::io::{LineInput, LineOutput};
use tvm::{assemble, disassemble, parse_intcode, InputChannel, Tvm, Word};

#[derive(Parser)]
#[command(name = "tvm", about = "The Tsvetok virtual machine and its assembler")]
struct Cli {
  /// Log more. Repeat for debug and trace output. `RUST_LOG` takes precedence.
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a program, reading input from `--input` or else from stdin, one word per line.
  Run {
    /// Intcode file, or assembly with `--asm`.
    file: PathBuf,

    /// Treat the file as assembly.
    #[arg(long)]
    asm: bool,

    /// Comma separated input words, e.g. `--input 3,-1,7`.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    input: Option<Vec<Word>>,

    /// Print the final memory and registers.
    #[arg(long)]
    dump: bool,
  },

  /// Assemble a program into comma separated intcode.
  Assemble {
    file: PathBuf,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// List an intcode program as assembly.
  Disassemble {
    file: PathBuf,
  },
}

fn setup_tracing(verbose: u8) -> Result<(), Box<dyn Error>> {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter    = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
  let fmt_layer = fmt::layer()
    .with_target(false)
    .with_writer(stdio::stderr);
  let sub = Registry::default()
    .with(filter)
    .with(fmt_layer);
  set_global_default(sub)?;
  Ok(())
}

fn load_program(file: &Path, asm: bool) -> Result<Vec<Word>, Box<dyn Error>> {
  let text = fs::read_to_string(file)?;
  let program =
    match asm {
      true  => assemble(&text)?,
      false => parse_intcode(&text)?,
    };
  tracing::info!("loaded {} words from {}", program.len(), file.display());
  Ok(program)
}

fn run(file: &Path, asm: bool, input: Option<Vec<Word>>, dump: bool) -> Result<(), Box<dyn Error>> {
  let program = load_program(file, asm)?;

  let input: Box<dyn InputChannel> =
    match input {
      Some(values) => Box::new(VecDeque::from(values)),
      None         => Box::new(LineInput::new(stdio::stdin().lock())),
    };
  let output = LineOutput::new(stdio::stdout());

  let mut machine = Tvm::with_io(program, input, output);
  let result      = machine.execute();

  tracing::info!(
    steps = machine.steps(),
    pc = machine.program_counter(),
    state = %machine.state(),
    "execution finished"
  );
  if dump {
    println!("{}", machine);
  }

  result?;
  Ok(())
}

fn assemble_file(file: &Path, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
  let program = load_program(file, true)?;
  let text =
    program
      .iter()
      .map(|word| word.to_string())
      .collect::<Vec<_>>()
      .join(",");

  match output {
    Some(path) => fs::write(path, text + "\n")?,
    None       => {
      let mut stdout = stdio::stdout().lock();
      writeln!(stdout, "{}", text)?;
    }
  }
  Ok(())
}

fn disassemble_file(file: &Path) -> Result<(), Box<dyn Error>> {
  let program = load_program(file, false)?;
  print!("{}", disassemble(&program));
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  if let Err(e) = setup_tracing(cli.verbose) {
    eprintln!("failed to set up logging: {}", e);
  }

  let result =
    match cli.command {
      Command::Run { file, asm, input, dump } => run(&file, asm, input, dump),
      Command::Assemble { file, output }      => assemble_file(&file, output.as_deref()),
      Command::Disassemble { file }           => disassemble_file(&file),
    };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}
