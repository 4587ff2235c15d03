//! Thin process-boundary shell: argument parsing, file I/O, structured
//! logging, and listing composition around the library's pure
//! decode/format/interpret/estimate surface.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use sim8086::cycles::estimate_cycles;
use sim8086::decode::{decode, DecodeError};
use sim8086::interpreter::Interpreter;

/// How much work to do with the decoded instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Print the NASM-compatible listing only.
    Decode,
    /// Print the listing with a running cycle-count comment per line.
    Cycles,
    /// Simulate execution and print per-step deltas, flags, and a
    /// final register dump.
    Exec,
}

/// A disassembler and interpreter for a subset of the 8086 instruction set.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to a flat binary image of 8086 machine code.
    input: PathBuf,

    /// What to do with the decoded instructions.
    #[arg(long, value_enum, default_value_t = Mode::Decode)]
    mode: Mode,

    /// Write the final 64 KiB memory image to this path after an exec run.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The binary's own error type, split along the I/O/decode boundary so
/// each kind maps to a distinct process exit code.
#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Decode(DecodeError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Decode(err) => write!(f, "decode error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Io(err)) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Err(CliError::Decode(err)) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let image = fs::read(&cli.input)?;
    info!(path = %cli.input.display(), bytes = image.len(), mode = ?cli.mode, "loaded input image");

    println!("bits 16");

    match cli.mode {
        Mode::Decode => run_decode(&image),
        Mode::Cycles => run_cycles(&image),
        Mode::Exec => run_exec(&image, cli.dump.as_deref()),
    }
}

fn run_decode(image: &[u8]) -> Result<(), CliError> {
    let mut offset = 0;
    while offset < image.len() {
        match decode(image, offset) {
            Ok(instruction) => {
                println!("{instruction}");
                offset += instruction.size;
            }
            Err(DecodeError::EndOfInput) => break,
            Err(err @ DecodeError::NoMatch { offset, byte }) => {
                debug!(offset, byte, "decoding halted: no blueprint matched");
                println!("; No command");
                return Err(CliError::Decode(err));
            }
        }
    }
    Ok(())
}

fn run_cycles(image: &[u8]) -> Result<(), CliError> {
    let mut offset = 0;
    let mut total = 0u32;
    while offset < image.len() {
        match decode(image, offset) {
            Ok(instruction) => {
                println!("{instruction}");
                if let Some(cost) = estimate_cycles(&instruction) {
                    total += cost;
                    println!("; cycles +{cost} = {total}");
                }
                offset += instruction.size;
            }
            Err(DecodeError::EndOfInput) => break,
            Err(err @ DecodeError::NoMatch { offset, byte }) => {
                debug!(offset, byte, "decoding halted: no blueprint matched");
                println!("; No command");
                return Err(CliError::Decode(err));
            }
        }
    }
    Ok(())
}

fn run_exec(image: &[u8], dump_path: Option<&std::path::Path>) -> Result<(), CliError> {
    let mut interpreter = Interpreter::new(image);
    loop {
        match interpreter.step() {
            Ok(None) => break,
            Ok(Some(outcome)) => {
                println!("{}", outcome.instruction);
                if let Some((operand, before, after)) = outcome.delta {
                    println!("; {operand} {before:#06x}->{after:#06x}");
                }
                if outcome.flags_changed {
                    println!("; Flags: {}", interpreter.flags);
                }
            }
            Err(err @ DecodeError::NoMatch { offset, byte }) => {
                debug!(offset, byte, "decoding halted: no blueprint matched");
                println!("; No command");
                return Err(CliError::Decode(err));
            }
            Err(DecodeError::EndOfInput) => break,
        }
    }

    println!("; Registers");
    for (index, value) in interpreter.registers.dump_order() {
        println!(";   {index}: {value:#06x} ({value})");
    }
    println!("; Flags: {}", interpreter.flags);

    if let Some(path) = dump_path {
        // Historical quirk, preserved verbatim: 65 535 bytes, address 0
        // first, not the full 65 536-byte image.
        fs::write(path, &interpreter.memory.bytes()[..65_535])?;
    }

    Ok(())
}
