//! `oct8`: the end-to-end toolchain driver. `oct8 build` compiles/assembles
//! a source file down to a byte image; `oct8 run` does the same and then
//! executes the image to completion, printing final machine state.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use asm8::file_reader::MockFileReader;
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use vm8::{NoKeyboard, NullConsole, Vm};

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "oct8 toolchain")]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile (if HighLang) and assemble a source file, writing a byte image.
    Build {
        source: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        #[clap(short, long, value_enum, default_value_t = Format::Bytes)]
        format: Format,
    },
    /// Compile, assemble and run a source file to HALT, printing final state.
    Run { source: PathBuf },
}

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Bytes,
    Text,
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> Result<()> {
    match opts.command {
        Command::Build { source, output, format } => {
            let bytes = assemble_source(&source)?;
            match format {
                Format::Bytes => fs::write(&output, &bytes).with_context(|| format!("writing {}", output.display()))?,
                Format::Text => {
                    fs::write(&output, asm8::image_format::to_text(&bytes)).with_context(|| format!("writing {}", output.display()))?
                }
            }
            println!("assembled {} to {} ({} bytes)", source.display(), output.display(), bytes.len());
            Ok(())
        }
        Command::Run { source } => {
            let bytes = assemble_source(&source)?;
            let mut vm = Vm::new(&bytes);
            vm.run(&mut NullConsole, &mut NoKeyboard).context("running")?;
            print_state(&vm);
            Ok(())
        }
    }
}

/// Compiles `source` down to a byte image. HighLang sources (`.hl`) go
/// through `highlang::compile` first; everything else is assembled as-is.
fn assemble_source(source: &Path) -> Result<Vec<u8>> {
    let text = fs::read_to_string(source).with_context(|| format!("reading {}", source.display()))?;
    let is_highlang = source.extension().and_then(|e| e.to_str()) == Some("hl");
    let asm_text = if is_highlang { highlang::compile(&text).context("compiling HighLang source")? } else { text };

    let mut reader = MockFileReader::default();
    let synthetic_path = PathBuf::from("<generated>.asm");
    reader.add_file(synthetic_path.to_str().unwrap(), &asm_text);
    asm8::assemble(&synthetic_path, &reader).context("assembling")
}

fn print_state(vm: &Vm) {
    println!("pc={:#06x} sp={:#06x} z={} c={}", vm.pc, vm.sp, vm.z, vm.c);
    for (i, r) in vm.regs.iter().enumerate() {
        let letter = (b'A' + i as u8) as char;
        print!("{letter}={r:#04x} ");
    }
    println!();
    for (i, p) in vm.ports.iter().enumerate() {
        print!("port{i}={p:#04x} ");
    }
    println!();
    let buf: [u8; isa::TEXT_BUFFER_LEN] = vm.memory[isa::TEXT_BUFFER_START as usize..].try_into().unwrap();
    println!("text: {}", charmap::decode_text_buffer(&buf));
}
