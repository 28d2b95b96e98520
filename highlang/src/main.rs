use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "oct8 toolchain", about = "Compiles a HighLang source file to asm8 assembly text")]
struct Opts {
    source: PathBuf,
    output: PathBuf,
}

fn main() -> ExitCode {
    match run(Opts::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> Result<()> {
    let source = fs::read_to_string(&opts.source).with_context(|| format!("could not read {}", opts.source.display()))?;
    let asm = highlang::compile(&source).context("compiling HighLang source")?;
    fs::write(&opts.output, asm).with_context(|| format!("could not write {}", opts.output.display()))?;
    Ok(())
}
