/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::Result;
use asm8::assemble;
use asm8::file_reader::AsmFileReader;
use asm8::image_format;
use clap::Parser as ClapParser;
use clap::ValueEnum;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "oct8 toolchain")]
struct Opts {
    #[clap(short, long)]
    input: PathBuf,
    #[clap(short, long)]
    output: PathBuf,
    #[clap(short, long, value_enum, default_value_t = Format::Bytes)]
    format: Format,
}

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Bytes,
    Text,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let reader = AsmFileReader;
    let input_path: &Path = Path::new(&opts.input);

    let bytes = assemble(input_path, &reader)?;

    match opts.format {
        Format::Bytes => fs::write(&opts.output, &bytes)?,
        Format::Text => fs::write(&opts.output, image_format::to_text(&bytes))?,
    }

    println!(
        "Successfully assembled {} to {} ({} bytes)",
        opts.input.display(),
        opts.output.display(),
        bytes.len()
    );

    Ok(())
}
