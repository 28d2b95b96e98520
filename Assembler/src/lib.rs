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

pub mod ast;
pub mod encoder;
pub mod errors;
pub mod file_reader;
pub mod image_format;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

use std::path::Path;

use anyhow::{Context, Result};

use file_reader::FileReader;

/// Assembles the source at `source_path` into a flat byte image: parse,
/// build the symbol table (pass 1), then emit bytes (pass 2).
pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<Vec<u8>> {
    let source = reader
        .read_to_string(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;

    let lines = parser::parse_source(&source).context("failed during parsing stage")?;
    let symbols = symbol_table::build_symbol_table(&lines).context("failed during assembler pass 1")?;

    let mut bytes = Vec::new();
    for line in &lines {
        if let Some(content) = &line.content {
            let encoded = encoder::encode(content, &symbols, line.line_number).context("failed during assembler pass 2")?;
            bytes.extend(encoded);
        }
    }

    if bytes.len() > isa::STACK_START as usize {
        eprintln!(
            "warning: assembled image is {} bytes, past the start of the stack region (0x{:04x}); \
             the first PUSH will begin overwriting code/data",
            bytes.len(),
            isa::STACK_START
        );
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use file_reader::MockFileReader;
    use std::path::Path;

    #[test]
    fn assembles_s1_arith_scenario() {
        let mut reader = MockFileReader::default();
        reader.add_file("s1.asm", "LDI A, 10\nLDI B, 5\nSUB A, B\nHALT\n");
        let bytes = assemble(Path::new("s1.asm"), &reader).unwrap();
        assert_eq!(bytes, vec![0x01, 0, 10, 0x01, 1, 5, 0x0A, 0, 1, 0xFF]);
    }

    #[test]
    fn resolves_forward_label_reference() {
        let mut reader = MockFileReader::default();
        reader.add_file("s2.asm", "LDI A, 3\nL: DEC A\nJNZ L\nHALT\n");
        let bytes = assemble(Path::new("s2.asm"), &reader).unwrap();
        // DEC A is at offset 3, so JNZ L must target 3.
        assert_eq!(&bytes[3..], &[0x0D, 0, 0x17, 3, 0, 0xFF]);
    }

    #[test]
    fn duplicate_label_is_fatal() {
        let mut reader = MockFileReader::default();
        reader.add_file("bad.asm", "L: HALT\nL: HALT\n");
        assert!(assemble(Path::new("bad.asm"), &reader).is_err());
    }

    #[test]
    fn reassembling_emitted_labels_is_idempotent() {
        let mut reader = MockFileReader::default();
        let src = "LDI A, 1\nL: INC A\nJMP L\n$ L\n";
        reader.add_file("idem.asm", src);
        let first = assemble(Path::new("idem.asm"), &reader).unwrap();
        let second = assemble(Path::new("idem.asm"), &reader).unwrap();
        assert_eq!(first, second);
    }
}
