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

use asm8::assemble;
use asm8::file_reader::MockFileReader;
use std::path::Path;

#[test]
fn test_halt() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "HALT\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(result, vec![0xFF]);
}

#[test]
fn test_ldi16_with_pair_token() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "LDI16 AB, 0x1234\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    // opcode, HI reg, LO reg, imm_lo, imm_hi
    assert_eq!(result, vec![0x02, 0, 1, 0x34, 0x12]);
}

#[test]
fn test_stack_round_trip_scenario_s3() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "LDI A, 7\nPUSH A\nLDI A, 0\nPOP A\nHALT\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(
        result,
        vec![0x01, 0, 7, 0x1A, 0, 0x01, 0, 0, 0x1B, 0, 0xFF]
    );
}

#[test]
fn test_push16_preserves_hi_lo_order() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "PUSH16 A, B\nPOP16 C, D\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(result, vec![0x1C, 0, 1, 0x1D, 2, 3]);
}

#[test]
fn test_unresolved_label_is_fatal() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "JMP nowhere\n");
    assert!(assemble(Path::new("test.asm"), &reader).is_err());
}

#[test]
fn test_unknown_mnemonic_is_fatal() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "FROB A\n");
    assert!(assemble(Path::new("test.asm"), &reader).is_err());
}

#[test]
fn test_three_comment_styles_are_all_stripped() {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", "HALT ; a\nHALT # b\nHALT // c\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(result, vec![0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_data_directive_mixed_widths() {
    let mut reader = MockFileReader::default();
    // 1 byte, then 0x100 doesn't fit in one byte so it's LO,HI
    reader.add_file("test.asm", "$ 1 0x100\n");
    let result = assemble(Path::new("test.asm"), &reader).unwrap();
    assert_eq!(result, vec![1, 0x00, 0x01]);
}
