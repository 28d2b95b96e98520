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

use std::collections::HashMap;

use crate::ast::AssemblyLine;
use crate::encoder::instruction_size;
use crate::errors::AssemblyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub address: u16,
}

pub type SymbolTable = HashMap<String, Symbol>;

/// Pass 1: walks every line once, assigning each label the byte offset it
/// will occupy, without resolving any operand. Length is a pure function of
/// the instruction/directive shape, mirrored exactly by `encoder::encode`.
pub fn build_symbol_table(lines: &[AssemblyLine]) -> Result<SymbolTable, AssemblyError> {
    let mut table = SymbolTable::new();
    let mut addr: u32 = 0;

    for line in lines {
        if let Some(name) = &line.label {
            if table.contains_key(name) {
                return Err(AssemblyError::StructuralError {
                    line: line.line_number,
                    reason: format!("duplicate label '{name}'"),
                });
            }
            table.insert(name.clone(), Symbol { address: addr as u16 });
        }
        if let Some(content) = &line.content {
            addr += instruction_size(content) as u32;
        }
    }
    Ok(table)
}

pub fn resolve(table: &SymbolTable, name: &str, line: usize) -> Result<u16, AssemblyError> {
    table
        .get(name)
        .map(|s| s.address)
        .ok_or_else(|| AssemblyError::SemanticError {
            line,
            reason: format!("unresolved label '{name}'"),
        })
}
