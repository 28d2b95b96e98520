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

use crate::ast::{AddrOperand, AssemblyLine, DataToken, Directive, ImmOperand, Instruction, LineContent, Register};
use crate::errors::AssemblyError;
use crate::lexer::{parse_number, split_label, split_operands, strip_comment};

pub fn parse_source(source: &str) -> Result<Vec<AssemblyLine>, AssemblyError> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line_number = i + 1;
        let stripped = strip_comment(raw);
        let (label, rest) = split_label(stripped);
        let rest = rest.trim();

        let content = if rest.is_empty() {
            None
        } else if let Some(data) = rest.strip_prefix('$') {
            Some(LineContent::Data(parse_directive(data, line_number)?))
        } else {
            Some(LineContent::Instr(parse_instruction(rest, line_number)?))
        };

        lines.push(AssemblyLine {
            line_number,
            label: label.map(|s| s.to_string()),
            content,
        });
    }
    Ok(lines)
}

fn parse_directive(rest: &str, line: usize) -> Result<Directive, AssemblyError> {
    let tokens = split_operands(rest);
    if tokens.is_empty() {
        return Err(AssemblyError::StructuralError {
            line,
            reason: "data directive with no values".to_string(),
        });
    }
    let values = tokens
        .iter()
        .map(|t| match parse_number(t) {
            Some(n) => Ok(DataToken::Literal(n as i32)),
            None => {
                if is_identifier(t) {
                    Ok(DataToken::Label(t.clone()))
                } else {
                    Err(AssemblyError::ParseError {
                        line,
                        reason: format!("bad number or label '{t}'"),
                    })
                }
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Directive { values })
}

fn is_identifier(tok: &str) -> bool {
    let mut chars = tok.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn reg(tok: &str, line: usize) -> Result<Register, AssemblyError> {
    let mut chars = tok.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(AssemblyError::StructuralError {
            line,
            reason: format!("'{tok}' is not a single register letter"),
        });
    };
    Register::from_letter(c).ok_or_else(|| AssemblyError::StructuralError {
        line,
        reason: format!("'{tok}' is not a valid register letter"),
    })
}

/// Consumes a register pair starting at `tokens[*idx]`: either one two-letter
/// token (first letter = HIGH) or two separate single-letter tokens.
fn reg_pair(tokens: &[String], idx: &mut usize, line: usize) -> Result<(Register, Register), AssemblyError> {
    let tok = tokens.get(*idx).ok_or_else(|| AssemblyError::StructuralError {
        line,
        reason: "expected a register pair, found end of line".to_string(),
    })?;
    let mut chars = tok.chars();
    if let (Some(hi_c), Some(lo_c), None) = (chars.next(), chars.next(), chars.next()) {
        if hi_c.is_ascii_alphabetic() && lo_c.is_ascii_alphabetic() {
            let hi = Register::from_letter(hi_c).ok_or_else(|| AssemblyError::StructuralError {
                line,
                reason: format!("'{hi_c}' is not a valid register letter"),
            })?;
            let lo = Register::from_letter(lo_c).ok_or_else(|| AssemblyError::StructuralError {
                line,
                reason: format!("'{lo_c}' is not a valid register letter"),
            })?;
            *idx += 1;
            return Ok((hi, lo));
        }
    }
    let hi = reg(tok, line)?;
    *idx += 1;
    let lo_tok = tokens.get(*idx).ok_or_else(|| AssemblyError::StructuralError {
        line,
        reason: "expected low half of register pair, found end of line".to_string(),
    })?;
    let lo = reg(lo_tok, line)?;
    *idx += 1;
    Ok((hi, lo))
}

fn addr_operand(tok: &str, line: usize) -> Result<AddrOperand, AssemblyError> {
    if let Some(n) = parse_number(tok) {
        if !(0..=0xFFFF).contains(&n) {
            return Err(AssemblyError::SemanticError {
                line,
                reason: format!("address {n} out of range for a 16-bit operand"),
            });
        }
        return Ok(AddrOperand::Literal(n as u16));
    }
    if is_identifier(tok) {
        return Ok(AddrOperand::Label(tok.to_string()));
    }
    Err(AssemblyError::ParseError {
        line,
        reason: format!("'{tok}' is not a valid address or label"),
    })
}

fn imm_operand(tok: &str, line: usize) -> Result<ImmOperand, AssemblyError> {
    if let Some(n) = parse_number(tok) {
        if !(0..=0xFF).contains(&n) {
            return Err(AssemblyError::SemanticError {
                line,
                reason: format!("immediate {n} out of range for an 8-bit operand"),
            });
        }
        return Ok(ImmOperand::Literal(n as u8));
    }
    if is_identifier(tok) {
        return Ok(ImmOperand::Label(tok.to_string()));
    }
    Err(AssemblyError::ParseError {
        line,
        reason: format!("'{tok}' is not a valid immediate or label"),
    })
}

fn expect_operands<'a>(tokens: &'a [String], n: usize, mnemonic: &str, line: usize) -> Result<&'a [String], AssemblyError> {
    if tokens.len() != n {
        return Err(AssemblyError::StructuralError {
            line,
            reason: format!("{mnemonic} expects {n} operand(s), found {}", tokens.len()),
        });
    }
    Ok(tokens)
}

fn parse_instruction(rest: &str, line: usize) -> Result<Instruction, AssemblyError> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let mnemonic = parts.next().unwrap_or("").to_ascii_uppercase();
    let operand_text = parts.next().unwrap_or("");
    let tokens = split_operands(operand_text);

    Ok(match mnemonic.as_str() {
        "LDI" => {
            let t = expect_operands(&tokens, 2, "LDI", line)?;
            Instruction::Ldi { r: reg(&t[0], line)?, imm: imm_operand(&t[1], line)? }
        }
        "LDI16" => {
            let mut idx = 0;
            let (hi, lo) = reg_pair(&tokens, &mut idx, line)?;
            let imm_tok = tokens.get(idx).ok_or_else(|| AssemblyError::StructuralError {
                line,
                reason: "LDI16 expects a 16-bit immediate".to_string(),
            })?;
            if idx + 1 != tokens.len() {
                return Err(AssemblyError::StructuralError {
                    line,
                    reason: format!("LDI16 expects 2 operands, found {}", tokens.len() - idx + 1),
                });
            }
            Instruction::Ldi16 { hi, lo, imm: addr_operand(imm_tok, line)? }
        }
        "MOV" => {
            let t = expect_operands(&tokens, 2, "MOV", line)?;
            Instruction::Mov { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "LDM" => {
            let t = expect_operands(&tokens, 2, "LDM", line)?;
            Instruction::Ldm { r: reg(&t[0], line)?, addr: addr_operand(&t[1], line)? }
        }
        "STM" => {
            let t = expect_operands(&tokens, 2, "STM", line)?;
            Instruction::Stm { addr: addr_operand(&t[0], line)?, r: reg(&t[1], line)? }
        }
        "LDR" => {
            let t = expect_operands(&tokens, 3, "LDR", line)?;
            Instruction::Ldr { r: reg(&t[0], line)?, hi: reg(&t[1], line)?, lo: reg(&t[2], line)? }
        }
        "STR" => {
            let t = expect_operands(&tokens, 3, "STR", line)?;
            Instruction::Str { hi: reg(&t[0], line)?, lo: reg(&t[1], line)?, r: reg(&t[2], line)? }
        }
        "ADD" => {
            let t = expect_operands(&tokens, 2, "ADD", line)?;
            Instruction::Add { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "ADC" => {
            let t = expect_operands(&tokens, 2, "ADC", line)?;
            Instruction::Adc { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "SUB" => {
            let t = expect_operands(&tokens, 2, "SUB", line)?;
            Instruction::Sub { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "SBC" => {
            let t = expect_operands(&tokens, 2, "SBC", line)?;
            Instruction::Sbc { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "INC" => {
            let t = expect_operands(&tokens, 1, "INC", line)?;
            Instruction::Inc { r: reg(&t[0], line)? }
        }
        "DEC" => {
            let t = expect_operands(&tokens, 1, "DEC", line)?;
            Instruction::Dec { r: reg(&t[0], line)? }
        }
        "CMP" => {
            let t = expect_operands(&tokens, 2, "CMP", line)?;
            Instruction::Cmp { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "AND" => {
            let t = expect_operands(&tokens, 2, "AND", line)?;
            Instruction::And { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "OR" => {
            let t = expect_operands(&tokens, 2, "OR", line)?;
            Instruction::Or { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "XOR" => {
            let t = expect_operands(&tokens, 2, "XOR", line)?;
            Instruction::Xor { r1: reg(&t[0], line)?, r2: reg(&t[1], line)? }
        }
        "NOT" => {
            let t = expect_operands(&tokens, 1, "NOT", line)?;
            Instruction::Not { r: reg(&t[0], line)? }
        }
        "SHL" => {
            let t = expect_operands(&tokens, 1, "SHL", line)?;
            Instruction::Shl { r: reg(&t[0], line)? }
        }
        "SHR" => {
            let t = expect_operands(&tokens, 1, "SHR", line)?;
            Instruction::Shr { r: reg(&t[0], line)? }
        }
        "JMP" => Instruction::Jmp(addr_operand(&expect_operands(&tokens, 1, "JMP", line)?[0], line)?),
        "JZ" => Instruction::Jz(addr_operand(&expect_operands(&tokens, 1, "JZ", line)?[0], line)?),
        "JNZ" => Instruction::Jnz(addr_operand(&expect_operands(&tokens, 1, "JNZ", line)?[0], line)?),
        "JC" => Instruction::Jc(addr_operand(&expect_operands(&tokens, 1, "JC", line)?[0], line)?),
        "JNC" => Instruction::Jnc(addr_operand(&expect_operands(&tokens, 1, "JNC", line)?[0], line)?),
        "PUSH" => {
            let t = expect_operands(&tokens, 1, "PUSH", line)?;
            Instruction::Push { r: reg(&t[0], line)? }
        }
        "POP" => {
            let t = expect_operands(&tokens, 1, "POP", line)?;
            Instruction::Pop { r: reg(&t[0], line)? }
        }
        "PUSH16" => {
            let mut idx = 0;
            let (hi, lo) = reg_pair(&tokens, &mut idx, line)?;
            if idx != tokens.len() {
                return Err(AssemblyError::StructuralError {
                    line,
                    reason: "PUSH16 expects exactly one register pair".to_string(),
                });
            }
            Instruction::Push16 { hi, lo }
        }
        "POP16" => {
            let mut idx = 0;
            let (hi, lo) = reg_pair(&tokens, &mut idx, line)?;
            if idx != tokens.len() {
                return Err(AssemblyError::StructuralError {
                    line,
                    reason: "POP16 expects exactly one register pair".to_string(),
                });
            }
            Instruction::Pop16 { hi, lo }
        }
        "CALL" => Instruction::Call(addr_operand(&expect_operands(&tokens, 1, "CALL", line)?[0], line)?),
        "RET" => {
            expect_operands(&tokens, 0, "RET", line)?;
            Instruction::Ret
        }
        "IN" => {
            let t = expect_operands(&tokens, 2, "IN", line)?;
            Instruction::In { r: reg(&t[0], line)?, port: imm_operand(&t[1], line)? }
        }
        "OUT" => {
            let t = expect_operands(&tokens, 2, "OUT", line)?;
            Instruction::Out { port: imm_operand(&t[0], line)?, r: reg(&t[1], line)? }
        }
        "HALT" => {
            expect_operands(&tokens, 0, "HALT", line)?;
            Instruction::Halt
        }
        other => {
            return Err(AssemblyError::StructuralError {
                line,
                reason: format!("unknown mnemonic '{other}'"),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ldi() {
        let lines = parse_source("LDI A, 10\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].content,
            Some(LineContent::Instr(Instruction::Ldi { r: Register(0), imm: ImmOperand::Literal(10) }))
        );
    }

    #[test]
    fn parses_label_and_jump() {
        let lines = parse_source("L: DEC A\nJNZ L\n").unwrap();
        assert_eq!(lines[0].label.as_deref(), Some("L"));
        assert_eq!(lines[1].content, Some(LineContent::Instr(Instruction::Jnz(AddrOperand::Label("L".to_string())))));
    }

    #[test]
    fn parses_register_pair_as_one_token() {
        let lines = parse_source("PUSH16 AB\n").unwrap();
        assert_eq!(lines[0].content, Some(LineContent::Instr(Instruction::Push16 { hi: Register(0), lo: Register(1) })));
    }

    #[test]
    fn parses_register_pair_as_two_tokens() {
        let lines = parse_source("PUSH16 A, B\n").unwrap();
        assert_eq!(lines[0].content, Some(LineContent::Instr(Instruction::Push16 { hi: Register(0), lo: Register(1) })));
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let err = parse_source("FROB A\n").unwrap_err();
        assert!(matches!(err, AssemblyError::StructuralError { .. }));
    }

    #[test]
    fn parses_data_directive_with_label() {
        let lines = parse_source("$ 1 2 my_label\n").unwrap();
        assert_eq!(
            lines[0].content,
            Some(LineContent::Data(Directive {
                values: vec![DataToken::Literal(1), DataToken::Literal(2), DataToken::Label("my_label".to_string())]
            }))
        );
    }
}
