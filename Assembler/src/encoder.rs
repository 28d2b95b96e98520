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

use crate::ast::{AddrOperand, DataToken, Directive, ImmOperand, Instruction, LineContent};
use crate::errors::AssemblyError;
use crate::symbol_table::{self, SymbolTable};
use isa::{
    ADC as ADC_OPCODE, ADD as ADD_OPCODE, AND as AND_OPCODE, CALL as CALL_OPCODE, CMP as CMP_OPCODE, DEC as DEC_OPCODE,
    HALT as HALT_OPCODE, IN as IN_OPCODE, INC as INC_OPCODE, JC as JC_OPCODE, JMP as JMP_OPCODE, JNC as JNC_OPCODE,
    JNZ as JNZ_OPCODE, JZ as JZ_OPCODE, LDI as LDI_OPCODE, LDI16 as LDI16_OPCODE, LDM as LDM_OPCODE, LDR as LDR_OPCODE,
    MOV as MOV_OPCODE, NOT as NOT_OPCODE, OR as OR_OPCODE, OUT as OUT_OPCODE, POP as POP_OPCODE, POP16 as POP16_OPCODE,
    PUSH as PUSH_OPCODE, PUSH16 as PUSH16_OPCODE, RET as RET_OPCODE, SBC as SBC_OPCODE, SHL as SHL_OPCODE,
    SHR as SHR_OPCODE, STM as STM_OPCODE, STR as STR_OPCODE, SUB as SUB_OPCODE, XOR as XOR_OPCODE,
};

/// Width a single data-directive token occupies: one byte when it fits an
/// unsigned (or single-byte two's-complement) range, two bytes LO,HI
/// otherwise. Labels always take two bytes. See DESIGN.md for why negative
/// literals are allowed down to -128 in the one-byte form.
fn data_token_width(tok: &DataToken) -> usize {
    match tok {
        DataToken::Label(_) => 2,
        DataToken::Literal(n) => {
            if (-128..=0xFF).contains(n) {
                1
            } else {
                2
            }
        }
    }
}

fn encode_data_token(tok: &DataToken, symbols: &SymbolTable, line: usize, out: &mut Vec<u8>) -> Result<(), AssemblyError> {
    match tok {
        DataToken::Label(name) => {
            let addr = symbol_table::resolve(symbols, name, line)?;
            out.push((addr & 0xFF) as u8);
            out.push((addr >> 8) as u8);
        }
        DataToken::Literal(n) => {
            if data_token_width(tok) == 1 {
                out.push(*n as u8);
            } else {
                let v = *n as i64 as u16;
                out.push((v & 0xFF) as u8);
                out.push((v >> 8) as u8);
            }
        }
    }
    Ok(())
}

fn directive_size(d: &Directive) -> usize {
    d.values.iter().map(data_token_width).sum()
}

/// Pure function mirrored between pass 1 (length only) and pass 2 (bytes) so
/// the assembler's length-determinism invariant holds by construction.
pub fn instruction_size(content: &LineContent) -> usize {
    match content {
        LineContent::Data(d) => directive_size(d),
        LineContent::Instr(instr) => match instr {
            Instruction::Ldi { .. } => 3,
            Instruction::Ldi16 { .. } => 5,
            Instruction::Mov { .. } => 3,
            Instruction::Ldm { .. } => 4,
            Instruction::Stm { .. } => 4,
            Instruction::Ldr { .. } => 4,
            Instruction::Str { .. } => 4,
            Instruction::Add { .. }
            | Instruction::Adc { .. }
            | Instruction::Sub { .. }
            | Instruction::Sbc { .. }
            | Instruction::Cmp { .. }
            | Instruction::And { .. }
            | Instruction::Or { .. }
            | Instruction::Xor { .. } => 3,
            Instruction::Inc { .. } | Instruction::Dec { .. } | Instruction::Not { .. } | Instruction::Shl { .. } | Instruction::Shr { .. } => 2,
            Instruction::Jmp(_) | Instruction::Jz(_) | Instruction::Jnz(_) | Instruction::Jc(_) | Instruction::Jnc(_) => 3,
            Instruction::Push { .. } | Instruction::Pop { .. } => 2,
            Instruction::Push16 { .. } | Instruction::Pop16 { .. } => 3,
            Instruction::Call(_) => 3,
            Instruction::Ret => 1,
            Instruction::In { .. } | Instruction::Out { .. } => 3,
            Instruction::Halt => 1,
        },
    }
}

fn resolve_addr(op: &AddrOperand, symbols: &SymbolTable, line: usize) -> Result<u16, AssemblyError> {
    match op {
        AddrOperand::Literal(v) => Ok(*v),
        AddrOperand::Label(name) => symbol_table::resolve(symbols, name, line),
    }
}

fn resolve_imm(op: &ImmOperand, symbols: &SymbolTable, line: usize) -> Result<u8, AssemblyError> {
    match op {
        ImmOperand::Literal(v) => Ok(*v),
        ImmOperand::Label(name) => {
            let addr = symbol_table::resolve(symbols, name, line)?;
            if addr > 0xFF {
                return Err(AssemblyError::SemanticError {
                    line,
                    reason: format!("label '{name}' resolves to {addr:#06x}, out of range for an 8-bit operand"),
                });
            }
            Ok(addr as u8)
        }
    }
}

fn push_addr16(out: &mut Vec<u8>, addr: u16) {
    out.push((addr & 0xFF) as u8);
    out.push((addr >> 8) as u8);
}

/// Pass 2: encodes one line's content to bytes, given the fully-built symbol
/// table. Every arm's byte count matches `instruction_size` for the same
/// content, by construction.
pub fn encode(content: &LineContent, symbols: &SymbolTable, line: usize) -> Result<Vec<u8>, AssemblyError> {
    let mut out = Vec::with_capacity(instruction_size(content));
    match content {
        LineContent::Data(d) => {
            for tok in &d.values {
                encode_data_token(tok, symbols, line, &mut out)?;
            }
        }
        LineContent::Instr(instr) => match instr {
            Instruction::Ldi { r, imm } => {
                out.push(LDI_OPCODE);
                out.push(r.index());
                out.push(resolve_imm(imm, symbols, line)?);
            }
            Instruction::Ldi16 { hi, lo, imm } => {
                out.push(LDI16_OPCODE);
                out.push(hi.index());
                out.push(lo.index());
                let addr = resolve_addr(imm, symbols, line)?;
                push_addr16(&mut out, addr);
            }
            Instruction::Mov { r1, r2 } => {
                out.push(MOV_OPCODE);
                out.push(r1.index());
                out.push(r2.index());
            }
            Instruction::Ldm { r, addr } => {
                out.push(LDM_OPCODE);
                out.push(r.index());
                push_addr16(&mut out, resolve_addr(addr, symbols, line)?);
            }
            Instruction::Stm { addr, r } => {
                out.push(STM_OPCODE);
                push_addr16(&mut out, resolve_addr(addr, symbols, line)?);
                out.push(r.index());
            }
            Instruction::Ldr { r, hi, lo } => {
                out.push(LDR_OPCODE);
                out.push(r.index());
                out.push(hi.index());
                out.push(lo.index());
            }
            Instruction::Str { hi, lo, r } => {
                out.push(STR_OPCODE);
                out.push(hi.index());
                out.push(lo.index());
                out.push(r.index());
            }
            Instruction::Add { r1, r2 } => encode_rr(&mut out, ADD_OPCODE, *r1, *r2),
            Instruction::Adc { r1, r2 } => encode_rr(&mut out, ADC_OPCODE, *r1, *r2),
            Instruction::Sub { r1, r2 } => encode_rr(&mut out, SUB_OPCODE, *r1, *r2),
            Instruction::Sbc { r1, r2 } => encode_rr(&mut out, SBC_OPCODE, *r1, *r2),
            Instruction::Cmp { r1, r2 } => encode_rr(&mut out, CMP_OPCODE, *r1, *r2),
            Instruction::And { r1, r2 } => encode_rr(&mut out, AND_OPCODE, *r1, *r2),
            Instruction::Or { r1, r2 } => encode_rr(&mut out, OR_OPCODE, *r1, *r2),
            Instruction::Xor { r1, r2 } => encode_rr(&mut out, XOR_OPCODE, *r1, *r2),
            Instruction::Inc { r } => encode_r(&mut out, INC_OPCODE, *r),
            Instruction::Dec { r } => encode_r(&mut out, DEC_OPCODE, *r),
            Instruction::Not { r } => encode_r(&mut out, NOT_OPCODE, *r),
            Instruction::Shl { r } => encode_r(&mut out, SHL_OPCODE, *r),
            Instruction::Shr { r } => encode_r(&mut out, SHR_OPCODE, *r),
            Instruction::Jmp(a) => encode_jump(&mut out, JMP_OPCODE, a, symbols, line)?,
            Instruction::Jz(a) => encode_jump(&mut out, JZ_OPCODE, a, symbols, line)?,
            Instruction::Jnz(a) => encode_jump(&mut out, JNZ_OPCODE, a, symbols, line)?,
            Instruction::Jc(a) => encode_jump(&mut out, JC_OPCODE, a, symbols, line)?,
            Instruction::Jnc(a) => encode_jump(&mut out, JNC_OPCODE, a, symbols, line)?,
            Instruction::Push { r } => encode_r(&mut out, PUSH_OPCODE, *r),
            Instruction::Pop { r } => encode_r(&mut out, POP_OPCODE, *r),
            Instruction::Push16 { hi, lo } => {
                out.push(PUSH16_OPCODE);
                out.push(hi.index());
                out.push(lo.index());
            }
            Instruction::Pop16 { hi, lo } => {
                out.push(POP16_OPCODE);
                out.push(hi.index());
                out.push(lo.index());
            }
            Instruction::Call(a) => encode_jump(&mut out, CALL_OPCODE, a, symbols, line)?,
            Instruction::Ret => out.push(RET_OPCODE),
            Instruction::In { r, port } => {
                out.push(IN_OPCODE);
                out.push(r.index());
                out.push(resolve_imm(port, symbols, line)?);
            }
            Instruction::Out { port, r } => {
                out.push(OUT_OPCODE);
                out.push(resolve_imm(port, symbols, line)?);
                out.push(r.index());
            }
            Instruction::Halt => out.push(HALT_OPCODE),
        },
    }
    Ok(out)
}

fn encode_rr(out: &mut Vec<u8>, opcode: u8, r1: crate::ast::Register, r2: crate::ast::Register) {
    out.push(opcode);
    out.push(r1.index());
    out.push(r2.index());
}

fn encode_r(out: &mut Vec<u8>, opcode: u8, r: crate::ast::Register) {
    out.push(opcode);
    out.push(r.index());
}

fn encode_jump(out: &mut Vec<u8>, opcode: u8, addr: &AddrOperand, symbols: &SymbolTable, line: usize) -> Result<(), AssemblyError> {
    out.push(opcode);
    push_addr16(out, resolve_addr(addr, symbols, line)?);
    Ok(())
}
