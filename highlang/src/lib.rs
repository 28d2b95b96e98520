//! HighLang: the typed, structured source language that compiles down to
//! `asm8` assembly text. `compile` is the single entry point used by both
//! the standalone `hlc` binary and the `oct8` driver.

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod scope;

pub use errors::CompileError;

pub fn compile(source: &str) -> Result<String, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    codegen::compile(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_function_call_round_trip_compiles() {
        let asm = compile("func inc(n:u8){ return n+1; } reg[A] = call inc(41); out(0, reg[A]); halt;").unwrap();
        assert!(asm.contains("inc:"));
        assert!(asm.contains("CALL inc"));
        assert!(asm.contains("RET"));
    }

    #[test]
    fn s5_u16_compare_compiles_hi_then_lo() {
        let asm = compile(
            "let: a=u16; let: b=u16; a=300; b=256; if (a>b) { out(1,1); } else { out(1,0); } halt;",
        )
        .unwrap();
        assert!(asm.contains("a_hi:"));
        assert!(asm.contains("a_lo:"));
        let cmp_count = asm.matches("CMP").count();
        assert!(cmp_count >= 2, "expected a HI compare and a LO compare");
    }

    #[test]
    fn every_char_map_glyph_round_trips_through_a_char_literal() {
        for code in 2u8..86 {
            let glyph = charmap::code_to_glyph(code);
            if glyph.chars().count() != 1 {
                continue;
            }
            let ch = glyph.chars().next().unwrap();
            let src = format!("reg[A] = '{ch}'; halt;");
            let asm = compile(&src).unwrap();
            assert!(asm.contains(&format!("LDI A, {code}")));
        }
    }

    #[test]
    fn while_loop_compiles_with_back_edge() {
        let asm = compile("let: i=u8; i=0; while (i<5) { i++; } halt;").unwrap();
        assert!(asm.contains("while_begin_0:"));
        assert!(asm.contains("JMP while_begin_0"));
    }

    #[test]
    fn undeclared_function_call_is_a_semantic_error() {
        let err = compile("reg[A] = call missing(1); halt;").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn out_with_non_constant_port_is_rejected() {
        let err = compile("reg[A] = 1; out(reg[A], 1); halt;").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }
}
