//! Lowers the AST to assembly text consumed by `asm8`. Generated mnemonics
//! and operand syntax follow `Assembler/src/parser.rs` exactly; the
//! generated return-address register pair is spelled `O, P` in the emitted
//! text and relies on the assembler's own I..P -> A..H aliasing to land it
//! on G/H.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::ast::{BinOp, Expr, FuncDef, Param, Program, RelOp, Stmt, Target, Type};
use crate::errors::CompileError;
use crate::scope::Scope;

pub fn compile(program: &Program) -> Result<String, CompileError> {
    let mut sigs = HashMap::new();
    for f in &program.funcs {
        for p in &f.params {
            if p.ty == Type::U16 {
                return Err(CompileError::Semantic { line: 0, reason: format!("function '{}': 16-bit parameters are not supported", f.name) });
            }
        }
        sigs.insert(f.name.clone(), f.params.clone());
    }

    let mut cg = Codegen { out: String::new(), label_counter: 0, data_labels: Vec::new(), sigs };
    let mut scope = Scope::global();

    for stmt in &program.top_level {
        cg.gen_stmt(&mut scope, stmt)?;
    }
    cg.emit("HALT", "");

    for f in &program.funcs {
        cg.gen_funcdef(&scope, f)?;
    }

    cg.emit_data_segment();
    Ok(cg.out)
}

struct Codegen {
    out: String,
    label_counter: usize,
    data_labels: Vec<String>,
    sigs: HashMap<String, Vec<Param>>,
}

const ACC: char = 'A';
const SCRATCH: char = 'B';
const RHS_HI: char = 'C';
const RHS_LO: char = 'D';
const PARAM_SCRATCH: char = 'E';

impl Codegen {
    fn new_label(&mut self, prefix: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("{prefix}_{n}")
    }

    fn emit(&mut self, mnemonic: &str, operands: &str) {
        if operands.is_empty() {
            let _ = writeln!(self.out, "{mnemonic}");
        } else {
            let _ = writeln!(self.out, "{mnemonic} {operands}");
        }
    }

    fn emit_label(&mut self, label: &str) {
        let _ = writeln!(self.out, "{label}:");
    }

    fn emit_data_segment(&mut self) {
        for label in std::mem::take(&mut self.data_labels) {
            self.emit_label(&label);
            self.emit("$", "0");
        }
    }

    fn gen_funcdef(&mut self, outer: &Scope, f: &FuncDef) -> Result<(), CompileError> {
        self.emit_label(&f.name);
        self.emit("POP16", "O, P");

        // Functions see the global frame as established after the top-level
        // statements ran, plus a fresh frame of their own for params/locals.
        let mut scope = outer.clone().enter_function(&f.name);
        for param in &f.params {
            scope.declare(&param.name, param.ty, 0)?;
            let label = scope.lookup_or_err(&param.name, 0)?.data_labels()[0].clone();
            self.data_labels.push(label.clone());
            self.emit("POP", &PARAM_SCRATCH.to_string());
            self.emit("STM", &format!("{label}, {PARAM_SCRATCH}"));
        }

        for stmt in &f.body {
            self.gen_stmt(&mut scope, stmt)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, scope: &mut Scope, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let { name, ty } => {
                scope.declare(name, *ty, 0)?;
                for label in scope.lookup_or_err(name, 0)?.data_labels() {
                    self.data_labels.push(label);
                }
                Ok(())
            }
            Stmt::Incr(t) => self.gen_incr_decr(scope, t, "INC"),
            Stmt::Decr(t) => self.gen_incr_decr(scope, t, "DEC"),
            Stmt::Assign(t, e) => self.gen_assign(scope, t, e),
            Stmt::CompoundAssign(t, op, e) => {
                let current = target_as_expr(scope, t, 0)?;
                let combined = Expr::Binary(*op, Box::new(current), Box::new(e.clone()));
                self.gen_assign(scope, t, &combined)
            }
            Stmt::If { cond, then_body, else_body } => self.gen_if(scope, cond, then_body, else_body),
            Stmt::While { cond, body } => self.gen_while(scope, cond, body),
            Stmt::Out { port, value } => {
                let Expr::Number(n) = port else {
                    return Err(CompileError::Semantic { line: 0, reason: "out() port must be a constant number".to_string() });
                };
                self.eval_u8_into(scope, ACC, value)?;
                self.emit("OUT", &format!("{n}, {ACC}"));
                Ok(())
            }
            Stmt::Halt => {
                self.emit("HALT", "");
                Ok(())
            }
            Stmt::Return(e) => {
                self.eval_u8_into(scope, ACC, e)?;
                self.emit("PUSH", &ACC.to_string());
                self.emit("PUSH16", "O, P");
                self.emit("RET", "");
                Ok(())
            }
            Stmt::ExprStmt(e) => self.eval_u8_into(scope, ACC, e),
        }
    }

    fn gen_incr_decr(&mut self, scope: &mut Scope, target: &Target, op: &str) -> Result<(), CompileError> {
        match target {
            Target::Reg(r) => {
                self.emit(op, &reg_letter(*r).to_string());
                Ok(())
            }
            Target::Mem(addr) => {
                self.emit("LDM", &format!("{ACC}, {addr}"));
                self.emit(op, &ACC.to_string());
                self.emit("STM", &format!("{addr}, {ACC}"));
                Ok(())
            }
            Target::Var(name) => {
                let info = scope.lookup_or_err(name, 0)?;
                if info.ty == Type::U16 {
                    return Err(CompileError::Semantic { line: 0, reason: format!("'{name}': 16-bit increment/decrement is not supported") });
                }
                let label = info.data_labels()[0].clone();
                self.emit("LDM", &format!("{ACC}, {label}"));
                self.emit(op, &ACC.to_string());
                self.emit("STM", &format!("{label}, {ACC}"));
                Ok(())
            }
        }
    }

    fn gen_assign(&mut self, scope: &mut Scope, target: &Target, expr: &Expr) -> Result<(), CompileError> {
        match target {
            Target::Reg(r) => self.eval_u8_into(scope, reg_letter(*r), expr),
            Target::Mem(addr) => {
                self.eval_u8_into(scope, ACC, expr)?;
                self.emit("STM", &format!("{addr}, {ACC}"));
                Ok(())
            }
            Target::Var(name) => {
                let ty = scope.lookup_or_err(name, 0)?.ty;
                match ty {
                    Type::U8 | Type::Char => {
                        let label = scope.lookup_or_err(name, 0)?.data_labels()[0].clone();
                        self.eval_u8_into(scope, ACC, expr)?;
                        self.emit("STM", &format!("{label}, {ACC}"));
                    }
                    Type::U16 => {
                        let labels = scope.lookup_or_err(name, 0)?.data_labels();
                        self.eval_u16_into(scope, ACC, SCRATCH, expr)?;
                        self.emit("STM", &format!("{}, {ACC}", labels[0]));
                        self.emit("STM", &format!("{}, {SCRATCH}", labels[1]));
                    }
                }
                Ok(())
            }
        }
    }

    fn expr_is_u16(&self, scope: &Scope, e: &Expr) -> bool {
        matches!(e, Expr::Ident(name) if scope.lookup(name).map(|v| v.ty) == Some(Type::U16))
    }

    /// `if`/`while` bodies share their enclosing function's (or the global)
    /// frame rather than opening a fresh lexical frame: every HighLang
    /// variable is static storage regardless of the block it's declared in,
    /// so a separate frame would only complicate name mangling for no
    /// observable benefit.
    fn gen_if(&mut self, scope: &mut Scope, cond: &Expr, then_body: &[Stmt], else_body: &Option<Vec<Stmt>>) -> Result<(), CompileError> {
        let else_label = self.new_label("else");
        self.gen_condition(scope, cond, &else_label)?;
        for stmt in then_body {
            self.gen_stmt(scope, stmt)?;
        }
        match else_body {
            Some(stmts) => {
                let endif_label = self.new_label("endif");
                self.emit("JMP", &endif_label);
                self.emit_label(&else_label);
                for stmt in stmts {
                    self.gen_stmt(scope, stmt)?;
                }
                self.emit_label(&endif_label);
            }
            None => self.emit_label(&else_label),
        }
        Ok(())
    }

    fn gen_while(&mut self, scope: &mut Scope, cond: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        let begin_label = self.new_label("while_begin");
        let end_label = self.new_label("while_end");
        self.emit_label(&begin_label);
        self.gen_condition(scope, cond, &end_label)?;
        for stmt in body {
            self.gen_stmt(scope, stmt)?;
        }
        self.emit("JMP", &begin_label);
        self.emit_label(&end_label);
        Ok(())
    }

    /// Emits code that jumps to `false_label` when `cond` does not hold,
    /// and falls through when it does.
    fn gen_condition(&mut self, scope: &Scope, cond: &Expr, false_label: &str) -> Result<(), CompileError> {
        let Expr::Compare(rel, left, right) = cond else {
            return Err(CompileError::Semantic { line: 0, reason: "if/while condition must be a comparison".to_string() });
        };
        if self.expr_is_u16(scope, left) || self.expr_is_u16(scope, right) {
            self.eval_u16_into(scope, ACC, SCRATCH, left)?;
            self.eval_u16_into(scope, RHS_HI, RHS_LO, right)?;
            let hi_decided = self.new_label("hi_decided");
            self.emit("CMP", &format!("{ACC}, {RHS_HI}"));
            self.emit("JNZ", &hi_decided);
            self.emit("CMP", &format!("{SCRATCH}, {RHS_LO}"));
            self.emit_label(&hi_decided);
        } else {
            self.eval_u8_into(scope, ACC, left)?;
            self.eval_u8_into(scope, SCRATCH, right)?;
            self.emit("CMP", &format!("{ACC}, {SCRATCH}"));
        }
        self.emit_skip_on_false(*rel, false_label);
        Ok(())
    }

    fn emit_skip_on_false(&mut self, rel: RelOp, false_label: &str) {
        match rel {
            RelOp::Eq => self.emit("JNZ", false_label),
            RelOp::Ne => self.emit("JZ", false_label),
            RelOp::Lt => self.emit("JNC", false_label),
            RelOp::Ge => self.emit("JC", false_label),
            RelOp::Gt => {
                self.emit("JC", false_label);
                self.emit("JZ", false_label);
            }
            RelOp::Le => {
                let true_label = self.new_label("le_true");
                self.emit("JC", &true_label);
                self.emit("JZ", &true_label);
                self.emit("JMP", false_label);
                self.emit_label(&true_label);
            }
        }
    }

    fn eval_u8_into(&mut self, scope: &Scope, dest: char, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(n) => {
                if !(0..=0xFF).contains(n) {
                    return Err(CompileError::Semantic { line: 0, reason: format!("{n} does not fit in 8 bits") });
                }
                self.emit("LDI", &format!("{dest}, {n}"));
                Ok(())
            }
            Expr::CharLit(c) => {
                let code = charmap::glyph_to_code(&c.to_string())
                    .map_err(|e| CompileError::Semantic { line: 0, reason: e.to_string() })?;
                self.emit("LDI", &format!("{dest}, {code}"));
                Ok(())
            }
            Expr::Ident(name) => {
                let info = scope.lookup_or_err(name, 0)?;
                if info.ty == Type::U16 {
                    return Err(CompileError::Semantic { line: 0, reason: format!("'{name}' is 16-bit, expected an 8-bit value") });
                }
                let label = info.data_labels()[0].clone();
                self.emit("LDM", &format!("{dest}, {label}"));
                Ok(())
            }
            Expr::Reg(r) => {
                let src = reg_letter(*r);
                if src != dest {
                    self.emit("MOV", &format!("{dest}, {src}"));
                }
                Ok(())
            }
            Expr::Mem(addr) => {
                self.emit("LDM", &format!("{dest}, {addr}"));
                Ok(())
            }
            Expr::In(inner) => {
                let Expr::Number(port) = inner.as_ref() else {
                    return Err(CompileError::Semantic { line: 0, reason: "in(..) port must be a constant number".to_string() });
                };
                self.emit("IN", &format!("{dest}, {port}"));
                Ok(())
            }
            Expr::Call(name, args) => self.gen_call(scope, dest, name, args),
            Expr::Not(inner) => {
                self.eval_u8_into(scope, dest, inner)?;
                self.emit("NOT", &dest.to_string());
                Ok(())
            }
            Expr::Binary(op, l, r) => self.gen_binary(scope, dest, *op, l, r),
            Expr::Compare(..) => Err(CompileError::Semantic { line: 0, reason: "a comparison may only appear in an if/while condition".to_string() }),
        }
    }

    fn gen_call(&mut self, scope: &Scope, dest: char, name: &str, args: &[Expr]) -> Result<(), CompileError> {
        let params = self.sigs.get(name).cloned().ok_or_else(|| CompileError::Semantic { line: 0, reason: format!("call to undeclared function '{name}'") })?;
        if params.len() != args.len() {
            return Err(CompileError::Semantic { line: 0, reason: format!("'{name}' expects {} argument(s), found {}", params.len(), args.len()) });
        }
        for arg in args.iter().rev() {
            self.eval_u8_into(scope, ACC, arg)?;
            self.emit("PUSH", &ACC.to_string());
        }
        self.emit("CALL", name);
        self.emit("POP", &ACC.to_string());
        if dest != ACC {
            self.emit("MOV", &format!("{dest}, {ACC}"));
        }
        Ok(())
    }

    fn gen_binary(&mut self, scope: &Scope, dest: char, op: BinOp, l: &Expr, r: &Expr) -> Result<(), CompileError> {
        if let BinOp::Shl | BinOp::Shr = op {
            let Expr::Number(shift) = r else {
                return Err(CompileError::Semantic { line: 0, reason: "shift amount must be a constant number".to_string() });
            };
            if !(0..=7).contains(shift) {
                return Err(CompileError::Semantic { line: 0, reason: "shift amount must be between 0 and 7".to_string() });
            }
            self.eval_u8_into(scope, dest, l)?;
            let mnemonic = if op == BinOp::Shl { "SHL" } else { "SHR" };
            for _ in 0..*shift {
                self.emit(mnemonic, &dest.to_string());
            }
            return Ok(());
        }

        let rhs_reg = if dest == SCRATCH { ACC } else { SCRATCH };
        self.eval_u8_into(scope, dest, l)?;
        self.eval_u8_into(scope, rhs_reg, r)?;
        let mnemonic = match op {
            BinOp::Add => "ADD",
            BinOp::Sub => "SUB",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Xor => "XOR",
            BinOp::Shl | BinOp::Shr => unreachable!("handled above"),
        };
        self.emit(mnemonic, &format!("{dest}, {rhs_reg}"));
        Ok(())
    }

    fn eval_u16_into(&mut self, scope: &Scope, hi: char, lo: char, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(n) => {
                if !(0..=0xFFFF).contains(n) {
                    return Err(CompileError::Semantic { line: 0, reason: format!("{n} does not fit in 16 bits") });
                }
                self.emit("LDI", &format!("{hi}, {}", (n >> 8) & 0xFF));
                self.emit("LDI", &format!("{lo}, {}", n & 0xFF));
                Ok(())
            }
            Expr::Ident(name) => {
                let info = scope.lookup_or_err(name, 0)?;
                if info.ty != Type::U16 {
                    return Err(CompileError::Semantic { line: 0, reason: format!("'{name}' is 8-bit, expected a 16-bit value") });
                }
                let labels = info.data_labels();
                self.emit("LDM", &format!("{hi}, {}", labels[0]));
                self.emit("LDM", &format!("{lo}, {}", labels[1]));
                Ok(())
            }
            _ => Err(CompileError::Semantic { line: 0, reason: "only 16-bit literals and 16-bit variables are supported in this position".to_string() }),
        }
    }
}

fn reg_letter(index: u8) -> char {
    (b'A' + (index % 8)) as char
}

fn target_as_expr(scope: &Scope, target: &Target, line: usize) -> Result<Expr, CompileError> {
    match target {
        Target::Reg(r) => Ok(Expr::Reg(*r)),
        Target::Mem(addr) => Ok(Expr::Mem(*addr)),
        Target::Var(name) => {
            scope.lookup_or_err(name, line)?;
            Ok(Expr::Ident(name.clone()))
        }
    }
}
