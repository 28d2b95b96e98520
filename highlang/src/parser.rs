//! Recursive-descent parser: walks the token stream from `lexer::tokenize`
//! and builds the tagged-sum-type AST in `ast`, one function per grammar
//! production.

use crate::ast::{BinOp, Expr, FuncDef, Param, Program, RelOp, Stmt, Target, Type};
use crate::errors::CompileError;
use crate::lexer::{Spanned, Token};

pub fn parse(tokens: Vec<Spanned>) -> Result<Program, CompileError> {
    Parser { tokens, pos: 0 }.parse_program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn here(&self) -> (usize, usize) {
        (self.tokens[self.pos].line, self.tokens[self.pos].col)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn syntax_err(&self, expected: &str) -> CompileError {
        let (line, col) = self.here();
        CompileError::Syntactic { line, col, expected: expected.to_string(), found: format!("{:?}", self.peek()) }
    }

    fn expect(&mut self, expected: &Token, label: &str) -> Result<(), CompileError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_err(label))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.syntax_err("identifier")),
        }
    }

    fn expect_type(&mut self) -> Result<Type, CompileError> {
        let ty = match self.peek() {
            Token::TypeU8 => Type::U8,
            Token::TypeU16 => Type::U16,
            Token::TypeChar => Type::Char,
            _ => return Err(self.syntax_err("a type (u8, u16, char)")),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut funcs = Vec::new();
        let mut top_level = Vec::new();
        while self.peek() != &Token::Eof {
            if self.peek() == &Token::Func {
                funcs.push(self.parse_funcdef()?);
            } else {
                top_level.push(self.parse_stmt()?);
            }
        }
        Ok(Program { funcs, top_level })
    }

    fn parse_funcdef(&mut self) -> Result<FuncDef, CompileError> {
        self.expect(&Token::Func, "'func'")?;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                let pname = self.expect_ident()?;
                self.expect(&Token::Colon, "':'")?;
                let ty = self.expect_type()?;
                params.push(Param { name: pname, ty });
                if self.peek() == &Token::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::LBrace, "'{'")?;
        let mut body = Vec::new();
        while self.peek() != &Token::RBrace {
            body.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace, "'}'")?;
        if !matches!(body.last(), Some(Stmt::Return(_))) {
            let (line, _) = self.here();
            return Err(CompileError::Semantic { line, reason: format!("function '{name}' must end with a return statement") });
        }
        Ok(FuncDef { name, params, body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        match self.peek() {
            Token::LetColon => self.parse_let(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::Out => self.parse_out(),
            Token::Halt => {
                self.advance();
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Halt)
            }
            Token::Return => {
                self.advance();
                let e = self.parse_operand_expr()?;
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Return(e))
            }
            Token::Call => {
                let e = self.parse_operand_expr()?;
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::ExprStmt(e))
            }
            _ => self.parse_assignment_like(),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&Token::LetColon, "'let:'")?;
        let name = self.expect_ident()?;
        self.expect(&Token::Eq, "'='")?;
        let ty = self.expect_type()?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::Let { name, ty })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while self.peek() != &Token::RBrace {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&Token::If, "'if'")?;
        self.expect(&Token::LParen, "'('")?;
        let cond = self.parse_condition()?;
        self.expect(&Token::RParen, "')'")?;
        let then_body = self.parse_block()?;
        let else_body = if self.peek() == &Token::Else {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If { cond, then_body, else_body })
    }

    fn parse_while(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&Token::While, "'while'")?;
        self.expect(&Token::LParen, "'('")?;
        let cond = self.parse_condition()?;
        self.expect(&Token::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_out(&mut self) -> Result<Stmt, CompileError> {
        self.expect(&Token::Out, "'out'")?;
        self.expect(&Token::LParen, "'('")?;
        let port = self.parse_operand_expr()?;
        self.expect(&Token::Comma, "','")?;
        let value = self.parse_operand_expr()?;
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Semicolon, "';'")?;
        Ok(Stmt::Out { port, value })
    }

    fn parse_condition(&mut self) -> Result<Expr, CompileError> {
        let left = self.parse_operand_expr()?;
        let rel = match self.peek() {
            Token::EqEq => RelOp::Eq,
            Token::NotEq => RelOp::Ne,
            Token::Lt => RelOp::Lt,
            Token::LtEq => RelOp::Le,
            Token::Gt => RelOp::Gt,
            Token::GtEq => RelOp::Ge,
            _ => return Err(self.syntax_err("a comparison operator")),
        };
        self.advance();
        let right = self.parse_operand_expr()?;
        Ok(Expr::Compare(rel, Box::new(left), Box::new(right)))
    }

    fn parse_assignment_like(&mut self) -> Result<Stmt, CompileError> {
        let target = self.parse_target()?;
        match self.peek() {
            Token::PlusPlus => {
                self.advance();
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Incr(target))
            }
            Token::MinusMinus => {
                self.advance();
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::Decr(target))
            }
            Token::Eq => {
                self.advance();
                let not_prefixed = if self.peek() == &Token::Not {
                    self.advance();
                    true
                } else {
                    false
                };
                let expr = self.parse_expr_maybe_binary()?;
                self.expect(&Token::Semicolon, "';'")?;
                let expr = if not_prefixed { Expr::Not(Box::new(expr)) } else { expr };
                Ok(Stmt::Assign(target, expr))
            }
            other => {
                let op = match other {
                    Token::PlusEq => BinOp::Add,
                    Token::MinusEq => BinOp::Sub,
                    Token::AndEq => BinOp::And,
                    Token::OrEq => BinOp::Or,
                    Token::XorEq => BinOp::Xor,
                    Token::ShlEq => BinOp::Shl,
                    Token::ShrEq => BinOp::Shr,
                    _ => return Err(self.syntax_err("an assignment operator")),
                };
                self.advance();
                let operand = self.parse_operand_expr()?;
                self.expect(&Token::Semicolon, "';'")?;
                Ok(Stmt::CompoundAssign(target, op, operand))
            }
        }
    }

    fn parse_target(&mut self) -> Result<Target, CompileError> {
        match self.peek().clone() {
            Token::Reg => {
                self.advance();
                self.expect(&Token::LBracket, "'['")?;
                let r = self.parse_register_letter()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Target::Reg(r))
            }
            Token::Mem => {
                self.advance();
                self.expect(&Token::LBracket, "'['")?;
                let addr = self.parse_addr()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Target::Mem(addr))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Target::Var(name))
            }
            _ => Err(self.syntax_err("an assignment target")),
        }
    }

    fn parse_register_letter(&mut self) -> Result<u8, CompileError> {
        match self.peek().clone() {
            Token::Ident(name) if name.len() == 1 => {
                let c = name.chars().next().unwrap().to_ascii_uppercase();
                if c.is_ascii_alphabetic() && (c as u8 - b'A') < 8 {
                    self.advance();
                    Ok(c as u8 - b'A')
                } else {
                    Err(self.syntax_err("a register letter A..H"))
                }
            }
            _ => Err(self.syntax_err("a register letter A..H")),
        }
    }

    fn parse_addr(&mut self) -> Result<u16, CompileError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(n as u16)
            }
            _ => Err(self.syntax_err("a numeric memory address")),
        }
    }

    /// `operand` per the grammar, with the one-level `operand BINOP operand`
    /// extension used by compound-assignment-equivalent expressions.
    fn parse_expr_maybe_binary(&mut self) -> Result<Expr, CompileError> {
        let left = self.parse_operand_expr()?;
        let op = match self.peek() {
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Amp => BinOp::And,
            Token::Pipe => BinOp::Or,
            Token::Caret => BinOp::Xor,
            Token::Shl => BinOp::Shl,
            Token::Shr => BinOp::Shr,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_operand_expr()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn parse_operand_expr(&mut self) -> Result<Expr, CompileError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::CharLit(c) => {
                self.advance();
                Ok(Expr::CharLit(c))
            }
            Token::Reg => {
                self.advance();
                self.expect(&Token::LBracket, "'['")?;
                let r = self.parse_register_letter()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Expr::Reg(r))
            }
            Token::Mem => {
                self.advance();
                self.expect(&Token::LBracket, "'['")?;
                let addr = self.parse_addr()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Expr::Mem(addr))
            }
            Token::In => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let inner = self.parse_operand_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::In(Box::new(inner)))
            }
            Token::Call => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(&Token::LParen, "'('")?;
                let mut args = Vec::new();
                if self.peek() != &Token::RParen {
                    loop {
                        args.push(self.parse_operand_expr()?);
                        if self.peek() == &Token::Comma {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::Call(name, args))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            _ => Err(self.syntax_err("a number, char literal, identifier, reg[..], mem[..], in(..) or call(..)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_src(src: &str) -> Program {
        parse(tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_s4_call_scenario() {
        let prog = parse_src("func inc(n:u8){ return n+1; } let: x=u8; x = call inc(41); halt;");
        assert_eq!(prog.funcs.len(), 1);
        assert_eq!(prog.funcs[0].name, "inc");
        assert_eq!(prog.top_level.len(), 3);
    }

    #[test]
    fn parses_s5_u16_compare_scenario() {
        let prog = parse_src(
            "let: a=u16; let: b=u16; a=300; b=256; if (a>b) { out(1,1); } else { out(1,0); }",
        );
        assert_eq!(prog.top_level.len(), 5);
        assert!(matches!(prog.top_level[4], Stmt::If { .. }));
    }

    #[test]
    fn requires_trailing_return_in_function() {
        let err = parse(tokenize("func f(){ halt; }").unwrap()).unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }
}
