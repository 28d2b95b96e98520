use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Lexical error at {line}:{col}: unexpected character '{found}'")]
    Lexical { line: usize, col: usize, found: char },

    #[error("Syntax error at {line}:{col}: expected {expected}, found {found}")]
    Syntactic { line: usize, col: usize, expected: String, found: String },

    #[error("Semantic error on line {line}: {reason}")]
    Semantic { line: usize, reason: String },
}
