use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },
    #[error("Unterminated character literal at line {line}, column {column}")]
    UnterminatedCharacter { line: usize, column: usize },
    #[error("Unterminated comment at line {line}, column {column}")]
    UnterminatedComment { line: usize, column: usize },
    #[error(
        "Indentation of {width} columns is not a multiple of {unit} at line {line}, column {column}"
    )]
    IrregularIndentation {
        width: usize,
        unit: usize,
        line: usize,
        column: usize,
    },
    #[error("Indentation jumps from level {from} to level {to} at line {line}, column {column}")]
    IndentationJump {
        from: usize,
        to: usize,
        line: usize,
        column: usize,
    },
}

pub type LexResult<T> = Result<T, LexError>;
