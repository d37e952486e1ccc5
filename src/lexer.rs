use tracing::debug;

use crate::token::{Span, Token, TokenKind};

mod error;
mod text;

pub use error::{LexError, LexResult};
pub use text::TextManager;
use text::TAB_WIDTH;

/// Columns of leading whitespace that make up one indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Single-pass scanner producing the flat token stream, including the
/// synthesized NEWLINE/INDENT/DEDENT structure tokens.
pub struct Lexer<'a> {
    text: TextManager<'a>,
    tokens: Vec<Token>,
    depth: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            text: TextManager::new(input),
            tokens: Vec::new(),
            depth: 0,
            at_line_start: true,
        }
    }

    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        while !self.text.at_end() {
            if self.at_line_start {
                self.at_line_start = false;
                self.read_indentation()?;
                continue;
            }
            self.next_token()?;
        }

        // Unwind whatever is still open so every INDENT has its DEDENT.
        let span = self.here();
        while self.depth > 0 {
            self.depth -= 1;
            self.tokens.push(Token::new(TokenKind::Dedent, span));
        }
        Ok(self.tokens)
    }

    fn next_token(&mut self) -> LexResult<()> {
        let span = self.here();
        let c = self.text.advance();
        match c {
            '\n' => {
                self.tokens.push(Token::new(TokenKind::Newline, span));
                self.at_line_start = true;
            }
            ' ' | '\t' | '\r' => {}
            '{' => self.skip_comment(span)?,
            '"' => self.read_string(span)?,
            '\'' => self.read_character(span)?,
            '&' => self.read_doubled('&', TokenKind::And, span)?,
            '|' => self.read_doubled('|', TokenKind::Or, span)?,
            '!' => {
                if self.text.peek() == '=' {
                    self.text.advance();
                    self.tokens.push(Token::new(TokenKind::NotEqual, span));
                } else {
                    return Err(unexpected('!', span));
                }
            }
            c if c.is_alphabetic() => self.read_word(c, span),
            c if c.is_ascii_digit() => self.read_number(c, span),
            c => match TokenKind::punctuation(c) {
                Some(kind) => self.read_punctuation(kind, span),
                None => return Err(unexpected(c, span)),
            },
        }
        Ok(())
    }

    fn read_indentation(&mut self) -> LexResult<()> {
        let span = self.here();
        let mut width = 0;
        loop {
            match self.text.peek() {
                ' ' => width += 1,
                '\t' => width += TAB_WIDTH,
                _ => break,
            }
            self.text.advance();
        }

        while self.text.peek() == '{' {
            let comment_span = self.here();
            self.text.advance();
            self.skip_comment(comment_span)?;
            while matches!(self.text.peek(), ' ' | '\t') {
                self.text.advance();
            }
        }

        // Blank and comment-only lines never change the depth.
        if self.text.at_end() || matches!(self.text.peek(), '\n' | '\r') {
            return Ok(());
        }

        if width % INDENT_WIDTH != 0 {
            return Err(LexError::IrregularIndentation {
                width,
                unit: INDENT_WIDTH,
                line: span.line,
                column: span.column,
            });
        }
        self.set_depth(width / INDENT_WIDTH, span)
    }

    fn set_depth(&mut self, level: usize, span: Span) -> LexResult<()> {
        if level > self.depth {
            if level > self.depth + 1 {
                return Err(LexError::IndentationJump {
                    from: self.depth,
                    to: level,
                    line: span.line,
                    column: span.column,
                });
            }
            self.depth = level;
            self.tokens.push(Token::new(TokenKind::Indent, span));
        } else {
            while self.depth > level {
                self.depth -= 1;
                self.tokens.push(Token::new(TokenKind::Dedent, span));
            }
        }
        Ok(())
    }

    fn read_word(&mut self, first: char, span: Span) {
        let mut word = String::from(first);
        while self.text.peek().is_alphabetic() {
            word.push(self.text.advance());
        }
        let token = match TokenKind::keyword(&word) {
            Some(kind) => Token::new(kind, span),
            None => Token::with_text(TokenKind::Word, span, word),
        };
        self.tokens.push(token);
    }

    fn read_number(&mut self, first: char, span: Span) {
        let mut number = String::from(first);
        let mut seen_point = false;
        loop {
            let next = self.text.peek();
            if next.is_ascii_digit() {
                number.push(self.text.advance());
            } else if next == '.' && !seen_point {
                seen_point = true;
                number.push(self.text.advance());
            } else {
                break;
            }
        }
        self.tokens
            .push(Token::with_text(TokenKind::Number, span, number));
    }

    fn read_punctuation(&mut self, kind: TokenKind, span: Span) {
        let next = self.text.peek();
        let kind = match kind {
            TokenKind::Assign if next == '=' => TokenKind::Equal,
            TokenKind::LessThan if next == '=' => TokenKind::LessThanEqual,
            TokenKind::GreaterThan if next == '=' => TokenKind::GreaterThanEqual,
            TokenKind::Dot if next.is_ascii_digit() => {
                let mut number = String::from('.');
                while self.text.peek().is_ascii_digit() {
                    number.push(self.text.advance());
                }
                self.tokens
                    .push(Token::with_text(TokenKind::Number, span, number));
                return;
            }
            kind => {
                self.tokens.push(Token::new(kind, span));
                return;
            }
        };
        self.text.advance();
        self.tokens.push(Token::new(kind, span));
    }

    fn read_doubled(&mut self, c: char, kind: TokenKind, span: Span) -> LexResult<()> {
        if self.text.peek() != c {
            return Err(unexpected(c, span));
        }
        self.text.advance();
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    fn read_string(&mut self, span: Span) -> LexResult<()> {
        let mut value = String::new();
        loop {
            if self.text.at_end() {
                return Err(LexError::UnterminatedString {
                    line: span.line,
                    column: span.column,
                });
            }
            match self.text.advance() {
                '"' => break,
                '\\' => {
                    if self.text.at_end() {
                        continue;
                    }
                    let escaped = self.text.advance();
                    value.push(unescape(escaped));
                }
                c => value.push(c),
            }
        }
        self.tokens
            .push(Token::with_text(TokenKind::QuotedString, span, value));
        Ok(())
    }

    fn read_character(&mut self, span: Span) -> LexResult<()> {
        let unterminated = LexError::UnterminatedCharacter {
            line: span.line,
            column: span.column,
        };
        if self.text.at_end() {
            return Err(unterminated);
        }
        let value = match self.text.advance() {
            '\\' if !self.text.at_end() => unescape(self.text.advance()),
            '\\' | '\'' | '\n' => return Err(unterminated),
            c => c,
        };
        if self.text.peek() != '\'' {
            return Err(unterminated);
        }
        self.text.advance();
        self.tokens.push(Token::with_text(
            TokenKind::QuotedCharacter,
            span,
            value.to_string(),
        ));
        Ok(())
    }

    fn skip_comment(&mut self, span: Span) -> LexResult<()> {
        loop {
            if self.text.at_end() {
                return Err(LexError::UnterminatedComment {
                    line: span.line,
                    column: span.column,
                });
            }
            if self.text.advance() == '}' {
                return Ok(());
            }
        }
    }

    fn here(&self) -> Span {
        let (line, column) = self.text.position();
        Span::new(line, column)
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    }
}

fn unexpected(character: char, span: Span) -> LexError {
    LexError::UnexpectedCharacter {
        character,
        line: span.line,
        column: span.column,
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let tokens = Lexer::new(input).tokenize()?;
    debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}
