use std::iter::Peekable;
use std::str::Chars;

/// Columns a tab advances the cursor by.
pub const TAB_WIDTH: usize = 4;

/// Sentinel returned by `peek`/`advance` once the input is exhausted.
pub const END: char = '\0';

/// Forward-only character cursor over the source text with one character of
/// lookahead and line/column tracking.
pub struct TextManager<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> TextManager<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    pub fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    pub fn peek(&mut self) -> char {
        self.chars.peek().copied().unwrap_or(END)
    }

    pub fn advance(&mut self) -> char {
        let Some(c) = self.chars.next() else {
            return END;
        };
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\t' => self.column += TAB_WIDTH,
            _ => self.column += 1,
        }
        c
    }

    /// Position of the next character to be consumed.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}
