use std::collections::VecDeque;

use crate::token::{Token, TokenKind};

/// Owning queue over the lexer's tokens with bounded lookahead.
pub struct TokenManager {
    tokens: VecDeque<Token>,
    last: Option<(usize, usize)>,
}

impl TokenManager {
    pub fn new(tokens: Vec<Token>) -> Self {
        let last = tokens.last().map(|token| (token.span.line, token.span.column));
        Self {
            tokens: tokens.into(),
            last,
        }
    }

    pub fn done(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Removes and returns the head only when it has the requested kind.
    pub fn match_and_remove(&mut self, kind: TokenKind) -> Option<Token> {
        if self.tokens.front()?.kind == kind {
            self.tokens.pop_front()
        } else {
            None
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Token `offset` positions ahead of the head (0 is the head).
    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(offset)
    }

    pub fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek(offset).map(|token| token.kind)
    }

    pub fn next_two_tokens_match(&self, first: TokenKind, second: TokenKind) -> bool {
        self.peek_kind(0) == Some(first) && self.peek_kind(1) == Some(second)
    }

    /// Line of the head, or of the final token once the queue is drained.
    pub fn current_line(&self) -> usize {
        self.position().0
    }

    pub fn current_column(&self) -> usize {
        self.position().1
    }

    fn position(&self) -> (usize, usize) {
        match self.tokens.front() {
            Some(token) => (token.span.line, token.span.column),
            None => self.last.unwrap_or((1, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    fn manager() -> TokenManager {
        TokenManager::new(vec![
            Token::with_text(TokenKind::Word, Span::new(1, 0), "x"),
            Token::new(TokenKind::Assign, Span::new(1, 2)),
            Token::with_text(TokenKind::Number, Span::new(1, 4), "1"),
        ])
    }

    #[test]
    fn removes_only_matching_head() {
        let mut tokens = manager();
        assert!(tokens.match_and_remove(TokenKind::Assign).is_none());
        let word = tokens
            .match_and_remove(TokenKind::Word)
            .expect("word should match");
        assert_eq!(word.text(), "x");
        assert_eq!(tokens.peek_kind(0), Some(TokenKind::Assign));
    }

    #[test]
    fn peeks_without_consuming() {
        let tokens = manager();
        assert!(tokens.next_two_tokens_match(TokenKind::Word, TokenKind::Assign));
        assert!(!tokens.next_two_tokens_match(TokenKind::Assign, TokenKind::Number));
        assert_eq!(tokens.peek(2).map(Token::text), Some("1"));
        assert!(tokens.peek(3).is_none());
        assert_eq!(tokens.current_column(), 0);
    }

    #[test]
    fn reports_last_position_once_drained() {
        let mut tokens = manager();
        tokens.match_and_remove(TokenKind::Word);
        tokens.match_and_remove(TokenKind::Assign);
        tokens.match_and_remove(TokenKind::Number);
        assert!(tokens.done());
        assert!(tokens.match_and_remove(TokenKind::Number).is_none());
        assert_eq!((tokens.current_line(), tokens.current_column()), (1, 4));

        let empty = TokenManager::new(Vec::new());
        assert!(empty.done());
        assert_eq!((empty.current_line(), empty.current_column()), (1, 0));
    }
}
