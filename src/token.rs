use std::fmt;

/// Source position of a token: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    Newline,
    Indent,
    Dedent,

    // Operators
    Assign,           // =
    Equal,            // ==
    NotEqual,         // !=
    LessThan,         // <
    GreaterThan,      // >
    LessThanEqual,    // <=
    GreaterThanEqual, // >=
    Plus,             // +
    Minus,            // -
    Times,            // *
    Divide,           // /
    And,              // && / and
    Or,               // || / or

    // Delimiters
    LParen, // (
    RParen, // )
    Dot,    // .
    Comma,  // ,
    Colon,  // :

    // Keywords
    If,
    Else,
    Class,
    Interface,
    Accessor,
    Mutator,
    Loop,
    True,
    False,
    Shared,
    Construct,
    New,
    Private,
    Implements,

    // Literals and identifiers
    Word,
    Number,
    QuotedString,
    QuotedCharacter,
}

impl TokenKind {
    /// Keyword table: maps a scanned word to its keyword kind.
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "if" => Self::If,
            "else" => Self::Else,
            "class" => Self::Class,
            "interface" => Self::Interface,
            "accessor" => Self::Accessor,
            "mutator" => Self::Mutator,
            "loop" => Self::Loop,
            "true" => Self::True,
            "false" => Self::False,
            "shared" => Self::Shared,
            "construct" => Self::Construct,
            "new" => Self::New,
            "private" => Self::Private,
            "implements" => Self::Implements,
            "and" => Self::And,
            "or" => Self::Or,
            _ => return None,
        };
        Some(kind)
    }

    /// Punctuation table for single-character operators and delimiters.
    pub fn punctuation(c: char) -> Option<Self> {
        let kind = match c {
            '=' => Self::Assign,
            '<' => Self::LessThan,
            '>' => Self::GreaterThan,
            '(' => Self::LParen,
            ')' => Self::RParen,
            '.' => Self::Dot,
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Times,
            '/' => Self::Divide,
            ',' => Self::Comma,
            ':' => Self::Colon,
            _ => return None,
        };
        Some(kind)
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Newline => "newline",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::Assign => "'='",
            Self::Equal => "'=='",
            Self::NotEqual => "'!='",
            Self::LessThan => "'<'",
            Self::GreaterThan => "'>'",
            Self::LessThanEqual => "'<='",
            Self::GreaterThanEqual => "'>='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Times => "'*'",
            Self::Divide => "'/'",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Dot => "'.'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::Class => "'class'",
            Self::Interface => "'interface'",
            Self::Accessor => "'accessor'",
            Self::Mutator => "'mutator'",
            Self::Loop => "'loop'",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Shared => "'shared'",
            Self::Construct => "'construct'",
            Self::New => "'new'",
            Self::Private => "'private'",
            Self::Implements => "'implements'",
            Self::Word => "word",
            Self::Number => "number",
            Self::QuotedString => "string literal",
            Self::QuotedCharacter => "character literal",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            text: None,
        }
    }

    pub fn with_text(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} '{}'", self.kind, text),
            None => write!(f, "{}", self.kind),
        }
    }
}
