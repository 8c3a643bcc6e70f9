//! The token definition for the range expression language.

use std::fmt;

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Literals
    /// A bare word, brace groups and `..` ranges included: `web{01-03}.dc`
    Word(&'a str),
    /// The content of `"..."` or `q(...)`, without delimiters
    Quoted(&'a str),
    /// The content of `/.../`, without delimiters
    Regex(&'a str),

    // Prefix operators
    Percent,  // %
    At,       // @
    Star,     // *
    Question, // ?

    // Set operators
    Comma, // ,
    Dash,  // -
    Amp,   // &

    // Punctuation
    LParen,    // (
    RParen,    // )
    Colon,     // :
    Semicolon, // ;

    // Special
    UnterminatedString, // `"` or `q(` without a closing delimiter
    UnterminatedRegex,  // `/` without a closing `/`
    UnclosedBrace,      // `{` inside a word without its `}`
    Illegal,            // An illegal/unknown character
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "word '{}'", w),
            TokenKind::Quoted(q) => write!(f, "quoted literal \"{}\"", q),
            TokenKind::Regex(r) => write!(f, "regex /{}/", r),
            TokenKind::Percent => f.write_str("'%'"),
            TokenKind::At => f.write_str("'@'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Question => f.write_str("'?'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Dash => f.write_str("'-'"),
            TokenKind::Amp => f.write_str("'&'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::UnterminatedString => f.write_str("unterminated quoted literal"),
            TokenKind::UnterminatedRegex => f.write_str("unterminated regex"),
            TokenKind::UnclosedBrace => f.write_str("unclosed '{'"),
            TokenKind::Illegal => f.write_str("illegal character"),
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span, used for "end of input" diagnostics.
    pub fn at(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end > self.start + 1 {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{}", self.start)
        }
    }
}
