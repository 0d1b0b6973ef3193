//! IB Pseudocode Lexer
//!
//! Tokenizes pseudocode source with the `logos` crate. Keywords are matched
//! case-insensitively (`IF` and `if` are the same token), identifiers keep
//! their spelling. Lexing never fails: unrecognised characters become
//! [`TokenKind::Error`] tokens and a [`SyntaxError`] is recorded.

use logos::Logos;
use std::fmt;
use std::ops::Range;

use crate::SyntaxError;

/// Byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A token with its kind and source location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All token types of the pseudocode language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("if", ignore(ascii_case))]
    If,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("output", ignore(ascii_case))]
    Output,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("new", ignore(ascii_case))]
    New,
    #[token("loop", ignore(ascii_case))]
    Loop,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("from", ignore(ascii_case))]
    From,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // ========== Operators ==========
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("->")]
    Arrow,

    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // ========== Literals ==========
    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // ========== Trivia ==========
    #[regex(r"#[^\n]*")]
    LineComment,

    /// Unrecognised character
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::End => "'end'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::Output => "'output'",
            TokenKind::Not => "'not'",
            TokenKind::New => "'new'",
            TokenKind::Loop => "'loop'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::From => "'from'",
            TokenKind::To => "'to'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::EqEq => "'=='",
            TokenKind::Eq => "'='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Bang => "'!'",
            TokenKind::Arrow => "'->'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Integer => "integer literal",
            TokenKind::String => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::LineComment => "comment",
            TokenKind::Error => "unrecognised character",
        };
        f.write_str(text)
    }
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::LineComment)
    }

    /// Binding power of the token as a prefix operator, 0 if it is not one.
    pub fn prefix_precedence(&self) -> u8 {
        match self {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Not => 5,
            _ => 0,
        }
    }

    /// Binding power of the token as an infix operator, 0 if it is not one.
    ///
    /// A single `=` compares inside expressions; statement-level assignment
    /// is recognised before expression parsing starts.
    pub fn infix_precedence(&self) -> u8 {
        match self {
            TokenKind::Star | TokenKind::Slash => 4,
            TokenKind::Plus | TokenKind::Minus => 3,
            TokenKind::Lt | TokenKind::Gt => 2,
            TokenKind::EqEq | TokenKind::Eq => 1,
            _ => 0,
        }
    }
}

/// Lexer for pseudocode source
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
        }
    }

    /// Tokenize the entire source, comments included.
    pub fn tokenize(self) -> (Vec<Token>, Vec<SyntaxError>) {
        let source = self.source;
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for (result, range) in self.inner.spanned() {
            let span = Span::from(range);
            match result {
                Ok(kind) => tokens.push(Token::new(kind, span)),
                Err(()) => {
                    let ch = source[span.start..].chars().next().unwrap_or('?');
                    errors.push(SyntaxError::UnexpectedCharacter {
                        ch,
                        offset: span.start,
                    });
                    tokens.push(Token::new(TokenKind::Error, span));
                }
            }
        }

        (tokens, errors)
    }
}
