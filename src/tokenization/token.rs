use std::fmt::{Display, Formatter};
use crate::position::FilePosition;

/// Reserved words that get a kind of their own. The logical
/// connectives `and`, `or`, `not` are reserved too, but share
/// `TokenKind::Logical` and are told apart by lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Prg,
    Var,
    Subrot,
    Int,
    Float,
    Char,
    Void,
    Read,
    Write,
    If,
    Then,
    Else,
    For,
    While,
    Repeat,
    Until,
    Begin,
    End,
    Return,
}

impl Keyword {
    pub fn text(&self) -> &'static str {
        match self {
            Keyword::Prg => "prg",
            Keyword::Var => "var",
            Keyword::Subrot => "subrot",
            Keyword::Int => "int",
            Keyword::Float => "float",
            Keyword::Char => "char",
            Keyword::Void => "void",
            Keyword::Read => "read",
            Keyword::Write => "write",
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Repeat => "repeat",
            Keyword::Until => "until",
            Keyword::Begin => "begin",
            Keyword::End => "end",
            Keyword::Return => "return",
        }
    }

    /// Type names usable in declarations and subroutine headers.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Keyword::Int | Keyword::Float | Keyword::Char | Keyword::Void
        )
    }
}

/// Literal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer,
    Float,
    Char,
    String,
}

/// Token categories. Several of them (`Arithmetic`, `Relational`,
/// `Logical`, `Delimiter`) cover more than one symbol, the concrete
/// one is in the lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    K(Keyword),
    L(Literal),
    Id,
    Assign,
    Arithmetic,
    Relational,
    Logical,
    Delimiter,
    EOF,
    Error,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TokenKind::K(k) => write!(f, "keyword '{}'", k.text()),
            TokenKind::L(Literal::Integer) => write!(f, "integer literal"),
            TokenKind::L(Literal::Float) => write!(f, "float literal"),
            TokenKind::L(Literal::Char) => write!(f, "char literal"),
            TokenKind::L(Literal::String) => write!(f, "string literal"),
            TokenKind::Id => write!(f, "identifier"),
            TokenKind::Assign => write!(f, "assignment operator"),
            TokenKind::Arithmetic => write!(f, "arithmetic operator"),
            TokenKind::Relational => write!(f, "relational operator"),
            TokenKind::Logical => write!(f, "logical operator"),
            TokenKind::Delimiter => write!(f, "delimiter"),
            TokenKind::EOF => write!(f, "end of input"),
            TokenKind::Error => write!(f, "lexical error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: FilePosition,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: &str, pos: FilePosition) -> Self {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            pos,
        }
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_exact(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }

    pub fn is_delimiter(&self, lexeme: &str) -> bool {
        self.is_exact(TokenKind::Delimiter, lexeme)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::K(keyword)
    }

    pub fn is_type(&self) -> bool {
        match self.kind {
            TokenKind::K(k) => k.is_type(),
            _ => false,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::L(_))
    }
}
