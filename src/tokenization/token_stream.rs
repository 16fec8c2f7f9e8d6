use std::collections::HashMap;
use crate::position::FilePosition;
use crate::error::CompilationError;
use crate::tokenization::{
    token::*,
    buffer::Buffer
};

type TokenizationResult = std::result::Result<Token, CompilationError>;

/// Longest lexeme kept. Longer identifiers, numbers and strings
/// are truncated.
pub const MAX_LEXEME_LEN: usize = 255;

/// A stream of LPD tokens
pub struct TokenStream<T: Buffer> {
    buffer: T,
    reserved_words: HashMap<&'static str, TokenKind>,
    lexeme: String,
    // characters in `lexeme`
    lexeme_len: usize,
    token_start: FilePosition,
}

impl<T: Buffer> TokenStream<T> {
    /// Creates a new TokenStream reading from `buffer`.
    pub fn new(buffer: T) -> TokenStream<T> {
        let token_start = buffer.pos();
        TokenStream {
            buffer,
            reserved_words: [
                ("and", TokenKind::Logical),
                ("begin", TokenKind::K(Keyword::Begin)),
                ("char", TokenKind::K(Keyword::Char)),
                ("else", TokenKind::K(Keyword::Else)),
                ("end", TokenKind::K(Keyword::End)),
                ("float", TokenKind::K(Keyword::Float)),
                ("for", TokenKind::K(Keyword::For)),
                ("if", TokenKind::K(Keyword::If)),
                ("int", TokenKind::K(Keyword::Int)),
                ("not", TokenKind::Logical),
                ("or", TokenKind::Logical),
                ("prg", TokenKind::K(Keyword::Prg)),
                ("read", TokenKind::K(Keyword::Read)),
                ("repeat", TokenKind::K(Keyword::Repeat)),
                ("return", TokenKind::K(Keyword::Return)),
                ("subrot", TokenKind::K(Keyword::Subrot)),
                ("then", TokenKind::K(Keyword::Then)),
                ("until", TokenKind::K(Keyword::Until)),
                ("var", TokenKind::K(Keyword::Var)),
                ("void", TokenKind::K(Keyword::Void)),
                ("while", TokenKind::K(Keyword::While)),
                ("write", TokenKind::K(Keyword::Write)),
            ].iter().cloned().collect(),
            lexeme: String::new(),
            lexeme_len: 0,
            token_start,
        }
    }

    pub fn pos(&self) -> FilePosition {
        self.buffer.pos()
    }

    /// Reads a token, reporting a malformed one as a lexical error.
    /// Once the input is exhausted every call returns `EOF`.
    pub fn next(&mut self) -> TokenizationResult {
        self.skip_trivia()?;

        self.lexeme.clear();
        self.lexeme_len = 0;
        self.token_start = self.buffer.pos();

        let c = match self.buffer.next() {
            Some(c) => c,
            None => return Ok(self.token(TokenKind::EOF)),
        };

        if c.is_ascii_alphabetic() || c == '_' {
            self.push(c);
            return Ok(self.identifier());
        }

        if c.is_ascii_digit() {
            self.push(c);
            return Ok(self.number());
        }

        match c {
            '"' => self.string_literal(),
            '\'' => self.char_literal(),
            '<' => Ok(match self.buffer.peek() {
                Some('-') => self.pair(c, TokenKind::Assign),
                Some('=') => self.pair(c, TokenKind::Relational),
                _ => self.single(c, TokenKind::Relational),
            }),
            '>' => Ok(match self.buffer.peek() {
                Some('=') => self.pair(c, TokenKind::Relational),
                _ => self.single(c, TokenKind::Relational),
            }),
            '=' => match self.buffer.peek() {
                Some('=') => Ok(self.pair(c, TokenKind::Relational)),
                _ => Err(self.error("use '==' for equality")),
            },
            '!' => match self.buffer.peek() {
                Some('=') => Ok(self.pair(c, TokenKind::Relational)),
                _ => Err(self.error("use '!=' for inequality")),
            },
            '+' | '-' | '*' | '/' => Ok(self.single(c, TokenKind::Arithmetic)),
            '(' | ')' | '[' | ']' | ',' | ';' | '.' | ':' => {
                Ok(self.single(c, TokenKind::Delimiter))
            },
            _ => Err(self.error(&format!("invalid character: '{}'", c))),
        }
    }

    /// Like `next`, but never fails: a lexical error comes back as a
    /// token of kind `Error` carrying the diagnostic in its lexeme.
    pub fn next_token(&mut self) -> Token {
        self.next().unwrap_or_else(|e| {
            Token::new(TokenKind::Error, e.msg(), e.pos())
        })
    }

    fn skip_trivia(&mut self) -> Result<(), CompilationError> {
        loop {
            match self.buffer.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.buffer.next();
                },
                Some('{') => self.skip_comment()?,
                Some('/') => match self.buffer.peek_second() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), CompilationError> {
        self.buffer.next();
        loop {
            match self.buffer.next() {
                Some('}') => return Ok(()),
                Some(_) => (),
                None => return Err(self.error_here("unterminated comment")),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.buffer.next() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), CompilationError> {
        self.buffer.next();
        self.buffer.next();
        loop {
            match self.buffer.next() {
                Some('*') if self.buffer.peek() == Some('/') => {
                    self.buffer.next();
                    return Ok(());
                },
                Some(_) => (),
                None => return Err(
                    self.error_here("unterminated block comment")
                ),
            }
        }
    }

    fn identifier(&mut self) -> Token {
        while let Some(c) = self.buffer.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.buffer.next();
                self.push(c);
            } else {
                break;
            }
        }

        let kind = self.reserved_words
            .get(self.lexeme.as_str())
            .copied()
            .unwrap_or(TokenKind::Id);
        self.token(kind)
    }

    fn number(&mut self) -> Token {
        self.digits();

        // `3.` followed by a non-digit leaves the dot for the delimiter.
        let fraction = self.buffer.peek() == Some('.')
            && self.buffer.peek_second().map_or(false, |c| c.is_ascii_digit());

        if fraction {
            self.buffer.next();
            self.push('.');
            self.digits();
            self.token(TokenKind::L(Literal::Float))
        } else {
            self.token(TokenKind::L(Literal::Integer))
        }
    }

    fn digits(&mut self) {
        while let Some(c) = self.buffer.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.buffer.next();
            self.push(c);
        }
    }

    fn string_literal(&mut self) -> TokenizationResult {
        loop {
            match self.buffer.peek() {
                Some('"') => {
                    self.buffer.next();
                    return Ok(self.token(TokenKind::L(Literal::String)));
                },
                Some('\n') => {
                    return Err(self.error_here("string cannot span lines"))
                },
                Some(c) => {
                    self.buffer.next();
                    self.push(c);
                },
                None => return Err(self.error_here("unterminated string")),
            }
        }
    }

    fn char_literal(&mut self) -> TokenizationResult {
        loop {
            match self.buffer.next() {
                Some('\'') => break,
                Some(c) => self.push(c),
                None => return Err(self.error_here("unterminated char")),
            }
        }

        if self.lexeme_len != 1 {
            return Err(self.error(
                "char literal must contain exactly one character"
            ));
        }

        Ok(self.token(TokenKind::L(Literal::Char)))
    }

    /// Finishes a two-character operator whose second character is
    /// still in the buffer.
    fn pair(&mut self, first: char, kind: TokenKind) -> Token {
        self.push(first);
        if let Some(second) = self.buffer.next() {
            self.push(second);
        }
        self.token(kind)
    }

    fn single(&mut self, c: char, kind: TokenKind) -> Token {
        self.push(c);
        self.token(kind)
    }

    fn push(&mut self, c: char) {
        if self.lexeme_len < MAX_LEXEME_LEN {
            self.lexeme.push(c);
            self.lexeme_len += 1;
        }
    }

    fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, &self.lexeme, self.token_start)
    }

    /// Error located at the start of the current token.
    fn error(&self, msg: &str) -> CompilationError {
        CompilationError::lexical(self.token_start, msg)
    }

    /// Error located at the cursor.
    fn error_here(&self, msg: &str) -> CompilationError {
        CompilationError::lexical(self.buffer.pos(), msg)
    }
}

#[cfg(test)]
mod token_stream_tests {
    use super::*;
    use crate::error::CompilationErrorKind;
    use crate::tokenization::SimpleBuffer;

    fn token_stream(input: &str) -> TokenStream<SimpleBuffer> {
        let b = SimpleBuffer::new(input.as_bytes());
        TokenStream::new(b)
    }

    fn lexical_error(input: &str) -> CompilationError {
        let mut ts = token_stream(input);
        loop {
            match ts.next() {
                Ok(t) if t.kind == TokenKind::EOF => {
                    panic!("expected a lexical error in {:?}", input)
                },
                Ok(_) => (),
                Err(e) => return e,
            }
        }
    }

    #[test]
    fn test_next_integer() {
        let ts = token_stream("123");
        assert_token_sequence(&[
            (TokenKind::L(Literal::Integer), "123"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_float() {
        let ts = token_stream("3.14");
        assert_token_sequence(&[
            (TokenKind::L(Literal::Float), "3.14"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_integer_then_dot() {
        let ts = token_stream("end 3.");
        assert_token_sequence(&[
            (TokenKind::K(Keyword::End), "end"),
            (TokenKind::L(Literal::Integer), "3"),
            (TokenKind::Delimiter, "."),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_integer_dot_identifier() {
        let ts = token_stream("3.x");
        assert_token_sequence(&[
            (TokenKind::L(Literal::Integer), "3"),
            (TokenKind::Delimiter, "."),
            (TokenKind::Id, "x"),
        ], ts);
    }

    #[test]
    fn test_next_float_is_not_merged() {
        let ts = token_stream("1.2.3");
        assert_token_sequence(&[
            (TokenKind::L(Literal::Float), "1.2"),
            (TokenKind::Delimiter, "."),
            (TokenKind::L(Literal::Integer), "3"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_identifiers() {
        let identifiers = [
            "hello",
            "i",
            "_tmp",
            "confused_here2",
            "Begin",
        ];

        for identifier in identifiers.iter() {
            let mut ts = token_stream(identifier);
            let token = ts.next().unwrap();
            assert_eq!(token.kind, TokenKind::Id);
            assert_eq!(token.lexeme, *identifier);
        }
    }

    #[test]
    fn test_next_keywords() {
        let keywords = [
            ("prg", Keyword::Prg),
            ("var", Keyword::Var),
            ("subrot", Keyword::Subrot),
            ("int", Keyword::Int),
            ("float", Keyword::Float),
            ("char", Keyword::Char),
            ("void", Keyword::Void),
            ("read", Keyword::Read),
            ("write", Keyword::Write),
            ("if", Keyword::If),
            ("then", Keyword::Then),
            ("else", Keyword::Else),
            ("for", Keyword::For),
            ("while", Keyword::While),
            ("repeat", Keyword::Repeat),
            ("until", Keyword::Until),
            ("begin", Keyword::Begin),
            ("end", Keyword::End),
            ("return", Keyword::Return),
        ];

        for (text, keyword) in keywords.iter() {
            let mut ts = token_stream(text);
            let token = ts.next().unwrap();
            assert_eq!(token.kind, TokenKind::K(*keyword));
            assert_eq!(token.lexeme, *text);
            assert_eq!(keyword.text(), *text);
        }
    }

    #[test]
    fn test_next_logical_operators_share_kind() {
        let ts = token_stream("and or not");
        assert_token_sequence(&[
            (TokenKind::Logical, "and"),
            (TokenKind::Logical, "or"),
            (TokenKind::Logical, "not"),
        ], ts);
    }

    #[test]
    fn test_next_whitespace() {
        let ts = token_stream(" \t thing \r\n  other_thing   ");
        assert_token_sequence(&[
            (TokenKind::Id, "thing"),
            (TokenKind::Id, "other_thing"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_brace_comment_spanning_lines() {
        let mut ts = token_stream("{ spans\nlines } x");
        let token = ts.next().unwrap();
        assert_eq!(token.kind, TokenKind::Id);
        assert_eq!(token.line(), 2);
    }

    #[test]
    fn test_next_line_comment() {
        let mut ts = token_stream("// skipped <- = !\nx");
        let token = ts.next().unwrap();
        assert_eq!(token.lexeme, "x");
        assert_eq!(token.line(), 2);
    }

    #[test]
    fn test_next_line_comment_at_end_of_input() {
        let ts = token_stream("x // trailing");
        assert_token_sequence(&[
            (TokenKind::Id, "x"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_block_comment() {
        let mut ts = token_stream("/* one\n * two\n **/ y");
        let token = ts.next().unwrap();
        assert_eq!(token.lexeme, "y");
        assert_eq!(token.line(), 3);
    }

    #[test]
    fn test_next_unterminated_comments() {
        let err = lexical_error("x { never closed\n");
        assert_eq!(err.kind(), CompilationErrorKind::LexicalError);
        assert_eq!(err.msg(), "unterminated comment");
        assert_eq!(err.line(), 2);

        let err = lexical_error("/* never closed");
        assert_eq!(err.msg(), "unterminated block comment");
    }

    #[test]
    fn test_next_slash_is_division() {
        let ts = token_stream("a / b");
        assert_token_sequence(&[
            (TokenKind::Id, "a"),
            (TokenKind::Arithmetic, "/"),
            (TokenKind::Id, "b"),
        ], ts);
    }

    #[test]
    fn test_next_strings() {
        let ts = token_stream("\"\" \"some string\"");
        assert_token_sequence(&[
            (TokenKind::L(Literal::String), ""),
            (TokenKind::L(Literal::String), "some string"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_string_errors() {
        let err = lexical_error("\"abc\ndef\"");
        assert_eq!(err.msg(), "string cannot span lines");
        assert_eq!(err.line(), 1);

        let err = lexical_error("write(\"abc);");
        assert_eq!(err.msg(), "unterminated string");
    }

    #[test]
    fn test_next_chars() {
        let ts = token_stream("'a' ' '");
        assert_token_sequence(&[
            (TokenKind::L(Literal::Char), "a"),
            (TokenKind::L(Literal::Char), " "),
        ], ts);
    }

    #[test]
    fn test_next_char_errors() {
        let err = lexical_error("'ab'");
        assert_eq!(
            err.msg(),
            "char literal must contain exactly one character"
        );

        let err = lexical_error("''");
        assert_eq!(
            err.msg(),
            "char literal must contain exactly one character"
        );

        let err = lexical_error("'a");
        assert_eq!(err.msg(), "unterminated char");
    }

    #[test]
    fn test_next_relations() {
        let ts = token_stream("< <= > >= == !=");
        assert_token_sequence(&[
            (TokenKind::Relational, "<"),
            (TokenKind::Relational, "<="),
            (TokenKind::Relational, ">"),
            (TokenKind::Relational, ">="),
            (TokenKind::Relational, "=="),
            (TokenKind::Relational, "!="),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_assignment() {
        let ts = token_stream("x<-1");
        assert_token_sequence(&[
            (TokenKind::Id, "x"),
            (TokenKind::Assign, "<-"),
            (TokenKind::L(Literal::Integer), "1"),
        ], ts);
    }

    #[test]
    fn test_next_bare_equals_and_bang() {
        let err = lexical_error("a = b");
        assert_eq!(err.msg(), "use '==' for equality");

        let err = lexical_error("a ! b");
        assert_eq!(err.msg(), "use '!=' for inequality");
    }

    #[test]
    fn test_next_operators() {
        let ts = token_stream("a+ 42 - c/d *e");
        assert_token_sequence(&[
            (TokenKind::Id, "a"),
            (TokenKind::Arithmetic, "+"),
            (TokenKind::L(Literal::Integer), "42"),
            (TokenKind::Arithmetic, "-"),
            (TokenKind::Id, "c"),
            (TokenKind::Arithmetic, "/"),
            (TokenKind::Id, "d"),
            (TokenKind::Arithmetic, "*"),
            (TokenKind::Id, "e"),
        ], ts);
    }

    #[test]
    fn test_next_delimiters() {
        let ts = token_stream("()[],;.:");
        assert_token_sequence(&[
            (TokenKind::Delimiter, "("),
            (TokenKind::Delimiter, ")"),
            (TokenKind::Delimiter, "["),
            (TokenKind::Delimiter, "]"),
            (TokenKind::Delimiter, ","),
            (TokenKind::Delimiter, ";"),
            (TokenKind::Delimiter, "."),
            (TokenKind::Delimiter, ":"),
            (TokenKind::EOF, ""),
        ], ts);
    }

    #[test]
    fn test_next_invalid_character() {
        let err = lexical_error("x\n  # y");
        assert_eq!(err.msg(), "invalid character: '#'");
        assert_eq!(err.pos(), FilePosition::new(2, 3));
    }

    #[test]
    fn test_next_eof_is_repeated() {
        let mut ts = token_stream("x\n");
        ts.next().unwrap();

        let first = ts.next().unwrap();
        let second = ts.next().unwrap();
        assert_eq!(first.kind, TokenKind::EOF);
        assert_eq!(first, second);
        assert_eq!(ts.pos(), FilePosition::new(2, 1));
    }

    #[test]
    fn test_next_token_reports_error_kind() {
        let mut ts = token_stream("x = 1");
        assert_eq!(ts.next_token().kind, TokenKind::Id);

        let err = ts.next_token();
        assert_eq!(err.kind, TokenKind::Error);
        assert_eq!(err.lexeme, "use '==' for equality");
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_next_long_identifier_truncated() {
        let long = "a".repeat(MAX_LEXEME_LEN + 40);
        let mut ts = token_stream(&format!("{} ;", long));

        let token = ts.next().unwrap();
        assert_eq!(token.kind, TokenKind::Id);
        assert_eq!(token.lexeme.len(), MAX_LEXEME_LEN);
        assert_eq!(ts.next().unwrap().lexeme, ";");
    }

    #[test]
    fn test_next_long_string_truncated_by_characters() {
        let long = "é".repeat(MAX_LEXEME_LEN + 10);
        let mut ts = token_stream(&format!("\"{}\" 'ü' x", long));

        let token = ts.next().unwrap();
        assert_eq!(token.kind, TokenKind::L(Literal::String));
        assert_eq!(token.lexeme.chars().count(), MAX_LEXEME_LEN);

        let token = ts.next().unwrap();
        assert_eq!(token.kind, TokenKind::L(Literal::Char));
        assert_eq!(token.lexeme, "ü");
        assert_eq!(ts.next().unwrap().lexeme, "x");
    }

    #[test]
    fn test_pos() {
        let mut ts = token_stream("prg\n  p;\n\nbegin");

        assert_eq!(ts.next().unwrap().pos, FilePosition::new(1, 1));
        assert_eq!(ts.next().unwrap().pos, FilePosition::new(2, 3));
        assert_eq!(ts.next().unwrap().pos, FilePosition::new(2, 4));
        assert_eq!(ts.next().unwrap().pos, FilePosition::new(4, 1));
    }

    fn assert_token_sequence<T: Buffer>(
        expected: &[(TokenKind, &str)], mut ts: TokenStream<T>
    ) {
        for (kind, lexeme) in expected.iter() {
            let token = ts.next().unwrap();
            assert_eq!(*kind, token.kind);
            assert_eq!(*lexeme, token.lexeme);
        }
    }
}
