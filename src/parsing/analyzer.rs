use log::{debug, trace};

use crate::{
    error::CompilationError,
    tokenization::{
        Token,
        TokenKind,
        Keyword,
        TokenStream,
        Buffer
    },
};

type ParseResult = Result<(), CompilationError>;

/// Deepest nesting of statements and parenthesized/negated factors.
pub const MAX_NESTING: usize = 256;

/// Summary of a program that passed the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Name given in the `prg` header.
    pub program: String,
    /// Tokens pulled from the scanner, end of input included.
    pub tokens: usize,
    /// Line the input ends on.
    pub lines: usize,
}

/// Recursive-descent syntax checker for LPD with one token of
/// lookahead. Stops at the first error.
pub struct Analyzer<T: Buffer> {
    token_stream: TokenStream<T>,
    lookahead: Token,
    pulled: usize,
    // last consumed token was `;` or `end`
    separated: bool,
    depth: usize,
}

impl<T: Buffer> Analyzer<T> {
    pub fn new(token_stream: TokenStream<T>) -> Analyzer<T> {
        let start = token_stream.pos();
        Analyzer {
            token_stream,
            lookahead: Token::new(TokenKind::EOF, "", start),
            pulled: 0,
            separated: false,
            depth: 0,
        }
    }

    /// Checks the code for syntactic correctness.
    pub fn check(mut self) -> Result<Report, CompilationError> {
        debug!("syntax analysis started");

        self.proceed()?;
        let program = self.program()?;

        let report = Report {
            program,
            tokens: self.pulled,
            lines: self.lookahead.line(),
        };

        debug!(
            "syntax analysis finished: {} tokens, {} lines",
            report.tokens, report.lines
        );

        Ok(report)
    }

    // <program> ::=
        // prg <identifier> ; { <var section> | <subroutine> } <block> .
    fn program(&mut self) -> Result<String, CompilationError> {
        self.consume(TokenKind::K(Keyword::Prg))?;
        let name = self.identifier()?;
        debug!("program '{}'", name);
        self.consume_delimiter(";")?;

        self.declarations_and_subroutines()?;
        self.block()?;
        self.consume_delimiter(".")?;

        if !self.lookahead.is(TokenKind::EOF) {
            return Err(self.syntax_error(
                "unexpected tokens after end of program",
                "end of input"
            ));
        }

        Ok(name)
    }

    // { <var section> | <subroutine> }
    fn declarations_and_subroutines(&mut self) -> ParseResult {
        loop {
            if self.lookahead.is_keyword(Keyword::Subrot) {
                self.subroutine()?;
            } else if self.lookahead.is_keyword(Keyword::Var)
                || self.starts_declaration() {
                self.var_section()?;
            } else {
                return Ok(());
            }
        }
    }

    // <var section> ::= [var] <declaration> {; <declaration>}
    fn var_section(&mut self) -> ParseResult {
        if self.lookahead.is_keyword(Keyword::Var) {
            self.proceed()?;
        }

        loop {
            self.declaration()?;
            self.consume_delimiter(";")?;
            self.skip_semicolons()?;
            if !self.starts_declaration() {
                return Ok(());
            }
        }
    }

    // <declaration> ::=
        // <type> <identifier> {, <identifier>}
        // | <identifier> {, <identifier>} : <type>
    fn declaration(&mut self) -> ParseResult {
        if self.lookahead.is_type() {
            self.type_()?;
            self.identifier_list()
        } else if self.lookahead.is(TokenKind::Id) {
            self.proceed()?;
            self.declaration_tail()
        } else {
            Err(self.syntax_error(
                "invalid declaration",
                "type or identifier"
            ))
        }
    }

    // Rest of a name-first declaration after its first identifier:
    // {, <identifier>} : <type>
    fn declaration_tail(&mut self) -> ParseResult {
        while self.lookahead.is_delimiter(",") {
            self.proceed()?;
            self.identifier()?;
        }

        self.consume_delimiter(":")?;
        self.type_()
    }

    // <type> ::= int | float | char | void
    fn type_(&mut self) -> ParseResult {
        if self.lookahead.is_type() {
            self.proceed()?;
            Ok(())
        } else {
            Err(self.syntax_error(
                "invalid type",
                "'int', 'float', 'char' or 'void'"
            ))
        }
    }

    // <subroutine> ::=
        // subrot (<type> <identifier> | <identifier>)
        // ( [<parameters>] ) [: <type>] [;]
        // { <var section> | <subroutine> } <block> [;]
    fn subroutine(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Subrot))?;
        if self.lookahead.is_type() {
            self.type_()?;
        }

        let line = self.lookahead.line();
        let name = self.identifier()?;
        debug!("subroutine '{}' at line {}", name, line);

        self.consume_delimiter("(")?;
        if !self.lookahead.is_delimiter(")") {
            self.parameters()?;
        }
        self.consume_delimiter(")")?;

        if self.lookahead.is_delimiter(":") {
            self.proceed()?;
            self.type_()?;
        }
        self.optional_semicolon()?;

        self.declarations_and_subroutines()?;
        self.block()?;
        self.optional_semicolon()
    }

    // <parameters> ::=
        // <type> <identifier> {, <type> <identifier>}
        // | <identifier> {, <identifier>} : <type>
    fn parameters(&mut self) -> ParseResult {
        if self.lookahead.is_type() {
            loop {
                self.type_()?;
                self.identifier()?;
                if self.lookahead.is_delimiter(",") {
                    self.proceed()?;
                } else {
                    return Ok(());
                }
            }
        } else if self.lookahead.is(TokenKind::Id) {
            self.proceed()?;
            self.declaration_tail()
        } else {
            Err(self.syntax_error(
                "invalid parameter list",
                "type or identifier"
            ))
        }
    }

    // <block> ::= begin {<declaration> ;} <statement list> end
    fn block(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Begin))?;
        let assigned = self.local_declarations()?;
        self.statement_list(!assigned)?;
        self.consume(TokenKind::K(Keyword::End))?;

        Ok(())
    }

    // A name-first local declaration and an assignment both start with
    // an identifier. The token after it tells them apart; an assignment
    // ends the declaration part of the block. Returns whether one was
    // parsed.
    fn local_declarations(&mut self) -> Result<bool, CompilationError> {
        loop {
            self.skip_semicolons()?;

            if self.lookahead.is_type() {
                self.declaration()?;
            } else if self.lookahead.is(TokenKind::Id) {
                self.proceed()?;
                if self.lookahead.is_delimiter(",")
                    || self.lookahead.is_delimiter(":") {
                    self.declaration_tail()?;
                } else {
                    self.assignment_tail()?;
                    return Ok(true);
                }
            } else {
                return Ok(false);
            }

            self.consume_delimiter(";")?;
        }
    }

    // <statement list> ::= [<statement>] { ; {;} <statement> } {;}
    // A statement ending in `end` needs no `;` after it.
    fn statement_list(&mut self, mut first: bool) -> ParseResult {
        loop {
            if self.lookahead.is_delimiter(";") {
                self.proceed()?;
            } else if self.starts_statement() {
                if !first && !self.separated {
                    return Err(self.syntax_error(
                        "missing separator between statements",
                        "';'"
                    ));
                }
                first = false;
                self.statement()?;
            } else {
                return Ok(());
            }
        }
    }

    // <statement> ::=
        // <assignment> | <read> | <write> | <return> | <block>
        // | <if statement> | <while statement> | <for statement>
        // | <repeat statement>
    fn statement(&mut self) -> ParseResult {
        self.nested(Self::unguarded_statement)
    }

    fn unguarded_statement(&mut self) -> ParseResult {
        match self.lookahead.kind {
            TokenKind::Id => self.assignment(),
            TokenKind::K(Keyword::Read) => self.read_statement(),
            TokenKind::K(Keyword::Write) => self.write_statement(),
            TokenKind::K(Keyword::Return) => self.return_statement(),
            TokenKind::K(Keyword::Begin) => self.block(),
            TokenKind::K(Keyword::If) => self.if_statement(),
            TokenKind::K(Keyword::While) => self.while_statement(),
            TokenKind::K(Keyword::For) => self.for_statement(),
            TokenKind::K(Keyword::Repeat) => self.repeat_statement(),
            _ => Err(self.syntax_error(
                "a statement cannot start here",
                "statement"
            )),
        }
    }

    // <assignment> ::= <identifier> <- <expression>
    fn assignment(&mut self) -> ParseResult {
        self.identifier()?;
        self.assignment_tail()
    }

    fn assignment_tail(&mut self) -> ParseResult {
        self.consume(TokenKind::Assign)?;
        self.expression()
    }

    // <if statement> ::=
        // if ( <expression> ) then <statement> [else <statement>]
    fn if_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::If))?;
        self.parenthesized_expression()?;
        self.consume(TokenKind::K(Keyword::Then))?;
        self.statement()?;

        // `x <- 1; else` is accepted as well
        self.skip_semicolons()?;

        if self.lookahead.is_keyword(Keyword::Else) {
            self.proceed()?;
            self.statement()?;
        }

        Ok(())
    }

    // <while statement> ::= while ( <expression> ) <statement>
    fn while_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::While))?;
        self.parenthesized_expression()?;
        self.statement()
    }

    // <for statement> ::=
        // for ( [<assignment>] ; <expression> ; [<assignment>] ) <statement>
    fn for_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::For))?;
        self.consume_delimiter("(")?;

        if self.lookahead.is(TokenKind::Id) {
            self.assignment()?;
        }
        self.consume_delimiter(";")?;

        self.expression()?;
        self.consume_delimiter(";")?;

        if self.lookahead.is(TokenKind::Id) {
            self.assignment()?;
        }
        self.consume_delimiter(")")?;

        self.statement()
    }

    // <repeat statement> ::= repeat <statement> until ( <expression> )
    fn repeat_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Repeat))?;
        self.statement()?;
        self.skip_semicolons()?;
        self.consume(TokenKind::K(Keyword::Until))?;
        self.parenthesized_expression()
    }

    // <read> ::= read ( <identifier> {, <identifier>} )
    fn read_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Read))?;
        self.consume_delimiter("(")?;
        self.identifier_list()?;
        self.consume_delimiter(")")?;

        Ok(())
    }

    // <write> ::= write ( <expression> {, <expression>} )
    // String and char literals are factors, so they need no case of
    // their own here.
    fn write_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Write))?;
        self.consume_delimiter("(")?;

        self.expression()?;
        while self.lookahead.is_delimiter(",") {
            self.proceed()?;
            self.expression()?;
        }

        self.consume_delimiter(")")?;

        Ok(())
    }

    // <return> ::= return [<expression>]
    fn return_statement(&mut self) -> ParseResult {
        self.consume(TokenKind::K(Keyword::Return))?;
        if self.starts_expression() {
            self.expression()?;
        }

        Ok(())
    }

    fn parenthesized_expression(&mut self) -> ParseResult {
        self.consume_delimiter("(")?;
        self.expression()?;
        self.consume_delimiter(")")?;

        Ok(())
    }

    // <expression> ::=
        // <relational expression> { (and | or) <relational expression> }
    fn expression(&mut self) -> ParseResult {
        self.relational_expression()?;

        while self.lookahead.is_exact(TokenKind::Logical, "and")
            || self.lookahead.is_exact(TokenKind::Logical, "or") {
            self.proceed()?;
            self.relational_expression()?;
        }

        Ok(())
    }

    // <relational expression> ::=
        // <arithmetic expression>
        // | <arithmetic expression> <relational operator> <arithmetic expression>
    fn relational_expression(&mut self) -> ParseResult {
        self.arithmetic_expression()?;

        if self.lookahead.is(TokenKind::Relational) {
            self.proceed()?;
            self.arithmetic_expression()?;
        }

        Ok(())
    }

    // <arithmetic expression> ::= <term> { (+ | -) <term> }
    fn arithmetic_expression(&mut self) -> ParseResult {
        self.term()?;

        while self.lookahead.is_exact(TokenKind::Arithmetic, "+")
            || self.lookahead.is_exact(TokenKind::Arithmetic, "-") {
            self.proceed()?;
            self.term()?;
        }

        Ok(())
    }

    // <term> ::= <factor> { (* | /) <factor> }
    fn term(&mut self) -> ParseResult {
        self.factor()?;

        while self.lookahead.is_exact(TokenKind::Arithmetic, "*")
            || self.lookahead.is_exact(TokenKind::Arithmetic, "/") {
            self.proceed()?;
            self.factor()?;
        }

        Ok(())
    }

    // <factor> ::=
        // ( <expression> )
        // | not <factor>
        // | <identifier> [( [<expression> {, <expression>}] )]
        // | <literal>
    fn factor(&mut self) -> ParseResult {
        if self.lookahead.is_delimiter("(") {
            self.nested(Self::parenthesized_expression)
        } else if self.lookahead.is_exact(TokenKind::Logical, "not") {
            self.proceed()?;
            self.nested(Self::factor)
        } else if self.lookahead.is(TokenKind::Id) {
            self.proceed()?;
            if self.lookahead.is_delimiter("(") {
                self.arguments()?;
            }
            Ok(())
        } else if self.lookahead.is_literal() {
            self.proceed()?;
            Ok(())
        } else {
            Err(self.syntax_error(
                "invalid factor in expression",
                "expression"
            ))
        }
    }

    // ( [<expression> {, <expression>}] )
    fn arguments(&mut self) -> ParseResult {
        self.consume_delimiter("(")?;

        if !self.lookahead.is_delimiter(")") {
            self.expression()?;
            while self.lookahead.is_delimiter(",") {
                self.proceed()?;
                self.expression()?;
            }
        }

        self.consume_delimiter(")")?;

        Ok(())
    }

    // <identifier> {, <identifier>}
    fn identifier_list(&mut self) -> ParseResult {
        self.identifier()?;
        while self.lookahead.is_delimiter(",") {
            self.proceed()?;
            self.identifier()?;
        }

        Ok(())
    }

    fn identifier(&mut self) -> Result<String, CompilationError> {
        let token = self.consume(TokenKind::Id)?;
        Ok(token.lexeme)
    }

    fn starts_declaration(&self) -> bool {
        self.lookahead.is_type() || self.lookahead.is(TokenKind::Id)
    }

    fn starts_statement(&self) -> bool {
        match self.lookahead.kind {
            TokenKind::Id => true,
            TokenKind::K(k) => matches!(
                k,
                Keyword::Read
                | Keyword::Write
                | Keyword::Return
                | Keyword::Begin
                | Keyword::If
                | Keyword::While
                | Keyword::For
                | Keyword::Repeat
            ),
            _ => false,
        }
    }

    fn starts_expression(&self) -> bool {
        self.lookahead.is_delimiter("(")
            || self.lookahead.is_exact(TokenKind::Logical, "not")
            || self.lookahead.is(TokenKind::Id)
            || self.lookahead.is_literal()
    }

    /// Runs `parse` one nesting level deeper, failing past `MAX_NESTING`
    /// instead of exhausting the stack.
    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult) -> ParseResult {
        if self.depth >= MAX_NESTING {
            return Err(self.syntax_error(
                "nesting too deep",
                &format!("at most {} nested levels", MAX_NESTING)
            ));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    fn skip_semicolons(&mut self) -> ParseResult {
        while self.lookahead.is_delimiter(";") {
            self.proceed()?;
        }

        Ok(())
    }

    fn optional_semicolon(&mut self) -> ParseResult {
        if self.lookahead.is_delimiter(";") {
            self.proceed()?;
        }

        Ok(())
    }

    /// Matches any token of `kind`.
    fn consume(&mut self, kind: TokenKind) -> Result<Token, CompilationError> {
        if self.lookahead.is(kind) {
            self.proceed()
        } else {
            Err(self.syntax_error(
                "unexpected token kind",
                &kind.to_string()
            ))
        }
    }

    /// Matches a token of `kind` spelled exactly `lexeme`.
    fn consume_exact(
        &mut self,
        kind: TokenKind,
        lexeme: &str
    ) -> Result<Token, CompilationError> {
        if self.lookahead.is_exact(kind, lexeme) {
            self.proceed()
        } else if self.lookahead.is(kind) {
            Err(self.syntax_error(
                "unexpected lexeme",
                &format!("'{}'", lexeme)
            ))
        } else {
            Err(self.syntax_error(
                "unexpected token kind",
                &format!("{} '{}'", kind, lexeme)
            ))
        }
    }

    fn consume_delimiter(&mut self, lexeme: &str) -> Result<Token, CompilationError> {
        self.consume_exact(TokenKind::Delimiter, lexeme)
    }

    /// Pulls the next token and returns the one it replaces.
    fn proceed(&mut self) -> Result<Token, CompilationError> {
        let token = self.token_stream.next()?;
        self.pulled += 1;
        self.separated = self.lookahead.is_delimiter(";")
            || self.lookahead.is_keyword(Keyword::End);

        trace!("{} {} \"{}\"", token.pos, token.kind, token.lexeme);

        Ok(std::mem::replace(&mut self.lookahead, token))
    }

    fn syntax_error(&self, message: &str, expected: &str) -> CompilationError {
        CompilationError::syntax(self.lookahead.pos, message)
            .with_expected(expected)
            .with_found(
                &self.lookahead.kind.to_string(),
                &self.lookahead.lexeme
            )
    }
}
