//! Error-tolerant recursive descent parser
//!
//! Builds a [`SyntaxTree`] straight from the token stream. The parser never
//! gives up: a missing piece is recorded as a [`SyntaxError`] and parsing
//! continues at the next token, so a half-typed document still produces a
//! tree that covers the whole input.
//!
//! Statements are line oriented. An operand, an infix operator or a call's
//! opening parenthesis only continues an expression when it starts on the
//! same line as the token before it.

use crate::kind::SyntaxKind;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::tree::{NodeId, SyntaxTree, TreeBuilder};
use crate::SyntaxError;

/// Parse `source` into a syntax tree.
pub fn parse(source: &str) -> SyntaxTree {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    let mut parser = Parser::new(source, tokens, lex_errors);
    parser.parse_program();
    parser.finish()
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    comments: Vec<Token>,
    next_comment: usize,
    pos: usize,
    /// End of the last consumed token.
    last_end: usize,
    builder: TreeBuilder,
    errors: Vec<SyntaxError>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, all_tokens: Vec<Token>, errors: Vec<SyntaxError>) -> Self {
        let (comments, tokens): (Vec<Token>, Vec<Token>) = all_tokens
            .into_iter()
            .partition(|token| token.kind.is_trivia());

        Self {
            source,
            tokens,
            comments,
            next_comment: 0,
            pos: 0,
            last_end: 0,
            builder: TreeBuilder::new(),
            errors,
        }
    }

    fn finish(self) -> SyntaxTree {
        self.builder.finish(self.source, self.errors)
    }

    fn parse_program(&mut self) {
        self.builder.start_node(SyntaxKind::Program, 0);
        loop {
            self.flush_comments(self.current_start());
            if self.is_eof() {
                break;
            }
            self.parse_statement();
        }
        self.builder.finish_node_at(self.source.len());
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    /// Start of the current token, or the end of input.
    fn current_start(&self) -> usize {
        self.current()
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// True if the current token starts on the line where the last consumed
    /// token ended.
    fn on_same_line(&self) -> bool {
        match self.current() {
            Some(token) => !self
                .source
                .get(self.last_end..token.span.start)
                .unwrap_or("")
                .contains('\n'),
            None => false,
        }
    }

    fn is_expression_start(&self) -> bool {
        matches!(
            self.current_kind(),
            Some(
                TokenKind::Integer
                    | TokenKind::String
                    | TokenKind::Identifier
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::LParen
                    | TokenKind::New
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Bang
                    | TokenKind::Not
            )
        )
    }

    /// An expression operand may begin here.
    fn at_operand(&self) -> bool {
        self.is_expression_start() && self.on_same_line()
    }

    /// Consumes the current token as a leaf of `kind`.
    fn bump(&mut self, kind: SyntaxKind) -> Option<NodeId> {
        let token = *self.current()?;
        self.pos += 1;
        self.last_end = token.span.end;
        Some(self.builder.leaf(kind, token.span))
    }

    fn eat(&mut self, token: TokenKind, kind: SyntaxKind) -> bool {
        if self.check(token) {
            self.bump(kind);
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: TokenKind, kind: SyntaxKind) -> bool {
        if self.eat(token, kind) {
            return true;
        }
        self.error_expected(&token.to_string());
        false
    }

    fn error_expected(&mut self, expected: &str) {
        let error = match self.current() {
            Some(token) if token.kind == TokenKind::Error => return,
            Some(token) => SyntaxError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
                span: token.span,
            },
            None => SyntaxError::UnexpectedEof {
                expected: expected.to_string(),
                offset: self.source.len(),
            },
        };
        self.errors.push(error);
    }

    /// Emits comments starting before `until` that do not fall inside an
    /// already parsed statement.
    fn flush_comments(&mut self, until: usize) {
        while let Some(comment) = self.comments.get(self.next_comment).copied() {
            if comment.span.start >= until {
                break;
            }
            self.next_comment += 1;
            if comment.span.start >= self.last_end {
                self.builder.leaf(SyntaxKind::LineComment, comment.span);
            }
        }
    }

    // ========================================================================
    // Statement Parsing
    // ========================================================================

    /// Parses one statement wrapped in an Atom. Consumes at least one token.
    fn parse_statement(&mut self) {
        self.builder.start_node(SyntaxKind::Atom, self.current_start());
        match self.current_kind() {
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::Function) => self.parse_function(),
            Some(TokenKind::Loop) => self.parse_loop(),
            Some(TokenKind::Output) => self.parse_output(),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Identifier) if self.peek_kind() == Some(TokenKind::Eq) => {
                self.parse_assignment()
            }
            _ if self.is_expression_start() => {
                let start = self.current_start();
                self.builder
                    .start_node(SyntaxKind::ExpressionStatement, start);
                self.builder.start_node(SyntaxKind::Expression, start);
                self.parse_binary(0);
                self.builder.finish_node();
                self.builder.finish_node();
            }
            _ => {
                self.error_expected("statement");
                self.bump(SyntaxKind::Error);
            }
        }
        self.builder.finish_node();
    }

    /// Statements up to `end`, `else` or end of input. The block spans from
    /// the end of the header to the start of the closing keyword.
    fn parse_block(&mut self) {
        self.builder.start_node(SyntaxKind::Block, self.last_end);
        loop {
            self.flush_comments(self.current_start());
            if self.is_eof() || self.check(TokenKind::End) || self.check(TokenKind::Else) {
                break;
            }
            self.parse_statement();
        }
        self.builder.finish_node_at(self.current_start());
    }

    fn expect_end(&mut self, construct: &str, opened: Span) {
        if !self.eat(TokenKind::End, SyntaxKind::EndKeyword) {
            self.errors.push(SyntaxError::MissingEnd {
                construct: construct.to_string(),
                opened,
            });
        }
    }

    fn parse_if(&mut self) {
        let Some(keyword) = self.current().map(|t| t.span) else {
            return;
        };
        self.builder.start_node(SyntaxKind::IfStatement, keyword.start);
        self.bump(SyntaxKind::IfKeyword);

        self.parse_expression();
        self.expect(TokenKind::Then, SyntaxKind::ThenKeyword);
        self.parse_block();

        if self.eat(TokenKind::Else, SyntaxKind::ElseKeyword) {
            self.parse_block();
        }

        self.expect_end("if", keyword);
        self.builder.finish_node();
    }

    fn parse_function(&mut self) {
        let Some(keyword) = self.current().map(|t| t.span) else {
            return;
        };
        self.builder
            .start_node(SyntaxKind::FunctionDeclaration, keyword.start);
        self.bump(SyntaxKind::FunctionKeyword);

        if !self.eat(TokenKind::Identifier, SyntaxKind::Identifier) {
            self.error_expected("function name");
        }
        if self.check(TokenKind::LParen) {
            self.parse_parameter_list();
        } else {
            self.error_expected("'('");
        }

        self.parse_block();
        self.expect_end("function", keyword);
        self.builder.finish_node();
    }

    /// `( name[: Type], ... ) [-> Type]`
    fn parse_parameter_list(&mut self) {
        self.builder
            .start_node(SyntaxKind::ParameterList, self.current_start());
        self.bump(SyntaxKind::LParen);

        loop {
            match self.current_kind() {
                Some(TokenKind::Identifier) => {
                    self.builder
                        .start_node(SyntaxKind::Parameter, self.current_start());
                    self.bump(SyntaxKind::Identifier);
                    if self.eat(TokenKind::Colon, SyntaxKind::Colon) {
                        self.parse_type_annotation();
                    }
                    self.builder.finish_node();
                }
                Some(TokenKind::Comma) => self.error_expected("parameter name"),
                _ => break,
            }
            if !self.eat(TokenKind::Comma, SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, SyntaxKind::RParen);

        if self.check(TokenKind::Arrow) {
            self.builder
                .start_node(SyntaxKind::ReturnType, self.current_start());
            self.bump(SyntaxKind::Arrow);
            self.parse_type_annotation();
            self.builder.finish_node();
        }

        self.builder.finish_node();
    }

    fn parse_type_annotation(&mut self) {
        if !self.eat(TokenKind::Identifier, SyntaxKind::TypeAnnotation) {
            self.error_expected("type name");
        }
    }

    /// `loop while COND` or `loop [for] I from A to B`
    fn parse_loop(&mut self) {
        let Some(keyword) = self.current().map(|t| t.span) else {
            return;
        };

        if self.peek_kind() == Some(TokenKind::While) {
            self.builder
                .start_node(SyntaxKind::WhileStatement, keyword.start);
            self.bump(SyntaxKind::LoopKeyword);
            self.bump(SyntaxKind::WhileKeyword);
            self.parse_expression();
        } else {
            self.builder.start_node(SyntaxKind::ForStatement, keyword.start);
            self.bump(SyntaxKind::LoopKeyword);
            self.eat(TokenKind::For, SyntaxKind::ForKeyword);
            if !self.eat(TokenKind::Identifier, SyntaxKind::Identifier) {
                self.error_expected("loop variable");
            }
            self.expect(TokenKind::From, SyntaxKind::FromKeyword);
            self.parse_expression();
            self.expect(TokenKind::To, SyntaxKind::ToKeyword);
            self.parse_expression();
        }

        self.parse_block();
        self.expect_end("loop", keyword);
        self.builder.finish_node();
    }

    fn parse_output(&mut self) {
        self.builder
            .start_node(SyntaxKind::OutputStatement, self.current_start());
        self.bump(SyntaxKind::OutputKeyword);
        self.parse_expression();
        self.builder.finish_node();
    }

    fn parse_return(&mut self) {
        self.builder
            .start_node(SyntaxKind::ReturnStatement, self.current_start());
        self.bump(SyntaxKind::ReturnKeyword);
        if self.at_operand() {
            self.parse_expression();
        }
        self.builder.finish_node();
    }

    fn parse_assignment(&mut self) {
        self.builder
            .start_node(SyntaxKind::VariableAssignment, self.current_start());
        self.bump(SyntaxKind::Identifier);
        self.bump(SyntaxKind::AssignmentOperator);
        self.parse_expression();
        self.builder.finish_node();
    }

    // ========================================================================
    // Expression Parsing
    // ========================================================================

    /// Parses an Expression wrapper. A missing operand leaves it empty.
    fn parse_expression(&mut self) {
        if self.at_operand() {
            self.builder
                .start_node(SyntaxKind::Expression, self.current_start());
            self.parse_binary(0);
        } else {
            self.builder.start_node(SyntaxKind::Expression, self.last_end);
            self.error_expected("expression");
        }
        self.builder.finish_node();
    }

    /// Precedence climbing over infix operators binding tighter than `min`.
    fn parse_binary(&mut self, min: u8) -> Option<NodeId> {
        let mut lhs = self.parse_unary()?;

        while let Some(kind) = self.current_kind() {
            let precedence = kind.infix_precedence();
            if precedence <= min || !self.on_same_line() {
                break;
            }

            let node = self.builder.precede(lhs, SyntaxKind::BinaryExpression);
            self.bump(SyntaxKind::Operator);
            if self.at_operand() {
                self.parse_binary(precedence);
            } else {
                self.error_expected("expression");
            }
            self.builder.finish_node();
            lhs = node;
        }

        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<NodeId> {
        let kind = self.current_kind()?;
        if kind.prefix_precedence() == 0 {
            return self.parse_postfix();
        }

        let node = self
            .builder
            .start_node(SyntaxKind::UnaryExpression, self.current_start());
        let leaf = if kind == TokenKind::Not {
            SyntaxKind::NotKeyword
        } else {
            SyntaxKind::Operator
        };
        self.bump(leaf);
        if self.at_operand() {
            self.parse_unary();
        } else {
            self.error_expected("expression");
        }
        self.builder.finish_node();
        Some(node)
    }

    fn parse_postfix(&mut self) -> Option<NodeId> {
        let mut expr = self.parse_primary()?;

        while self.check(TokenKind::Dot) && self.on_same_line() {
            let member = self.builder.precede(expr, SyntaxKind::MemberExpression);
            self.bump(SyntaxKind::Dot);
            if !self.eat(TokenKind::Identifier, SyntaxKind::Identifier) {
                self.error_expected("member name");
            }
            self.builder.finish_node();
            expr = member;

            if self.check(TokenKind::LParen) && self.on_same_line() {
                let call = self.builder.precede(expr, SyntaxKind::CallExpression);
                self.parse_argument_list();
                self.builder.finish_node();
                expr = call;
            }
        }

        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<NodeId> {
        let start = self.current_start();
        match self.current_kind() {
            Some(TokenKind::Integer) => self.bump(SyntaxKind::Number),
            Some(TokenKind::String) => self.bump(SyntaxKind::String),
            Some(TokenKind::True | TokenKind::False) => self.bump(SyntaxKind::Boolean),
            Some(TokenKind::LParen) => {
                let node = self
                    .builder
                    .start_node(SyntaxKind::ParenthesizedExpression, start);
                self.bump(SyntaxKind::LParen);
                if self.at_operand() {
                    self.parse_binary(0);
                } else {
                    self.error_expected("expression");
                }
                self.expect(TokenKind::RParen, SyntaxKind::RParen);
                self.builder.finish_node();
                Some(node)
            }
            Some(TokenKind::New) => Some(self.parse_instantiation()),
            Some(TokenKind::Identifier) => {
                let is_call = self.peek_kind() == Some(TokenKind::LParen)
                    && self.tokens.get(self.pos + 1).is_some_and(|paren| {
                        !self
                            .source
                            .get(start..paren.span.start)
                            .unwrap_or("")
                            .contains('\n')
                    });
                let kind = if is_call {
                    SyntaxKind::CallExpression
                } else {
                    SyntaxKind::ReferenceExpression
                };
                let node = self.builder.start_node(kind, start);
                self.bump(SyntaxKind::Identifier);
                if is_call {
                    self.parse_argument_list();
                }
                self.builder.finish_node();
                Some(node)
            }
            _ => {
                self.error_expected("expression");
                None
            }
        }
    }

    /// `new Type[<Type>](args)`
    fn parse_instantiation(&mut self) -> NodeId {
        let node = self.builder.start_node(
            SyntaxKind::ObjectInstantiationExpression,
            self.current_start(),
        );
        self.bump(SyntaxKind::NewKeyword);
        self.parse_type_annotation();

        if self.check(TokenKind::Lt) && self.on_same_line() {
            self.bump(SyntaxKind::Operator);
            self.parse_type_annotation();
            self.expect(TokenKind::Gt, SyntaxKind::Operator);
        }

        if self.check(TokenKind::LParen) && self.on_same_line() {
            self.parse_argument_list();
        } else {
            self.error_expected("'('");
        }

        self.builder.finish_node();
        node
    }

    fn parse_argument_list(&mut self) {
        self.builder
            .start_node(SyntaxKind::ArgumentList, self.current_start());
        self.bump(SyntaxKind::LParen);

        while self.at_operand() {
            self.parse_expression();
            if !self.eat(TokenKind::Comma, SyntaxKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen, SyntaxKind::RParen);
        self.builder.finish_node();
    }
}
