//! Recursive descent parser producing the concrete syntax tree
//!
//! Each grammar rule is one method that opens a branch node, matches its
//! tokens into leaves and returns to the parent branch. A mismatched token
//! is reported but not consumed; an unrecognised statement start triggers
//! panic mode. Any recorded error discards the whole tree.

use crate::error::{no_tokens_remaining, syntax_error, unexpected_token};
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::syntax_tree::{Rule, SyntaxTree, TreeBuilder};
use core_types::{Diagnostic, DiagnosticLog, Severity, Stage};

/// Token kinds panic mode stops at
pub const RECOVERY_SET: [TokenKind; 10] = [
    TokenKind::Identifier,
    TokenKind::IntType,
    TokenKind::StringType,
    TokenKind::BooleanType,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Print,
    TokenKind::LeftBrace,
    TokenKind::RightBrace,
    TokenKind::EndOfProgram,
];

/// Parser for one program unit
pub struct Parser<'a> {
    tokens: TokenStream,
    builder: TreeBuilder,
    diagnostics: &'a mut DiagnosticLog,
    errors: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over an already filtered token stream
    pub fn new(tokens: TokenStream, diagnostics: &'a mut DiagnosticLog) -> Self {
        Self {
            tokens,
            builder: TreeBuilder::new(),
            diagnostics,
            errors: 0,
        }
    }

    /// Parse a whole program.
    ///
    /// Returns the tree only when no syntax error was recorded.
    pub fn parse(mut self) -> Option<SyntaxTree> {
        if self.tokens.is_empty() {
            self.report(syntax_error("no tokens to parse", None));
            return None;
        }

        log::debug!("parsing {} tokens", self.tokens.len());
        self.parse_program();

        if let Some(extra) = self.tokens.peek() {
            log::debug!("{} tokens left after end of program, first {}", self.tokens.len(), extra);
        }

        let errors = self.errors;
        self.diagnostics.info(
            Stage::Parser,
            format!("parse completed with {} error(s)", errors),
            None,
        );
        if errors == 0 {
            Some(self.builder.finish())
        } else {
            log::debug!("discarding syntax tree after {} parse errors", errors);
            None
        }
    }

    /// Number of syntax errors recorded so far
    pub fn error_count(&self) -> usize {
        self.errors
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.errors += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.peek().map(|t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn trace_expect(&mut self, expected: &str) {
        if !self.diagnostics.is_verbose() {
            return;
        }
        let (found, span) = match self.tokens.peek() {
            Some(token) => (token.to_string(), Some(token.span())),
            None => ("nothing".to_string(), None),
        };
        self.diagnostics.debug(
            Stage::Parser,
            format!("expecting {}, found {}", expected, found),
            span,
        );
    }

    /// Consume the current token as a leaf if it has the expected kind.
    /// A mismatch is reported and the token is left in place.
    fn match_token(&mut self, expected: TokenKind) -> bool {
        self.match_any(&[expected], expected.describe())
    }

    fn match_any(&mut self, accepted: &[TokenKind], expected: &str) -> bool {
        self.trace_expect(expected);
        let matched = match self.tokens.peek() {
            None => {
                let kind = accepted.first().copied().unwrap_or(TokenKind::EndOfProgram);
                self.report(no_tokens_remaining(kind));
                return false;
            }
            Some(token) if accepted.contains(&token.kind) => true,
            Some(token) => {
                let diagnostic = unexpected_token(expected, token);
                self.report(diagnostic);
                false
            }
        };
        if matched {
            if let Some(token) = self.tokens.next_token() {
                log::trace!("matched {}", token);
                self.builder.add_leaf(token);
            }
        }
        matched
    }

    fn open(&mut self, rule: Rule) {
        log::trace!("enter {}", rule);
        self.builder.add_branch(rule);
    }

    fn close(&mut self) {
        self.builder.ascend();
    }

    fn parse_program(&mut self) {
        self.open(Rule::Program);
        self.parse_block();
        self.match_token(TokenKind::EndOfProgram);
        self.close();
    }

    fn parse_block(&mut self) {
        self.open(Rule::Block);
        self.match_token(TokenKind::LeftBrace);
        self.parse_statement_list();
        self.match_token(TokenKind::RightBrace);
        self.close();
    }

    fn parse_statement_list(&mut self) {
        self.open(Rule::StatementList);
        while let Some(kind) = self.peek_kind() {
            if matches!(kind, TokenKind::RightBrace | TokenKind::EndOfProgram) {
                break;
            }
            self.parse_statement();
        }
        self.close();
    }

    fn parse_statement(&mut self) {
        let kind = match self.peek_kind() {
            None | Some(TokenKind::RightBrace) | Some(TokenKind::EndOfProgram) => return,
            Some(kind) => kind,
        };

        let rule = match kind {
            TokenKind::Print => Rule::PrintStatement,
            TokenKind::Identifier => Rule::AssignmentStatement,
            k if k.is_type() => Rule::VarDecl,
            TokenKind::While => Rule::WhileStatement,
            TokenKind::If => Rule::IfStatement,
            TokenKind::LeftBrace => Rule::Block,
            _ => {
                self.panic_mode();
                return;
            }
        };

        self.open(Rule::Statement);
        match rule {
            Rule::PrintStatement => self.parse_print(),
            Rule::AssignmentStatement => self.parse_assignment(),
            Rule::VarDecl => self.parse_var_decl(),
            Rule::WhileStatement => self.parse_while(),
            Rule::IfStatement => self.parse_if(),
            _ => self.parse_block(),
        }
        self.close();
    }

    /// Discard tokens until one in [`RECOVERY_SET`] is current
    fn panic_mode(&mut self) {
        if let Some(token) = self.tokens.peek() {
            let diagnostic = syntax_error(
                format!(
                    "invalid statement starting with {} '{}' at ({}:{})",
                    token.kind, token.text, token.line, token.column
                ),
                Some(token),
            );
            self.report(diagnostic);
        }

        while let Some(kind) = self.peek_kind() {
            if RECOVERY_SET.contains(&kind) {
                break;
            }
            if let Some(token) = self.tokens.next_token() {
                self.diagnostics.info(
                    Stage::Parser,
                    format!("panic mode discarded {}", token),
                    Some(token.span()),
                );
            }
        }
        log::debug!("panic mode recovered at {:?}", self.peek_kind());
    }

    fn parse_print(&mut self) {
        self.open(Rule::PrintStatement);
        self.match_token(TokenKind::Print);
        self.match_token(TokenKind::LeftParen);
        self.parse_expression();
        self.match_token(TokenKind::RightParen);
        self.close();
    }

    fn parse_assignment(&mut self) {
        self.open(Rule::AssignmentStatement);
        self.parse_identifier();
        self.match_token(TokenKind::Assign);
        self.parse_expression();
        self.close();
    }

    fn parse_var_decl(&mut self) {
        self.open(Rule::VarDecl);
        self.open(Rule::Type);
        self.match_any(
            &[TokenKind::IntType, TokenKind::StringType, TokenKind::BooleanType],
            "type",
        );
        self.close();
        self.parse_identifier();
        self.close();
    }

    fn parse_while(&mut self) {
        self.open(Rule::WhileStatement);
        self.match_token(TokenKind::While);
        self.parse_condition();
        self.parse_statement();
        self.close();
    }

    fn parse_if(&mut self) {
        self.open(Rule::IfStatement);
        self.match_token(TokenKind::If);
        self.parse_condition();
        self.parse_statement();
        self.close();
    }

    fn parse_condition(&mut self) {
        self.open(Rule::Condition);
        self.match_token(TokenKind::LeftParen);
        self.parse_operand();
        if self.peek_kind().map_or(false, |k| k.is_bool_op()) {
            self.parse_bool_op();
            self.parse_expression();
        }
        self.match_token(TokenKind::RightParen);
        self.close();
    }

    fn parse_expression(&mut self) {
        self.parse_expression_with(true);
    }

    /// Left operand of a comparison: a boolean literal does not absorb the
    /// operator that follows it.
    fn parse_operand(&mut self) {
        self.parse_expression_with(false);
    }

    fn parse_expression_with(&mut self, chain: bool) {
        self.open(Rule::Expression);
        match self.peek_kind() {
            Some(TokenKind::Identifier) => self.parse_identifier(),
            Some(TokenKind::Digit) => self.parse_int_expr(),
            Some(TokenKind::StringLiteral) => self.parse_string_expr(),
            Some(TokenKind::LeftParen) | Some(TokenKind::True) | Some(TokenKind::False) => {
                self.parse_boolean_expr(chain)
            }
            Some(_) => {
                if let Some(token) = self.tokens.peek() {
                    let diagnostic = unexpected_token("expression", token);
                    self.report(diagnostic);
                }
            }
            None => self.report(no_tokens_remaining(TokenKind::Identifier)),
        }
        self.close();
    }

    fn parse_int_expr(&mut self) {
        self.open(Rule::IntExpr);
        self.match_token(TokenKind::Digit);
        if self.check(TokenKind::Plus) {
            self.match_token(TokenKind::Plus);
            self.parse_expression();
        }
        self.close();
    }

    fn parse_string_expr(&mut self) {
        self.open(Rule::StringExpr);
        self.match_token(TokenKind::StringLiteral);
        self.close();
    }

    fn parse_boolean_expr(&mut self, chain: bool) {
        self.open(Rule::BooleanExpr);
        if self.check(TokenKind::LeftParen) {
            self.match_token(TokenKind::LeftParen);
            self.parse_operand();
            self.parse_bool_op();
            self.parse_expression();
            self.match_token(TokenKind::RightParen);
        } else {
            self.match_any(&[TokenKind::True, TokenKind::False], "boolean value");
            if chain && self.peek_kind().map_or(false, |k| k.is_bool_op()) {
                self.parse_bool_op();
                self.parse_expression();
            }
        }
        self.close();
    }

    fn parse_bool_op(&mut self) {
        self.open(Rule::BoolOp);
        self.match_any(&[TokenKind::Equality, TokenKind::Inequality], "boolean operator");
        self.close();
    }

    fn parse_identifier(&mut self) {
        self.open(Rule::Identifier);
        self.match_token(TokenKind::Identifier);
        self.close();
    }
}

/// Parse a token stream, recording diagnostics into `diagnostics`
pub fn parse(tokens: TokenStream, diagnostics: &mut DiagnosticLog) -> Option<SyntaxTree> {
    Parser::new(tokens, diagnostics).parse()
}

/// The leaf tokens of a tree in order, for display
pub fn leaf_texts(tree: &SyntaxTree) -> Vec<String> {
    tree.leaves().into_iter().map(|t: &Token| t.text.clone()).collect()
}
