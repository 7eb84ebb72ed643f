//! Lexer - converts one program unit's source text into tokens

use crate::error::{lex_error, lex_warning};
use core_types::{DiagnosticLog, SourcePosition, SourceSpan, Stage};
use std::collections::VecDeque;
use std::fmt;

/// The marker that ends a program unit
pub const END_OF_PROGRAM: char = '$';

/// Token kinds of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `+`
    Plus,
    /// `=`
    Assign,
    /// `==`
    Equality,
    /// `!=`
    Inequality,
    /// `"..."`
    StringLiteral,
    /// A single decimal digit
    Digit,
    /// A single lowercase letter
    Identifier,
    /// `print`
    Print,
    /// `while`
    While,
    /// `if`
    If,
    /// `int`
    IntType,
    /// `string`
    StringType,
    /// `boolean`
    BooleanType,
    /// `true`
    True,
    /// `false`
    False,
    /// `/* ... */`
    Comment,
    /// Space, tab or line break
    Whitespace,
    /// `$`, or the synthesized end of input
    EndOfProgram,
}

impl TokenKind {
    /// Short name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Plus => "'+'",
            TokenKind::Assign => "'='",
            TokenKind::Equality => "'=='",
            TokenKind::Inequality => "'!='",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Digit => "digit",
            TokenKind::Identifier => "identifier",
            TokenKind::Print => "'print'",
            TokenKind::While => "'while'",
            TokenKind::If => "'if'",
            TokenKind::IntType => "'int'",
            TokenKind::StringType => "'string'",
            TokenKind::BooleanType => "'boolean'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::EndOfProgram => "end of program",
        }
    }

    /// Whitespace and comments, which never reach the parser
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// `int`, `string` or `boolean`
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::IntType | TokenKind::StringType | TokenKind::BooleanType
        )
    }

    /// `==` or `!=`
    pub fn is_bool_op(&self) -> bool {
        matches!(self, TokenKind::Equality | TokenKind::Inequality)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Keywords, longest first so that a longer keyword wins over a shorter
/// one sharing its prefix.
const KEYWORDS: [(&str, TokenKind); 8] = [
    ("boolean", TokenKind::BooleanType),
    ("string", TokenKind::StringType),
    ("print", TokenKind::Print),
    ("while", TokenKind::While),
    ("false", TokenKind::False),
    ("true", TokenKind::True),
    ("int", TokenKind::IntType),
    ("if", TokenKind::If),
];

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Classification
    pub kind: TokenKind,
    /// Source lexeme (string literals keep their quotes)
    pub text: String,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
    /// Character offset in the program unit
    pub offset: usize,
}

impl Token {
    /// Create a token starting at `position`
    pub fn new(kind: TokenKind, text: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            line: position.line,
            column: position.column,
            offset: position.offset,
        }
    }

    /// Where the token starts
    pub fn position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.offset)
    }

    /// The token as a diagnostic span
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(self.text.clone(), self.position())
    }

    /// Content of a string literal without quotes, with doubled quotes
    /// collapsed. For any other token this is the text itself.
    pub fn string_value(&self) -> String {
        if self.kind != TokenKind::StringLiteral {
            return self.text.clone();
        }
        let inner = self.text.strip_prefix('"').unwrap_or(&self.text);
        let trailing = inner.chars().rev().take_while(|&c| c == '"').count();
        let inner = if trailing % 2 == 1 {
            &inner[..inner.len() - 1]
        } else {
            inner
        };
        inner.replace("\"\"", "\"")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [ {} ]", self.kind, self.text)
    }
}

/// Ordered tokens of one program unit, consumed from the front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    /// Create a stream from tokens in source order
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// The next token, without consuming it
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Number of tokens left
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when every token has been consumed
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the remaining tokens
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Kinds of the remaining tokens
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::collections::vec_deque::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// Lexer for one program unit
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// The text being lexed
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// True once the end-of-program token has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get the next token from the source.
    ///
    /// Invalid characters are reported and skipped. Once the end of the
    /// program has been reached every further call returns another
    /// `EndOfProgram` token.
    pub fn next_token(&mut self, diagnostics: &mut DiagnosticLog) -> Token {
        loop {
            if self.finished {
                return Token::new(TokenKind::EndOfProgram, "", self.current_position());
            }
            if self.is_at_end() {
                self.finished = true;
                let position = self.current_position();
                diagnostics.push(lex_warning(
                    format!("missing program separator '{}' at end of input", END_OF_PROGRAM),
                    SourceSpan::new("", position),
                ));
                return Token::new(TokenKind::EndOfProgram, "", position);
            }

            let start = self.current_position();
            let ch = self.peek();

            let token = match ch {
                END_OF_PROGRAM => {
                    self.advance();
                    self.finished = true;
                    Token::new(TokenKind::EndOfProgram, ch.to_string(), start)
                }
                '{' | '}' | '(' | ')' | '+' => {
                    self.advance();
                    let kind = match ch {
                        '{' => TokenKind::LeftBrace,
                        '}' => TokenKind::RightBrace,
                        '(' => TokenKind::LeftParen,
                        ')' => TokenKind::RightParen,
                        _ => TokenKind::Plus,
                    };
                    Token::new(kind, ch.to_string(), start)
                }
                '=' => {
                    self.advance();
                    if self.match_char('=') {
                        Token::new(TokenKind::Equality, "==", start)
                    } else {
                        Token::new(TokenKind::Assign, "=", start)
                    }
                }
                '!' if self.peek_next() == Some('=') => {
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::Inequality, "!=", start)
                }
                '"' => self.scan_string(diagnostics),
                _ if ch.is_ascii_digit() => {
                    self.advance();
                    Token::new(TokenKind::Digit, ch.to_string(), start)
                }
                '/' if self.peek_next() == Some('*') => self.scan_comment(diagnostics),
                '\n' | '\r' => {
                    self.advance();
                    if ch == '\r' {
                        self.match_char('\n');
                    }
                    self.new_line();
                    Token::new(TokenKind::Whitespace, "\n", start)
                }
                ' ' | '\t' => {
                    self.advance();
                    Token::new(TokenKind::Whitespace, ch.to_string(), start)
                }
                _ if is_letter(ch) => self.scan_word(),
                _ => {
                    self.advance();
                    diagnostics.push(lex_error(
                        format!("invalid character '{}'", ch.escape_debug()),
                        SourceSpan::new(ch.to_string(), start),
                    ));
                    continue;
                }
            };

            log::trace!("lexed {} at {}", token, start);
            diagnostics.debug(
                Stage::Lexer,
                format!("{} found at ({})", token, start),
                Some(token.span()),
            );
            return token;
        }
    }

    fn scan_string(&mut self, diagnostics: &mut DiagnosticLog) -> Token {
        let start = self.current_position();
        let mut text = String::from('"');
        self.advance();

        loop {
            if self.is_at_end() || matches!(self.peek(), '\n' | '\r' | END_OF_PROGRAM) {
                diagnostics.push(lex_error(
                    "unterminated string",
                    SourceSpan::new(text.clone(), start),
                ));
                break;
            }

            let position = self.current_position();
            let ch = self.advance();
            if ch == '"' {
                if self.match_char('"') {
                    text.push_str("\"\"");
                    continue;
                }
                text.push('"');
                break;
            }
            if is_letter(ch) || ch == ' ' {
                text.push(ch);
            } else {
                diagnostics.push(lex_error(
                    format!("invalid character '{}' in string", ch.escape_debug()),
                    SourceSpan::new(ch.to_string(), position),
                ));
            }
        }

        Token::new(TokenKind::StringLiteral, text, start)
    }

    fn scan_comment(&mut self, diagnostics: &mut DiagnosticLog) -> Token {
        let start = self.current_position();
        let mut text = String::from("/*");
        self.advance();
        self.advance();

        loop {
            if self.is_at_end() {
                diagnostics.push(lex_error(
                    "unterminated comment",
                    SourceSpan::new(text.clone(), start),
                ));
                break;
            }
            if self.peek() == '*' && self.peek_next() == Some('/') {
                self.advance();
                self.advance();
                text.push_str("*/");
                break;
            }

            let position = self.current_position();
            let ch = self.advance();
            match ch {
                '\n' => self.new_line(),
                '\r' | '\t' | ' ' => {}
                _ if ch.is_control() => {
                    diagnostics.push(lex_error(
                        format!("invalid character '{}' in comment", ch.escape_debug()),
                        SourceSpan::new(ch.to_string(), position),
                    ));
                }
                _ => {}
            }
            text.push(ch);
        }

        Token::new(TokenKind::Comment, text, start)
    }

    /// Keyword starting at the cursor, or a one-letter identifier
    fn scan_word(&mut self) -> Token {
        let start = self.current_position();
        for (keyword, kind) in KEYWORDS.iter() {
            if self.matches_ahead(keyword) {
                for _ in 0..keyword.len() {
                    self.advance();
                }
                return Token::new(*kind, *keyword, start);
            }
        }
        let ch = self.advance();
        Token::new(TokenKind::Identifier, ch.to_string(), start)
    }

    fn matches_ahead(&self, word: &str) -> bool {
        word.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.position + i) == Some(&c))
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.position]
        }
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        self.column += 1;
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.position] != expected {
            false
        } else {
            self.position += 1;
            self.column += 1;
            true
        }
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition::new(self.line, self.column, self.position)
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_lowercase()
}

/// Lex a whole program unit, keeping whitespace and comments
pub fn lex_all(source: &str, diagnostics: &mut DiagnosticLog) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token(diagnostics);
        let done = token.kind == TokenKind::EndOfProgram;
        tokens.push(token);
        if done {
            break;
        }
    }

    let errors = diagnostics.count(Stage::Lexer, core_types::Severity::Error);
    log::debug!("lexed {} tokens with {} errors", tokens.len(), errors);
    diagnostics.info(
        Stage::Lexer,
        format!("lex completed with {} error(s)", errors),
        None,
    );
    tokens
}

/// Lex a whole program unit into the stream the parser consumes
pub fn tokenize(source: &str, diagnostics: &mut DiagnosticLog) -> TokenStream {
    TokenStream::new(
        lex_all(source, diagnostics)
            .into_iter()
            .filter(|t| !t.kind.is_trivia()),
    )
}
