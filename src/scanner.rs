//! Lexical analyzer

use std::rc::Rc;

use tracing::debug;

use crate::ctx::Context;
use crate::diag::{Diagnostics, LexError, Position};
use crate::token::{Literal, Token, TokenKind};

/// Turns source text into a sequence of tokens.
///
/// `start` and `current` are byte offsets into `source` delimiting the lexeme being scanned.
#[derive(Debug)]
pub struct Scanner<'s> {
    source: &'s str,
    start: usize,
    current: usize,
    line: Position,
    ctx: Rc<Context>,
    tokens: Vec<Token>,
}

impl<'s> Scanner<'s> {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &'s str, ctx: Rc<Context>) -> Scanner<'s> {
        Scanner {
            source,
            start: 0,
            current: 0,
            line: 1,
            ctx,
            tokens: vec![],
        }
    }

    /// Scans the whole source.
    ///
    /// Never fails: bad characters and unterminated strings are recorded into `diags` and
    /// scanning resumes right after them.  The result always ends with a single `Eof` token.
    pub fn scan(mut self, diags: &mut Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(diags);
        }

        let eof = self.ctx.symbol("");
        self.tokens
            .push(Token::new(TokenKind::Eof, eof, None, self.line));
        debug!(tokens = self.tokens.len(), lines = self.line, "scan finished");
        self.tokens
    }

    fn scan_token(&mut self, diags: &mut Diagnostics) {
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return,
        };
        match ch {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => self.add_either('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.add_either('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.add_either('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.add_either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '/' => {
                if self.matches('/') {
                    self.skip_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => (),
            '\n' => self.line += 1,
            '"' => self.scan_string(diags),
            '0'..='9' => self.scan_number(diags),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(),
            _ => diags.lexical(self.line, LexError::UnexpectedChar(ch)),
        }
    }

    fn skip_comment(&mut self) {
        while matches!(self.peek(), Some(ch) if ch != '\n') {
            self.advance();
        }
    }

    fn scan_string(&mut self, diags: &mut Diagnostics) {
        while let Some(ch) = self.peek() {
            if ch == '"' {
                break;
            }
            if ch == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            diags.lexical(self.line, LexError::UnterminatedString);
            return;
        }

        // closing quote
        self.advance();
        let source = self.source;
        let value = Literal::Str(Rc::from(&source[self.start + 1..self.current - 1]));
        self.push_token(TokenKind::String, Some(value));
    }

    fn scan_number(&mut self, diags: &mut Diagnostics) {
        self.skip_digits();

        // A dot is part of the number only when a digit follows it.
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(ch) if ch.is_ascii_digit())
        {
            self.advance();
            self.skip_digits();
        }

        // Digits with an optional fraction always parse; the error arm is unreachable in practice.
        match self.lexeme().parse::<f64>() {
            Ok(n) => self.push_token(TokenKind::Number, Some(Literal::Number(n))),
            Err(_) => diags.lexical(
                self.line,
                LexError::BadNumberLiteral(self.lexeme().to_string()),
            ),
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
            self.advance();
        }

        let sym = self.ctx.symbol(self.lexeme());
        let kind = self.ctx.keyword(&sym).unwrap_or(TokenKind::Identifier);
        self.tokens.push(Token::new(kind, sym, None, self.line));
    }

    fn add_either(&mut self, second: char, matched: TokenKind, single: TokenKind) {
        let kind = if self.matches(second) { matched } else { single };
        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.push_token(kind, None);
    }

    fn push_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.ctx.symbol(self.lexeme());
        self.tokens
            .push(Token::new(kind, lexeme, literal, self.line));
    }

    fn lexeme(&self) -> &'s str {
        let source = self.source;
        &source[self.start..self.current]
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += ch.len_utf8();
        Some(ch)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagnosticKind;

    fn scan(input: &str) -> (Vec<Token>, Diagnostics) {
        let ctx = Context::new();
        let mut diags = Diagnostics::new();
        let tokens = Scanner::new(input, ctx).scan(&mut diags);
        (tokens, diags)
    }

    /// Kinds of the scanned tokens, without the trailing `Eof`.
    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, diags) = scan(input);
        assert!(!diags.has_errors(), "unexpected diagnostics: {}", diags);
        let mut kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds.pop(), Some(TokenKind::Eof));
        kinds
    }

    #[test]
    fn empty_source_yields_eof() {
        let (tokens, diags) = scan("");
        assert!(diags.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].line, 1);
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("(){},.-+;*/"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Star,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn two_char_tokens_use_lookahead() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
            ]
        );
        assert_eq!(kinds("!=="), vec![TokenKind::BangEqual, TokenKind::Equal]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            kinds("1 // 2 3\n4"),
            vec![TokenKind::Number, TokenKind::Number]
        );
        assert_eq!(kinds("// only a comment"), vec![]);
    }

    #[test]
    fn lexemes_are_exact_source_text() {
        let (tokens, _) = scan("foo >= 12.5");
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["foo", ">=", "12.5", ""]);
    }

    #[test]
    fn numbers_decode_to_f64() {
        let (tokens, _) = scan("42 4.25");
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(4.25)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let (tokens, _) = scan("1.");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(1.0)));
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(kinds("1.x"), vec![
            TokenKind::Number,
            TokenKind::Dot,
            TokenKind::Identifier
        ]);
    }

    #[test]
    fn strings_drop_quotes() {
        let (tokens, _) = scan("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme.as_str(), "\"hello world\"");
        assert_eq!(tokens[0].literal, Some(Literal::Str(Rc::from("hello world"))));
    }

    #[test]
    fn multi_line_string_counts_lines() {
        let (tokens, _) = scan("\"a\nb\" x");
        assert_eq!(tokens[0].literal, Some(Literal::Str(Rc::from("a\nb"))));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_reported_without_token() {
        let (tokens, diags) = scan("1 \"abc\ndef");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
        let reported: Vec<_> = diags.iter().collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].line, 2);
        assert_eq!(
            reported[0].kind,
            DiagnosticKind::Lexical(LexError::UnterminatedString)
        );
    }

    #[test]
    fn unexpected_character_does_not_stop_scanning() {
        let (tokens, diags) = scan("1 @ 2 # 3");
        let numbers = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .count();
        assert_eq!(numbers, 3);
        let errors: Vec<_> = diags.iter().map(|d| d.kind.clone()).collect();
        assert_eq!(
            errors,
            vec![
                DiagnosticKind::Lexical(LexError::UnexpectedChar('@')),
                DiagnosticKind::Lexical(LexError::UnexpectedChar('#')),
            ]
        );
    }

    #[test]
    fn modulo_is_not_an_operator() {
        let (_, diags) = scan("5 % 2");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn identifiers_continue_with_digits_and_underscores() {
        let (tokens, _) = scan("f foo _foo t42 a_b");
        let names: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(names, vec!["f", "foo", "_foo", "t42", "a_b"]);
    }

    #[test]
    fn keywords() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                TokenKind::And,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        assert_eq!(kinds("orchid variable"), vec![
            TokenKind::Identifier,
            TokenKind::Identifier
        ]);
    }

    #[test]
    fn scanner_keeps_track_of_lines() {
        let (tokens, _) = scan("1\n2 3\r\n\n4");
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 2, 4, 4]);
    }

    #[test]
    fn same_identifier_shares_symbol() {
        let (tokens, _) = scan("abc abc");
        assert_eq!(tokens[0].lexeme, tokens[1].lexeme);
    }
}
