//! Script tokenizer.
//!
//! Total and lenient: every input produces a token stream ending in `Eof`, and
//! characters that start no token are dropped. Line comments (`//`) are
//! skipped, except the `//@version=N` pragma which is emitted as a token.
//! Newlines are emitted as statement separators.

use crate::domain::token::{Token, TokenKind, classify_word};

const VERSION_PRAGMA: &str = "//@version=";

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        self.column += 1;
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>, column: usize) {
        self.tokens.push(Token::new(kind, value, self.line, column));
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_comment(&mut self) {
        let column = self.column;
        if self.remaining().starts_with(VERSION_PRAGMA) {
            for _ in 0..VERSION_PRAGMA.len() {
                self.advance();
            }
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let digits = &self.input[start..self.pos];
            if !digits.is_empty() {
                self.push(TokenKind::VersionPragma, digits, column);
            }
        }
        self.skip_line();
    }

    /// Digits with at most one decimal point.
    fn read_number(&mut self) {
        let column = self.column;
        let start = self.pos;
        let mut has_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        self.push(TokenKind::Number, text, column);
    }

    /// Backslash escapes are consumed verbatim; an unterminated string runs to end of input.
    fn read_string(&mut self, quote: char) {
        let column = self.column;
        self.advance();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == quote {
                break;
            }
            if ch == '\\' {
                self.advance();
            }
            self.advance();
        }
        let text = &self.input[start..self.pos.min(self.input.len())];
        self.advance();
        self.push(TokenKind::Str, text, column);
    }

    fn read_identifier(&mut self) {
        let column = self.column;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.input[start..self.pos];
        self.push(classify_word(word), word, column);
    }

    fn read_operator(&mut self, ch: char) {
        let column = self.column;
        let two = match (ch, self.peek_at(1)) {
            (':', Some('=')) => Some(TokenKind::ColonAssign),
            ('=', Some('=')) => Some(TokenKind::Equal),
            ('!', Some('=')) => Some(TokenKind::NotEqual),
            ('>', Some('=')) => Some(TokenKind::GreaterEqual),
            ('<', Some('=')) => Some(TokenKind::LessEqual),
            ('=', Some('>')) => Some(TokenKind::Arrow),
            _ => None,
        };
        if let Some(kind) = two {
            let text = &self.input[self.pos..self.pos + 2];
            self.push(kind, text, column);
            self.advance();
            self.advance();
            return;
        }

        let single = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '=' => Some(TokenKind::Assign),
            '>' => Some(TokenKind::Greater),
            '<' => Some(TokenKind::Less),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ',' => Some(TokenKind::Comma),
            '.' => Some(TokenKind::Dot),
            ':' => Some(TokenKind::Colon),
            '?' => Some(TokenKind::Question),
            _ => None,
        };
        if let Some(kind) = single {
            self.push(kind, ch.to_string(), column);
        }
        self.advance();
    }

    fn run(mut self) -> Vec<Token> {
        loop {
            self.skip_whitespace();
            let Some(ch) = self.peek() else {
                break;
            };

            if ch == '/' && self.peek_at(1) == Some('/') {
                self.read_comment();
            } else if ch == '\n' {
                self.push(TokenKind::Newline, "\n", self.column);
                self.advance();
                self.line += 1;
                self.column = 1;
            } else if ch.is_ascii_digit()
                || (ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
            {
                self.read_number();
            } else if ch == '"' || ch == '\'' {
                self.read_string(ch);
            } else if ch.is_alphabetic() || ch == '_' {
                self.read_identifier();
            } else {
                self.read_operator(ch);
            }
        }
        let column = self.column;
        self.push(TokenKind::Eof, "", column);
        self.tokens
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn dotted_builtin_is_one_token() {
        let tokens = tokenize("ta.sma(close, 14)");
        assert_eq!(tokens[0].kind, TokenKind::BuiltinFunction);
        assert_eq!(tokens[0].value, "ta.sma");
        assert_eq!(tokens[2].kind, TokenKind::BuiltinVariable);
        assert_eq!(tokens[4].kind, TokenKind::Number);
        assert_eq!(tokens[4].value, "14");
    }

    #[test]
    fn two_char_operators_win() {
        assert_eq!(
            kinds("a := b == c != d >= e <= f => g"),
            vec![
                TokenKind::Identifier,
                TokenKind::ColonAssign,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::GreaterEqual,
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_decimal_point() {
        let tokens = tokenize("1.5.2");
        assert_eq!(tokens[0].value, "1.5");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].value, ".2");
    }

    #[test]
    fn leading_dot_number() {
        let tokens = tokenize(".5");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value, ".5");
    }

    #[test]
    fn strings_with_either_quote_and_escape() {
        let tokens = tokenize(r#""a\"b" 'c'"#);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, r#"a\"b"#);
        assert_eq!(tokens[1].value, "c");
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens[0].value, "abc");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn comments_are_skipped_and_newlines_kept() {
        assert_eq!(
            kinds("x = 1 // note\ny"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn version_pragma_token() {
        let tokens = tokenize("//@version=5\nstrategy(\"T\")");
        assert_eq!(tokens[0].kind, TokenKind::VersionPragma);
        assert_eq!(tokens[0].value, "5");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
    }

    #[test]
    fn unknown_characters_are_dropped() {
        assert_eq!(
            kinds("a # @ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn logical_words_and_booleans() {
        assert_eq!(
            kinds("not true and false or x"),
            vec![
                TokenKind::Not,
                TokenKind::Bool,
                TokenKind::And,
                TokenKind::Bool,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = tokenize("a\n  bb");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    proptest! {
        #[test]
        fn tokenize_is_total(source in "\\PC{0,120}") {
            let tokens = tokenize(&source);
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }
}
