use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, Type};

pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column_offset: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            column_offset: 0,
        }
    }

    /// Scans the source code and returns a vector of tokens.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(
            Token::new(
                Type::EOF,
                String::from(""),
                None,
                Location::new(self.line, self.current - self.column_offset),
            )
        );

        self.tokens.clone()
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> char {
        match self.source.next() {
            Some(char) => {
                self.current += 1;
                char
            },
            None => panic!("tried to advance past end of the file."),
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> char {
        self.source.peek().copied().unwrap_or('\0')
    }

    /// Returns the character after the next one without consuming it.
    fn peek_next(&mut self) -> char {
        self.source.peek_nth(1).copied().unwrap_or('\0')
    }

    /// Returns if the character after the next one is the expected character.
    fn match_next(&mut self, expected: char) -> bool {
        matches!(self.source.peek_nth(1), Some(char) if *char == expected)
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, r#type: Type, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(
            Token::new(
                r#type,
                lexeme,
                literal,
                Location::new(self.line, self.start - self.column_offset),
            )
        );
    }

    /// Adds a new single char token to the list of tokens.
    fn add_single_char_token(&mut self, r#type: Type) {
        let c = self.advance();
        self.add_token(r#type, c.to_string(), None);
    }

    /// Adds a new double char token to the list of tokens.
    fn add_double_char_token(&mut self, r#type: Type) {
        let first = self.advance();
        let second = self.advance();

        self.add_token(r#type, format!("{first}{second}"), None);
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    /// Advances over a newline, updating the line counters.
    fn new_line(&mut self) {
        self.line += 1;
        self.column_offset = self.current;
    }

    /// Handles a string literal. Newlines are allowed inside strings;
    /// there are no escape sequences in this dialect.
    fn string(&mut self) {
        self.advance(); // Move past the starting double quotes.
        let start = Location::new(self.line, self.start - self.column_offset);

        let mut value = Vec::new();
        while !self.is_at_end() && self.peek() != '"' {
            let c = self.advance();
            if c == '\n' {
                self.new_line();
            }
            value.push(c);
        }

        if self.is_at_end() {
            ScanError {
                location: start,
                message: String::from("Unterminated string."),
            }.throw();
            return;
        }

        self.advance();  // Move past the closing double quotes.

        let value: String = value.into_iter().collect();

        // The literal does not include the double quotes unlike the lexeme.
        // The token is located at the opening quote, which may be lines above
        // the closing one.
        self.tokens.push(Token::new(
            Type::String,
            format!("\"{value}\""),
            Some(Literal::String(value)),
            start,
        ));
    }

    /// Handles a number literal. A decimal point must be followed by at
    /// least one digit, otherwise it is scanned as a separate dot token.
    fn number(&mut self) {
        let mut value = Vec::new();

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            value.push(self.advance());  // Consume the dot.

            while self.peek().is_ascii_digit() {
                value.push(self.advance());
            }
        }

        let value: String = value.into_iter().collect();
        let number: f64 = value.parse().expect("scanned number to be parsable");

        self.add_token(Type::Number, value, Some(Literal::Number(number)));
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        let mut value = Vec::new();

        while self.peek().is_ascii_alphanumeric() {
            value.push(self.advance());
        }

        let value = String::from_iter(value);
        let token_type = match value.as_str() {
            "and"      => Type::And,
            "break"    => Type::Break,
            "class"    => Type::Class,
            "else"     => Type::Else,
            "false"    => Type::False,
            "for"      => Type::For,
            "fun"      => Type::Fun,
            "if"       => Type::If,
            "nil"      => Type::Nil,
            "or"       => Type::Or,
            "print"    => Type::Print,
            "return"   => Type::Return,
            "super"    => Type::Super,
            "this"     => Type::This,
            "trait"    => Type::Trait,
            "true"     => Type::True,
            "var"      => Type::Var,
            "while"    => Type::While,
            "with"     => Type::With,
            _          => Type::Identifier,
        };

        self.add_token(token_type, value, None);
    }

    /// Skips a block comment. Block comments nest; every `/*` must be
    /// matched by a `*/` before the end of the file.
    fn block_comment(&mut self) {
        let start = Location::new(self.line, self.start - self.column_offset);

        self.advance(); // Move past the '/'.
        self.advance(); // Move past the '*'.

        let mut depth = 1;
        while depth > 0 {
            if self.is_at_end() {
                ScanError {
                    location: start,
                    message: String::from("Unterminated block comment."),
                }.throw();
                return;
            }

            match self.advance() {
                '/' if self.peek() == '*' => {
                    self.advance();
                    depth += 1;
                },
                '*' if self.peek() == '/' => {
                    self.advance();
                    depth -= 1;
                },
                '\n' => self.new_line(),
                _ => (),
            }
        }
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let c = self.peek();
        match c {
            // One character tokens
            '(' => self.add_single_char_token(Type::LeftParen),
            ')' => self.add_single_char_token(Type::RightParen),
            '{' => self.add_single_char_token(Type::LeftBrace),
            '}' => self.add_single_char_token(Type::RightBrace),
            ',' => self.add_single_char_token(Type::Comma),
            '.' => self.add_single_char_token(Type::Dot),
            '-' => self.add_single_char_token(Type::Minus),
            '+' => self.add_single_char_token(Type::Plus),
            ';' => self.add_single_char_token(Type::Semicolon),
            '*' => self.add_single_char_token(Type::Star),
            '%' => self.add_single_char_token(Type::Percent),
            '?' => self.add_single_char_token(Type::Question),
            ':' => self.add_single_char_token(Type::Colon),

            // Two character tokens
            '!' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::BangEqual);
                } else {
                    self.add_single_char_token(Type::Bang)
                };
            },
            '=' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::EqualEqual);
                } else {
                    self.add_single_char_token(Type::Equal)
                };
            },
            '<' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::LessEqual);
                } else {
                    self.add_single_char_token(Type::Less)
                };
            },
            '>' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::GreaterEqual);
                } else {
                    self.add_single_char_token(Type::Greater)
                };
            },
            '/' => {
                if self.match_next('/') {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                } else if self.match_next('*') {
                    self.block_comment();
                } else {
                    self.add_single_char_token(Type::Slash);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {
                self.advance();
            },

            // Update line counter
            '\n' => {
                self.advance();
                self.new_line();
            },

            // String
            '"' => self.string(),

            // Numbers
            c if c.is_ascii_digit() => self.number(),

            // Identifiers
            c if c.is_ascii_alphabetic() => self.identifier(),

            _ => {
                self.advance();

                ScanError {
                    location: Location::new(self.line, self.start - self.column_offset),
                    message: format!("Unexpected character '{c}'."),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).scan_tokens()
    }

    #[test]
    fn punctuation() {
        let tokens = scan("( ) { } , . - + ; / * % ? :");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![
            Type::LeftParen, Type::RightParen, Type::LeftBrace, Type::RightBrace,
            Type::Comma, Type::Dot, Type::Minus, Type::Plus, Type::Semicolon,
            Type::Slash, Type::Star, Type::Percent, Type::Question, Type::Colon,
            Type::EOF,
        ]);
    }

    #[test]
    fn double_char_tokens() {
        let tokens = scan("! != = == > >= < <=");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![
            Type::Bang, Type::BangEqual, Type::Equal, Type::EqualEqual,
            Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual,
            Type::EOF,
        ]);
    }

    #[test]
    fn number_literals() {
        let tokens = scan("12 3.25 4.");

        assert_eq!(tokens[0].literal, Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.25)));
        // A dot not followed by a digit ends the number.
        assert_eq!(tokens[2].literal, Some(Literal::Number(4.0)));
        assert_eq!(tokens[3].r#type, Type::Dot);
    }

    #[test]
    fn string_literal_spans_lines() {
        let tokens = scan("\"one\ntwo\" x");

        assert_eq!(tokens[0].literal, Some(Literal::String(String::from("one\ntwo"))));
        assert_eq!(tokens[1].r#type, Type::Identifier);
        assert_eq!(tokens[1].location.line, 2);
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = scan("trait with nil breakage");
        let types: Vec<Type> = tokens.iter().map(|token| token.r#type).collect();

        assert_eq!(types, vec![
            Type::Trait, Type::With, Type::Nil, Type::Identifier, Type::EOF,
        ]);
    }

    #[test]
    fn nested_block_comment() {
        let tokens = scan("1 /* outer /* inner */ still out */ 2");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].literal, Some(Literal::Number(1.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(2.0)));
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = scan("var a;\nprint a;");

        assert_eq!(tokens[0].location, Location::new(1, 0));
        assert_eq!(tokens[1].location, Location::new(1, 4));
        assert_eq!(tokens[3].location, Location::new(2, 0));
        assert_eq!(tokens[4].location, Location::new(2, 6));
    }

    #[test]
    fn lexemes_reconstruct_source() {
        let source = "var answer = 6 * 7 + \"x\";";
        let tokens = scan(source);

        let lexemes: String = tokens.iter()
            .filter(|token| token.r#type != Type::EOF)
            .map(|token| token.lexeme.as_str())
            .collect();

        assert_eq!(lexemes, source.replace(' ', ""));
    }
}
