//! Lexer for C source
//!
//! Converts source text into a flat token stream. Unlike a compiler lexer it
//! keeps trivia (whitespace, newlines, comments) as tokens so that consumers
//! can map back to the original layout; the declaration scanners filter them.
//! Preprocessor directives become a single token per logical line.

use crate::frontend::token::{Token, TokenCategory};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based) and column (0-based)
    line: u32,
    column: u32,
    /// Location of the current token's first character
    start_line: u32,
    start_column: u32,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            column: 0,
            start_line: 1,
            start_column: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    fn make_token(&self, category: TokenCategory) -> Token {
        Token::new(category, self.lexeme(), self.start_line, self.start_column)
    }

    /// Run of spaces, tabs, carriage returns and form feeds
    fn read_whitespace(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' || c == '\x0c' {
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenCategory::Whitespace)
    }

    fn read_line_comment(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.make_token(TokenCategory::Comment)
    }

    /// Block comments may span lines; an unterminated one runs to end of input
    fn read_block_comment(&mut self) -> Token {
        self.advance(); // /
        self.advance(); // *
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_next() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
        self.make_token(TokenCategory::Comment)
    }

    /// A directive runs to the end of the line. Backslash-newline continues it;
    /// the backslash is dropped and the newline kept in the token text.
    fn read_directive(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            if c == '\\' && self.continues_line() {
                self.advance(); // backslash
                while let Some(ws) = self.peek() {
                    if ws == '\n' {
                        break;
                    }
                    self.advance();
                }
                self.advance(); // newline
                text.push('\n');
                continue;
            }
            text.push(c);
            self.advance();
        }

        let directive = text
            .trim_start_matches('#')
            .trim_start()
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .next()
            .unwrap_or("");
        let category = match directive {
            "include" => TokenCategory::Include,
            "define" => TokenCategory::Define,
            _ => TokenCategory::Preprocessor,
        };
        Token::new(category, text.trim_end(), self.start_line, self.start_column)
    }

    /// True if the backslash at `pos` is followed only by blanks before the newline
    fn continues_line(&self) -> bool {
        let mut i = self.pos + 1;
        while let Some(&c) = self.source.get(i) {
            match c {
                '\n' => return true,
                ' ' | '\t' | '\r' => i += 1,
                _ => return false,
            }
        }
        false
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();

        // Encoding prefixes: L"..", u"..", U"..", u8"..", L'x'
        if matches!(text.as_str(), "L" | "u" | "U" | "u8") {
            match self.peek() {
                Some('"') => return self.read_quoted('"', TokenCategory::String),
                Some('\'') => return self.read_quoted('\'', TokenCategory::CharLiteral),
                _ => {}
            }
        }

        let category = TokenCategory::keyword_from_str(&text).unwrap_or(TokenCategory::Identifier);
        Token::new(category, text, self.start_line, self.start_column)
    }

    /// Numbers are read as preprocessing numbers: digits, letters, dots,
    /// underscores, and a sign directly after an exponent marker.
    fn read_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                self.advance();
                if matches!(c, 'e' | 'E' | 'p' | 'P') && matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
        self.make_token(TokenCategory::Number)
    }

    /// String or character literal, raw text including quotes and prefix.
    /// Unterminated literals stop at the end of the line.
    fn read_quoted(&mut self, quote: char, category: TokenCategory) -> Token {
        self.advance(); // opening quote
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                break;
            } else if c == '\\' {
                self.advance();
                if self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else if c == '\n' {
                break;
            } else {
                self.advance();
            }
        }
        self.make_token(category)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::eof(self.line, self.column),
        };

        match c {
            '\n' => {
                self.advance();
                self.make_token(TokenCategory::Newline)
            }
            ' ' | '\t' | '\r' | '\x0c' => self.read_whitespace(),
            '/' if self.peek_next() == Some('/') => self.read_line_comment(),
            '/' if self.peek_next() == Some('*') => self.read_block_comment(),
            '#' => self.read_directive(),
            '"' => self.read_quoted('"', TokenCategory::String),
            '\'' => self.read_quoted('\'', TokenCategory::CharLiteral),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(),
            '-' if self.peek_next() == Some('>') => {
                self.advance();
                self.advance();
                self.make_token(TokenCategory::Arrow)
            }
            // Shifts stay one token so enum initializers read naturally
            '<' | '>' if self.peek_next() == Some(c) => {
                self.advance();
                self.advance();
                self.make_token(TokenCategory::Unknown)
            }
            _ => {
                self.advance();
                let category = TokenCategory::punct_from_char(c).unwrap_or(TokenCategory::Unknown);
                self.make_token(category)
            }
        }
    }

    /// Tokenize the entire source and return all tokens, ending with `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.category == TokenCategory::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Tokenize a source string
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
