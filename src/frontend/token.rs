//! Token definitions for C source
#![allow(dead_code)]

use serde::Serialize;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub category: TokenCategory,
    pub text: String,
    /// 1-based source line
    pub line: u32,
    /// 0-based column within the line
    pub column: u32,
}

impl Token {
    pub fn new(category: TokenCategory, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            category,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn eof(line: u32, column: u32) -> Self {
        Self::new(TokenCategory::Eof, "", line, column)
    }

    pub fn is(&self, category: TokenCategory) -> bool {
        self.category == category
    }

    pub fn is_trivia(&self) -> bool {
        self.category.is_trivia()
    }
}

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    // ============ Structural keywords ============
    /// struct
    Struct,
    /// union
    Union,
    /// enum
    Enum,
    /// typedef
    Typedef,
    /// static
    Static,
    /// extern
    Extern,
    /// inline
    Inline,
    /// const
    Const,
    /// void
    Void,

    // ============ Base-type keywords ============
    /// char
    Char,
    /// int
    Int,
    /// float
    Float,
    /// double
    Double,
    /// long
    Long,
    /// short
    Short,
    /// unsigned
    Unsigned,
    /// signed
    Signed,

    // ============ Punctuation ============
    /// {
    LBrace,
    /// }
    RBrace,
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// =
    Assign,
    /// *
    Asterisk,
    /// &
    Ampersand,
    /// ->
    Arrow,

    // ============ Literals and identifiers ============
    Identifier,
    Number,
    String,
    CharLiteral,

    // ============ Preprocessor ============
    /// `#include ...` line
    Include,
    /// `#define ...` line, continuation lines merged
    Define,
    /// any other directive line
    Preprocessor,

    // ============ Trivia ============
    Comment,
    Whitespace,
    Newline,

    // ============ Special ============
    Eof,
    Unknown,
}

impl TokenCategory {
    /// Whitespace, comments and newlines carry no meaning for declarations
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenCategory::Comment | TokenCategory::Whitespace | TokenCategory::Newline
        )
    }

    /// Check if this category is a keyword
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenCategory::Struct
                | TokenCategory::Union
                | TokenCategory::Enum
                | TokenCategory::Typedef
                | TokenCategory::Static
                | TokenCategory::Extern
                | TokenCategory::Inline
                | TokenCategory::Const
                | TokenCategory::Void
                | TokenCategory::Char
                | TokenCategory::Int
                | TokenCategory::Float
                | TokenCategory::Double
                | TokenCategory::Long
                | TokenCategory::Short
                | TokenCategory::Unsigned
                | TokenCategory::Signed
        )
    }

    /// Keywords, identifiers and numbers: tokens that need a separating space
    /// when two of them are adjacent.
    pub fn is_word(self) -> bool {
        self.is_keyword() || matches!(self, TokenCategory::Identifier | TokenCategory::Number)
    }

    /// `struct` or `union`
    pub fn is_aggregate_keyword(self) -> bool {
        matches!(self, TokenCategory::Struct | TokenCategory::Union)
    }

    /// Look up a keyword. C keywords are case-sensitive.
    pub fn keyword_from_str(s: &str) -> Option<TokenCategory> {
        match s {
            "struct" => Some(TokenCategory::Struct),
            "union" => Some(TokenCategory::Union),
            "enum" => Some(TokenCategory::Enum),
            "typedef" => Some(TokenCategory::Typedef),
            "static" => Some(TokenCategory::Static),
            "extern" => Some(TokenCategory::Extern),
            "inline" => Some(TokenCategory::Inline),
            "const" => Some(TokenCategory::Const),
            "void" => Some(TokenCategory::Void),
            "char" => Some(TokenCategory::Char),
            "int" => Some(TokenCategory::Int),
            "float" => Some(TokenCategory::Float),
            "double" => Some(TokenCategory::Double),
            "long" => Some(TokenCategory::Long),
            "short" => Some(TokenCategory::Short),
            "unsigned" => Some(TokenCategory::Unsigned),
            "signed" => Some(TokenCategory::Signed),
            _ => None,
        }
    }

    /// Single-character punctuation
    pub fn punct_from_char(c: char) -> Option<TokenCategory> {
        match c {
            '{' => Some(TokenCategory::LBrace),
            '}' => Some(TokenCategory::RBrace),
            '(' => Some(TokenCategory::LParen),
            ')' => Some(TokenCategory::RParen),
            '[' => Some(TokenCategory::LBracket),
            ']' => Some(TokenCategory::RBracket),
            ';' => Some(TokenCategory::Semicolon),
            ',' => Some(TokenCategory::Comma),
            '=' => Some(TokenCategory::Assign),
            '*' => Some(TokenCategory::Asterisk),
            '&' => Some(TokenCategory::Ampersand),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(TokenCategory::keyword_from_str("struct"), Some(TokenCategory::Struct));
        assert_eq!(TokenCategory::keyword_from_str("Struct"), None);
        assert_eq!(TokenCategory::keyword_from_str("uint8_t"), None);
    }

    #[test]
    fn test_trivia() {
        assert!(TokenCategory::Comment.is_trivia());
        assert!(TokenCategory::Newline.is_trivia());
        assert!(!TokenCategory::Semicolon.is_trivia());
        assert!(!TokenCategory::Eof.is_trivia());
    }
}
