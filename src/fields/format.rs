//! Re-joining token runs into type text
//!
//! The joins differ per declarator shape and are kept as separate functions;
//! output of each is stable and consumed by diagram golden files.

use crate::frontend::token::{Token, TokenCategory};

fn is_grouping(token: &Token) -> bool {
    matches!(
        token.category,
        TokenCategory::LParen | TokenCategory::RParen | TokenCategory::LBracket | TokenCategory::RBracket
    )
}

/// Single-space join
pub fn format_loose(tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parentheses and brackets attach without spaces on either side; other
/// tokens are space-separated. `int ( * arr [ 4 ] ) ( int )` becomes
/// `int(* arr[4])(int)`.
pub fn format_tight(tokens: &[&Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && !is_grouping(token) && !is_grouping(tokens[i - 1]) {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Parameter lists: a space only between two adjacent words, so
/// `( int , char * )` becomes `(int,char*)` and `( const char * s )`
/// becomes `(const char*s)`.
pub fn format_params(tokens: &[&Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.category.is_word() && tokens[i - 1].category.is_word() {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}
