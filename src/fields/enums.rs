//! Enum value extraction

use crate::fields::locate_body;
use crate::frontend::token::{Token, TokenCategory};

/// Enumerators of the enum spanning `start..=end`, each as its space-joined
/// tokens (`"READY = 1"`). Commas inside parentheses, as in
/// `MASK = FLAG(1, 2)`, do not split an entry.
pub fn find_enum_values(tokens: &[Token], start: usize, end: usize) -> Vec<String> {
    let Some(body) = locate_body(tokens, start, end) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut depth = 0usize;

    for token in &tokens[body.first()..body.close] {
        match token.category {
            TokenCategory::LParen | TokenCategory::LBrace | TokenCategory::LBracket => depth += 1,
            TokenCategory::RParen | TokenCategory::RBrace | TokenCategory::RBracket => {
                depth = depth.saturating_sub(1)
            }
            TokenCategory::Comma if depth == 0 => {
                if !current.is_empty() {
                    values.push(current.join(" "));
                    current.clear();
                }
                continue;
            }
            _ => {}
        }
        if !token.is_trivia() {
            current.push(&token.text);
        }
    }
    if !current.is_empty() {
        values.push(current.join(" "));
    }

    values
}
