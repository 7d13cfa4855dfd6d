//! Aggregate body location

use crate::frontend::token::{Token, TokenCategory};

/// Brace pair bounding an aggregate body, both indices into the token slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    /// Index of the opening `{`
    pub open: usize,
    /// Index of the matching `}`
    pub close: usize,
}

impl Body {
    /// Index of the first token inside the body
    pub fn first(&self) -> usize {
        self.open + 1
    }
}

/// Index of the `}` matching the `{` at `open`, searching no further than
/// `limit` (inclusive, clamped to the slice).
pub fn matching_brace(tokens: &[Token], open: usize, limit: usize) -> Option<usize> {
    if tokens.is_empty() {
        return None;
    }
    let limit = limit.min(tokens.len() - 1);
    let mut depth = 1usize;
    for i in open.checked_add(1)?..=limit {
        match tokens[i].category {
            TokenCategory::LBrace => depth += 1,
            TokenCategory::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the body of the declaration spanning `start..=end`: the first `{`
/// in the span and its matching `}`. `None` when there is no `{` in the span
/// or its braces never balance before `end`.
pub fn locate_body(tokens: &[Token], start: usize, end: usize) -> Option<Body> {
    if tokens.is_empty() || start > end {
        return None;
    }
    let end = end.min(tokens.len() - 1);
    let open = (start..=end).find(|&i| tokens[i].is(TokenCategory::LBrace))?;
    let close = matching_brace(tokens, open, end)?;
    Some(Body { open, close })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    #[test]
    fn test_locate_nested_body() {
        let tokens = tokenize("struct s { struct { int a; } in; int b; } tail;");
        let body = locate_body(&tokens, 0, tokens.len() - 1).unwrap();
        assert_eq!(tokens[body.open].text, "{");
        assert_eq!(tokens[body.close].text, "}");
        // The outer closing brace is the last one in the source
        let last_close = tokens.iter().rposition(|t| t.is(TokenCategory::RBrace)).unwrap();
        assert_eq!(body.close, last_close);
    }

    #[test]
    fn test_no_brace_in_span() {
        let tokens = tokenize("struct s; struct t { int a; };");
        let semicolon = tokens.iter().position(|t| t.is(TokenCategory::Semicolon)).unwrap();
        assert_eq!(locate_body(&tokens, 0, semicolon), None);
    }

    #[test]
    fn test_unbalanced_and_degenerate_spans() {
        let tokens = tokenize("struct s { int a;");
        assert_eq!(locate_body(&tokens, 0, tokens.len() - 1), None);
        assert_eq!(locate_body(&tokens, 5, 2), None);
        assert_eq!(locate_body(&[], 0, 10), None);
        // An end past the slice is clamped rather than panicking
        let tokens = tokenize("struct s { int a; };");
        assert!(locate_body(&tokens, 0, usize::MAX).is_some());
    }
}
