//! Member scanning
//!
//! Splits an aggregate body into one token run per member declaration. The
//! scan is a pure step function: each call takes the slice and a position and
//! returns the run together with the position to continue from.

use crate::frontend::token::{Token, TokenCategory};

/// Non-trivia tokens of one member declaration
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRun<'a> {
    pub tokens: Vec<&'a Token>,
    /// Whether the run ended at a depth-0 `;` rather than at the body's end
    pub terminated: bool,
    /// Position after the terminating `;`, or `close` for an unterminated run
    pub next: usize,
}

/// Scan one member starting at `pos`, never reading at or past `close`.
///
/// Braces are counted relative to the member so the semicolons of a nested
/// aggregate's own members do not end the run; `struct { int a; } x;` comes
/// back as a single run.
pub fn scan_member<'a>(tokens: &'a [Token], pos: usize, close: usize) -> MemberRun<'a> {
    let close = close.min(tokens.len());
    let mut run = Vec::new();
    let mut depth = 0usize;
    let mut i = pos;

    while i < close {
        let token = &tokens[i];
        match token.category {
            TokenCategory::LBrace => depth += 1,
            TokenCategory::RBrace => depth = depth.saturating_sub(1),
            TokenCategory::Semicolon if depth == 0 => {
                return MemberRun {
                    tokens: run,
                    terminated: true,
                    next: i + 1,
                };
            }
            _ => {}
        }
        if !token.is_trivia() {
            run.push(token);
        }
        i += 1;
    }

    MemberRun {
        tokens: run,
        terminated: false,
        next: close.max(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::locate_body;
    use crate::frontend::lexer::tokenize;
    use pretty_assertions::assert_eq;

    /// All member runs in `[first, close)`, in declaration order
    fn scan_members(tokens: &[Token], first: usize, close: usize) -> Vec<MemberRun<'_>> {
        let mut runs = Vec::new();
        let mut pos = first;
        while pos < close {
            let run = scan_member(tokens, pos, close);
            pos = run.next;
            runs.push(run);
        }
        runs
    }

    fn runs(source: &str) -> Vec<(String, bool)> {
        let tokens = tokenize(source);
        let body = locate_body(&tokens, 0, tokens.len() - 1).unwrap();
        scan_members(&tokens, body.first(), body.close)
            .into_iter()
            .map(|run| {
                let text: Vec<&str> = run.tokens.iter().map(|t| t.text.as_str()).collect();
                (text.join(" "), run.terminated)
            })
            .collect()
    }

    #[test]
    fn test_one_run_per_member() {
        let found = runs("struct s {\n  int a; /* note */\n  char *b;\n};");
        assert_eq!(
            found,
            vec![
                ("int a".to_string(), true),
                ("char * b".to_string(), true),
                ("".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_nested_aggregate_is_one_run() {
        let found = runs("struct s { union { struct { int x; } p; long l; } u; int tail; };");
        assert_eq!(found[0], ("union { struct { int x ; } p ; long l ; } u".to_string(), true));
        assert_eq!(found[1], ("int tail".to_string(), true));
    }

    #[test]
    fn test_missing_semicolon() {
        let found = runs("struct s { int a };");
        assert_eq!(found, vec![("int a".to_string(), false)]);
    }

    #[test]
    fn test_positions_always_advance() {
        let tokens = tokenize("struct s { ; ; int a; };");
        let body = locate_body(&tokens, 0, tokens.len() - 1).unwrap();
        let mut pos = body.first();
        while pos < body.close {
            let run = scan_member(&tokens, pos, body.close);
            assert!(run.next > pos);
            pos = run.next;
        }
        assert_eq!(pos, body.close);
    }
}
