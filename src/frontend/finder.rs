//! Aggregate boundary detection
//!
//! Locates top-level `struct`, `union` and `enum` definitions in a token
//! stream and reports the token span each one covers. Only definitions (with
//! a body) are reported; forward declarations and plain uses such as
//! `struct point p;` are skipped. Simple `typedef <type> <name>;` aliases
//! are collected by a second walk over the same file scope.

use log::{debug, trace};
use serde::Serialize;

use crate::fields::format::{format_loose, format_tight};
use crate::fields::matching_brace;
use crate::frontend::token::{Token, TokenCategory};

/// Which kind of declaration a span covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Struct,
    Union,
    Enum,
}

impl DeclKind {
    fn from_category(category: TokenCategory) -> Option<Self> {
        match category {
            TokenCategory::Struct => Some(DeclKind::Struct),
            TokenCategory::Union => Some(DeclKind::Union),
            TokenCategory::Enum => Some(DeclKind::Enum),
            _ => None,
        }
    }
}

/// Token span of one definition. `start` and `end` are inclusive indices
/// into the token slice the span was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpan {
    pub kind: DeclKind,
    pub start: usize,
    pub end: usize,
    /// Typedef name if present, otherwise the tag
    pub name: String,
    pub tag: Option<String>,
    /// Set when the body's braces never balance
    pub unterminated: bool,
    pub line: u32,
}

/// Index of the first non-trivia token at or after `from`
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_trivia())
}

/// Index of the `{` when `extern "..." {` starts at `start`
fn linkage_block_open(tokens: &[Token], start: usize) -> Option<usize> {
    let name = next_significant(tokens, start + 1)?;
    if !tokens[name].is(TokenCategory::String) {
        return None;
    }
    let open = next_significant(tokens, name + 1)?;
    tokens[open].is(TokenCategory::LBrace).then_some(open)
}

/// Brace tracking for a walk over a whole file. The braces of an
/// `extern "C" { ... }` block do not count, so its contents stay at file scope.
#[derive(Debug, Default)]
struct FileScope {
    depth: usize,
    linkage_blocks: usize,
}

impl FileScope {
    fn at_file_scope(&self) -> bool {
        self.depth == 0
    }

    /// Account for the token at `pos` and return the position to look at next
    fn advance(&mut self, tokens: &[Token], pos: usize) -> usize {
        let token = &tokens[pos];
        match token.category {
            TokenCategory::LBrace => self.depth += 1,
            TokenCategory::RBrace if self.depth == 0 && self.linkage_blocks > 0 => {
                self.linkage_blocks -= 1
            }
            TokenCategory::RBrace => self.depth = self.depth.saturating_sub(1),
            TokenCategory::Extern if self.depth == 0 => {
                if let Some(open) = linkage_block_open(tokens, pos) {
                    trace!("linkage block opens at line {}", token.line);
                    self.linkage_blocks += 1;
                    return open + 1;
                }
            }
            _ => {}
        }
        pos + 1
    }
}

/// Find every top-level aggregate definition, in source order
pub fn find_aggregates(tokens: &[Token]) -> Vec<AggregateSpan> {
    let mut spans = Vec::new();
    let mut scope = FileScope::default();
    let mut pos = 0;

    while pos < tokens.len() {
        let starts_definition = matches!(
            tokens[pos].category,
            TokenCategory::Typedef | TokenCategory::Struct | TokenCategory::Union | TokenCategory::Enum
        );
        if starts_definition && scope.at_file_scope() {
            if let Some(span) = parse_definition(tokens, pos) {
                trace!("{:?} '{}' spans tokens {}..={}", span.kind, span.name, span.start, span.end);
                pos = span.end + 1;
                let stop = span.unterminated;
                if !span.name.is_empty() || stop {
                    spans.push(span);
                }
                if stop {
                    break;
                }
                continue;
            }
        }
        pos = scope.advance(tokens, pos);
    }

    spans
}

/// A `typedef` that names an existing type rather than defining a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAlias {
    pub name: String,
    pub original_type: String,
    pub line: u32,
}

/// Find every top-level `typedef <type> <name>;`, in source order. Typedefs
/// with a body are aggregates and are left to [`find_aggregates`].
pub fn find_aliases(tokens: &[Token]) -> Vec<TypeAlias> {
    let mut aliases = Vec::new();
    let mut scope = FileScope::default();
    let mut pos = 0;

    while pos < tokens.len() {
        if tokens[pos].is(TokenCategory::Typedef) && scope.at_file_scope() {
            if let Some((alias, end)) = parse_alias(tokens, pos) {
                debug!("typedef {} = {}", alias.name, alias.original_type);
                aliases.push(alias);
                pos = end + 1;
                continue;
            }
        }
        pos = scope.advance(tokens, pos);
    }

    aliases
}

/// Read `typedef ... ;` at `start`, returning the alias and the index of the `;`
fn parse_alias(tokens: &[Token], start: usize) -> Option<(TypeAlias, usize)> {
    let mut run = Vec::new();
    let mut end = None;
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        match token.category {
            TokenCategory::Semicolon => {
                end = Some(i);
                break;
            }
            TokenCategory::LBrace | TokenCategory::RBrace | TokenCategory::Eof => return None,
            _ if token.is_trivia() => {}
            _ => run.push(token),
        }
    }
    let end = end?;

    // `ret (*name)(params)` names the alias inside the pointer group
    let pointer = run
        .windows(2)
        .position(|w| w[0].is(TokenCategory::LParen) && w[1].is(TokenCategory::Asterisk));
    let (name, original_type) = match pointer {
        Some(group) => {
            let name = run[group + 2..].iter().find(|t| t.is(TokenCategory::Identifier))?;
            (name.text.clone(), format_loose(&run))
        }
        None => {
            let bracket = run
                .iter()
                .position(|t| t.is(TokenCategory::LBracket))
                .unwrap_or(run.len());
            let at = bracket.checked_sub(1)?;
            if at == 0 || !run[at].is(TokenCategory::Identifier) {
                return None;
            }
            let original_type = format!("{}{}", format_loose(&run[..at]), format_tight(&run[at + 1..]));
            (run[at].text.clone(), original_type)
        }
    };

    let alias = TypeAlias {
        name,
        original_type,
        line: tokens[start].line,
    };
    Some((alias, end))
}

/// Try to read `[typedef] (struct|union|enum) [Tag] { ... } [Name] ;` at `start`
fn parse_definition(tokens: &[Token], start: usize) -> Option<AggregateSpan> {
    let mut pos = start;
    let is_typedef = tokens[pos].is(TokenCategory::Typedef);
    if is_typedef {
        pos = next_significant(tokens, pos + 1)?;
    }

    let kind = DeclKind::from_category(tokens[pos].category)?;
    pos = next_significant(tokens, pos + 1)?;

    let tag = if tokens[pos].is(TokenCategory::Identifier) {
        let tag = tokens[pos].text.clone();
        pos = next_significant(tokens, pos + 1)?;
        Some(tag)
    } else {
        None
    };

    if !tokens[pos].is(TokenCategory::LBrace) {
        return None;
    }
    let open = pos;
    let line = tokens[start].line;

    let close = match matching_brace(tokens, open, tokens.len().saturating_sub(1)) {
        Some(close) => close,
        None => {
            debug!("unbalanced braces in {:?} definition at line {}", kind, line);
            return Some(AggregateSpan {
                kind,
                start,
                end: tokens.len() - 1,
                name: tag.clone().unwrap_or_default(),
                tag,
                unterminated: true,
                line,
            });
        }
    };

    // Declarators after the body run up to the terminating semicolon
    let mut declarator = None;
    let mut end = close;
    let mut cursor = close + 1;
    while let Some(i) = next_significant(tokens, cursor) {
        match tokens[i].category {
            TokenCategory::Semicolon => {
                end = i;
                break;
            }
            TokenCategory::Identifier if declarator.is_none() => {
                declarator = Some(tokens[i].text.clone());
            }
            TokenCategory::LBrace | TokenCategory::RBrace | TokenCategory::Eof => break,
            _ => {}
        }
        end = i;
        cursor = i + 1;
    }

    let name = if is_typedef {
        declarator.or_else(|| tag.clone())
    } else {
        tag.clone()
    };

    // Unnamed definitions still consume their body so members are not rescanned
    let name = name.unwrap_or_default();
    if name.is_empty() {
        debug!("skipping unnamed {:?} at line {}", kind, line);
    }

    Some(AggregateSpan {
        kind,
        start,
        end,
        name,
        tag,
        unterminated: false,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn names(source: &str) -> Vec<(DeclKind, String, Option<String>)> {
        find_aggregates(&tokenize(source))
            .into_iter()
            .map(|s| (s.kind, s.name, s.tag))
            .collect()
    }

    #[test]
    fn test_tagged_struct() {
        let found = names("struct point { int x; int y; };");
        assert_eq!(found, vec![(DeclKind::Struct, "point".to_string(), Some("point".to_string()))]);
    }

    #[test]
    fn test_typedef_forms() {
        let source = "typedef struct node_tag { struct node_tag *next; } node_t;\n\
                      typedef union { int i; float f; } number_t;\n\
                      typedef enum { RED, GREEN } color_t;";
        let found = names(source);
        assert_eq!(
            found,
            vec![
                (DeclKind::Struct, "node_t".to_string(), Some("node_tag".to_string())),
                (DeclKind::Union, "number_t".to_string(), None),
                (DeclKind::Enum, "color_t".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_skips_declarations_and_uses() {
        let source = "struct fwd;\nstruct point p;\nstruct point make(void) { struct inner { int a; } v; return p; }\nstruct real { int a; };";
        let found = names(source);
        assert_eq!(found, vec![(DeclKind::Struct, "real".to_string(), Some("real".to_string()))]);
    }

    #[test]
    fn test_span_covers_semicolon() {
        let tokens = tokenize("typedef struct { int a; } pair_t; int after;");
        let spans = find_aggregates(&tokens);
        assert_eq!(spans.len(), 1);
        assert!(tokens[spans[0].start].is(TokenCategory::Typedef));
        assert!(tokens[spans[0].end].is(TokenCategory::Semicolon));
        assert_eq!(spans[0].line, 1);
    }

    #[test]
    fn test_unbalanced_body_runs_to_end() {
        let tokens = tokenize("struct broken { int a;\n");
        let spans = find_aggregates(&tokens);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].unterminated);
        assert_eq!(spans[0].end, tokens.len() - 1);
    }

    #[test]
    fn test_definitions_inside_extern_c_block() {
        let source = "#ifdef __cplusplus\nextern \"C\" {\n#endif\n\
                      struct point { int x; int y; };\n\
                      typedef struct { int a; } pair_t;\n\
                      extern int counter;\n\
                      #ifdef __cplusplus\n}\n#endif\n\
                      union after { int i; };";
        let found = names(source);
        assert_eq!(
            found,
            vec![
                (DeclKind::Struct, "point".to_string(), Some("point".to_string())),
                (DeclKind::Struct, "pair_t".to_string(), None),
                (DeclKind::Union, "after".to_string(), Some("after".to_string())),
            ]
        );
    }

    #[test]
    fn test_function_bodies_still_hide_definitions() {
        let source = "extern \"C\" {\nvoid f(void) { struct local { int a; } l; }\n}\nstruct top { int b; };";
        let found = names(source);
        assert_eq!(found, vec![(DeclKind::Struct, "top".to_string(), Some("top".to_string()))]);
    }

    #[test]
    fn test_aliases() {
        let source = "typedef unsigned int uint_t;\n\
                      typedef struct point point_t;\n\
                      typedef char name_t[16];\n\
                      typedef int (*handler_t)(void *ctx);\n\
                      typedef struct { int a; } pair_t;\n\
                      void f(void) { typedef int local_t; }\n\
                      extern \"C\" { typedef long wide_t; }";
        let aliases: Vec<(String, String, u32)> = find_aliases(&tokenize(source))
            .into_iter()
            .map(|a| (a.name, a.original_type, a.line))
            .collect();
        assert_eq!(
            aliases,
            vec![
                ("uint_t".to_string(), "unsigned int".to_string(), 1),
                ("point_t".to_string(), "struct point".to_string(), 2),
                ("name_t".to_string(), "char[16]".to_string(), 3),
                ("handler_t".to_string(), "int ( * handler_t ) ( void * ctx )".to_string(), 4),
                ("wide_t".to_string(), "long".to_string(), 7),
            ]
        );
    }
}
