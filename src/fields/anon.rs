//! Anonymous aggregate payloads
//!
//! The member list of an untagged nested struct/union is carried in the
//! field's type text as `struct { /*ANON:<base64>:<name>*/ ... }` so that a
//! later pass can rebuild it without re-reading the source.
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::frontend::token::{Token, TokenCategory};
use crate::model::AggregateKind;
use crate::utils::{Error, Result};

const MARKER_OPEN: &str = "/*ANON:";
const MARKER_CLOSE: &str = "*/";

/// Space-joined text between the first `{` of the run and its matching `}`,
/// both braces excluded. Empty if the run has no complete brace pair.
pub fn body_text(run: &[&Token]) -> String {
    let Some(open) = run.iter().position(|t| t.is(TokenCategory::LBrace)) else {
        return String::new();
    };

    let mut depth = 0usize;
    let mut parts = Vec::new();
    for token in &run[open + 1..] {
        match token.category {
            TokenCategory::LBrace => depth += 1,
            TokenCategory::RBrace if depth == 0 => return parts.join(" "),
            TokenCategory::RBrace => depth -= 1,
            _ => {}
        }
        parts.push(token.text.as_str());
    }
    String::new()
}

/// Base64 payload for the body of an anonymous aggregate run
pub fn encode_body(run: &[&Token]) -> String {
    let body = body_text(run);
    if body.is_empty() {
        String::new()
    } else {
        STANDARD.encode(body.as_bytes())
    }
}

/// Decode a payload back to body text
pub fn decode_body(member: &str, encoded: &str) -> Result<String> {
    let bytes = STANDARD.decode(encoded).map_err(|e| Error::Decode {
        member: member.to_string(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::Decode {
        member: member.to_string(),
        reason: e.to_string(),
    })
}

/// Flattened type text for an anonymous member
pub fn marker_text(kind: AggregateKind, encoded_body: &str, name: &str) -> String {
    if encoded_body.is_empty() {
        format!("{} {{ ... }}", kind.keyword())
    } else {
        format!(
            "{} {{ {}{}:{}{} ... }}",
            kind.keyword(),
            MARKER_OPEN,
            encoded_body,
            name,
            MARKER_CLOSE
        )
    }
}

/// A marker read back out of flattened type text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousMarker {
    pub kind: AggregateKind,
    pub encoded_body: String,
    pub name: String,
}

impl AnonymousMarker {
    /// Decoded body text
    pub fn body(&self) -> Result<String> {
        decode_body(&self.name, &self.encoded_body)
    }
}

/// Find the marker in a flattened type text such as
/// `union { /*ANON:aW50IGE7:u*/ ... }`
pub fn parse_marker(type_text: &str) -> Option<AnonymousMarker> {
    let keyword = type_text.split_whitespace().next()?;
    let kind = AggregateKind::from_keyword(keyword)?;

    let start = type_text.find(MARKER_OPEN)? + MARKER_OPEN.len();
    let rest = &type_text[start..];
    let end = rest.find(MARKER_CLOSE)?;
    let (encoded, name) = rest[..end].split_once(':')?;
    if encoded.is_empty() || name.is_empty() {
        return None;
    }

    Some(AnonymousMarker {
        kind,
        encoded_body: encoded.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn run_of(tokens: &[Token]) -> Vec<&Token> {
        tokens
            .iter()
            .filter(|t| !t.is_trivia() && !t.is(TokenCategory::Eof))
            .collect()
    }

    #[test]
    fn test_body_text_stops_at_matching_brace() {
        let tokens = tokenize("struct { int a; struct { char c; } deep; } outer");
        let run = run_of(&tokens);
        assert_eq!(body_text(&run), "int a ; struct { char c ; } deep ;");
    }

    #[test]
    fn test_body_text_without_braces() {
        let tokens = tokenize("int a");
        assert_eq!(body_text(&run_of(&tokens)), "");
        let tokens = tokenize("struct { int a;");
        assert_eq!(body_text(&run_of(&tokens)), "");
    }

    #[test]
    fn test_marker_round_trip() {
        let tokens = tokenize("union { int i; float f; } v");
        let encoded = encode_body(&run_of(&tokens));
        let text = marker_text(AggregateKind::Union, &encoded, "v");
        assert!(text.starts_with("union { /*ANON:"));
        assert!(text.ends_with(":v*/ ... }"));

        let marker = parse_marker(&text).unwrap();
        assert_eq!(marker.kind, AggregateKind::Union);
        assert_eq!(marker.name, "v");
        assert_eq!(marker.body().unwrap(), "int i ; float f ;");
    }

    #[test]
    fn test_empty_body_has_no_marker() {
        assert_eq!(marker_text(AggregateKind::Struct, "", "x"), "struct { ... }");
        assert_eq!(parse_marker("struct { ... }"), None);
        assert_eq!(parse_marker("int"), None);
    }

    #[test]
    fn test_bad_payload() {
        let marker = parse_marker("struct { /*ANON:!!!:x*/ ... }").unwrap();
        assert!(matches!(marker.body(), Err(Error::Decode { member, .. }) if member == "x"));
    }
}
