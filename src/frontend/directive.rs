//! Preprocessor directive contents
//!
//! The lexer keeps each directive line as one token; these helpers read the
//! parts the model records out of `#include` and `#define` lines.

use crate::frontend::token::{Token, TokenCategory};

/// Header named by an `#include` line, without its quotes or angle brackets
pub fn include_target(directive: &str) -> Option<String> {
    let open = directive.find(|c: char| c == '<' || c == '"')?;
    let close = match directive.as_bytes()[open] {
        b'<' => '>',
        _ => '"',
    };
    let rest = &directive[open + 1..];
    let target = &rest[..rest.find(close)?];
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// Name of a `#define`, with its parameter list for function-like macros:
/// `#define PI 3.14` gives `PI`, `#define MIN(a, b) ...` gives `MIN(a, b)`
pub fn macro_signature(directive: &str) -> Option<String> {
    let body = directive.trim_start_matches('#').trim_start();
    let body = body.strip_prefix("define")?.trim_start();

    let name_len = body
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(body.len());
    let name = &body[..name_len];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    // A parameter list only counts when it touches the name
    let rest = &body[name_len..];
    if rest.starts_with('(') {
        if let Some(close) = rest.find(')') {
            return Some(format!("{}{}", name, &rest[..=close]));
        }
    }
    Some(name.to_string())
}

/// Included headers, in source order
pub fn find_includes(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.is(TokenCategory::Include))
        .filter_map(|t| include_target(&t.text))
        .collect()
}

/// Macro signatures, in source order
pub fn find_macros(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.is(TokenCategory::Define))
        .filter_map(|t| macro_signature(&t.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_include_target() {
        assert_eq!(include_target("#include <stdio.h>"), Some("stdio.h".to_string()));
        assert_eq!(include_target("#  include \"sys/config.h\" // local"), Some("sys/config.h".to_string()));
        assert_eq!(include_target("#include MACRO_HEADER"), None);
        assert_eq!(include_target("#include <>"), None);
    }

    #[test]
    fn test_macro_signature() {
        assert_eq!(macro_signature("#define PI 3.14159"), Some("PI".to_string()));
        assert_eq!(macro_signature("#define MIN(a, b) ((a) < (b) ? (a) : (b))"), Some("MIN(a, b)".to_string()));
        assert_eq!(macro_signature("#define WRAP (x)"), Some("WRAP".to_string()));
        assert_eq!(macro_signature("# define GUARD_H"), Some("GUARD_H".to_string()));
        assert_eq!(macro_signature("#define"), None);
    }

    #[test]
    fn test_directives_from_source() {
        let tokens = tokenize(
            "#include <stdint.h>\n#include \"dev.h\"\n#ifndef MAX\n#define MAX(a, b) \\\n  ((a) > (b) ? (a) : (b))\n#endif\n#define LIMIT 8\n",
        );
        assert_eq!(find_includes(&tokens), vec!["stdint.h", "dev.h"]);
        assert_eq!(find_macros(&tokens), vec!["MAX(a, b)", "LIMIT"]);
    }
}
