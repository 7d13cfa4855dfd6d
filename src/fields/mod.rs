//! Struct and union field extraction
//!
//! Pulls `(name, type)` pairs out of an aggregate body without a C grammar:
//! the body is split into one token run per member by brace-aware semicolon
//! search, and each run is classified by its declarator shape.
//!
//! Extraction is lenient. Members that cannot be classified are left out and
//! a body that cannot be located yields no fields; deciding whether that is an
//! error is up to the caller.

pub mod anon;
pub mod classifier;
pub mod enums;
pub mod format;
pub mod locator;
pub mod scanner;

use log::debug;

use crate::frontend::token::Token;
use crate::model::Field;

pub use enums::find_enum_values;
pub use locator::{locate_body, matching_brace};
pub use scanner::scan_member;

/// Fields of the struct or union spanning `start..=end`, in declaration order
pub fn extract_fields(tokens: &[Token], start: usize, end: usize) -> Vec<Field> {
    let Some(body) = locate_body(tokens, start, end) else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    let mut pos = body.first();
    while pos < body.close {
        let run = scan_member(tokens, pos, body.close);
        pos = run.next;

        if run.tokens.is_empty() {
            continue;
        }
        if !run.terminated {
            debug!(
                "dropping unterminated member at line {}",
                run.tokens[0].line
            );
            continue;
        }
        match classifier::classify(&run.tokens) {
            Some(field) => fields.push(field),
            None => debug!("dropping unrecognised member at line {}", run.tokens[0].line),
        }
    }

    fields
}
