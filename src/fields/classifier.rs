//! Member classification
//!
//! Decides the declarator shape of one member's token run and produces the
//! `(name, type)` pair for it. Shapes are tried in a fixed priority order and
//! the first whose trigger matches decides the result, even if it then fails
//! to produce a valid field.

use log::trace;

use crate::fields::anon;
use crate::fields::format::{format_loose, format_params, format_tight};
use crate::frontend::token::{Token, TokenCategory};
use crate::model::{AggregateKind, Field, FieldKind};

/// Names that can only come from a mis-split declarator
const INVALID_NAMES: [&str; 4] = ["[", "]", ";", "}"];

/// Declarator shapes, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    AnonymousAggregate,
    TaggedAggregate,
    FunctionPointerArray,
    FunctionPointer,
    Array,
    Plain,
}

fn is_at(run: &[&Token], index: usize, category: TokenCategory) -> bool {
    run.get(index).is_some_and(|t| t.is(category))
}

fn contains(run: &[&Token], category: TokenCategory) -> bool {
    run.iter().any(|t| t.is(category))
}

/// Index of the first `(` immediately followed by `*`
fn pointer_group(run: &[&Token]) -> Option<usize> {
    run.windows(2)
        .position(|w| w[0].is(TokenCategory::LParen) && w[1].is(TokenCategory::Asterisk))
}

fn is_array_tail(run: &[&Token]) -> bool {
    let len = run.len();
    len >= 4 && run[len - 3].is(TokenCategory::LBracket) && run[len - 1].is(TokenCategory::RBracket)
}

/// Determine the shape of a run. Tagged aggregates skip the function pointer
/// checks because their bodies may contain function pointer members.
pub fn shape_of(run: &[&Token]) -> Shape {
    let aggregate = run.first().is_some_and(|t| t.category.is_aggregate_keyword());

    if aggregate && is_at(run, 1, TokenCategory::LBrace) {
        return Shape::AnonymousAggregate;
    }
    let tagged = aggregate && is_at(run, 1, TokenCategory::Identifier) && is_at(run, 2, TokenCategory::LBrace);

    if !tagged {
        if is_at(run, 1, TokenCategory::LParen)
            && is_at(run, 2, TokenCategory::Asterisk)
            && contains(run, TokenCategory::LBracket)
            && contains(run, TokenCategory::RBracket)
        {
            return Shape::FunctionPointerArray;
        }
        if pointer_group(run).is_some() {
            return Shape::FunctionPointer;
        }
    }

    if is_array_tail(run) {
        Shape::Array
    } else if tagged {
        Shape::TaggedAggregate
    } else {
        Shape::Plain
    }
}

/// Classify one member run. Runs shorter than two tokens and candidates that
/// fail validation produce nothing.
pub fn classify(run: &[&Token]) -> Option<Field> {
    if run.len() < 2 {
        return None;
    }

    let shape = shape_of(run);
    trace!("member '{}' classified as {:?}", format_loose(run), shape);

    let field = match shape {
        Shape::AnonymousAggregate => anonymous_aggregate(run)?,
        Shape::FunctionPointerArray => function_pointer_array(run)?,
        Shape::FunctionPointer => function_pointer(run)?,
        Shape::Array => array(run),
        Shape::TaggedAggregate | Shape::Plain => plain(run)?,
    };
    validate(field)
}

/// `struct { ... } name` / `union { ... } name`
fn anonymous_aggregate(run: &[&Token]) -> Option<Field> {
    let kind = match run[0].category {
        TokenCategory::Union => AggregateKind::Union,
        _ => AggregateKind::Struct,
    };
    let last_close = run.iter().rposition(|t| t.is(TokenCategory::RBrace))?;
    let name = run[last_close + 1..]
        .iter()
        .find(|t| t.is(TokenCategory::Identifier))?
        .text
        .clone();

    Some(Field {
        name: name.clone(),
        kind: FieldKind::AnonymousAggregate {
            kind,
            encoded_body: anon::encode_body(run),
            name,
        },
    })
}

/// `ret (*name[size])(params)`
fn function_pointer_array(run: &[&Token]) -> Option<Field> {
    let bracket = (3..run.len()).find(|&i| run[i].is(TokenCategory::LBracket))?;
    Some(Field::plain(format_loose(&run[3..bracket]), format_tight(run)))
}

/// `ret (*name)(params)`
fn function_pointer(run: &[&Token]) -> Option<Field> {
    let anchor = pointer_group(run)?;

    let mut depth = 0usize;
    let mut close = None;
    for (i, token) in run.iter().enumerate().skip(anchor) {
        match token.category {
            TokenCategory::LParen => depth += 1,
            TokenCategory::RParen => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;

    let name = format_loose(&run[anchor + 2..close]);
    let type_text = [
        format_loose(&run[..anchor]),
        "( * )".to_string(),
        format_params(&run[close + 1..]),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Some(Field::plain(name, type_text))
}

/// `type name[size]`
fn array(run: &[&Token]) -> Field {
    let len = run.len();
    let type_text = format!("{}[{}]", format_loose(&run[..len - 4]), run[len - 2].text);
    Field::plain(run[len - 4].text.clone(), type_text)
}

/// `type name`, the last token naming the member
fn plain(run: &[&Token]) -> Option<Field> {
    let (name, type_tokens) = run.split_last()?;
    Some(Field::plain(name.text.clone(), format_loose(type_tokens)))
}

/// Trim both sides and reject empty or impossible names
fn validate(field: Field) -> Option<Field> {
    let name = field.name.trim();
    if name.is_empty() || INVALID_NAMES.contains(&name) {
        return None;
    }

    let kind = match field.kind {
        FieldKind::Plain(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            FieldKind::Plain(text.to_string())
        }
        anonymous => anonymous,
    };

    Some(Field {
        name: name.to_string(),
        kind,
    })
}
