//! Anonymous aggregate lifting
//!
//! Members declared with an untagged nested struct or union carry their body
//! as an encoded payload. This pass decodes each payload, extracts its fields
//! with the same extractor used for top-level aggregates, and adds the result
//! to the model as `<parent>_anonymous_<struct|union>_<n>`. The member's type
//! then refers to that name.

use log::{debug, warn};

use crate::fields::{anon, extract_fields};
use crate::frontend::lexer::tokenize;
use crate::model::{Aggregate, AggregateKind, Field, FieldKind, FileModel};
use crate::utils::Error;

#[derive(Debug, Default)]
pub struct AnonymousProcessor;

impl AnonymousProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Lift every anonymous member in the model. Payloads that fail to decode
    /// are left in place and returned as diagnostics.
    pub fn process(&self, model: &mut FileModel) -> Vec<Error> {
        let mut lifted = Vec::new();
        let mut problems = Vec::new();

        for aggregate in model.structs.iter_mut().chain(model.unions.iter_mut()) {
            self.lift(aggregate, &mut lifted, &mut problems);
        }

        debug!("{}: lifted {} anonymous aggregates", model.file, lifted.len());
        for aggregate in lifted {
            model.push_aggregate(aggregate);
        }
        problems
    }

    /// Lift the anonymous members of `parent`; each lifted aggregate is
    /// followed in `lifted` by the ones lifted out of it
    fn lift(&self, parent: &mut Aggregate, lifted: &mut Vec<Aggregate>, problems: &mut Vec<Error>) {
        let mut counter = 0;

        for field in parent.fields.iter_mut() {
            let (kind, encoded_body, member) = match &field.kind {
                FieldKind::AnonymousAggregate {
                    kind,
                    encoded_body,
                    name,
                } => (*kind, encoded_body.clone(), name.clone()),
                FieldKind::Plain(_) => continue,
            };

            let fields = if encoded_body.is_empty() {
                Vec::new()
            } else {
                match anon::decode_body(&member, &encoded_body) {
                    Ok(body) => expand(kind, &body),
                    Err(err) => {
                        warn!("{}.{}: {}", parent.name, member, err);
                        problems.push(err);
                        continue;
                    }
                }
            };

            counter += 1;
            let name = format!("{}_anonymous_{}_{}", parent.name, kind.keyword(), counter);
            let mut child = Aggregate {
                kind,
                name: name.clone(),
                tag: None,
                fields,
                line: parent.line,
                parent: Some(parent.name.clone()),
            };

            let mut nested = Vec::new();
            self.lift(&mut child, &mut nested, problems);
            lifted.push(child);
            lifted.extend(nested);

            field.kind = FieldKind::Plain(name);
        }
    }
}

/// Fields of a decoded body, re-read as `struct { <body> }`
pub fn expand(kind: AggregateKind, body: &str) -> Vec<Field> {
    let source = format!("{} {{ {} }}", kind.keyword(), body);
    let tokens = tokenize(&source);
    extract_fields(&tokens, 0, tokens.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn types(aggregate: &Aggregate) -> Vec<(String, String)> {
        aggregate
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.type_text()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_lifts_nested_members() {
        let source = r#"
struct sensor {
    int id;
    union {
        struct {
            short x;
            short y;
        } axis;
        long raw;
    } reading;
    struct {
        char unit[4];
    } meta;
};
"#;
        let (mut model, _) = FileModel::from_source("sensor.h", source);
        let problems = AnonymousProcessor::new().process(&mut model);
        assert!(problems.is_empty());

        let sensor = model.find_struct("sensor").unwrap();
        assert_eq!(
            types(sensor),
            pairs(&[
                ("id", "int"),
                ("reading", "sensor_anonymous_union_1"),
                ("meta", "sensor_anonymous_struct_2"),
            ])
        );

        assert_eq!(sensor.parent, None);
        let reading = model.find_union("sensor_anonymous_union_1").unwrap();
        assert_eq!(reading.parent.as_deref(), Some("sensor"));
        assert_eq!(
            types(reading),
            pairs(&[
                ("axis", "sensor_anonymous_union_1_anonymous_struct_1"),
                ("raw", "long"),
            ])
        );

        let axis = model
            .find_struct("sensor_anonymous_union_1_anonymous_struct_1")
            .unwrap();
        assert_eq!(types(axis), pairs(&[("x", "short"), ("y", "short")]));
        assert_eq!(axis.parent.as_deref(), Some("sensor_anonymous_union_1"));

        let meta = model.find_struct("sensor_anonymous_struct_2").unwrap();
        assert_eq!(types(meta), pairs(&[("unit", "char[4]")]));
        assert_eq!(meta.parent.as_deref(), Some("sensor"));
        assert_eq!(model.anonymous_member_count(), 0);

        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();
        assert_eq!(json["unions"][0]["parent"], "sensor");
        assert!(json["structs"][0].get("parent").is_none());
    }

    #[test]
    fn test_empty_body() {
        let (mut model, _) = FileModel::from_source("e.h", "struct holder { struct { } nothing; };");
        AnonymousProcessor::new().process(&mut model);
        let holder = model.find_struct("holder").unwrap();
        assert_eq!(types(holder), pairs(&[("nothing", "holder_anonymous_struct_1")]));
        assert!(model.find_struct("holder_anonymous_struct_1").unwrap().fields.is_empty());
    }

    #[test]
    fn test_bad_payload_is_kept() {
        let mut model = FileModel {
            file: "x.h".to_string(),
            ..Default::default()
        };
        model.push_aggregate(Aggregate {
            kind: AggregateKind::Struct,
            name: "outer".to_string(),
            tag: None,
            fields: vec![Field {
                name: "inner".to_string(),
                kind: FieldKind::AnonymousAggregate {
                    kind: AggregateKind::Struct,
                    encoded_body: "%%%".to_string(),
                    name: "inner".to_string(),
                },
            }],
            line: 1,
            parent: None,
        });

        assert_eq!(model.anonymous_member_count(), 1);
        let problems = AnonymousProcessor::new().process(&mut model);
        assert_eq!(problems.len(), 1);
        assert_eq!(model.structs.len(), 1);
        assert!(model.structs[0].fields[0].is_anonymous());
    }

    #[test]
    fn test_expand_matches_direct_extraction() {
        let fields = expand(AggregateKind::Union, "int i ; float f ; char * s ;");
        assert_eq!(
            fields,
            vec![
                Field::plain("i", "int"),
                Field::plain("f", "float"),
                Field::plain("s", "char *"),
            ]
        );
    }
}
