//! Declaration model
//!
//! Structs, unions and enums found in one source file, with their members,
//! alongside the file's includes, macros and plain typedef aliases.
//! Building a model drives the lexer, the boundary finder and the field
//! extractor; the anonymous processor then lifts nested anonymous aggregates
//! into named entries.

pub mod anonymous;

use std::fmt;

use log::{debug, info, warn};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::fields::{self, anon};
use crate::frontend::directive::{find_includes, find_macros};
use crate::frontend::finder::{find_aggregates, find_aliases, DeclKind};
use crate::frontend::lexer::tokenize;
use crate::utils::Error;

pub use crate::frontend::finder::TypeAlias;
pub use anonymous::AnonymousProcessor;

/// `struct` or `union`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    pub fn keyword(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "struct" => Some(AggregateKind::Struct),
            "union" => Some(AggregateKind::Union),
            _ => None,
        }
    }
}

/// The type side of a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Readable type text, e.g. `const char *` or `int ( * ) (int,char*)`
    Plain(String),
    /// An untagged nested aggregate whose member list travels as base64 text
    AnonymousAggregate {
        kind: AggregateKind,
        /// Base64 of the space-joined body tokens; empty for an empty body
        encoded_body: String,
        name: String,
    },
}

/// One member of a struct or union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn plain(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Plain(type_text.into()),
        }
    }

    /// Type text as shown in diagrams. Anonymous aggregates flatten to
    /// `struct { /*ANON:<base64>:<name>*/ ... }`.
    pub fn type_text(&self) -> String {
        match &self.kind {
            FieldKind::Plain(text) => text.clone(),
            FieldKind::AnonymousAggregate {
                kind,
                encoded_body,
                name,
            } => anon::marker_text(*kind, encoded_body, name),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.kind, FieldKind::AnonymousAggregate { .. })
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Field", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.type_text())?;
        state.end()
    }
}

/// A struct or union definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub kind: AggregateKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub fields: Vec<Field>,
    pub line: u32,
    /// Aggregate whose anonymous member this one was lifted out of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// An enum definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub values: Vec<String>,
    pub line: u32,
}

/// Everything extracted from one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileModel {
    pub file: String,
    /// Included headers as written, without quotes or angle brackets
    pub includes: Vec<String>,
    /// Macro names, with the parameter list for function-like macros
    pub macros: Vec<String>,
    pub aliases: Vec<TypeAlias>,
    pub structs: Vec<Aggregate>,
    pub unions: Vec<Aggregate>,
    pub enums: Vec<EnumDecl>,
}

impl FileModel {
    /// Build the model for one file's source text.
    ///
    /// Returns the model together with the malformed declarations that were
    /// skipped; those are diagnostics, not failures.
    pub fn from_source(file: impl Into<String>, source: &str) -> (Self, Vec<Error>) {
        let file = file.into();
        let tokens = tokenize(source);
        let mut model = FileModel {
            file,
            includes: find_includes(&tokens),
            macros: find_macros(&tokens),
            aliases: find_aliases(&tokens),
            ..Default::default()
        };
        let mut problems = Vec::new();

        for span in find_aggregates(&tokens) {
            if fields::locate_body(&tokens, span.start, span.end).is_none() {
                let err = Error::MalformedDeclaration {
                    name: span.name.clone(),
                    line: span.line,
                };
                warn!("{}: {}", model.file, err);
                problems.push(err);
                continue;
            }

            match span.kind {
                DeclKind::Enum => {
                    let values = fields::find_enum_values(&tokens, span.start, span.end);
                    debug!("enum {} has {} values", span.name, values.len());
                    model.enums.push(EnumDecl {
                        name: span.name,
                        tag: span.tag,
                        values,
                        line: span.line,
                    });
                }
                DeclKind::Struct | DeclKind::Union => {
                    let kind = if span.kind == DeclKind::Struct {
                        AggregateKind::Struct
                    } else {
                        AggregateKind::Union
                    };
                    let fields = fields::extract_fields(&tokens, span.start, span.end);
                    debug!("{} {} has {} fields", kind.keyword(), span.name, fields.len());
                    model.push_aggregate(Aggregate {
                        kind,
                        name: span.name,
                        tag: span.tag,
                        fields,
                        line: span.line,
                        parent: None,
                    });
                }
            }
        }

        info!(
            "{}: {} structs, {} unions, {} enums, {} aliases",
            model.file,
            model.structs.len(),
            model.unions.len(),
            model.enums.len(),
            model.aliases.len()
        );
        (model, problems)
    }

    pub fn push_aggregate(&mut self, aggregate: Aggregate) {
        match aggregate.kind {
            AggregateKind::Struct => self.structs.push(aggregate),
            AggregateKind::Union => self.unions.push(aggregate),
        }
    }

    /// Members still carrying an encoded anonymous payload
    pub fn anonymous_member_count(&self) -> usize {
        self.structs
            .iter()
            .chain(&self.unions)
            .flat_map(|aggregate| &aggregate.fields)
            .filter(|field| field.is_anonymous())
            .count()
    }
}

#[cfg(test)]
impl FileModel {
    pub fn find_struct(&self, name: &str) -> Option<&Aggregate> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_union(&self, name: &str) -> Option<&Aggregate> {
        self.unions.iter().find(|u| u.name == name)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.name)?;
        if let Some(tag) = self.tag.as_ref().filter(|tag| **tag != self.name) {
            write!(f, " (tag {})", tag)?;
        }
        if let Some(parent) = &self.parent {
            write!(f, " (anonymous in {})", parent)?;
        }
        writeln!(f, " @ line {}", self.line)?;
        for field in &self.fields {
            writeln!(f, "    {}: {}", field.name, field.type_text())?;
        }
        Ok(())
    }
}

impl fmt::Display for EnumDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "enum {} @ line {}", self.name, self.line)?;
        for value in &self.values {
            writeln!(f, "    {}", value)?;
        }
        Ok(())
    }
}

impl fmt::Display for FileModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {}", self.file)?;
        for include in &self.includes {
            writeln!(f, "include {}", include)?;
        }
        for name in &self.macros {
            writeln!(f, "define {}", name)?;
        }
        for alias in &self.aliases {
            writeln!(f, "typedef {} = {} @ line {}", alias.name, alias.original_type, alias.line)?;
        }
        for aggregate in self.structs.iter().chain(&self.unions) {
            write!(f, "{}", aggregate)?;
        }
        for decl in &self.enums {
            write!(f, "{}", decl)?;
        }
        Ok(())
    }
}
