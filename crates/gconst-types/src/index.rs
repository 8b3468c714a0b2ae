use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::{Name, RecordDef, SchemaDoc, TypeExpr};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("record '{0}' defined more than once")]
    DuplicateRecord(Name),
    #[error("record '{record}' declares field '{field}' more than once")]
    DuplicateField { record: Name, field: String },
    #[error("record '{record}' field '{field}' references unknown record '{reference}'")]
    UnknownRef {
        record: Name,
        field: String,
        reference: Name,
    },
    #[error("record '{0}' embeds itself without an option, list, map or dynamic break")]
    EmbeddedCycle(Name),
    #[error("invalid schema document: {0}")]
    Json(String),
}

/// Lookup table of named record definitions.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    records: IndexMap<Name, RecordDef>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate an index from record definitions.
    pub fn from_defs(defs: impl IntoIterator<Item = RecordDef>) -> Result<Self, SchemaError> {
        let mut index = Self::new();
        for def in defs {
            if index.records.contains_key(&def.name) {
                return Err(SchemaError::DuplicateRecord(def.name));
            }
            index.records.insert(def.name.clone(), def);
        }
        index.validate()?;
        Ok(index)
    }

    /// Parse a `{ "records": [...] }` document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc =
            serde_json::from_str(json).map_err(|err| SchemaError::Json(err.to_string()))?;
        Self::from_defs(doc.records)
    }

    pub fn get(&self, name: &str) -> Option<&RecordDef> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordDef> {
        self.records.values()
    }

    /// `name` and every record definition reachable from it through field
    /// types, in first-reached order. Unknown names are left out.
    pub fn closure(&self, name: &str) -> Vec<&RecordDef> {
        let mut reached: Vec<&RecordDef> = Vec::new();
        let mut pending = vec![name];
        while let Some(next) = pending.pop() {
            if reached.iter().any(|def| def.name == next) {
                continue;
            }
            let Some(def) = self.records.get(next) else {
                continue;
            };
            reached.push(def);
            let mut refs = Vec::new();
            for field in &def.fields {
                collect_refs(&field.ty, &mut refs);
            }
            pending.extend(refs.into_iter().rev().map(String::as_str));
        }
        reached
    }

    /// Checks field uniqueness, reference resolution and embedded cycles.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for def in self.records.values() {
            let mut seen = HashSet::new();
            for field in &def.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        record: def.name.clone(),
                        field: field.name.clone(),
                    });
                }
                let mut refs = Vec::new();
                collect_refs(&field.ty, &mut refs);
                for reference in refs {
                    if !self.records.contains_key(reference) {
                        return Err(SchemaError::UnknownRef {
                            record: def.name.clone(),
                            field: field.name.clone(),
                            reference: reference.clone(),
                        });
                    }
                }
            }
        }

        let mut done = HashSet::new();
        for name in self.records.keys() {
            let mut path = Vec::new();
            self.check_embedded(name, &mut path, &mut done)?;
        }
        Ok(())
    }

    // Depth-first over direct (unwrapped) record fields only: those are the
    // edges that would make an empty instance infinitely large.
    fn check_embedded<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), SchemaError> {
        if done.contains(name) {
            return Ok(());
        }
        if path.contains(&name) {
            return Err(SchemaError::EmbeddedCycle(name.to_string()));
        }
        let Some(def) = self.records.get(name) else {
            return Ok(());
        };
        path.push(name);
        for field in &def.fields {
            if let TypeExpr::Ref(next) = &field.ty {
                self.check_embedded(next, path, done)?;
            }
        }
        path.pop();
        done.insert(name);
        Ok(())
    }
}

fn collect_refs<'a>(ty: &'a TypeExpr, out: &mut Vec<&'a Name>) {
    match ty {
        TypeExpr::Ref(name) => out.push(name),
        TypeExpr::List(inner) | TypeExpr::Option(inner) => collect_refs(inner, out),
        TypeExpr::Map(map) => collect_refs(&map.value, out),
        TypeExpr::Variant(cases) => cases.values().for_each(|case| collect_refs(case, out)),
        TypeExpr::Bool
        | TypeExpr::Int
        | TypeExpr::Nat
        | TypeExpr::Float
        | TypeExpr::Text
        | TypeExpr::Bytes
        | TypeExpr::Dynamic => {}
    }
}
