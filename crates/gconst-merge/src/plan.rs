//! Shape walker: builds a [`FieldPlan`] from a donor or reference record.
//!
//! The walker visits the record's declared fields in declaration order,
//! recursing into composite fields before deciding whether to keep them, and
//! emits one node per non-empty field. Empty branches are pruned, so apply
//! time only touches fields that can change.
//!
//! Only one layer of `option` is looked through when deciding whether a field
//! is a composite. `option<option<_>>` and dynamic slots (including a dynamic
//! whose payload is another dynamic) are opaque leaves.

use gconst_types::{FieldDef, Name, RecordDef, SchemaIndex, TypeExpr};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::{CollectionPolicy, EngineConfig};
use crate::kinds::{FieldKind, classify};
use crate::shape::empty_record;
use crate::value::{Record, Value, ValueKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("plan root must be a record, got {found}")]
    NotARecord { found: &'static str },
    #[error("record type '{0}' is not defined in the schema")]
    UnknownRecord(Name),
    #[error("record nesting exceeds max depth {max_depth} at '{path}'")]
    DepthExceeded { max_depth: usize, path: String },
    #[error("failed to fingerprint donor: {0}")]
    Fingerprint(String),
}

/// Stable location of a field inside its parent record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPos {
    /// Declaration index within the record definition.
    pub index: usize,
    pub name: String,
}

/// What a node carries for the executors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanBody {
    /// Captured donor/reference value, applied as a whole.
    Leaf(Value),
    /// Record-typed field with at least one planned sub-field, or a present
    /// optional record. `template` is an empty instance used to allocate the
    /// target slot when it is absent.
    Composite {
        template: Record,
        children: Vec<PlanNode>,
    },
    /// Element-aware map: `value` is the whole captured map; `entries` hold
    /// nested plans for record-valued entries.
    MapEntries {
        value: Value,
        entries: Vec<EntryPlan>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanNode {
    pub position: FieldPos,
    pub kind: FieldKind,
    pub body: PlanBody,
}

impl PlanNode {
    pub fn children(&self) -> &[PlanNode] {
        match &self.body {
            PlanBody::Composite { children, .. } => children,
            PlanBody::Leaf(_) | PlanBody::MapEntries { .. } => &[],
        }
    }

    fn count(&self) -> usize {
        1 + self.children().iter().map(PlanNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPlan {
    pub key: ValueKey,
    pub children: Vec<PlanNode>,
}

/// A field the walker could not plan; it is left untouched by the executors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

/// Reusable, immutable description of a donor's (or reference's) non-empty
/// fields. Cheap to share through `Arc` across threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPlan {
    pub(crate) type_name: Name,
    pub(crate) policy: CollectionPolicy,
    pub(crate) nodes: Vec<PlanNode>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl FieldPlan {
    /// Walk `donor` once and capture its non-empty fields.
    pub fn build(
        schemas: &SchemaIndex,
        donor: &Value,
        config: &EngineConfig,
    ) -> Result<Self, PlanError> {
        let record = donor
            .as_record()
            .ok_or(PlanError::NotARecord { found: donor.kind() })?;
        let def = schemas
            .get(&record.type_name)
            .ok_or_else(|| PlanError::UnknownRecord(record.type_name.clone()))?;

        let mut walker = Walker {
            schemas,
            config,
            diagnostics: Vec::new(),
        };
        let nodes = walker.walk_record(def, record, 1, &record.type_name)?;
        let plan = FieldPlan {
            type_name: record.type_name.clone(),
            policy: config.policy,
            nodes,
            diagnostics: walker.diagnostics,
        };
        debug!(
            record = %plan.type_name,
            nodes = plan.node_count(),
            skipped = plan.diagnostics.len(),
            "built field plan"
        );
        Ok(plan)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn policy(&self) -> CollectionPolicy {
        self.policy
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True when the donor had nothing to contribute; applying is a no-op.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes, nested ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(PlanNode::count).sum()
    }
}

struct Walker<'a> {
    schemas: &'a SchemaIndex,
    config: &'a EngineConfig,
    diagnostics: Vec<Diagnostic>,
}

impl Walker<'_> {
    fn walk_record(
        &mut self,
        def: &RecordDef,
        record: &Record,
        depth: usize,
        path: &str,
    ) -> Result<Vec<PlanNode>, PlanError> {
        if depth > self.config.max_depth {
            return Err(PlanError::DepthExceeded {
                max_depth: self.config.max_depth,
                path: path.to_string(),
            });
        }

        let mut nodes = Vec::new();
        for (index, field) in def.fields.iter().enumerate() {
            if !field.access.is_writable() {
                continue;
            }
            let Some(value) = record.get(&field.name) else {
                continue;
            };
            let field_path = format!("{path}.{}", field.name);
            let position = FieldPos {
                index,
                name: field.name.clone(),
            };
            if let Some(node) = self.walk_field(field, position, value, depth, &field_path)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn walk_field(
        &mut self,
        field: &FieldDef,
        position: FieldPos,
        value: &Value,
        depth: usize,
        path: &str,
    ) -> Result<Option<PlanNode>, PlanError> {
        match &field.ty {
            TypeExpr::Variant(_) => {
                trace!(field = %path, "variant field left untouched");
                Ok(None)
            }
            TypeExpr::Ref(name) => {
                let Value::Record(inner) = value else {
                    self.skip(path, format!("expected record, found {}", value.kind()));
                    return Ok(None);
                };
                match self.walk_nested(name, inner, depth, path)? {
                    Some(children) if !children.is_empty() => {
                        Ok(Some(self.composite(position, FieldKind::Record, name, children)))
                    }
                    _ => Ok(None),
                }
            }
            TypeExpr::Option(inner_ty) => match (&**inner_ty, value) {
                (_, Value::Null) => Ok(None),
                (TypeExpr::Ref(name), Value::Record(inner)) => {
                    // Presence alone is content for an optional record.
                    let children = self.walk_nested(name, inner, depth, path)?;
                    Ok(children
                        .map(|children| self.composite(position, FieldKind::Optional, name, children)))
                }
                (TypeExpr::Ref(_), other) => {
                    self.skip(path, format!("expected record or null, found {}", other.kind()));
                    Ok(None)
                }
                _ => Ok(self.walk_leaf(&field.ty, position, value, path)),
            },
            TypeExpr::Map(map) if self.config.policy == CollectionPolicy::ElementAware => {
                let Value::Map(entries) = value else {
                    self.skip(path, format!("expected map, found {}", value.kind()));
                    return Ok(None);
                };
                if entries.is_empty() {
                    return Ok(None);
                }
                let mut planned = Vec::new();
                if let Some(name) = record_name(&map.value) {
                    for (key, entry) in entries {
                        let Value::Record(inner) = entry else {
                            continue;
                        };
                        let entry_path = format!("{path}[{key:?}]");
                        if let Some(children) = self.walk_nested(name, inner, depth, &entry_path)? {
                            if !children.is_empty() {
                                planned.push(EntryPlan {
                                    key: key.clone(),
                                    children,
                                });
                            }
                        }
                    }
                }
                Ok(Some(PlanNode {
                    position,
                    kind: FieldKind::Map,
                    body: PlanBody::MapEntries {
                        value: value.clone(),
                        entries: planned,
                    },
                }))
            }
            ty => Ok(self.walk_leaf(ty, position, value, path)),
        }
    }

    fn walk_leaf(
        &mut self,
        ty: &TypeExpr,
        position: FieldPos,
        value: &Value,
        path: &str,
    ) -> Option<PlanNode> {
        let Some(handler) = classify(ty) else {
            self.skip(path, format!("no handler for {} fields", ty.kind()));
            return None;
        };
        if !handler.accepts(value) {
            self.skip(path, format!("expected {}, found {}", ty.kind(), value.kind()));
            return None;
        }
        if handler.is_empty(value) {
            return None;
        }
        Some(PlanNode {
            position,
            kind: handler.kind(),
            body: PlanBody::Leaf(value.clone()),
        })
    }

    /// Recurse into a nested record; `None` when it is not a `name` record or
    /// its type cannot be resolved.
    fn walk_nested(
        &mut self,
        name: &str,
        inner: &Record,
        depth: usize,
        path: &str,
    ) -> Result<Option<Vec<PlanNode>>, PlanError> {
        if inner.type_name != name {
            self.skip(path, format!("expected {name}, found {}", inner.type_name));
            return Ok(None);
        }
        let Some(def) = self.schemas.get(name) else {
            self.skip(path, format!("unknown record type '{name}'"));
            return Ok(None);
        };
        self.walk_record(def, inner, depth + 1, path).map(Some)
    }

    fn composite(
        &self,
        position: FieldPos,
        kind: FieldKind,
        name: &str,
        children: Vec<PlanNode>,
    ) -> PlanNode {
        PlanNode {
            position,
            kind,
            body: PlanBody::Composite {
                template: empty_record(self.schemas, name),
                children,
            },
        }
    }

    fn skip(&mut self, path: &str, message: String) {
        warn!(field = %path, "{message}; field skipped");
        self.diagnostics.push(Diagnostic {
            path: path.to_string(),
            message,
        });
    }
}

fn record_name(ty: &TypeExpr) -> Option<&str> {
    match ty {
        TypeExpr::Ref(name) => Some(name),
        TypeExpr::Option(inner) => match &**inner {
            TypeExpr::Ref(name) => Some(name),
            _ => None,
        },
        _ => None,
    }
}
