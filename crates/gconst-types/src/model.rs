use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type Name = String;

/// Field type expression.
///
/// Record types are always named and referenced through [`TypeExpr::Ref`];
/// everything else is structural and inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Bool,
    Int,
    Nat,
    Float,
    Text,
    Bytes,
    /// Named record type.
    Ref(Name),
    List(Box<TypeExpr>),
    Map(TypeMap),
    /// Nullable slot; `null` means absent.
    Option(Box<TypeExpr>),
    /// Tagged union: exactly one of the named cases is populated.
    Variant(IndexMap<String, TypeExpr>),
    /// Open "any" slot holding a self-describing value of any shape.
    Dynamic,
}

impl TypeExpr {
    pub fn option(inner: TypeExpr) -> Self {
        TypeExpr::Option(Box::new(inner))
    }

    pub fn list(inner: TypeExpr) -> Self {
        TypeExpr::List(Box::new(inner))
    }

    pub fn map(key: TypeMapKey, value: TypeExpr) -> Self {
        TypeExpr::Map(TypeMap {
            key,
            value: Box::new(value),
        })
    }

    pub fn reference(name: impl Into<Name>) -> Self {
        TypeExpr::Ref(name.into())
    }

    /// Human-readable kind string used in error messages and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeExpr::Bool => "bool",
            TypeExpr::Int => "int",
            TypeExpr::Nat => "nat",
            TypeExpr::Float => "float",
            TypeExpr::Text => "text",
            TypeExpr::Bytes => "bytes",
            TypeExpr::Ref(_) => "record",
            TypeExpr::List(_) => "list",
            TypeExpr::Map(_) => "map",
            TypeExpr::Option(_) => "option",
            TypeExpr::Variant(_) => "variant",
            TypeExpr::Dynamic => "dynamic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMap {
    pub key: TypeMapKey,
    pub value: Box<TypeExpr>,
}

/// Key types allowed in maps (comparable primitives only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMapKey {
    Bool,
    Int,
    Nat,
    Text,
}

/// Who may write a field from outside the record.
///
/// Only public fields take part in merge and reduce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAccess {
    #[default]
    Public,
    ReadOnly,
    Private,
}

impl FieldAccess {
    pub fn is_writable(self) -> bool {
        matches!(self, FieldAccess::Public)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default, skip_serializing_if = "is_public")]
    pub access: FieldAccess,
}

fn is_public(access: &FieldAccess) -> bool {
    *access == FieldAccess::Public
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            access: FieldAccess::Public,
        }
    }

    pub fn with_access(mut self, access: FieldAccess) -> Self {
        self.access = access;
        self
    }
}

/// Named record type; field order is declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: Name,
    pub fields: Vec<FieldDef>,
}

impl RecordDef {
    pub fn new(name: impl Into<Name>, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<(usize, &FieldDef)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }
}

/// On-disk schema document: `{ "records": [ ... ] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDoc {
    #[serde(default)]
    pub records: Vec<RecordDef>,
}
