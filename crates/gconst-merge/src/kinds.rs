//! Kind handler registry: per-kind emptiness, comparison and reset rules.
//!
//! A field's kind is resolved once from its declared [`TypeExpr`] while the
//! plan is built and cached on the plan node, so executors never re-detect it.

use gconst_types::TypeExpr;
use serde::Serialize;

use crate::value::{Value, ValueMap};

/// Closed set of field kinds the engine knows how to merge and reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int,
    Nat,
    Float,
    Text,
    Bytes,
    /// Embedded record; always present.
    Record,
    /// `option<_>`; empty when `null`.
    Optional,
    List,
    Map,
    /// Open "any" slot; always an opaque leaf.
    Dynamic,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Nat => "nat",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::Bytes => "bytes",
            FieldKind::Record => "record",
            FieldKind::Optional => "optional",
            FieldKind::List => "list",
            FieldKind::Map => "map",
            FieldKind::Dynamic => "dynamic",
        }
    }
}

/// The value a handler extracts for reduce's equality test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparable<'a> {
    Bool(bool),
    Int(i64),
    Nat(u64),
    Float(f64),
    Text(&'a str),
    Bytes(&'a [u8]),
    /// Deep structural comparison of the whole value.
    Whole(&'a Value),
}

pub trait KindHandler: Sync {
    fn kind(&self) -> FieldKind;

    /// Whether `value` has the shape this kind expects.
    fn accepts(&self, value: &Value) -> bool;

    /// Emptiness test. Values of the wrong shape are never empty, so merge
    /// leaves unexpected data alone.
    fn is_empty(&self, value: &Value) -> bool;

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        Comparable::Whole(value)
    }

    /// The value a cleared field is reset to.
    fn empty_value(&self) -> Value;
}

struct BoolHandler;
struct IntHandler;
struct NatHandler;
struct FloatHandler;
struct TextHandler;
struct BytesHandler;
struct RecordHandler;
struct OptionalHandler;
struct ListHandler;
struct MapHandler;
struct DynamicHandler;

impl KindHandler for BoolHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Bool
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(false))
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Bool(b) => Comparable::Bool(*b),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Bool(false)
    }
}

impl KindHandler for IntHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Int
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Int(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Int(0))
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Int(i) => Comparable::Int(*i),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Int(0)
    }
}

impl KindHandler for NatHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Nat
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Nat(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Nat(0))
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Nat(n) => Comparable::Nat(*n),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Nat(0)
    }
}

impl KindHandler for FloatHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Float(f) if *f == 0.0)
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Float(f) => Comparable::Float(*f),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Float(0.0)
    }
}

impl KindHandler for TextHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Text(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Text(t) if t.is_empty())
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Text(t) => Comparable::Text(t),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Text(String::new())
    }
}

impl KindHandler for BytesHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Bytes
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Bytes(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Bytes(b) if b.is_empty())
    }

    fn value_of<'a>(&self, value: &'a Value) -> Comparable<'a> {
        match value {
            Value::Bytes(b) => Comparable::Bytes(b),
            other => Comparable::Whole(other),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Bytes(Vec::new())
    }
}

impl KindHandler for RecordHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Record
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Record(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Record(_)) && value.is_zero()
    }

    // Embedded records are never reset wholesale; reduce clears their leaves.
    fn empty_value(&self) -> Value {
        Value::Null
    }
}

impl KindHandler for OptionalHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Optional
    }

    fn accepts(&self, _value: &Value) -> bool {
        true
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Null)
    }

    fn empty_value(&self) -> Value {
        Value::Null
    }
}

impl KindHandler for ListHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::List
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::List(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::List(items) if items.is_empty())
    }

    fn empty_value(&self) -> Value {
        Value::List(Vec::new())
    }
}

impl KindHandler for MapHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Map
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Map(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Map(entries) if entries.is_empty())
    }

    fn empty_value(&self) -> Value {
        Value::Map(ValueMap::new())
    }
}

impl KindHandler for DynamicHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Dynamic
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Dynamic(_))
    }

    fn is_empty(&self, value: &Value) -> bool {
        matches!(value, Value::Null)
    }

    fn empty_value(&self) -> Value {
        Value::Null
    }
}

static BOOL: BoolHandler = BoolHandler;
static INT: IntHandler = IntHandler;
static NAT: NatHandler = NatHandler;
static FLOAT: FloatHandler = FloatHandler;
static TEXT: TextHandler = TextHandler;
static BYTES: BytesHandler = BytesHandler;
static RECORD: RecordHandler = RecordHandler;
static OPTIONAL: OptionalHandler = OptionalHandler;
static LIST: ListHandler = ListHandler;
static MAP: MapHandler = MapHandler;
static DYNAMIC: DynamicHandler = DynamicHandler;

/// Handler for a kind already resolved on a plan node.
pub fn handler(kind: FieldKind) -> &'static dyn KindHandler {
    match kind {
        FieldKind::Bool => &BOOL,
        FieldKind::Int => &INT,
        FieldKind::Nat => &NAT,
        FieldKind::Float => &FLOAT,
        FieldKind::Text => &TEXT,
        FieldKind::Bytes => &BYTES,
        FieldKind::Record => &RECORD,
        FieldKind::Optional => &OPTIONAL,
        FieldKind::List => &LIST,
        FieldKind::Map => &MAP,
        FieldKind::Dynamic => &DYNAMIC,
    }
}

/// Resolve the handler for a declared field type.
///
/// Variants return `None`: tagged unions are never merged or reduced.
pub fn classify(ty: &TypeExpr) -> Option<&'static dyn KindHandler> {
    let kind = match ty {
        TypeExpr::Bool => FieldKind::Bool,
        TypeExpr::Int => FieldKind::Int,
        TypeExpr::Nat => FieldKind::Nat,
        TypeExpr::Float => FieldKind::Float,
        TypeExpr::Text => FieldKind::Text,
        TypeExpr::Bytes => FieldKind::Bytes,
        TypeExpr::Ref(_) => FieldKind::Record,
        TypeExpr::Option(_) => FieldKind::Optional,
        TypeExpr::List(_) => FieldKind::List,
        TypeExpr::Map(_) => FieldKind::Map,
        TypeExpr::Dynamic => FieldKind::Dynamic,
        TypeExpr::Variant(_) => return None,
    };
    Some(handler(kind))
}
