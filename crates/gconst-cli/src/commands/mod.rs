//! CLI command handlers.

pub mod header;
pub mod merge;
pub mod plan;
pub mod reduce;
pub mod stream;

use anyhow::{Context, Result};
use gconst_merge::Record;
use gconst_types::SchemaIndex;

use crate::input::parse_input_json;
use crate::json::record_from_json;

/// Read a record argument (`json`, `@file` or `@-`) as `type_name`.
fn load_record(schemas: &SchemaIndex, type_name: &str, value: &str, what: &str) -> Result<Record> {
    let json = parse_input_json(value, what)?;
    record_from_json(schemas, type_name, &json).with_context(|| format!("{what} is not a valid {type_name}"))
}
