//! Input parsing utilities for @file and @- syntax.

use std::io::Read;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

/// Read an argument that may be a literal, `@file`, or `@-` for stdin.
pub fn parse_input_value(value: &str) -> Result<String> {
    if value == "@-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read from stdin")?;
        Ok(buf)
    } else if let Some(path) = value.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path))
    } else {
        Ok(value.to_string())
    }
}

/// [`parse_input_value`] followed by JSON parsing; `what` names the argument
/// in errors.
pub fn parse_input_json(value: &str, what: &str) -> Result<JsonValue> {
    let text = parse_input_value(value)?;
    serde_json::from_str(&text).with_context(|| format!("parse {what} as JSON"))
}
