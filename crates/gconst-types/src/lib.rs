//! Record schema model: named record definitions, field types and validation.

mod index;
mod model;

pub use index::{SchemaError, SchemaIndex};
pub use model::*;

#[cfg(test)]
mod tests;
