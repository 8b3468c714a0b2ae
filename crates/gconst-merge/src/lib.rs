//! Generic merge/reduce engine for constant-defaulted record streams.
//!
//! A [`FieldPlan`] is built once from a donor (or reference) record and then
//! applied to any number of records of the same type: [`FieldPlan::merge_into`]
//! fills their empty fields, [`FieldPlan::reduce_from`] clears the fields that
//! duplicate the reference.

mod apply;
mod cache;
pub mod config;
pub mod kinds;
mod merge;
mod plan;
mod reduce;
pub mod shape;
mod value;

pub use apply::{ApplyError, Merger, Reducer};
pub use cache::PlanCache;
pub use config::{CollectionPolicy, ConfigError, EngineConfig};
pub use kinds::FieldKind;
pub use plan::{Diagnostic, EntryPlan, FieldPlan, FieldPos, PlanBody, PlanError, PlanNode};
pub use value::{Record, Value, ValueKey, ValueMap};

#[cfg(test)]
mod tests;
