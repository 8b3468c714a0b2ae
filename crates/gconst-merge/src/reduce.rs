//! Reduce executor: clears subject fields equal to the reference.
//!
//! Composites are only entered when already present; nothing is allocated and
//! an all-empty composite is left in place rather than collapsed to `Null`.
//! Collections are cleared whole or not at all.

use crate::apply::ApplyError;
use crate::kinds::handler;
use crate::plan::{FieldPlan, PlanBody, PlanNode};
use crate::value::{Record, Value};

impl FieldPlan {
    /// Clear every field of `subject` that duplicates the captured reference.
    pub fn reduce_from(&self, subject: &mut Value) -> Result<(), ApplyError> {
        let record = self.target_record(subject)?;
        reduce_nodes(&self.nodes, record);
        Ok(())
    }
}

fn reduce_nodes(nodes: &[PlanNode], record: &mut Record) {
    for node in nodes {
        // A missing field is already empty.
        let Some(slot) = record.get_mut(&node.position.name) else {
            continue;
        };
        match &node.body {
            PlanBody::Leaf(reference) | PlanBody::MapEntries { value: reference, .. } => {
                let handler = handler(node.kind);
                if handler.value_of(slot) == handler.value_of(reference) {
                    *slot = handler.empty_value();
                }
            }
            PlanBody::Composite { children, .. } => {
                if let Value::Record(inner) = slot {
                    reduce_nodes(children, inner);
                }
            }
        }
    }
}
