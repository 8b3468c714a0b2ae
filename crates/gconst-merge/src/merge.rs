//! Merge executor: fills empty target fields from a plan. Never overwrites a
//! non-empty field, so applying the same plan twice changes nothing.

use tracing::warn;

use crate::apply::ApplyError;
use crate::kinds::handler;
use crate::plan::{EntryPlan, FieldPlan, PlanBody, PlanNode};
use crate::value::{Record, Value, ValueMap};

impl FieldPlan {
    /// Merge the captured donor values into `target` in place.
    pub fn merge_into(&self, target: &mut Value) -> Result<(), ApplyError> {
        let record = self.target_record(target)?;
        merge_nodes(&self.nodes, record);
        Ok(())
    }
}

fn merge_nodes(nodes: &[PlanNode], record: &mut Record) {
    for node in nodes {
        let name = &node.position.name;
        match &node.body {
            PlanBody::Leaf(value) => {
                let slot = record
                    .fields
                    .entry(name.clone())
                    .or_insert_with(|| handler(node.kind).empty_value());
                if handler(node.kind).is_empty(slot) {
                    *slot = value.clone();
                }
            }
            PlanBody::Composite { template, children } => {
                let slot = record.fields.entry(name.clone()).or_insert(Value::Null);
                if matches!(slot, Value::Null) {
                    *slot = Value::Record(template.clone());
                }
                match slot {
                    Value::Record(inner) => merge_nodes(children, inner),
                    other => warn!(
                        field = %name,
                        found = other.kind(),
                        "merge target is not a record; field skipped"
                    ),
                }
            }
            PlanBody::MapEntries { value, entries } => {
                let Value::Map(donor) = value else {
                    continue;
                };
                let slot = record
                    .fields
                    .entry(name.clone())
                    .or_insert_with(|| handler(node.kind).empty_value());
                let target = match slot {
                    Value::Map(target) => target,
                    other => {
                        warn!(field = %name, found = other.kind(), "merge target is not a map; field skipped");
                        continue;
                    }
                };
                merge_shared_entries(entries, target);
                for (key, entry) in donor {
                    let missing = target.get(key).is_none_or(|existing| matches!(existing, Value::Null));
                    if missing {
                        target.insert(key.clone(), entry.clone());
                    }
                }
            }
        }
    }
}

/// One level into record-valued entries present on both sides.
fn merge_shared_entries(entries: &[EntryPlan], target: &mut ValueMap) {
    for entry in entries {
        if let Some(Value::Record(inner)) = target.get_mut(&entry.key) {
            merge_nodes(&entry.children, inner);
        }
    }
}
