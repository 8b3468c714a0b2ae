//! `gconst plan` command: show what a donor contributes.

use anyhow::Result;
use clap::Args;
use gconst_merge::{FieldPlan, PlanBody, PlanNode, Value};
use serde_json::{Value as JsonValue, json};

use crate::json::{key_to_string, value_to_json};
use crate::opts::GlobalOpts;
use crate::output::print_json;

use super::load_record;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Donor or reference record: JSON literal, @file, or @- for stdin
    pub value: String,

    /// Print the plan as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_plan(opts: &GlobalOpts, args: &PlanArgs) -> Result<()> {
    let schemas = opts.load_schemas()?;
    let config = opts.engine_config()?;
    let donor = load_record(&schemas, &args.type_name, &args.value, "record")?;
    let plan = FieldPlan::build(&schemas, &Value::Record(donor), &config)?;

    if args.json {
        return print_json(opts, &plan_to_json(&plan));
    }
    println!("{} ({})", plan.type_name(), plan.policy().as_str());
    let mut lines = Vec::new();
    render_nodes(plan.nodes(), 1, &mut lines);
    for line in lines {
        println!("{line}");
    }
    for diagnostic in plan.diagnostics() {
        eprintln!("skipped {}: {}", diagnostic.path, diagnostic.message);
    }
    Ok(())
}

fn render_nodes(nodes: &[PlanNode], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let label = format!("{indent}{} [{}]", node.position.name, node.kind.as_str());
        match &node.body {
            PlanBody::Leaf(value) => lines.push(format!("{label} = {}", value_to_json(value))),
            PlanBody::Composite { children, .. } => {
                lines.push(label);
                render_nodes(children, depth + 1, lines);
            }
            PlanBody::MapEntries { value, entries } => {
                lines.push(format!("{label} = {}", value_to_json(value)));
                for entry in entries {
                    lines.push(format!("{indent}  [{}]", key_to_string(&entry.key)));
                    render_nodes(&entry.children, depth + 2, lines);
                }
            }
        }
    }
}

fn plan_to_json(plan: &FieldPlan) -> JsonValue {
    json!({
        "type": plan.type_name(),
        "policy": plan.policy().as_str(),
        "fields": nodes_to_json(plan.nodes()),
        "diagnostics": plan
            .diagnostics()
            .iter()
            .map(|d| json!({ "path": d.path, "message": d.message }))
            .collect::<Vec<_>>(),
    })
}

fn nodes_to_json(nodes: &[PlanNode]) -> Vec<JsonValue> {
    nodes
        .iter()
        .map(|node| {
            let mut out = json!({
                "index": node.position.index,
                "name": node.position.name,
                "kind": node.kind.as_str(),
            });
            match &node.body {
                PlanBody::Leaf(value) => out["value"] = value_to_json(value),
                PlanBody::Composite { children, .. } => out["fields"] = json!(nodes_to_json(children)),
                PlanBody::MapEntries { value, entries } => {
                    out["value"] = value_to_json(value);
                    out["entries"] = entries
                        .iter()
                        .map(|entry| {
                            json!({
                                "key": key_to_string(&entry.key),
                                "fields": nodes_to_json(&entry.children),
                            })
                        })
                        .collect();
                }
            }
            out
        })
        .collect()
}
