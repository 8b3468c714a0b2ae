//! `gconst reduce` command.

use anyhow::Result;
use clap::Args;
use gconst_merge::{FieldPlan, Value};
use tracing::debug;

use crate::json::value_to_json;
use crate::opts::GlobalOpts;
use crate::output::print_json;

use super::load_record;

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Reference record; matching fields are cleared: JSON literal, @file, or @-
    #[arg(long)]
    pub reference: String,

    /// Subject record: JSON literal, @file, or @- for stdin
    pub subject: String,
}

pub fn cmd_reduce(opts: &GlobalOpts, args: &ReduceArgs) -> Result<()> {
    let schemas = opts.load_schemas()?;
    let config = opts.engine_config()?;
    let reference = load_record(&schemas, &args.type_name, &args.reference, "reference")?;
    let mut subject = Value::Record(load_record(&schemas, &args.type_name, &args.subject, "subject")?);

    let plan = FieldPlan::build(&schemas, &Value::Record(reference), &config)?;
    debug!(nodes = plan.node_count(), skipped = plan.diagnostics().len(), "plan built");
    plan.reduce_from(&mut subject)?;
    print_json(opts, &value_to_json(&subject))
}
