//! `gconst merge` command.

use anyhow::Result;
use clap::Args;
use gconst_merge::{FieldPlan, Value};
use tracing::debug;

use crate::json::value_to_json;
use crate::opts::GlobalOpts;
use crate::output::print_json;

use super::load_record;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Donor record whose set fields fill the target: JSON literal, @file, or @-
    #[arg(long)]
    pub donor: String,

    /// Target record: JSON literal, @file, or @- for stdin
    pub target: String,
}

pub fn cmd_merge(opts: &GlobalOpts, args: &MergeArgs) -> Result<()> {
    let schemas = opts.load_schemas()?;
    let config = opts.engine_config()?;
    let donor = load_record(&schemas, &args.type_name, &args.donor, "donor")?;
    let mut target = Value::Record(load_record(&schemas, &args.type_name, &args.target, "target")?);

    let plan = FieldPlan::build(&schemas, &Value::Record(donor), &config)?;
    debug!(nodes = plan.node_count(), skipped = plan.diagnostics().len(), "plan built");
    plan.merge_into(&mut target)?;
    print_json(opts, &value_to_json(&target))
}
