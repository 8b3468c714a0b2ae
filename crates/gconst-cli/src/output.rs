use anyhow::Result;
use serde_json::Value as JsonValue;

use crate::opts::GlobalOpts;

pub fn print_json(opts: &GlobalOpts, data: &JsonValue) -> Result<()> {
    if opts.pretty {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        println!("{}", serde_json::to_string(data)?);
    }
    Ok(())
}
