//! `gconst header encode|decode` commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use gconst_stream::{decode_constant, header_set_constant};

use crate::input::parse_input_value;
use crate::json::record_to_json;
use crate::opts::GlobalOpts;
use crate::output::print_json;

use super::load_record;

#[derive(Subcommand, Debug)]
pub enum HeaderCommand {
    /// Print the constant header for a record
    Encode(HeaderEncodeArgs),

    /// Decode a constant header value back into JSON
    Decode(HeaderDecodeArgs),
}

#[derive(Args, Debug)]
pub struct HeaderEncodeArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Record value: JSON literal, @file, or @- for stdin
    pub value: String,
}

#[derive(Args, Debug)]
pub struct HeaderDecodeArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Header value (base64), @file, or @- for stdin
    pub header: String,
}

pub fn cmd_header(opts: &GlobalOpts, command: &HeaderCommand) -> Result<()> {
    match command {
        HeaderCommand::Encode(args) => cmd_encode(opts, args),
        HeaderCommand::Decode(args) => cmd_decode(opts, args),
    }
}

fn cmd_encode(opts: &GlobalOpts, args: &HeaderEncodeArgs) -> Result<()> {
    let schemas = opts.load_schemas()?;
    let record = load_record(&schemas, &args.type_name, &args.value, "record")?;
    for (key, values) in header_set_constant(&schemas, &record)? {
        for value in values {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn cmd_decode(opts: &GlobalOpts, args: &HeaderDecodeArgs) -> Result<()> {
    let schemas = opts.load_schemas()?;
    let header = parse_input_value(&args.header)?;
    let record = decode_constant(&schemas, &args.type_name, &header)?;
    print_json(opts, &record_to_json(&record))
}
