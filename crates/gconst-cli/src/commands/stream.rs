//! `gconst stream` command: run messages through an in-memory stream.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use gconst_stream::channel;
use gconst_stream::{
    MergingReceiver, MessageSink, MessageSource, Metadata, ReducingSender, client_metadata,
};
use serde_json::json;

use crate::input::parse_input_json;
use crate::json::{record_from_json, record_to_json};
use crate::opts::GlobalOpts;
use crate::output::print_json;

use super::load_record;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Record type (e.g., geo/Feature)
    #[arg(long = "type")]
    pub type_name: String,

    /// Constant the sender offers: JSON literal, @file, or @-
    #[arg(long)]
    pub constant: String,

    /// JSON array of messages: literal, @file, or @- for stdin
    pub messages: String,

    /// Receiver does not advertise the constant header
    #[arg(long)]
    pub no_advertise: bool,
}

pub fn cmd_stream(opts: &GlobalOpts, args: &StreamArgs) -> Result<()> {
    let schemas = Arc::new(opts.load_schemas()?);
    let config = opts.engine_config()?;
    let constant = load_record(&schemas, &args.type_name, &args.constant, "constant")?;
    let messages = parse_input_json(&args.messages, "messages")?;
    let Some(items) = messages.as_array() else {
        bail!("messages must be a JSON array");
    };
    let messages = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            record_from_json(&schemas, &args.type_name, item)
                .with_context(|| format!("message {i} is not a valid {}", args.type_name))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut request = Metadata::new();
    if !args.no_advertise {
        client_metadata(&mut request);
    }

    let (sink, source) = channel::pair(schemas.clone(), args.type_name.clone());
    let sender_schemas = schemas.clone();
    let sender = thread::spawn(move || -> Result<(usize, bool)> {
        let mut sender = ReducingSender::negotiate(&sender_schemas, &request, &constant, sink, &config)?;
        let reducing = sender.is_reducing();
        for message in messages {
            sender.send(message)?;
        }
        let sink = sender.into_inner();
        let bytes = sink.bytes_sent();
        sink.close()?;
        Ok((bytes, reducing))
    });

    let mut receiver = MergingReceiver::new(source, schemas, args.type_name.clone()).with_config(config);
    let mut received = Vec::new();
    while let Some(message) = receiver.recv()? {
        received.push(record_to_json(&message));
    }
    let (bytes, reducing) = sender
        .join()
        .map_err(|_| anyhow!("sender thread panicked"))??;

    print_json(
        opts,
        &json!({
            "reduced": reducing,
            "wire_bytes": bytes,
            "received": received,
        }),
    )
}
