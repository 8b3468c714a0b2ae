//! In-memory transport. Every message crosses the channel in its encoded
//! form, so what the receiver sees is exactly what the wire would carry.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use gconst_merge::Record;
use gconst_types::{Name, SchemaIndex};

use crate::codec;
use crate::header::Metadata;
use crate::stream::{MessageSink, MessageSource, StreamError};

#[derive(Debug)]
enum Frame {
    Header(Metadata),
    Message(Vec<u8>),
}

/// Sending end. Metadata is flushed ahead of the first message.
#[derive(Debug)]
pub struct ChannelSink {
    schemas: Arc<SchemaIndex>,
    tx: Sender<Frame>,
    pending_header: Option<Metadata>,
    header_sent: bool,
    bytes_sent: usize,
}

/// Receiving end; decodes messages as `type_name`.
#[derive(Debug)]
pub struct ChannelSource {
    schemas: Arc<SchemaIndex>,
    type_name: Name,
    rx: Receiver<Frame>,
    header: Option<Metadata>,
    early: VecDeque<Vec<u8>>,
}

/// Connected sink/source pair for one stream of `type_name` records.
pub fn pair(schemas: Arc<SchemaIndex>, type_name: impl Into<Name>) -> (ChannelSink, ChannelSource) {
    let (tx, rx) = mpsc::channel();
    let sink = ChannelSink {
        schemas: schemas.clone(),
        tx,
        pending_header: None,
        header_sent: false,
        bytes_sent: 0,
    };
    let source = ChannelSource {
        schemas,
        type_name: type_name.into(),
        rx,
        header: None,
        early: VecDeque::new(),
    };
    (sink, source)
}

impl ChannelSink {
    /// Total encoded message bytes sent so far.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Flush the header (if not yet sent) and close the stream.
    pub fn close(mut self) -> Result<(), StreamError> {
        self.flush_header()
    }

    fn flush_header(&mut self) -> Result<(), StreamError> {
        if self.header_sent {
            return Ok(());
        }
        let metadata = self.pending_header.take().unwrap_or_default();
        self.tx
            .send(Frame::Header(metadata))
            .map_err(|_| StreamError::Closed)?;
        self.header_sent = true;
        Ok(())
    }
}

impl MessageSink for ChannelSink {
    fn set_header(&mut self, metadata: Metadata) -> Result<(), StreamError> {
        if self.header_sent {
            return Err(StreamError::HeaderSent);
        }
        self.pending_header
            .get_or_insert_with(Metadata::new)
            .extend(metadata);
        Ok(())
    }

    fn send(&mut self, message: Record) -> Result<(), StreamError> {
        self.flush_header()?;
        let bytes = codec::encode(&self.schemas, &message)?;
        self.bytes_sent += bytes.len();
        self.tx
            .send(Frame::Message(bytes))
            .map_err(|_| StreamError::Closed)
    }
}

impl MessageSource for ChannelSource {
    fn header(&mut self) -> Result<Metadata, StreamError> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }
        // A sender that hung up without a header sent empty metadata.
        let header = loop {
            match self.rx.recv() {
                Ok(Frame::Header(metadata)) => break metadata,
                Ok(Frame::Message(bytes)) => self.early.push_back(bytes),
                Err(_) => break Metadata::new(),
            }
        };
        self.header = Some(header.clone());
        Ok(header)
    }

    fn recv(&mut self) -> Result<Option<Record>, StreamError> {
        self.header()?;
        let bytes = match self.early.pop_front() {
            Some(bytes) => bytes,
            None => loop {
                match self.rx.recv() {
                    Ok(Frame::Message(bytes)) => break bytes,
                    Ok(Frame::Header(_)) => continue,
                    Err(_) => return Ok(None),
                }
            },
        };
        Ok(Some(codec::decode(&self.schemas, &self.type_name, &bytes)?))
    }
}
