//! Stream wrappers that merge on receive and reduce on send.
//!
//! Both wrappers sit between the transport and application code: messages are
//! merged after the transport decodes them and reduced before it encodes them.

use std::sync::Arc;

use gconst_merge::{
    ApplyError, EngineConfig, FieldPlan, Merger, PlanCache, PlanError, Record, Reducer, Value,
};
use gconst_types::{Name, SchemaIndex};
use thiserror::Error;
use tracing::{debug, error};

use crate::codec::CodecError;
use crate::header::{ConstHeader, HeaderError, Metadata, advertises_constant, header_set_constant, read_constant};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream closed by peer")]
    Closed,
    #[error("header already sent")]
    HeaderSent,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Receive half of a record stream.
pub trait MessageSource {
    /// Metadata the sender attached before its first message.
    fn header(&mut self) -> Result<Metadata, StreamError>;

    /// Next decoded message; `None` once the sender is done.
    fn recv(&mut self) -> Result<Option<Record>, StreamError>;
}

/// Send half of a record stream.
pub trait MessageSink {
    /// Attach metadata; must happen before the first `send`.
    fn set_header(&mut self, metadata: Metadata) -> Result<(), StreamError>;

    fn send(&mut self, message: Record) -> Result<(), StreamError>;
}

impl<T: MessageSource + ?Sized> MessageSource for &mut T {
    fn header(&mut self) -> Result<Metadata, StreamError> {
        (**self).header()
    }

    fn recv(&mut self) -> Result<Option<Record>, StreamError> {
        (**self).recv()
    }
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn set_header(&mut self, metadata: Metadata) -> Result<(), StreamError> {
        (**self).set_header(metadata)
    }

    fn send(&mut self, message: Record) -> Result<(), StreamError> {
        (**self).send(message)
    }
}

/// Builds the merger for a decoded constant. Lets a specialised implementation
/// replace the generic plan.
pub type MergerFactory =
    Arc<dyn Fn(&SchemaIndex, &Value) -> Result<Box<dyn Merger>, PlanError> + Send + Sync>;

enum MergeState {
    Pending,
    PassThrough,
    Active(Box<dyn Merger>),
}

/// Fills every received message with the constant from the stream header.
///
/// The header is read once, on the first `recv`. Without a constant the
/// stream passes through unchanged.
pub struct MergingReceiver<S> {
    inner: S,
    schemas: Arc<SchemaIndex>,
    type_name: Name,
    config: EngineConfig,
    factory: Option<MergerFactory>,
    cache: Option<Arc<PlanCache>>,
    state: MergeState,
}

impl<S: MessageSource> MergingReceiver<S> {
    pub fn new(inner: S, schemas: Arc<SchemaIndex>, type_name: impl Into<Name>) -> Self {
        Self {
            inner,
            schemas,
            type_name: type_name.into(),
            config: EngineConfig::default(),
            factory: None,
            cache: None,
            state: MergeState::Pending,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Share plans with other receivers carrying the same constant.
    pub fn with_cache(mut self, cache: Arc<PlanCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_factory(mut self, factory: MergerFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// True once a constant was found and is being applied.
    pub fn is_merging(&self) -> bool {
        matches!(self.state, MergeState::Active(_))
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn init(&mut self) -> Result<(), StreamError> {
        let metadata = self.inner.header()?;
        self.state = match read_constant(&self.schemas, &self.type_name, &metadata) {
            ConstHeader::Absent => MergeState::PassThrough,
            // Already logged by `read_constant`.
            ConstHeader::Invalid(_) => MergeState::PassThrough,
            ConstHeader::Present(record) => match self.build_merger(Value::Record(record)) {
                Ok(merger) => MergeState::Active(merger),
                Err(err) => {
                    error!(record = %self.type_name, error = %err, "constant could not be planned; merging disabled");
                    MergeState::PassThrough
                }
            },
        };
        debug!(record = %self.type_name, merging = self.is_merging(), "stream header read");
        Ok(())
    }

    fn build_merger(&self, donor: Value) -> Result<Box<dyn Merger>, PlanError> {
        if let Some(factory) = &self.factory {
            return factory(&self.schemas, &donor);
        }
        if let Some(cache) = &self.cache {
            return Ok(Box::new(cache.get_or_build(&self.schemas, &donor, &self.config)?));
        }
        Ok(Box::new(FieldPlan::build(&self.schemas, &donor, &self.config)?))
    }
}

impl<S: MessageSource> MessageSource for MergingReceiver<S> {
    fn header(&mut self) -> Result<Metadata, StreamError> {
        self.inner.header()
    }

    fn recv(&mut self) -> Result<Option<Record>, StreamError> {
        if matches!(self.state, MergeState::Pending) {
            self.init()?;
        }
        let Some(message) = self.inner.recv()? else {
            return Ok(None);
        };
        let MergeState::Active(merger) = &self.state else {
            return Ok(Some(message));
        };
        let mut message = Value::Record(message);
        merger.merge(&mut message)?;
        let found = message.kind();
        Ok(Some(
            message
                .into_record()
                .ok_or(ApplyError::NotARecord { found })?,
        ))
    }
}

/// Strips constant fields from every outgoing message when the peer asked
/// for it.
pub struct ReducingSender<S> {
    inner: S,
    reducer: Option<Box<dyn Reducer>>,
}

impl<S: MessageSink> ReducingSender<S> {
    /// Decide from the peer's request metadata whether to reduce. When the
    /// peer advertised the constant header, `reference` is sent as the
    /// header and every message is reduced against it.
    pub fn negotiate(
        schemas: &SchemaIndex,
        incoming: &Metadata,
        reference: &Record,
        sink: S,
        config: &EngineConfig,
    ) -> Result<Self, StreamError> {
        if !advertises_constant(incoming) {
            return Ok(Self::pass_through(sink));
        }
        let plan = FieldPlan::build(schemas, &Value::Record(reference.clone()), config)?;
        Self::negotiate_with(schemas, incoming, reference, Box::new(plan), sink)
    }

    /// Like [`ReducingSender::negotiate`] with a caller-supplied reducer.
    pub fn negotiate_with(
        schemas: &SchemaIndex,
        incoming: &Metadata,
        reference: &Record,
        reducer: Box<dyn Reducer>,
        mut sink: S,
    ) -> Result<Self, StreamError> {
        if !advertises_constant(incoming) {
            return Ok(Self::pass_through(sink));
        }
        sink.set_header(header_set_constant(schemas, reference)?)?;
        debug!(record = %reference.type_name, "peer accepts constants; reducing stream");
        Ok(Self {
            inner: sink,
            reducer: Some(reducer),
        })
    }

    pub fn pass_through(sink: S) -> Self {
        Self {
            inner: sink,
            reducer: None,
        }
    }

    pub fn is_reducing(&self) -> bool {
        self.reducer.is_some()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MessageSink> MessageSink for ReducingSender<S> {
    fn set_header(&mut self, metadata: Metadata) -> Result<(), StreamError> {
        self.inner.set_header(metadata)
    }

    fn send(&mut self, message: Record) -> Result<(), StreamError> {
        let Some(reducer) = &self.reducer else {
            return self.inner.send(message);
        };
        let mut message = Value::Record(message);
        if let Err(err) = reducer.reduce(&mut message) {
            error!(error = %err, "could not reduce message; sending it whole");
        }
        let found = message.kind();
        let message = message
            .into_record()
            .ok_or(ApplyError::NotARecord { found })?;
        self.inner.send(message)
    }
}
