//! Constant-defaulted record streams.
//!
//! A sender announces a constant record in the stream header and strips the
//! fields every message shares with it; the receiver reads the header once
//! and fills those fields back in. Peers that never advertise the header see
//! an ordinary stream.

pub mod channel;
pub mod codec;
mod header;
mod stream;

pub use codec::CodecError;
pub use header::{
    CONST_HEADER, ConstHeader, HeaderError, Metadata, advertises_constant, client_metadata,
    decode_constant, encode_constant, header_set_constant, read_constant,
};
pub use stream::{
    MergerFactory, MergingReceiver, MessageSink, MessageSource, ReducingSender, StreamError,
};

#[cfg(test)]
mod tests;
