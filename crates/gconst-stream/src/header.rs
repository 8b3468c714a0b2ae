//! Carriage of the constant record in stream metadata.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use gconst_merge::Record;
use gconst_types::SchemaIndex;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::error;

use crate::codec::{self, CodecError};

/// Metadata key carrying the constant. An empty value is a bare advertisement.
pub const CONST_HEADER: &str = "x-grpc-const";

/// Stream metadata: lower-case keys, each with one or more values.
pub type Metadata = IndexMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("constant header is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("constant header does not decode: {0}")]
    Codec(#[from] CodecError),
}

/// Outcome of looking for the constant in received metadata.
#[derive(Debug)]
pub enum ConstHeader {
    /// No constant was sent; the stream passes through untouched.
    Absent,
    Present(Record),
    /// A constant was sent but could not be decoded.
    Invalid(HeaderError),
}

/// Encode `record` into the header's text form.
pub fn encode_constant(schemas: &SchemaIndex, record: &Record) -> Result<String, HeaderError> {
    let bytes = codec::encode(schemas, record)?;
    Ok(URL_SAFE.encode(bytes))
}

pub fn decode_constant(
    schemas: &SchemaIndex,
    type_name: &str,
    header: &str,
) -> Result<Record, HeaderError> {
    let bytes = URL_SAFE.decode(header.trim())?;
    Ok(codec::decode(schemas, type_name, &bytes)?)
}

/// Metadata a sender attaches to announce `record` as the stream constant.
pub fn header_set_constant(schemas: &SchemaIndex, record: &Record) -> Result<Metadata, HeaderError> {
    let mut metadata = Metadata::new();
    metadata.insert(
        CONST_HEADER.to_string(),
        vec![encode_constant(schemas, record)?],
    );
    Ok(metadata)
}

/// Append the empty advertisement a receiver sends when it can merge.
pub fn client_metadata(metadata: &mut Metadata) {
    metadata
        .entry(CONST_HEADER.to_string())
        .or_default()
        .push(String::new());
}

/// True when the peer announced support for constants, with or without a value.
pub fn advertises_constant(metadata: &Metadata) -> bool {
    metadata
        .get(CONST_HEADER)
        .is_some_and(|values| !values.is_empty())
}

/// Read the constant of type `type_name` from received metadata. Only the
/// first value is considered.
pub fn read_constant(schemas: &SchemaIndex, type_name: &str, metadata: &Metadata) -> ConstHeader {
    let Some(header) = metadata.get(CONST_HEADER).and_then(|values| values.first()) else {
        return ConstHeader::Absent;
    };
    if header.is_empty() {
        return ConstHeader::Absent;
    }
    match decode_constant(schemas, type_name, header) {
        Ok(record) => ConstHeader::Present(record),
        Err(err) => {
            error!(header = %header, error = %err, "{CONST_HEADER} header could not be decoded");
            ConstHeader::Invalid(err)
        }
    }
}
