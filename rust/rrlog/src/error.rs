//! Error types for the `rrlog` writer and schema layer.

use thiserror::Error;

/// A result of a fallible `rrlog` operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building schemas or writing a log stream.
#[derive(Debug, Error)]
pub enum Error {
    /// A channel was registered with a name already in use on this writer.
    #[error("channel `{0}` is already registered")]
    DuplicateChannelName(String),
    /// A write targeted a channel handle that isn't bound to this writer.
    #[error("channel `{0}` is not bound to this writer")]
    UnknownChannel(String),
    /// A schema's size accounting disagreed with what it actually wrote.
    #[error("schema `{schema}` reported size {expected} but wrote {actual} bytes")]
    SizeAccountingMismatch {
        /// The schema kind that disagreed with itself.
        schema: &'static str,
        /// The size it reported up front.
        expected: usize,
        /// The number of bytes actually written.
        actual: usize,
    },
    /// An enum value was written by name, but the name isn't one of the
    /// schema's declared constants.
    #[error("`{name}` is not a declared constant of this enum")]
    InvalidEnumValue {
        /// The name that failed to resolve.
        name: String,
    },
    /// Schema derivation encountered a type it cannot represent (a callable,
    /// a cyclic type graph, or some other unsupported shape).
    #[error("cannot derive a schema for `{0}`")]
    UnsupportedType(String),
    /// A custom-component schema was constructed with mismatched component
    /// name/schema arrays.
    #[error(
        "custom schema `{type_name}` has {name_count} component names but {schema_count} component schemas"
    )]
    MismatchedComponents {
        /// The record's type name.
        type_name: String,
        /// Number of component names supplied.
        name_count: usize,
        /// Number of component schemas supplied.
        schema_count: usize,
    },
    /// The underlying byte sink returned an I/O error.
    #[error("sink I/O error: {0}")]
    SinkIoError(#[from] std::io::Error),
    /// An operation was attempted on a writer that has already been closed.
    #[error("writer is closed")]
    WriterClosed,
    /// A name-indexed write inferred a schema that differs from the one
    /// already registered for that channel name. `spec.md` leaves this
    /// undefined; this crate rejects the drift rather than silently keeping
    /// the first-seen schema (see `DESIGN.md`).
    #[error("channel `{0}` was first registered with a different schema")]
    SchemaMismatch(String),
    /// A reader (not implemented by this crate) would raise this on a header
    /// magic/version mismatch; kept for symmetry with the wire format.
    #[error("bad header: expected magic `RR` version 1, found {0:?}")]
    BadHeader([u8; 4]),
}
