//! A typed, self-describing binary logging codec.
//!
//! `rrlog` writes a stream of named, schema-described channels: each
//! channel is declared once (emitting a schema entry) and then written to
//! any number of times (each write emitting a message entry indexed by
//! channel). The schema algebra ([`schema`]) is closed over primitives,
//! enums, arrays, and records, so a reader needs no out-of-band type
//! information to decode a stream — every message entry's shape is fully
//! determined by the schema entry that preceded it.
//!
//! Most applications only need three things from this crate:
//! - [`Writer`], opened over any [`ByteSink`] (a file, a pipe, an in-memory
//!   buffer via [`sink::MemSink`]);
//! - `#[derive(Loggable)]` on the types to be logged (requires the
//!   `derive` feature, enabled by default);
//! - [`Writer::add_channel`] to declare a channel, then
//!   [`Writer::write`]/[`channel::ChannelHandle::put`] to write to it.
//!
//! ```no_run
//! use rrlog::{Loggable, Writer};
//! use rrlog::sink::IoSink;
//!
//! #[derive(Loggable)]
//! struct Temperature {
//!     celsius: f64,
//! }
//!
//! # fn main() -> rrlog::Result<()> {
//! let file = std::fs::File::create("readings.rrlog")?;
//! let writer = Writer::new(IoSink::new(file))?;
//! let channel = writer.add_channel::<Temperature>("temp")?;
//! writer.write(&channel, &Temperature { celsius: 21.5 })?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod channel;
pub mod error;
pub mod reflect;
pub mod registry;
pub mod schema;
pub mod sink;
pub mod value;
pub mod writer;

pub use crate::error::{Error, Result};
pub use crate::reflect::Loggable;
pub use crate::schema::{Schema, SchemaRef};
pub use crate::sink::ByteSink;
pub use crate::value::Value;
pub use crate::writer::Writer;

#[cfg(feature = "derive")]
pub use rrlog_macros::Loggable;

/// The wire format version this crate reads and writes (`spec.md` §6).
pub const WIRE_VERSION: u16 = 1;
