//! The writer engine (component C9): owns a [`ByteSink`], a table of
//! registered channels, and writes the framed entry stream `spec.md` §6
//! defines. All write-path operations take `&self` and serialize through an
//! internal mutex, so a [`Writer`] can be shared across threads behind an
//! `Arc` (the same shared-resource shape as a connection pool or a
//! `tracing` subscriber).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::channel::ChannelSpec;
use crate::reflect::Loggable;
use crate::registry;
use crate::schema::{CustomRecordSchema, SchemaRef};
use crate::sink::{ByteSink, MemSink};
use crate::value::Value;
use crate::{Error, Result};

/// The four-byte stream header: magic `RR`, version `1`, both big-endian
/// (`spec.md` §6).
const HEADER: [u8; 4] = [0x52, 0x52, 0x00, 0x01];

const SCHEMA_ENTRY_KIND: i32 = 0;
const MESSAGE_ENTRY_KIND: i32 = 1;

struct ChannelEntry {
    name: String,
    schema: SchemaRef,
}

struct WriterState {
    sink: Box<dyn ByteSink + Send>,
    channels: Vec<ChannelEntry>,
    by_name: HashMap<String, u32>,
    closed: bool,
}

impl WriterState {
    fn register(&mut self, name: String, schema: SchemaRef) -> Result<u32> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateChannelName(name));
        }
        let index = self.channels.len() as u32;
        let entry = build_schema_entry(&name, &schema)?;
        self.sink.write_exact(&entry)?;
        log::debug!("registered channel `{name}` at index {index}");
        self.by_name.insert(name.clone(), index);
        self.channels.push(ChannelEntry { name, schema });
        Ok(index)
    }
}

/// A mutex-guarded writer over a single [`ByteSink`] (`spec.md` §5).
///
/// Construction writes the stream header immediately. Every subsequent
/// write is one channel registration or one message, each assembled in
/// memory and then written to the sink as a single call, so a caller never
/// observes a torn entry even under concurrent use.
pub struct Writer {
    state: Mutex<WriterState>,
}

impl Writer {
    /// Opens a writer over `sink`, writing the stream header.
    pub fn new(sink: impl ByteSink + Send + 'static) -> Result<Self> {
        let mut sink: Box<dyn ByteSink + Send> = Box::new(sink);
        sink.write_exact(&HEADER)?;
        Ok(Self {
            state: Mutex::new(WriterState {
                sink,
                channels: Vec::new(),
                by_name: HashMap::new(),
                closed: false,
            }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WriterState> {
        self.state.lock().expect("writer mutex poisoned")
    }

    /// Declares a channel named `name` over `T`'s registered schema
    /// (deriving it on first use via [`registry::global`]), returning a
    /// [`ChannelSpec`] that can be passed to [`Writer::write`] or bound into
    /// a [`crate::channel::ChannelHandle`].
    ///
    /// Fails with [`Error::DuplicateChannelName`] if `name` is already
    /// registered on this writer.
    pub fn add_channel<T: Loggable + 'static>(&self, name: impl Into<String>) -> Result<ChannelSpec<T>> {
        let name = name.into();
        let schema = registry::global().schema_of::<T>()?;
        self.lock().register(name.clone(), schema.clone())?;
        Ok(ChannelSpec::new(name, schema))
    }

    /// Declares a channel named `name` over an explicitly supplied schema,
    /// bypassing [`Loggable`] derivation. Useful when the schema was built
    /// by hand or came from [`CustomRecordSchema::descriptor`].
    pub fn add_channel_with_schema<T>(&self, name: impl Into<String>, schema: SchemaRef) -> Result<ChannelSpec<T>> {
        let name = name.into();
        self.lock().register(name.clone(), schema.clone())?;
        Ok(ChannelSpec::new(name, schema))
    }

    /// Writes `value` to `channel` (`spec.md` §4.9).
    ///
    /// If `channel` names a channel this writer hasn't registered yet (an
    /// "unbound" [`ChannelSpec`] built independently of this writer), it is
    /// registered first, using `channel`'s own schema.
    pub fn write<T: Loggable>(&self, channel: &ChannelSpec<T>, value: &T) -> Result<()> {
        let mut state = self.lock();
        let index = match state.by_name.get(channel.name()) {
            Some(&index) => index,
            None => state.register(channel.name().to_string(), channel.schema().clone())?,
        };
        write_message(&mut state, index, channel.schema(), &value.to_value())
    }

    /// Writes `value` to the channel named `name`, deriving `T`'s schema via
    /// the global registry and registering the channel on first use
    /// (`spec.md` §4.9's name-indexed write path).
    ///
    /// If `name` is already registered with a schema that differs from
    /// `T`'s, the write is rejected with [`Error::SchemaMismatch`] rather
    /// than silently keeping the first-seen schema (see `DESIGN.md`).
    pub fn write_named<T: Loggable + 'static>(&self, name: &str, value: &T) -> Result<()> {
        let schema = registry::global().schema_of::<T>()?;
        let mut state = self.lock();
        let index = match state.by_name.get(name) {
            Some(&index) => {
                let existing = &state.channels[index as usize].schema;
                if descriptor_bytes(existing)? != descriptor_bytes(&schema)? {
                    return Err(Error::SchemaMismatch(name.to_string()));
                }
                index
            }
            None => state.register(name.to_string(), schema.clone())?,
        };
        write_message(&mut state, index, &schema, &value.to_value())
    }

    /// Writes an already-erased [`Value`] to `channel`, bypassing
    /// [`Loggable`]. Useful when a value was built dynamically (no
    /// concrete Rust type to derive a schema from) rather than produced
    /// from a `#[derive(Loggable)]` type.
    pub fn write_value(&self, channel: &ChannelSpec<Value>, value: &Value) -> Result<()> {
        let mut state = self.lock();
        let index = match state.by_name.get(channel.name()) {
            Some(&index) => index,
            None => state.register(channel.name().to_string(), channel.schema().clone())?,
        };
        write_message(&mut state, index, channel.schema(), value)
    }

    /// Writes `value` through a [`CustomRecordSchema`] (component C5's
    /// `Custom` variant), registering `channel` on first use via the
    /// schema's wire descriptor.
    pub fn write_custom<T>(&self, channel: &crate::channel::CustomChannelSpec<T>, value: &T) -> Result<()> {
        let mut state = self.lock();
        let index = match state.by_name.get(channel.name()) {
            Some(&index) => index,
            None => state.register(channel.name().to_string(), channel.schema().descriptor())?,
        };
        if state.closed {
            return Err(Error::WriterClosed);
        }
        let declared = channel.schema().obj_size(value)?;
        let mut mem = MemSink::new();
        mem.write_exact(&MESSAGE_ENTRY_KIND.to_be_bytes())?;
        mem.write_exact(&(index as i32).to_be_bytes())?;
        channel.schema().encode_object(value, &mut mem)?;
        let buf = mem.into_vec();
        if buf.len() != 8 + declared {
            return Err(Error::SizeAccountingMismatch {
                schema: "Custom",
                expected: 8 + declared,
                actual: buf.len(),
            });
        }
        state.sink.write_exact(&buf)
    }

    /// Flushes and closes the underlying sink. Further writes fail with
    /// [`Error::WriterClosed`].
    pub fn close(&self) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(Error::WriterClosed);
        }
        state.sink.close()?;
        state.closed = true;
        log::debug!("writer closed after {} channel(s)", state.channels.len());
        Ok(())
    }
}

fn write_message(state: &mut WriterState, index: u32, schema: &SchemaRef, value: &Value) -> Result<()> {
    if state.closed {
        return Err(Error::WriterClosed);
    }
    let declared = schema.obj_size(value)?;
    let mut mem = MemSink::new();
    mem.write_exact(&MESSAGE_ENTRY_KIND.to_be_bytes())?;
    mem.write_exact(&(index as i32).to_be_bytes())?;
    schema.encode_object(value, &mut mem)?;
    let buf = mem.into_vec();
    if buf.len() != 8 + declared {
        return Err(Error::SizeAccountingMismatch {
            schema: "message",
            expected: 8 + declared,
            actual: buf.len(),
        });
    }
    state.sink.write_exact(&buf)
}

/// Builds a schema entry's bytes. The entry doesn't carry its own channel
/// index; a reader recovers it from the entry's position in the stream
/// (the Nth schema entry declares channel N).
fn build_schema_entry(name: &str, schema: &SchemaRef) -> Result<Vec<u8>> {
    let mut mem = MemSink::new();
    mem.write_exact(&SCHEMA_ENTRY_KIND.to_be_bytes())?;
    crate::schema::write_len_prefixed_str(name, &mut mem)?;
    schema.encode_schema(&mut mem)?;
    let buf = mem.into_vec();
    let expected = 4 + crate::schema::len_prefixed_str_size(name) + schema.schema_size();
    if buf.len() != expected {
        return Err(Error::SizeAccountingMismatch {
            schema: "channel-entry",
            expected,
            actual: buf.len(),
        });
    }
    Ok(buf)
}

fn descriptor_bytes(schema: &SchemaRef) -> Result<Vec<u8>> {
    let mut mem = MemSink::new();
    schema.encode_schema(&mut mem)?;
    Ok(mem.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemSink;
    use std::sync::{Arc, Mutex as StdMutex};

    /// A [`ByteSink`] that keeps writing visible to the test after it's been
    /// moved into a [`Writer`], by way of a shared buffer.
    struct SharedSink(Arc<StdMutex<Vec<u8>>>);

    impl ByteSink for SharedSink {
        fn write_exact(&mut self, buf: &[u8]) -> Result<()> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn new_writer() -> Writer {
        Writer::new(MemSink::new()).unwrap()
    }

    #[test]
    fn header_is_written_on_construction() {
        let buf = Arc::new(StdMutex::new(Vec::new()));
        let _writer = Writer::new(SharedSink(buf.clone())).unwrap();
        assert_eq!(&buf.lock().unwrap()[..], &HEADER);
    }

    #[test]
    fn duplicate_channel_name_is_rejected() {
        let writer = new_writer();
        writer.add_channel::<f64>("temp").unwrap();
        let err = writer.add_channel::<f64>("temp").unwrap_err();
        assert!(matches!(err, Error::DuplicateChannelName(_)));
    }

    #[test]
    fn channels_are_indexed_in_registration_order() {
        let writer = new_writer();
        let a = writer.add_channel::<f64>("a").unwrap();
        let b = writer.add_channel::<i64>("b").unwrap();
        assert_eq!(a.name(), "a");
        assert_eq!(b.name(), "b");
        writer.write(&a, &1.0).unwrap();
        writer.write(&b, &2i64).unwrap();
    }

    #[test]
    fn write_named_rejects_schema_drift() {
        let writer = new_writer();
        writer.write_named("x", &1.0f64).unwrap();
        let err = writer.write_named("x", &1i64).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn write_named_allows_repeated_writes_of_the_same_type() {
        let writer = new_writer();
        writer.write_named("x", &1.0f64).unwrap();
        writer.write_named("x", &2.0f64).unwrap();
    }

    #[test]
    fn writes_after_close_are_rejected() {
        let writer = new_writer();
        let chan = writer.add_channel::<f64>("a").unwrap();
        writer.close().unwrap();
        let err = writer.write(&chan, &1.0).unwrap_err();
        assert!(matches!(err, Error::WriterClosed));
    }

    #[test]
    fn closing_twice_is_rejected() {
        let writer = new_writer();
        writer.close().unwrap();
        assert!(matches!(writer.close().unwrap_err(), Error::WriterClosed));
    }

    #[test]
    fn custom_channel_round_trips() {
        use crate::channel::CustomChannelSpec;
        use crate::schema::Float64Schema;

        struct Pt {
            x: f64,
            y: f64,
        }
        let schema = Arc::new(
            CustomRecordSchema::new(
                "Pt",
                vec!["x".into(), "y".into()],
                vec![Arc::new(Float64Schema) as SchemaRef, Arc::new(Float64Schema)],
                |p: &Pt| vec![Value::Float64(p.x), Value::Float64(p.y)],
            )
            .unwrap(),
        );

        let writer = new_writer();
        let channel = CustomChannelSpec::new("points", schema);
        writer.write_custom(&channel, &Pt { x: 1.0, y: 2.0 }).unwrap();
        writer.write_custom(&channel, &Pt { x: 3.0, y: 4.0 }).unwrap();
    }
}
