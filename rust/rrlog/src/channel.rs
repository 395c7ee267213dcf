//! Channel handles and the downsampling wrapper (component C10).
//!
//! A [`ChannelSpec`] is a bare (name, schema) declaration; a
//! [`ChannelHandle`] binds one to a particular [`Writer`] and adds a
//! `put` convenience that forwards to [`Writer::write`]. [`DownsamplingHandle`]
//! wraps a handle to rate-limit emission to at most once per period, gated
//! on a monotonic clock (`spec.md` §4.10).

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::reflect::Loggable;
use crate::schema::{CustomRecordSchema, SchemaRef};
use crate::writer::Writer;
use crate::Result;

/// A (name, schema) declaration for values of type `T`, independent of any
/// particular [`Writer`]. Passing one to [`Writer::write`] registers it on
/// that writer if it isn't already, so the same spec can seed channels on
/// several writers (`spec.md` §4.9's "unbound handle" case).
pub struct ChannelSpec<T> {
    name: String,
    schema: SchemaRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ChannelSpec<T> {
    /// Creates a channel spec over an explicit schema.
    pub fn new(name: impl Into<String>, schema: SchemaRef) -> Self {
        Self {
            name: name.into(),
            schema,
            _marker: PhantomData,
        }
    }

    /// The channel's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel's schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }
}

impl<T> Clone for ChannelSpec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            _marker: PhantomData,
        }
    }
}

/// A (name, schema) declaration for a [`CustomRecordSchema`]-backed channel.
pub struct CustomChannelSpec<T> {
    name: String,
    schema: Arc<CustomRecordSchema<T>>,
}

impl<T> CustomChannelSpec<T> {
    /// Creates a custom-component channel spec.
    pub fn new(name: impl Into<String>, schema: Arc<CustomRecordSchema<T>>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// The channel's declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The channel's custom schema.
    pub fn schema(&self) -> &Arc<CustomRecordSchema<T>> {
        &self.schema
    }
}

/// A [`ChannelSpec`] bound to a particular [`Writer`], with a `put`
/// convenience method (`spec.md` §4.10, component C10).
pub struct ChannelHandle<T> {
    spec: ChannelSpec<T>,
    writer: Arc<Writer>,
}

impl<T: Loggable> ChannelHandle<T> {
    /// Binds `spec` to `writer`.
    pub fn new(spec: ChannelSpec<T>, writer: Arc<Writer>) -> Self {
        Self { spec, writer }
    }

    /// The channel's declared name.
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Writes `value` to the bound writer.
    pub fn put(&self, value: &T) -> Result<()> {
        self.writer.write(&self.spec, value)
    }
}

/// Supplies the "now" a [`DownsamplingHandle`] compares against `next_due`.
/// Abstracted behind a trait so tests can advance time deterministically
/// instead of racing a real clock at nanosecond granularity.
pub trait Clock: Send + Sync {
    /// The current time, in nanoseconds since some fixed, arbitrary origin.
    /// Only differences between calls are meaningful.
    fn now_nanos(&self) -> u64;
}

/// The default [`Clock`], backed by [`Instant`] (genuinely monotonic,
/// immune to wall-clock adjustments).
struct SystemClock {
    start: Instant,
}

impl SystemClock {
    fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

/// Wraps a [`ChannelHandle`] so that `put` is a no-op unless at least one
/// period has elapsed since the last accepted write. `next_due` starts at 0,
/// so the first call always writes (P13).
pub struct DownsamplingHandle<T> {
    inner: ChannelHandle<T>,
    period_nanos: u64,
    next_due: Mutex<u64>,
    clock: Box<dyn Clock>,
}

impl<T: Loggable> DownsamplingHandle<T> {
    /// Wraps `inner`, emitting at most once per `period`.
    pub fn new(inner: ChannelHandle<T>, period: Duration) -> Self {
        Self::with_clock(inner, period, Box::new(SystemClock::new()))
    }

    /// Wraps `inner` with an explicit clock, for deterministic testing.
    pub fn with_clock(inner: ChannelHandle<T>, period: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            inner,
            period_nanos: (period.as_nanos() as u64).max(1),
            next_due: Mutex::new(0),
            clock,
        }
    }

    /// Writes `value` if at least one period has elapsed since the last
    /// accepted write; otherwise returns `Ok(())` without writing.
    pub fn put(&self, value: &T) -> Result<()> {
        let now = self.clock.now_nanos();
        let mut next_due = self.next_due.lock().expect("downsampler mutex poisoned");
        if now < *next_due {
            return Ok(());
        }
        *next_due = (now / self.period_nanos + 1) * self.period_nanos;
        drop(next_due);
        self.inner.put(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemSink;
    use std::sync::Mutex as StdMutex;

    struct FakeClock(StdMutex<u64>);

    impl FakeClock {
        fn new() -> Self {
            Self(StdMutex::new(0))
        }

        fn advance(&self, nanos: u64) {
            *self.0.lock().unwrap() += nanos;
        }
    }

    impl Clock for FakeClock {
        fn now_nanos(&self) -> u64 {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn first_write_always_goes_through() {
        let writer = Arc::new(Writer::new(MemSink::new()).unwrap());
        let spec = writer.add_channel::<f64>("temp").unwrap();
        let handle = ChannelHandle::new(spec, writer);
        let clock = FakeClock::new();
        let downsampled = DownsamplingHandle::with_clock(handle, Duration::from_secs(1), Box::new(clock));
        downsampled.put(&1.0).unwrap();
    }

    #[test]
    fn writes_within_period_are_dropped() {
        let writer = Arc::new(Writer::new(MemSink::new()).unwrap());
        let spec = writer.add_channel::<f64>("temp").unwrap();
        let handle = ChannelHandle::new(spec, writer.clone());
        let clock = Arc::new(FakeClock::new());

        struct SharedClock(Arc<FakeClock>);
        impl Clock for SharedClock {
            fn now_nanos(&self) -> u64 {
                self.0.now_nanos()
            }
        }

        let downsampled =
            DownsamplingHandle::with_clock(handle, Duration::from_nanos(1_000), Box::new(SharedClock(clock.clone())));
        downsampled.put(&1.0).unwrap();
        clock.advance(500);
        downsampled.put(&2.0).unwrap(); // within the period, dropped
        clock.advance(600);
        downsampled.put(&3.0).unwrap(); // period elapsed, goes through
    }
}
