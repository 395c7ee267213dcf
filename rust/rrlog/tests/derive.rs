//! Exercises `#[derive(Loggable)]` end to end: derivation, registration,
//! and writing through a real [`Writer`].

use std::sync::{Arc, Mutex};

use rrlog::sink::ByteSink;
use rrlog::{Loggable, Writer};

#[derive(Loggable)]
struct Reading {
    celsius: f64,
    #[rrlog(rename = "sensor_id")]
    sensor: i32,
}

#[derive(Loggable)]
#[rrlog(as_type = "Pt")]
struct Pt {
    x: f64,
    y: f64,
}

#[derive(Loggable)]
enum Color {
    Red,
    Green,
    Blue,
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl ByteSink for SharedSink {
    fn write_exact(&mut self, buf: &[u8]) -> rrlog::Result<()> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> rrlog::Result<()> {
        Ok(())
    }
}

#[test]
fn plain_struct_derives_a_record_with_renamed_field() {
    let sink = SharedSink::default();
    let writer = Writer::new(sink.clone()).unwrap();
    let channel = writer.add_channel::<Reading>("readings").unwrap();
    writer
        .write(
            &channel,
            &Reading {
                celsius: 21.5,
                sensor: 7,
            },
        )
        .unwrap();
    writer.close().unwrap();

    let bytes = sink.bytes();
    // name `sensor_id`, not `sensor`.
    assert!(bytes.windows(9).any(|w| w == b"sensor_id"));
}

#[test]
fn as_type_derives_a_typed_record() {
    let sink = SharedSink::default();
    let writer = Writer::new(sink.clone()).unwrap();
    let channel = writer.add_channel::<Pt>("p").unwrap();
    writer.write(&channel, &Pt { x: 1.0, y: 2.0 }).unwrap();
    writer.close().unwrap();

    let bytes = sink.bytes();
    assert!(bytes.windows(5).any(|w| w == b".type"));
    assert!(bytes.windows(2).any(|w| w == b"Pt"));
}

#[test]
fn unit_enum_derives_an_enum_schema() {
    let sink = SharedSink::default();
    let writer = Writer::new(sink.clone()).unwrap();
    let channel = writer.add_channel::<Color>("color").unwrap();
    writer.write(&channel, &Color::Green).unwrap();
    writer.close().unwrap();

    let bytes = sink.bytes();
    // ordinal of Green (index 1) as the last 4 bytes.
    assert_eq!(&bytes[bytes.len() - 4..], &1i32.to_be_bytes());
}

#[test]
fn derived_schema_is_memoized_across_calls() {
    let schema_a = rrlog::registry::global().schema_of::<Reading>().unwrap();
    let schema_b = rrlog::registry::global().schema_of::<Reading>().unwrap();
    assert!(Arc::ptr_eq(&schema_a, &schema_b));
}
