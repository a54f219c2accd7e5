//! Shared recording writers for the cross-module behavioral tests in this
//! directory, mirroring the role `tests/test_data` and `tests/util` play
//! for the teacher crate's own integration tests.

#![allow(dead_code)]

use cloudevents::event::format::Format;
use cloudevents::message::{BinaryWriter, Result as MsgResult, StructuredWriter};
use cloudevents::{Attribute, Value};
use std::sync::{Arc, Mutex};

/// What a [`RecordingBinaryWriter`] observed, readable after `write()` has
/// consumed the boxed writer.
#[derive(Default)]
pub struct BinaryLog {
    pub started: bool,
    pub ended: bool,
    pub attributes: Vec<(Attribute, Value)>,
    pub extensions: Vec<(String, Value)>,
    pub data: Option<Vec<u8>>,
}

pub struct RecordingBinaryWriter(Arc<Mutex<BinaryLog>>);

impl RecordingBinaryWriter {
    /// Returns a boxed writer plus a handle to inspect what it captured
    /// once the orchestrator has consumed it.
    pub fn new() -> (Box<dyn BinaryWriter>, Arc<Mutex<BinaryLog>>) {
        let log = Arc::new(Mutex::new(BinaryLog::default()));
        (Box::new(RecordingBinaryWriter(log.clone())), log)
    }
}

impl BinaryWriter for RecordingBinaryWriter {
    fn start(&mut self) -> MsgResult<()> {
        self.0.lock().unwrap().started = true;
        Ok(())
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> MsgResult<()> {
        self.0.lock().unwrap().attributes.push((attribute, value));
        Ok(())
    }

    fn set_extension(&mut self, name: &str, value: Value) -> MsgResult<()> {
        self.0
            .lock()
            .unwrap()
            .extensions
            .push((name.to_owned(), value));
        Ok(())
    }

    fn set_data(&mut self, data: Vec<u8>) -> MsgResult<()> {
        self.0.lock().unwrap().data = Some(data);
        Ok(())
    }

    fn end(&mut self) -> MsgResult<()> {
        self.0.lock().unwrap().ended = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct StructuredLog {
    pub media_type: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

pub struct RecordingStructuredWriter(Arc<Mutex<StructuredLog>>);

impl RecordingStructuredWriter {
    pub fn new() -> (Box<dyn StructuredWriter>, Arc<Mutex<StructuredLog>>) {
        let log = Arc::new(Mutex::new(StructuredLog::default()));
        (Box::new(RecordingStructuredWriter(log.clone())), log)
    }
}

impl StructuredWriter for RecordingStructuredWriter {
    fn set_structured_event(&mut self, format: &dyn Format, bytes: Vec<u8>) -> MsgResult<()> {
        let mut log = self.0.lock().unwrap();
        log.media_type = Some(format.media_type().to_owned());
        log.bytes = Some(bytes);
        Ok(())
    }
}

/// The event from spec.md section 8's seed scenarios S1/S2.
pub fn s1_event() -> cloudevents::Event {
    cloudevents::event::builder::builder_v10()
        .id("ABC-123")
        .source("http://example.com/source")
        .ty("com.example.test")
        .data("application/json", serde_json::json!({"msg": "hi"}))
        .build()
        .unwrap()
}
