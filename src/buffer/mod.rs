//! Buffering: capture a [`Message`] into a reusable, repeatedly-readable
//! form, and support multi-consumer acknowledgement over it.
//!
//! Grounded on spec.md section 4.6 (no equivalent Go source file ships in
//! this retrieval pack's `original_source/pkg/binding`; the shape follows
//! the same `Message`/`StructuredWriter`/`BinaryWriter` contracts the rest
//! of this module already implements).

use crate::event::format::Format;
use crate::message::{BinaryWriter, Encoding, Error, Message, Result, StructuredWriter, WriteOptions};
use crate::spec::Attribute;
use crate::transform::TransformerFactories;
use crate::types::Value;
use delegate_attr::delegate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What [`BufferedMessage`] captured: exactly one of a structured payload
/// or a decomposed binary attribute/extension/data set.
#[derive(Debug, Clone)]
pub enum BufferedPayload {
    Structured { media_type: String, bytes: Vec<u8> },
    Binary {
        attributes: Vec<(Attribute, Value)>,
        extensions: HashMap<String, Value>,
        data: Option<Vec<u8>>,
    },
}

#[derive(Default)]
struct Shared {
    attributes: Vec<(Attribute, Value)>,
    extensions: HashMap<String, Value>,
    data: Option<Vec<u8>>,
    structured: Option<(String, Vec<u8>)>,
}

struct BinarySide(Arc<Mutex<Shared>>);

impl BinaryWriter for BinarySide {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        self.0.lock().unwrap().attributes.push((attribute, value));
        Ok(())
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .extensions
            .insert(name.to_owned(), value);
        Ok(())
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.0.lock().unwrap().data = Some(data);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

struct StructuredSide(Arc<Mutex<Shared>>);

impl StructuredWriter for StructuredSide {
    fn set_structured_event(&mut self, format: &dyn Format, bytes: Vec<u8>) -> Result<()> {
        self.0.lock().unwrap().structured = Some((format.media_type().to_owned(), bytes));
        Ok(())
    }
}

/// A message captured once and safe to read from repeatedly — including
/// from multiple threads at once, provided each reader drives a distinct
/// writer (spec.md section 4.6's concurrency guarantee).
pub struct BufferedMessage {
    payload: BufferedPayload,
    source: Box<dyn Message>,
    finished: AtomicBool,
}

/// Drives `message` through [`write`] with a sink that captures whichever
/// encoding gets chosen, without finishing `message` yet — finishing is
/// deferred to [`BufferedMessage::finish`], matching spec.md section
/// 4.6's "invokes the original message's Finish(nil) exactly once" (once
/// the *buffer* is finished, not at capture time).
pub fn buffer_message(
    message: Box<dyn Message>,
    factories: &TransformerFactories,
) -> Result<BufferedMessage> {
    let shared = Arc::new(Mutex::new(Shared::default()));
    let structured_writer: Box<dyn StructuredWriter> = Box::new(StructuredSide(shared.clone()));
    let binary_writer: Box<dyn BinaryWriter> = Box::new(BinarySide(shared.clone()));

    crate::message::drive(
        message.as_ref(),
        structured_writer,
        binary_writer,
        factories,
        &WriteOptions::default(),
    )?;

    let captured = Arc::try_unwrap(shared)
        .map_err(|_| Error::other("buffer capture writer outlived drive()"))?
        .into_inner()
        .map_err(|_| Error::other("buffer capture lock was poisoned"))?;

    let payload = match captured.structured {
        Some((media_type, bytes)) => BufferedPayload::Structured { media_type, bytes },
        None => BufferedPayload::Binary {
            attributes: captured.attributes,
            extensions: captured.extensions,
            data: captured.data,
        },
    };

    Ok(BufferedMessage {
        payload,
        source: message,
        finished: AtomicBool::new(false),
    })
}

impl BufferedMessage {
    pub fn payload(&self) -> &BufferedPayload {
        &self.payload
    }
}

impl Message for BufferedMessage {
    fn read_encoding(&self) -> Encoding {
        match &self.payload {
            BufferedPayload::Structured { .. } => Encoding::Structured,
            BufferedPayload::Binary { .. } => Encoding::Binary,
        }
    }

    fn read_structured(&self, writer: &mut dyn StructuredWriter) -> Result<()> {
        match &self.payload {
            BufferedPayload::Structured { media_type, bytes } => {
                let format = crate::event::format::lookup(media_type).ok_or(Error::NotStructured)?;
                writer.set_structured_event(format, bytes.clone())
            }
            BufferedPayload::Binary { .. } => Err(Error::NotStructured),
        }
    }

    fn read_binary(&self, writer: &mut dyn BinaryWriter) -> Result<()> {
        match &self.payload {
            BufferedPayload::Binary {
                attributes,
                extensions,
                data,
            } => {
                writer.start()?;
                for (attribute, value) in attributes {
                    writer.set_attribute(*attribute, value.clone())?;
                }
                for (name, value) in extensions {
                    writer.set_extension(name, value.clone())?;
                }
                if let Some(data) = data {
                    writer.set_data(data.clone())?;
                }
                writer.end()
            }
            BufferedPayload::Structured { .. } => Err(Error::NotBinary),
        }
    }

    /// Idempotent: only the first call forwards to the captured source's
    /// own `finish`, and always with `None` — the buffer, not whatever
    /// error a particular reader hit, owns that decision.
    fn finish(&self, _err: Option<&Error>) -> Result<()> {
        if self.finished.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.source.finish(None)
    }
}

/// Wraps a [`BufferedMessage`] so `finish` is a no-op for the first `n-1`
/// calls and forwards to the inner buffer's `finish` on the `n`-th.
/// Thread-safe: the countdown is a single atomic decrement.
pub struct WithAcksBeforeFinish {
    inner: BufferedMessage,
    remaining: AtomicUsize,
}

pub fn with_acks_before_finish(inner: BufferedMessage, acks: usize) -> Result<WithAcksBeforeFinish> {
    if acks < 1 {
        return Err(Error::invalid_argument("ack count must be at least 1"));
    }
    Ok(WithAcksBeforeFinish {
        inner,
        remaining: AtomicUsize::new(acks),
    })
}

#[delegate(self.inner)]
impl Message for WithAcksBeforeFinish {
    fn read_encoding(&self) -> Encoding;
    fn read_structured(&self, writer: &mut dyn StructuredWriter) -> Result<()>;
    fn read_binary(&self, writer: &mut dyn BinaryWriter) -> Result<()>;

    fn finish(&self, err: Option<&Error>) -> Result<()> {
        let remaining_before = self.remaining.fetch_sub(1, Ordering::SeqCst);
        if remaining_before == 1 {
            self.inner.finish(err)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::spec::SpecVersion;

    struct CountingEvent {
        event: Event,
        finishes: Arc<AtomicUsize>,
    }

    impl Message for CountingEvent {
        fn read_encoding(&self) -> Encoding {
            self.event.read_encoding()
        }
        fn read_structured(&self, writer: &mut dyn StructuredWriter) -> Result<()> {
            self.event.read_structured(writer)
        }
        fn read_binary(&self, writer: &mut dyn BinaryWriter) -> Result<()> {
            self.event.read_binary(writer)
        }
        fn finish(&self, err: Option<&Error>) -> Result<()> {
            self.finishes.fetch_add(1, Ordering::SeqCst);
            self.event.finish(err)
        }
    }

    fn sample_message() -> (Box<dyn Message>, Arc<AtomicUsize>) {
        let mut event = Event::new(SpecVersion::V10);
        event.set_type("com.example.test");
        event.set_data(None, serde_json::json!({"a": 1}));
        let finishes = Arc::new(AtomicUsize::new(0));
        (
            Box::new(CountingEvent {
                event,
                finishes: finishes.clone(),
            }),
            finishes,
        )
    }

    struct RecordingBinaryWriter {
        attributes: Vec<(Attribute, Value)>,
        data: Option<Vec<u8>>,
    }

    impl BinaryWriter for RecordingBinaryWriter {
        fn start(&mut self) -> Result<()> {
            Ok(())
        }
        fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
            self.attributes.push((attribute, value));
            Ok(())
        }
        fn set_extension(&mut self, _name: &str, _value: Value) -> Result<()> {
            Ok(())
        }
        fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
            self.data = Some(data);
            Ok(())
        }
        fn end(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn buffer_captures_binary_and_replays_repeatedly() {
        let (message, _finishes) = sample_message();
        let buffered = buffer_message(message, &Vec::new()).unwrap();

        for _ in 0..3 {
            let mut writer = RecordingBinaryWriter {
                attributes: Vec::new(),
                data: None,
            };
            buffered.read_binary(&mut writer).unwrap();
            assert!(writer.data.is_some());
            assert!(!writer.attributes.is_empty());
        }
    }

    #[test]
    fn buffer_finish_is_forwarded_exactly_once() {
        let (message, finishes) = sample_message();
        let buffered = buffer_message(message, &Vec::new()).unwrap();

        buffered.finish(None).unwrap();
        buffered.finish(None).unwrap();
        buffered.finish(None).unwrap();

        assert_eq!(finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn with_acks_before_finish_requires_n_calls() {
        let (message, finishes) = sample_message();
        let buffered = buffer_message(message, &Vec::new()).unwrap();
        let acked = with_acks_before_finish(buffered, 3).unwrap();

        acked.finish(None).unwrap();
        acked.finish(None).unwrap();
        assert_eq!(finishes.load(Ordering::SeqCst), 0);
        acked.finish(None).unwrap();
        assert_eq!(finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn with_acks_before_finish_rejects_zero() {
        let (message, _finishes) = sample_message();
        let buffered = buffer_message(message, &Vec::new()).unwrap();
        let err = with_acks_before_finish(buffered, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
