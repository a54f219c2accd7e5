use super::{Encoding, Error, Result};
use crate::event::format::Format;
use crate::spec::Attribute;
use crate::types::Value;

/// Sink for a structured-mode payload: the whole encoded event, verbatim,
/// plus the [`Format`] it was encoded with.
///
/// Grounded on the Go `binding.StructuredWriter` interface
/// (`SetStructuredEvent(ctx, format, reader)`), seen driving
/// `EventMessage.ReadStructured` in
/// `original_source/pkg/binding/event_message.go`.
pub trait StructuredWriter: Send {
    fn set_structured_event(&mut self, format: &dyn Format, bytes: Vec<u8>) -> Result<()>;
}

/// Sink for binary-mode replay: a small state machine driven
/// `start` → `set_attribute`*/`set_extension`* (each key at most once,
/// order irrelevant) → optional `set_data` → `end`.
///
/// Grounded on the Go `binding.BinaryWriter` interface, inferred from its
/// call sites in `eventContextToBinaryWriter` and the transformer overlay
/// types in `original_source/pkg/binding/transformer/*.go`.
pub trait BinaryWriter: Send {
    fn start(&mut self) -> Result<()>;
    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()>;
    fn set_extension(&mut self, name: &str, value: Value) -> Result<()>;
    fn set_data(&mut self, data: Vec<u8>) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

/// A CloudEvent in one of its wire or in-memory forms.
///
/// Grounded on the Go `binding.Message` interface; `finish` takes `&self`
/// rather than consuming `Box<Self>` so [`crate::buffer::BufferedMessage`]
/// can be shared across independent concurrent readers (spec.md section
/// 4.6's concurrency guarantee) without each reader needing ownership of
/// the message to call it.
pub trait Message: Send + Sync {
    fn read_encoding(&self) -> Encoding;

    /// Hands the whole payload to `writer` in one call. Implementations
    /// that cannot produce a single structured payload return
    /// [`Error::NotStructured`].
    fn read_structured(&self, writer: &mut dyn StructuredWriter) -> Result<()>;

    /// Replays attributes, extensions and data through `writer`.
    /// Implementations that cannot decompose into binary mode return
    /// [`Error::NotBinary`].
    fn read_binary(&self, writer: &mut dyn BinaryWriter) -> Result<()>;

    /// Signals that the caller is done with this message; `err` carries
    /// the first failure encountered driving it, if any. Takes the error
    /// by reference (rather than consuming `Option<Error>`) so the
    /// [`super::write`] orchestrator can still return that same error to
    /// its own caller after reporting it here. Must be callable more than
    /// once without double-counting side effects — callers are
    /// nonetheless expected to call it exactly once per logical read (the
    /// orchestrator upholds this).
    fn finish(&self, err: Option<&Error>) -> Result<()>;
}

impl Message for crate::event::Event {
    fn read_encoding(&self) -> Encoding {
        Encoding::Event
    }

    /// Marshals through the JSON format by default; callers wanting a
    /// different structured format should encode the event themselves via
    /// [`crate::event::format::Format::serialize`] and hand the bytes to a
    /// [`StructuredWriter`] directly.
    fn read_structured(&self, writer: &mut dyn StructuredWriter) -> Result<()> {
        let format = crate::event::format::JsonFormat;
        let bytes = format.serialize(self).map_err(attribute_error_from_format)?;
        writer.set_structured_event(&format, bytes)
    }

    fn read_binary(&self, writer: &mut dyn BinaryWriter) -> Result<()> {
        writer.start()?;
        let ctx = self.context();
        let version = ctx.version().version();
        for attribute in version.attributes() {
            if let Some(value) = attribute.get(ctx) {
                writer.set_attribute(attribute, value)?;
            }
        }
        for (name, value) in self.iter_extensions() {
            writer.set_extension(name, value.clone())?;
        }
        if let Some(bytes) = self
            .data_bytes()
            .map_err(|source| Error::other(format!("encoding event data: {source}")))?
        {
            if !bytes.is_empty() {
                writer.set_data(bytes)?;
            }
        }
        writer.end()
    }

    fn finish(&self, _err: Option<&Error>) -> Result<()> {
        Ok(())
    }
}

fn attribute_error_from_format(source: crate::event::format::FormatError) -> Error {
    Error::Format { source }
}
