use super::{BinaryWriter, CancellationToken, Encoding, Error, Message, Result, StructuredWriter};
use crate::event::format::Format;
use crate::event::{Data, Event};
use crate::spec::{Attribute, EventContext};
use crate::transform::{self, TransformerFactories};
use crate::types::Value;

/// Runtime configuration for [`write`], standing in for the
/// `context.Context`-keyed preferences the Go SDK reads inside `Write`
/// (forced encoding, preferred encoding, structured format selection,
/// cancellation).
///
/// Grounded on spec.md section 4.4 step 2, section 5's cancellation
/// requirement, and section 6's note that `WriteOptions` represents
/// context-keyed configuration.
pub struct WriteOptions {
    pub force_structured: bool,
    pub force_binary: bool,
    pub preferred_encoding: Encoding,
    pub structured_format: &'static dyn Format,
    pub cancellation: CancellationToken,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            force_structured: false,
            force_binary: false,
            preferred_encoding: Encoding::Binary,
            structured_format: &crate::event::format::JsonFormat,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Drives `message` into whichever of `structured_writer`/`binary_writer`
/// the selection algorithm picks, wrapping the destination in `factories`,
/// and returns the encoding actually used.
///
/// Implements spec.md section 4.4 steps 1-6 verbatim: compute source
/// encoding and chain capability, pick a path (respecting forced
/// preferences or falling back to materializing an event), wrap the
/// destination writer innermost-factory-first, then call `finish` exactly
/// once regardless of outcome.
pub fn write(
    message: &dyn Message,
    structured_writer: Box<dyn StructuredWriter>,
    binary_writer: Box<dyn BinaryWriter>,
    factories: &TransformerFactories,
    options: &WriteOptions,
) -> Result<Encoding> {
    let result = drive(message, structured_writer, binary_writer, factories, options);
    let finish_result = message.finish(result.as_ref().err());
    match (&result, finish_result) {
        (Ok(_), Err(finish_err)) => Err(finish_err),
        _ => result,
    }
}

/// The selection-and-drive logic of [`write`] without the `finish` call,
/// so [`crate::buffer::buffer_message`] can capture a message's bytes
/// while deferring `finish` to the resulting `BufferedMessage` (spec.md
/// section 4.6).
pub(crate) fn drive(
    message: &dyn Message,
    structured_writer: Box<dyn StructuredWriter>,
    binary_writer: Box<dyn BinaryWriter>,
    factories: &TransformerFactories,
    options: &WriteOptions,
) -> Result<Encoding> {
    options.cancellation.check()?;
    let source_enc = message.read_encoding();
    let structured_capable = transform::is_structured_capable(factories);
    let binary_capable = transform::is_binary_capable(factories);

    if options.force_structured {
        if structured_capable && matches!(source_enc, Encoding::Structured | Encoding::Event) {
            return drive_structured(message, structured_writer, factories, source_enc, options);
        }
        return Err(Error::TransformationNotSupported {
            reason: "forced structured encoding is not reachable from this source/chain"
                .to_owned(),
        });
    }
    if options.force_binary {
        if binary_capable && matches!(source_enc, Encoding::Binary | Encoding::Event) {
            return drive_binary(message, binary_writer, factories, source_enc, options);
        }
        return Err(Error::TransformationNotSupported {
            reason: "forced binary encoding is not reachable from this source/chain".to_owned(),
        });
    }

    match source_enc {
        Encoding::Event => drive_via_event(message, structured_writer, binary_writer, factories, options),
        Encoding::Structured if structured_capable => {
            drive_structured(message, structured_writer, factories, source_enc, options)
        }
        Encoding::Binary if binary_capable => {
            drive_binary(message, binary_writer, factories, source_enc, options)
        }
        _ => drive_via_event(message, structured_writer, binary_writer, factories, options),
    }
}

fn drive_structured(
    message: &dyn Message,
    structured_writer: Box<dyn StructuredWriter>,
    factories: &TransformerFactories,
    source_enc: Encoding,
    options: &WriteOptions,
) -> Result<Encoding> {
    let mut wrapped = transform::wrap_structured_chain(factories, structured_writer);
    let mut cancelling = CancellingStructuredWriter {
        inner: wrapped.as_mut(),
        cancellation: &options.cancellation,
    };
    if source_enc == Encoding::Event {
        let mut event = materialize_with_cancellation(message, &options.cancellation)?;
        transform::run_event_transformers(factories, &mut event)?;
        options.cancellation.check()?;
        let bytes = options.structured_format.serialize(&event)?;
        cancelling.set_structured_event(options.structured_format, bytes)?;
    } else {
        message.read_structured(&mut cancelling)?;
    }
    Ok(Encoding::Structured)
}

fn drive_binary(
    message: &dyn Message,
    binary_writer: Box<dyn BinaryWriter>,
    factories: &TransformerFactories,
    source_enc: Encoding,
    options: &WriteOptions,
) -> Result<Encoding> {
    let mut wrapped = transform::wrap_binary_chain(factories, binary_writer);
    let mut cancelling = CancellingBinaryWriter {
        inner: wrapped.as_mut(),
        cancellation: &options.cancellation,
    };
    if source_enc == Encoding::Event {
        let mut event = materialize_with_cancellation(message, &options.cancellation)?;
        transform::run_event_transformers(factories, &mut event)?;
        event.read_binary(&mut cancelling)?;
    } else {
        message.read_binary(&mut cancelling)?;
    }
    Ok(Encoding::Binary)
}

/// Last-resort path: materialize the whole message into an [`Event`], run
/// every factory's event-level closure in order, then emit through
/// whichever writer `options.preferred_encoding` names (spec.md section
/// 4.4 step 4's final fallback and step 2's default-to-binary preference).
fn drive_via_event(
    message: &dyn Message,
    structured_writer: Box<dyn StructuredWriter>,
    binary_writer: Box<dyn BinaryWriter>,
    factories: &TransformerFactories,
    options: &WriteOptions,
) -> Result<Encoding> {
    let mut event = materialize_with_cancellation(message, &options.cancellation)?;
    transform::run_event_transformers(factories, &mut event)?;
    options.cancellation.check()?;
    match options.preferred_encoding {
        Encoding::Structured => {
            let bytes = options.structured_format.serialize(&event)?;
            let mut writer = structured_writer;
            let mut cancelling = CancellingStructuredWriter {
                inner: writer.as_mut(),
                cancellation: &options.cancellation,
            };
            cancelling.set_structured_event(options.structured_format, bytes)?;
            Ok(Encoding::Structured)
        }
        _ => {
            let mut writer = binary_writer;
            let mut cancelling = CancellingBinaryWriter {
                inner: writer.as_mut(),
                cancellation: &options.cancellation,
            };
            event.read_binary(&mut cancelling)?;
            Ok(Encoding::Binary)
        }
    }
}

/// Wraps a destination [`BinaryWriter`] so every call checks
/// `cancellation` first, satisfying spec.md section 5's "check
/// cancellation ... before `Start`, between each attribute, before
/// `SetData`, before `End`" without requiring every concrete writer
/// (transport-provided or test fixture) to know about cancellation itself.
struct CancellingBinaryWriter<'a> {
    inner: &'a mut dyn BinaryWriter,
    cancellation: &'a CancellationToken,
}

impl BinaryWriter for CancellingBinaryWriter<'_> {
    fn start(&mut self) -> Result<()> {
        self.cancellation.check()?;
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        self.cancellation.check()?;
        self.inner.set_attribute(attribute, value)
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.cancellation.check()?;
        self.inner.set_extension(name, value)
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.cancellation.check()?;
        self.inner.set_data(data)
    }

    fn end(&mut self) -> Result<()> {
        self.cancellation.check()?;
        self.inner.end()
    }
}

/// The [`StructuredWriter`] counterpart of [`CancellingBinaryWriter`].
struct CancellingStructuredWriter<'a> {
    inner: &'a mut dyn StructuredWriter,
    cancellation: &'a CancellationToken,
}

impl StructuredWriter for CancellingStructuredWriter<'_> {
    fn set_structured_event(&mut self, format: &dyn Format, bytes: Vec<u8>) -> Result<()> {
        self.cancellation.check()?;
        self.inner.set_structured_event(format, bytes)
    }
}

/// Converts an arbitrary message into an owned [`Event`] by driving it
/// into a capturing writer: binary mode first (cheaper, no format
/// round-trip), falling back to structured mode on [`Error::NotBinary`].
///
/// Grounded on the Go SDK's `binding.ToEvent` helper referenced by spec.md
/// section 4.4 step 4's "materialize to event via `ToEvent`".
pub fn materialize(message: &dyn Message) -> Result<Event> {
    materialize_with_cancellation(message, &CancellationToken::new())
}

pub(crate) fn materialize_with_cancellation(
    message: &dyn Message,
    cancellation: &CancellationToken,
) -> Result<Event> {
    cancellation.check()?;
    let mut binary_capture = BinaryCapture::default();
    let binary_result = {
        let mut cancelling = CancellingBinaryWriter {
            inner: &mut binary_capture,
            cancellation,
        };
        message.read_binary(&mut cancelling)
    };
    match binary_result {
        Ok(()) => {
            let data = match binary_capture.data {
                Some(bytes) => Some(
                    Data::from_bytes(binary_capture.ctx.datacontenttype.as_deref(), bytes)
                        .map_err(|source| Error::other(format!("decoding captured data: {source}")))?,
                ),
                None => None,
            };
            Ok(Event {
                attributes: binary_capture.ctx,
                data,
            })
        }
        Err(Error::NotBinary) => {
            cancellation.check()?;
            let mut structured_capture = StructuredCapture::default();
            let mut cancelling = CancellingStructuredWriter {
                inner: &mut structured_capture,
                cancellation,
            };
            message.read_structured(&mut cancelling)?;
            structured_capture
                .event
                .ok_or_else(|| Error::other("structured writer captured no event"))
        }
        Err(other) => Err(other),
    }
}

#[derive(Default)]
struct BinaryCapture {
    ctx: EventContext,
    data: Option<Vec<u8>>,
}

impl BinaryWriter for BinaryCapture {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        attribute.set(&mut self.ctx, value)?;
        Ok(())
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.ctx.set_extension(name.to_owned(), Some(value));
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

#[derive(Default)]
struct StructuredCapture {
    event: Option<Event>,
}

impl StructuredWriter for StructuredCapture {
    fn set_structured_event(&mut self, format: &dyn Format, bytes: Vec<u8>) -> Result<()> {
        self.event = Some(format.deserialize(&bytes)?);
        Ok(())
    }
}
