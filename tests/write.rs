//! Testable property 3 from spec.md section 8: force-encoding preferences,
//! including the cases where a force conflicts with what the source or the
//! transformer chain can actually do.

mod support;

use cloudevents::event::format::{Format, JsonFormat};
use cloudevents::message::{
    write, BinaryWriter, Encoding, Error, Message, Result as MsgResult, StructuredWriter,
    WriteOptions,
};
use cloudevents::spec::SpecVersion;
use cloudevents::transform::{self, TransformerFactories};
use support::{s1_event, RecordingBinaryWriter, RecordingStructuredWriter};

/// A message that can only ever be driven in structured mode - modeling a
/// transport message backed by opaque, already-encoded bytes with no
/// attribute decomposition available (spec.md section 4.4's `Message`
/// capability set: a message need not implement every path).
struct StructuredOnly(Vec<u8>);

impl Message for StructuredOnly {
    fn read_encoding(&self) -> Encoding {
        Encoding::Structured
    }

    fn read_structured(&self, writer: &mut dyn StructuredWriter) -> MsgResult<()> {
        writer.set_structured_event(&JsonFormat, self.0.clone())
    }

    fn read_binary(&self, _writer: &mut dyn BinaryWriter) -> MsgResult<()> {
        Err(Error::NotBinary)
    }

    fn finish(&self, _err: Option<&Error>) -> MsgResult<()> {
        Ok(())
    }
}

#[test]
fn force_binary_drives_binary_for_an_event_source() {
    let event = s1_event();
    let (binary_writer, binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, _structured_log) = RecordingStructuredWriter::new();
    let mut options = WriteOptions::default();
    options.force_binary = true;

    let encoding = write(
        &event,
        structured_writer,
        binary_writer,
        &Vec::new(),
        &options,
    )
    .unwrap();
    assert_eq!(encoding, Encoding::Binary);
    assert!(binary_log.lock().unwrap().started);
}

#[test]
fn force_structured_drives_structured_for_an_event_source() {
    let event = s1_event();
    let (binary_writer, _binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, structured_log) = RecordingStructuredWriter::new();
    let mut options = WriteOptions::default();
    options.force_structured = true;

    let encoding = write(
        &event,
        structured_writer,
        binary_writer,
        &Vec::new(),
        &options,
    )
    .unwrap();
    assert_eq!(encoding, Encoding::Structured);
    assert!(structured_log.lock().unwrap().bytes.is_some());
}

#[test]
fn force_structured_fails_when_the_chain_is_not_structured_capable() {
    let event = s1_event();
    let (binary_writer, _binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, _structured_log) = RecordingStructuredWriter::new();
    let factories: TransformerFactories = vec![transform::version(SpecVersion::V03)];
    let mut options = WriteOptions::default();
    options.force_structured = true;

    let err = write(&event, structured_writer, binary_writer, &factories, &options).unwrap_err();
    assert!(matches!(err, Error::TransformationNotSupported { .. }));
}

#[test]
fn force_binary_fails_for_a_structured_only_source() {
    let event = s1_event();
    let bytes = JsonFormat.serialize(&event).unwrap();
    let source = StructuredOnly(bytes);

    let (binary_writer, _binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, _structured_log) = RecordingStructuredWriter::new();
    let mut options = WriteOptions::default();
    options.force_binary = true;

    let err = write(&source, structured_writer, binary_writer, &Vec::new(), &options).unwrap_err();
    assert!(matches!(err, Error::TransformationNotSupported { .. }));
}

#[test]
fn structured_only_source_drives_structured_without_a_force() {
    // Without a forced preference, step 4's "otherwise" rule prefers the
    // source's own native encoding over `preferred_encoding` whenever the
    // chain can carry it - so a structured-only source stays structured
    // even though `WriteOptions::default()` prefers binary.
    let event = s1_event();
    let bytes = JsonFormat.serialize(&event).unwrap();
    let source = StructuredOnly(bytes);

    let (binary_writer, _binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, structured_log) = RecordingStructuredWriter::new();

    let encoding = write(
        &source,
        structured_writer,
        binary_writer,
        &Vec::new(),
        &WriteOptions::default(),
    )
    .unwrap();
    assert_eq!(encoding, Encoding::Structured);
    assert!(structured_log.lock().unwrap().bytes.is_some());
}

#[test]
fn structured_only_source_falls_back_via_materialization_when_chain_is_binary_only() {
    // A factory that only supports binary narrows the chain so the
    // structured-only source can no longer be driven directly; the
    // orchestrator must materialize to an event and emit through the
    // binary writer instead.
    let event = s1_event();
    let bytes = JsonFormat.serialize(&event).unwrap();
    let source = StructuredOnly(bytes);
    let factories: TransformerFactories = vec![transform::version(SpecVersion::V03)];

    let (binary_writer, binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, _structured_log) = RecordingStructuredWriter::new();

    let encoding = write(
        &source,
        structured_writer,
        binary_writer,
        &factories,
        &WriteOptions::default(),
    )
    .unwrap();
    assert_eq!(encoding, Encoding::Binary);
    let log = binary_log.lock().unwrap();
    assert!(!log.attributes.is_empty());
    assert_eq!(log.attributes[0].0.version(), SpecVersion::V03);
}
