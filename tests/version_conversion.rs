//! Testable property 7 and seed scenario S4 from spec.md section 8: moving
//! an event between spec versions renames `dataschema`/`schemaurl` without
//! losing the value, and the emitted `specversion` always reflects the
//! event's current version.

mod support;

use cloudevents::event::format::{Format, JsonFormat};
use cloudevents::message::{write, Encoding, WriteOptions};
use cloudevents::spec::{Kind, SpecVersion};
use support::{RecordingBinaryWriter, RecordingStructuredWriter};
use url::Url;

fn v10_event_with_dataschema() -> cloudevents::Event {
    cloudevents::event::builder::builder_v10()
        .id("1")
        .source("http://example.com/source")
        .ty("com.example.test")
        .dataschema("http://example.com/schema")
        .build()
        .unwrap()
}

#[test]
fn s4_converting_v10_to_v03_renames_dataschema_to_schemaurl() {
    let event = v10_event_with_dataschema();
    let converted = event.convert(SpecVersion::V03);

    assert_eq!(converted.specversion(), SpecVersion::V03);
    assert_eq!(
        converted.dataschema().map(Url::as_str),
        Some("http://example.com/schema")
    );

    let (binary_writer, binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, _structured_log) = RecordingStructuredWriter::new();
    write(
        &converted,
        structured_writer,
        binary_writer,
        &Vec::new(),
        &WriteOptions::default(),
    )
    .unwrap();

    let log = binary_log.lock().unwrap();
    let schema_attr = log
        .attributes
        .iter()
        .find(|(a, _)| a.kind() == Kind::DataSchema)
        .expect("dataschema attribute present");
    assert_eq!(schema_attr.0.name(), "schemaurl");
}

#[test]
fn s4_converting_back_to_v10_renames_schemaurl_to_dataschema_and_is_lossless() {
    let original = v10_event_with_dataschema();
    let round_tripped = original.clone().convert(SpecVersion::V03).convert(SpecVersion::V10);

    assert_eq!(round_tripped.specversion(), SpecVersion::V10);
    assert_eq!(round_tripped.dataschema(), original.dataschema());
    assert_eq!(round_tripped.id(), original.id());
    assert_eq!(round_tripped.source(), original.source());
    assert_eq!(round_tripped.ty(), original.ty());
}

#[test]
fn property7_structured_payload_specversion_field_tracks_the_converted_version() {
    let event = v10_event_with_dataschema().convert(SpecVersion::V03);

    let (binary_writer, _binary_log) = RecordingBinaryWriter::new();
    let (structured_writer, structured_log) = RecordingStructuredWriter::new();
    let mut options = WriteOptions::default();
    options.preferred_encoding = Encoding::Structured;
    write(&event, structured_writer, binary_writer, &Vec::new(), &options).unwrap();

    let bytes = structured_log.lock().unwrap().bytes.clone().unwrap();
    let decoded = JsonFormat.deserialize(&bytes).unwrap();
    assert_eq!(decoded.specversion(), SpecVersion::V03);

    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["specversion"], "0.3");
    assert_eq!(parsed["schemaurl"], "http://example.com/schema");
    assert!(parsed.get("dataschema").is_none());
}
