//! Event Value: an immutable-by-convention holder of the validated
//! attribute/extension/data triple spec.md section 4.2 describes, built
//! from and read through the Spec Registry and Type System.

use crate::spec::{EventContext, Kind, SpecVersion};
use crate::types::Value;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

mod data;
pub mod builder;
pub mod format;

pub use data::Data;
pub use builder::EventBuilder;

/// A single CloudEvents event: spec-version-tagged context attributes,
/// user extensions, and at most one data payload.
///
/// Grounded on `cloudevents-sdk`'s `event::Event` struct, with the
/// per-version `Attributes` enum collapsed into the single
/// [`EventContext`] the Spec Registry already maintains (see
/// [`crate::spec::context`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub(crate) attributes: EventContext,
    pub(crate) data: Option<Data>,
}

impl Event {
    /// A fresh event for `version` with a random id, `http://localhost/` as
    /// source, and no type/data/extensions set — callers are expected to
    /// fill in `ty` (and usually `source`) before publishing it.
    pub fn new(version: SpecVersion) -> Self {
        Event {
            attributes: EventContext {
                version,
                ..EventContext::default()
            },
            data: None,
        }
    }

    pub fn specversion(&self) -> SpecVersion {
        self.attributes.version
    }

    pub fn id(&self) -> &str {
        &self.attributes.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.attributes.id = id.into();
    }

    pub fn source(&self) -> &Url {
        &self.attributes.source
    }

    pub fn set_source(&mut self, source: Url) {
        self.attributes.source = source;
    }

    pub fn ty(&self) -> &str {
        &self.attributes.ty
    }

    pub fn set_type(&mut self, ty: impl Into<String>) {
        self.attributes.ty = ty.into();
    }

    pub fn datacontenttype(&self) -> Option<&str> {
        self.attributes.datacontenttype.as_deref()
    }

    pub fn dataschema(&self) -> Option<&Url> {
        self.attributes.dataschema.as_ref()
    }

    pub fn set_dataschema(&mut self, dataschema: Option<Url>) {
        self.attributes.dataschema = dataschema;
    }

    pub fn subject(&self) -> Option<&str> {
        self.attributes.subject.as_deref()
    }

    pub fn set_subject(&mut self, subject: Option<String>) {
        self.attributes.subject = subject;
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.attributes.time
    }

    pub fn set_time(&mut self, time: Option<DateTime<Utc>>) {
        self.attributes.time = time;
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.attributes.extension(name)
    }

    pub fn iter_extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.extensions()
    }

    pub fn set_extension(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.set_extension(name, Some(value.into()));
    }

    pub fn remove_extension(&mut self, name: &str) -> Option<Value> {
        let value = self.attributes.extension(name).cloned();
        if value.is_some() {
            self.attributes.set_extension(name.to_owned(), None);
        }
        value
    }

    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// The payload's canonical byte encoding, or `None` if this event
    /// carries no data. Shared by every binary-mode writer and by test
    /// assertion helpers so the `Data`-to-bytes encoding lives in one
    /// place.
    pub fn data_bytes(&self) -> std::result::Result<Option<Vec<u8>>, serde_json::Error> {
        self.data.as_ref().map(Data::to_bytes).transpose()
    }

    pub fn take_data(&mut self) -> Option<(Option<String>, Data)> {
        let data = self.data.take()?;
        let dct = self.attributes.datacontenttype.take();
        Some((dct, data))
    }

    /// Sets the payload, inferring `application/json` when `content_type`
    /// is `None` and `data` is [`Data::Json`] (mirroring
    /// [`Data::from_bytes`]'s own inference for raw-byte construction).
    pub fn set_data(&mut self, content_type: impl Into<Option<String>>, data: impl Into<Data>) {
        let data = data.into();
        let content_type = content_type.into().or_else(|| match &data {
            Data::Json(_) => Some("application/json".to_owned()),
            _ => None,
        });
        self.attributes.datacontenttype = content_type;
        self.data = Some(data);
    }

    pub fn remove_data(&mut self) {
        self.data = None;
        self.attributes.datacontenttype = None;
    }

    /// Context-attribute validity (spec.md section 4.2's invariant): all
    /// required attributes set, no extension shadowing a standard name.
    pub fn validate(&self) -> bool {
        self.attributes.validate()
    }

    pub(crate) fn context(&self) -> &EventContext {
        &self.attributes
    }

    pub(crate) fn context_mut(&mut self) -> &mut EventContext {
        &mut self.attributes
    }

    /// Re-tags this event to `version`, applying the Spec Registry's
    /// cross-version attribute-name equivalences (schemaurl/dataschema).
    pub fn convert(mut self, version: SpecVersion) -> Self {
        self.attributes = version.version().convert(self.attributes);
        self
    }
}

impl Default for Event {
    fn default() -> Self {
        Event::new(SpecVersion::default())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation: {}", self.validate())?;
        writeln!(f, "Context Attributes,")?;
        writeln!(f, "  specversion: {}", self.attributes.version)?;
        writeln!(f, "  id: {}", self.attributes.id)?;
        writeln!(f, "  source: {}", self.attributes.source)?;
        writeln!(f, "  type: {}", self.attributes.ty)?;
        if let Some(dct) = &self.attributes.datacontenttype {
            writeln!(f, "  datacontenttype: {}", dct)?;
        }
        if let Some(schema) = &self.attributes.dataschema {
            writeln!(
                f,
                "  {}: {}",
                self.attributes.version.version().attribute_from_kind(Kind::DataSchema).name(),
                schema
            )?;
        }
        if let Some(subject) = &self.attributes.subject {
            writeln!(f, "  subject: {}", subject)?;
        }
        if let Some(time) = &self.attributes.time {
            writeln!(f, "  time: {}", time.to_rfc3339())?;
        }
        if !self.attributes.extensions.is_empty() {
            writeln!(f, "Extensions,")?;
            for (name, value) in self.iter_extensions() {
                writeln!(f, "  {}: {}", name, value)?;
            }
        }
        if let Some(data) = &self.data {
            writeln!(f, "Data,")?;
            write!(f, "  {}", data)?;
        }
        Ok(())
    }
}
