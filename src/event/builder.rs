use super::{Data, Event};
use crate::spec::{EventContext, SpecVersion};
use crate::types::{TypeError, Value};
use chrono::{DateTime, Utc};
use snafu::Snafu;
use url::Url;

/// Errors raised while [`EventBuilder::build`]ing an [`Event`].
#[derive(Debug, Snafu, Clone)]
pub enum Error {
    #[snafu(display("missing required attribute '{attribute_name}'"))]
    MissingRequiredAttribute { attribute_name: &'static str },
    #[snafu(display("invalid value for attribute '{attribute_name}': {source}"))]
    InvalidAttribute {
        attribute_name: &'static str,
        source: TypeError,
    },
}

/// Builder for [`Event`], one instance per target [`SpecVersion`].
///
/// Grounded on `cloudevents-sdk`'s `EventBuilder` trait plus
/// `EventBuilderV03`/`EventBuilderV10`; here a single struct parametrized
/// by [`SpecVersion`] replaces the two near-identical generated structs,
/// since the underlying [`EventContext`] is already version-tagged rather
/// than duplicated per version.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    version: SpecVersion,
    id: Option<String>,
    source: Option<Url>,
    ty: Option<String>,
    subject: Option<String>,
    time: Option<DateTime<Utc>>,
    dataschema: Option<Url>,
    data: Option<(String, Data)>,
    extensions: Vec<(String, Value)>,
}

impl EventBuilder {
    pub fn new(version: SpecVersion) -> Self {
        EventBuilder {
            version,
            ..Default::default()
        }
    }

    /// Seeds the builder from an existing event (its attributes, data and
    /// extensions become the new defaults).
    pub fn from_event(event: Event) -> Self {
        let data = event
            .attributes
            .datacontenttype
            .clone()
            .zip(event.data.clone());
        EventBuilder {
            version: event.attributes.version,
            id: Some(event.attributes.id),
            source: Some(event.attributes.source),
            ty: Some(event.attributes.ty),
            subject: event.attributes.subject,
            time: event.attributes.time,
            dataschema: event.attributes.dataschema,
            data,
            extensions: event.attributes.extensions.into_iter().collect(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn source(mut self, source: impl AsRef<str>) -> Self {
        self.source = Url::parse(source.as_ref()).ok();
        self
    }

    pub fn ty(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn dataschema(mut self, uri: impl AsRef<str>) -> Self {
        self.dataschema = Url::parse(uri.as_ref()).ok();
        self
    }

    pub fn data(mut self, content_type: impl Into<String>, data: impl Into<Data>) -> Self {
        self.data = Some((content_type.into(), data.into()));
        self
    }

    pub fn extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Event, Error> {
        let id = self.id.ok_or(Error::MissingRequiredAttribute {
            attribute_name: "id",
        })?;
        let source = self.source.ok_or(Error::MissingRequiredAttribute {
            attribute_name: "source",
        })?;
        let ty = self.ty.ok_or(Error::MissingRequiredAttribute {
            attribute_name: "type",
        })?;

        let (datacontenttype, data) = match self.data {
            Some((ct, d)) => (Some(ct), Some(d)),
            None => (None, None),
        };

        let mut extensions = std::collections::HashMap::new();
        for (name, value) in self.extensions {
            extensions.insert(name, value.into_extension_value());
        }

        Ok(Event {
            attributes: EventContext {
                version: self.version,
                id,
                source,
                ty,
                datacontenttype,
                dataschema: self.dataschema,
                subject: self.subject,
                time: self.time,
                extensions,
            },
            data,
        })
    }
}

/// Convenience constructor matching `cloudevents-sdk`'s
/// `EventBuilderV10::new()` entry point.
pub fn builder_v10() -> EventBuilder {
    EventBuilder::new(SpecVersion::V10)
}

/// Convenience constructor matching `cloudevents-sdk`'s
/// `EventBuilderV03::new()` entry point.
pub fn builder_v03() -> EventBuilder {
    EventBuilder::new(SpecVersion::V03)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_id_source_type() {
        let err = EventBuilder::new(SpecVersion::V10).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredAttribute { .. }));
    }

    #[test]
    fn build_succeeds_with_required_fields() {
        let event = EventBuilder::new(SpecVersion::V10)
            .id("1")
            .source("http://example.com/source")
            .ty("com.example.test")
            .build()
            .unwrap();
        assert_eq!(event.id(), "1");
        assert_eq!(event.source().as_str(), "http://example.com/source");
    }
}
