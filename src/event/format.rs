//! Wire formats for [`Event`]: the JSON format spec.md's binding layer
//! treats as default, plus YAML as the ambient second encoding the
//! runtime's format registry can fall back to.
//!
//! Grounded on `cloudevents-sdk`'s `event::format`/`event::v10::format`
//! modules. There the serializer/deserializer are generated once per spec
//! version (`EventFormatSerializerV03`/`V10`); here they collapse into a
//! single implementation driven by [`crate::spec::Version::attributes`],
//! since [`EventContext`] is already version-tagged rather than
//! per-version-typed.

use super::{Data, Event};
use crate::spec::{EventContext, Kind};
use crate::types::Value;
use serde::de::{Error as DeError, IntoDeserializer};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;
use std::collections::HashMap;

/// Errors raised encoding/decoding an [`Event`] through a [`Format`].
#[derive(Debug, Snafu)]
pub enum FormatError {
    #[snafu(display("JSON format error: {source}"))]
    Json { source: serde_json::Error },
    #[snafu(display("YAML format error: {source}"))]
    Yaml { source: serde_yaml::Error },
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// A structured-mode wire format: a name, an IANA media type, and
/// bytes-level (de)serialization of an [`Event`].
///
/// Grounded on `cloudevents-sdk`'s built-in JSON `EventFormat` plus the
/// Go `binding.EventFormat` interface this crate's spec.md section 4.3
/// describes (`MediaType()`, `Marshal`, `Unmarshal`).
pub trait Format: Send + Sync {
    fn media_type(&self) -> &'static str;
    fn serialize(&self, event: &Event) -> Result<Vec<u8>>;
    fn deserialize(&self, bytes: &[u8]) -> Result<Event>;
}

/// `application/cloudevents+json`, the format every conformant CloudEvents
/// binding must support.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn media_type(&self) -> &'static str {
        "application/cloudevents+json"
    }

    fn serialize(&self, event: &Event) -> Result<Vec<u8>> {
        serde_json::to_vec(event).context(JsonSnafu)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Event> {
        serde_json::from_slice(bytes).context(JsonSnafu)
    }
}

/// `application/cloudevents+yaml`, carried as the ambient second format
/// alongside JSON (the teacher's core crate only ships JSON; YAML is
/// supplemented here because `Event`'s `Serialize`/`Deserialize` impls are
/// already format-agnostic, and `serde_yaml` is already the corpus's
/// ambient choice for YAML).
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFormat;

impl Format for YamlFormat {
    fn media_type(&self) -> &'static str {
        "application/cloudevents+yaml"
    }

    fn serialize(&self, event: &Event) -> Result<Vec<u8>> {
        serde_yaml::to_string(event)
            .map(String::into_bytes)
            .context(YamlSnafu)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Event> {
        serde_yaml::from_slice(bytes).context(YamlSnafu)
    }
}

use snafu::ResultExt;

/// Looks up a built-in [`Format`] by IANA media type (without structured
/// suffix conventions such as `+json` on a foreign base type).
///
/// Matching is case-insensitive and ignores any `;`-separated parameters
/// (e.g. `charset=utf-8`), per spec.md section 6.
pub fn lookup(media_type: &str) -> Option<&'static dyn Format> {
    let base = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "application/cloudevents+json" | "application/json" => Some(&JsonFormat),
        "application/cloudevents+yaml" | "application/yaml" | "text/yaml" => Some(&YamlFormat),
        _ => None,
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ctx = self.context();
        let version = ctx.version().version();
        let attrs = version.attributes();

        let extensions = &ctx.extensions;
        let len = attrs.iter().filter(|a| a.get(ctx).is_some()).count()
            + usize::from(self.data.is_some())
            + extensions.len();

        let mut map = serializer.serialize_map(Some(len))?;
        for attribute in &attrs {
            if let Some(value) = attribute.get(ctx) {
                map.serialize_entry(attribute.name(), &value)?;
            }
        }
        match &self.data {
            Some(Data::Json(v)) => map.serialize_entry("data", v)?,
            Some(Data::String(s)) => map.serialize_entry("data", s)?,
            Some(Data::Binary(b)) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(b);
                map.serialize_entry("data_base64", &encoded)?
            }
            None => {}
        }
        for (name, value) in extensions {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let root = serde_json::Value::deserialize(deserializer)?;
        let mut map = match root {
            serde_json::Value::Object(m) => m,
            _ => return Err(DeError::custom("a CloudEvents event must be a JSON object")),
        };

        let specversion_raw = map
            .remove("specversion")
            .ok_or_else(|| DeError::missing_field("specversion"))?;
        let specversion_str = specversion_raw
            .as_str()
            .ok_or_else(|| DeError::custom("specversion must be a string"))?;
        let spec_version = crate::spec::SpecVersion::try_from(specversion_str)
            .map_err(|e| DeError::custom(e.to_string()))?;
        let version = spec_version.version();

        let mut ctx = EventContext {
            version: spec_version,
            ..EventContext::default()
        };

        for attribute in version.attributes() {
            if attribute.kind() == Kind::SpecVersion {
                continue;
            }
            let Some(raw) = map.remove(attribute.name()) else {
                if attribute.required() {
                    return Err(DeError::missing_field(attribute.name()));
                }
                continue;
            };
            if raw.is_null() {
                continue;
            }
            let text = match &raw {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let value = crate::types::Value::parse(&text, attribute.kind().value_kind())
                .map_err(|e| DeError::custom(e.to_string()))?;
            attribute
                .set(&mut ctx, value)
                .map_err(|e| DeError::custom(e.to_string()))?;
        }

        let content_type = ctx.datacontenttype.clone();
        let is_json = content_type
            .as_deref()
            .map(crate::event::data::is_json_content_type)
            .unwrap_or(true);

        let data = map.remove("data");
        let data_base64 = map.remove("data_base64");
        let data = match (data, data_base64, is_json) {
            (Some(d), None, true) => Some(Data::Json(
                serde_json::Value::deserialize(d.into_deserializer()).map_err(DeError::custom)?,
            )),
            (Some(d), None, false) => Some(Data::String(
                String::deserialize(d.into_deserializer()).map_err(DeError::custom)?,
            )),
            (None, Some(d), _) => {
                let s = String::deserialize(d.into_deserializer()).map_err(DeError::custom)?;
                let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, s)
                    .map_err(|e| DeError::custom(e.to_string()))?;
                Some(Data::Binary(bytes))
            }
            (Some(_), Some(_), _) => {
                return Err(DeError::custom("cannot have both data and data_base64"))
            }
            (None, None, _) => None,
        };

        let extensions: HashMap<String, Value> = map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let value =
                    Value::deserialize(v.into_deserializer()).map_err(DeError::custom)?;
                Ok((k, value))
            })
            .collect::<std::result::Result<_, D::Error>>()?;
        ctx.extensions = extensions;

        Ok(Event { attributes: ctx, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecVersion;

    fn sample() -> Event {
        let mut event = Event::new(SpecVersion::V10);
        event.set_type("com.example.test");
        event.set_subject(Some("doc".to_owned()));
        event.set_data(None, serde_json::json!({"hello": "world"}));
        event.set_extension("comexampleextension1", "value");
        event
    }

    #[test]
    fn json_round_trip() {
        let event = sample();
        let bytes = JsonFormat.serialize(&event).unwrap();
        let decoded = JsonFormat.deserialize(&bytes).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn yaml_round_trip() {
        let event = sample();
        let bytes = YamlFormat.serialize(&event).unwrap();
        let decoded = YamlFormat.deserialize(&bytes).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn lookup_resolves_media_types() {
        assert!(lookup("application/cloudevents+json").is_some());
        assert!(lookup("application/cloudevents+yaml").is_some());
        assert!(lookup("text/plain").is_none());
    }

    #[test]
    fn lookup_ignores_case_and_parameters() {
        assert!(lookup("Application/CloudEvents+JSON; charset=utf-8").is_some());
        assert!(lookup("APPLICATION/JSON").is_some());
        assert!(lookup("text/YAML ; charset=utf-8").is_some());
    }

    #[test]
    fn deserialize_rejects_unknown_specversion() {
        let json = serde_json::json!({
            "specversion": "9.9",
            "id": "1",
            "source": "http://example.com",
            "type": "com.example.test",
        });
        let err = serde_json::from_value::<Event>(json).unwrap_err();
        assert!(err.to_string().contains("9.9"));
    }
}
