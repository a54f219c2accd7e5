use super::SpecVersion;
use crate::types::Value;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use url::Url;

/// Version-tagged record of CloudEvents context attributes plus the
/// extensions map, as described in spec section 3 ("EventContext").
///
/// Unlike `cloudevents-sdk`'s `Attributes` enum (one Rust struct per spec
/// version, reached through `delegate-attr`), this registry keeps a single
/// struct tagged by [`SpecVersion`] and lets [`super::Attribute::get`] /
/// [`super::Attribute::set`] dispatch per-[`super::Kind`]. The two
/// approaches are equivalent for the closed attribute set CloudEvents
/// defines; the single-struct form is what lets [`super::Version::convert`]
/// be a pure re-tag instead of a field-by-field copy.
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    pub(crate) version: SpecVersion,
    pub(crate) id: String,
    pub(crate) source: Url,
    pub(crate) ty: String,
    pub(crate) datacontenttype: Option<String>,
    pub(crate) dataschema: Option<Url>,
    pub(crate) subject: Option<String>,
    pub(crate) time: Option<DateTime<Utc>>,
    pub(crate) extensions: HashMap<String, Value>,
}

impl EventContext {
    pub fn version(&self) -> SpecVersion {
        self.version
    }

    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Sets or clears (on `None`) an extension. Extension names are
    /// preserved as given; case-insensitive comparison is only a transport
    /// mapping concern (spec section 3), not a storage concern.
    ///
    /// A non-primitive value (URI, URI-reference, timestamp, binary) is
    /// downgraded to its canonical string form via [`Value::format`]
    /// before storage, matching the value kinds CloudEvents extensions
    /// actually carry on the wire.
    pub fn set_extension(&mut self, name: impl Into<String>, value: Option<Value>) {
        let name = name.into();
        match value {
            Some(v) => {
                self.extensions.insert(name, v.into_extension_value());
            }
            None => {
                self.extensions.remove(&name);
            }
        }
    }

    /// Checks that required attributes are non-empty and that no extension
    /// name collides with a standard attribute name for this version.
    pub fn validate(&self) -> bool {
        if self.id.is_empty() || self.source.as_str().is_empty() || self.ty.is_empty() {
            return false;
        }
        let version = self.version.version();
        !version
            .attributes()
            .iter()
            .any(|a| self.extensions.contains_key(a.name()))
    }
}

impl Default for EventContext {
    fn default() -> Self {
        EventContext {
            version: SpecVersion::V10,
            id: uuid::Uuid::new_v4().to_string(),
            source: Url::parse("http://localhost/").expect("static URL is valid"),
            ty: String::new(),
            datacontenttype: None,
            dataschema: None,
            subject: None,
            time: None,
            extensions: HashMap::new(),
        }
    }
}
