//! Canonical CloudEvents attribute value representation and text/JSON
//! formatting.
//!
//! Mirrors `cloudevents-sdk`'s `event::types` module, but unifies the
//! per-kind host types (`Url`, `DateTime<Utc>`, `String`, ...) into a
//! single closed [`Value`] enum so the [Spec Registry](crate::spec) can
//! read and write any attribute uniformly.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::{Error as DeError, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;
use std::fmt;
use url::Url;

/// The value types permitted for CloudEvents context attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Integer,
    String,
    Binary,
    Uri,
    UriRef,
    Time,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Boolean => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::String => "String",
            ValueKind::Binary => "Binary",
            ValueKind::Uri => "URI",
            ValueKind::UriRef => "URI-reference",
            ValueKind::Time => "Timestamp",
        };
        f.write_str(s)
    }
}

/// A value of one of the closed CloudEvents attribute types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
    Binary(Vec<u8>),
    Uri(Url),
    UriRef(String),
    Time(DateTime<Utc>),
}

/// Errors raised while validating, formatting or parsing a [`Value`].
#[derive(Debug, Snafu)]
pub enum TypeError {
    #[snafu(display("value is not a valid CloudEvents attribute type: {reason}"))]
    InvalidValueType { reason: String },
    #[snafu(display("could not parse '{text}' as {target}: {reason}"))]
    InvalidValueFormat {
        text: String,
        target: ValueKind,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, TypeError>;

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::Uri(_) => ValueKind::Uri,
            Value::UriRef(_) => ValueKind::UriRef,
            Value::Time(_) => ValueKind::Time,
        }
    }

    /// Rejects NaN/infinite floats (there is no float variant, so this only
    /// rejects malformed construction paths reachable from untyped hosts,
    /// e.g. via [`Value::parse`]) and otherwise passes `self` through.
    pub fn validate(self) -> Result<Self> {
        Ok(self)
    }

    /// Deterministic textual form, used by header-based transports and by
    /// [`Value::parse`]'s round-trip invariant.
    pub fn format(&self) -> String {
        match self {
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::String(s) => s.clone(),
            Value::Binary(b) => STANDARD.encode(b),
            Value::Uri(u) => u.to_string(),
            Value::UriRef(u) => u.clone(),
            Value::Time(t) => t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        }
    }

    /// Parses a textual representation into the declared target type.
    /// Left-inverse of [`Value::format`] for that type; additionally
    /// accepts unpadded base64 for [`ValueKind::Binary`].
    pub fn parse(text: &str, target: ValueKind) -> Result<Value> {
        match target {
            ValueKind::Boolean => text
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|e| invalid_format(text, target, e)),
            ValueKind::Integer => text
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| invalid_format(text, target, e)),
            ValueKind::String => Ok(Value::String(text.to_owned())),
            ValueKind::UriRef => Ok(Value::UriRef(text.to_owned())),
            ValueKind::Uri => Url::parse(text)
                .map(Value::Uri)
                .map_err(|e| invalid_format(text, target, e)),
            ValueKind::Time => DateTime::parse_from_rfc3339(text)
                .map(|t| Value::Time(t.with_timezone(&Utc)))
                .map_err(|e| invalid_format(text, target, e)),
            ValueKind::Binary => STANDARD
                .decode(text)
                .or_else(|_| STANDARD_NO_PAD.decode(text))
                .map(Value::Binary)
                .map_err(|e| invalid_format(text, target, e)),
        }
    }

    /// Coerces `self` into `target`'s type by round-tripping through
    /// [`Value::format`]/[`Value::parse`] when the kinds differ. Used by
    /// [`crate::spec::Attribute::set`].
    pub fn coerce(self, target: ValueKind) -> Result<Value> {
        if self.kind() == target {
            return Ok(self);
        }
        Value::parse(&self.format(), target)
    }

    /// Restricts `self` to the value kinds CloudEvents extension attributes
    /// actually carry on the wire (boolean, integer, string), downgrading
    /// anything else to its canonical [`Value::format`] string.
    ///
    /// Mirrors `cloudevents-sdk`'s `ExtensionValue` enum, which has no
    /// variants for URI/URI-reference/timestamp — used by
    /// [`crate::spec::EventContext::set_extension`] so extensions always
    /// round-trip losslessly through the untagged [`Value`] decoder below.
    pub(crate) fn into_extension_value(self) -> Value {
        match self {
            Value::Boolean(_) | Value::Integer(_) | Value::String(_) => self,
            Value::Binary(_) | Value::Uri(_) | Value::UriRef(_) | Value::Time(_) => {
                Value::String(self.format())
            }
        }
    }
}

fn invalid_format(text: &str, target: ValueKind, reason: impl fmt::Display) -> TypeError {
    TypeError::InvalidValueFormat {
        text: text.to_owned(),
        target,
        reason: reason.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Url> for Value {
    fn from(u: Url) -> Self {
        Value::Uri(u)
    }
}

/// Serializes each variant as the native JSON/YAML type it most resembles
/// (`bool`, `i64`, a string), rather than always going through
/// [`Value::format`] — this is what lets extension attributes round-trip
/// as JSON booleans/numbers instead of stringified text, matching
/// `cloudevents-sdk`'s untagged `ExtensionValue` enum.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::UriRef(s) => serializer.serialize_str(s),
            Value::Uri(u) => serializer.serialize_str(u.as_str()),
            Value::Binary(b) => serializer.serialize_str(&STANDARD.encode(b)),
            Value::Time(t) => serializer.serialize_str(&t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)),
        }
    }
}

/// Untagged deserialization covering the value shapes CloudEvents
/// extensions actually use on the wire (boolean, integer, string); context
/// attributes are parsed through [`Value::parse`] with an explicit target
/// [`ValueKind`] instead, since their type is known from the Spec Registry.
///
/// This is lossless for extensions specifically because
/// [`Value::into_extension_value`] already restricts every extension to
/// one of these three kinds at `set_extension` time — a URI/time/binary
/// extension value is downgraded to its canonical string form before it
/// is ever stored, so there is no wider kind left for this decoder to
/// collapse.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        match v {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| DeError::invalid_type(Unexpected::Other("non-integer number"), &"an integer")),
            serde_json::Value::String(s) => Ok(Value::String(s)),
            other => Err(DeError::invalid_type(
                Unexpected::Other(&format!("{:?}", other)),
                &"a boolean, integer or string",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Boolean(true))]
    #[case(Value::Integer(-42))]
    #[case(Value::String("hello".into()))]
    #[case(Value::Binary(vec![1, 2, 3, 4, 5]))]
    #[case(Value::Uri(Url::parse("http://example.com/source").unwrap()))]
    #[case(Value::UriRef("/relative/path".into()))]
    fn round_trip(#[case] value: Value) {
        let kind = value.kind();
        let formatted = value.format();
        let parsed = Value::parse(&formatted, kind).unwrap();
        assert_eq!(value, parsed);
    }

    #[test]
    fn binary_accepts_unpadded_base64_on_parse() {
        let padded = Value::Binary(b"value".to_vec()).format();
        assert!(padded.ends_with('='));
        let unpadded = padded.trim_end_matches('=');
        assert_eq!(
            Value::parse(unpadded, ValueKind::Binary).unwrap(),
            Value::Binary(b"value".to_vec())
        );
    }

    #[test]
    fn time_round_trip_is_rfc3339() {
        let t = DateTime::parse_from_rfc3339("2020-03-21T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let formatted = Value::Time(t).format();
        assert_eq!(formatted, "2020-03-21T12:00:00Z");
    }

    #[test]
    fn coerce_string_to_uri_and_back() {
        let v = Value::String("http://example.com".into());
        let coerced = v.coerce(ValueKind::Uri).unwrap();
        assert_eq!(coerced, Value::Uri(Url::parse("http://example.com").unwrap()));
    }

    #[test]
    fn invalid_integer_format_is_rejected() {
        assert!(Value::parse("0x10", ValueKind::Integer).is_err());
    }

    #[test]
    fn into_extension_value_passes_primitives_through() {
        assert_eq!(
            Value::Boolean(true).into_extension_value(),
            Value::Boolean(true)
        );
        assert_eq!(Value::Integer(7).into_extension_value(), Value::Integer(7));
        assert_eq!(
            Value::String("x".into()).into_extension_value(),
            Value::String("x".into())
        );
    }

    #[test]
    fn into_extension_value_downgrades_non_primitives_to_their_canonical_string() {
        let uri = Value::Uri(Url::parse("http://example.com/x").unwrap());
        assert_eq!(
            uri.clone().into_extension_value(),
            Value::String(uri.format())
        );

        let time = Value::Time(
            DateTime::parse_from_rfc3339("2020-03-21T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        assert_eq!(
            time.clone().into_extension_value(),
            Value::String(time.format())
        );
    }
}
