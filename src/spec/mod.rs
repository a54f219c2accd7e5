//! The Spec Registry: a closed table of CloudEvents specification
//! versions with per-version attribute metadata and conversion rules.
//!
//! Grounded on the usage of the (unexported) `pkg/binding/spec` package in
//! `original_source/pkg/binding/event_message.go` and
//! `original_source/pkg/binding/transformer/*.go`: `spec.VS.Version(...)`,
//! `v.Attributes()`, `v.AttributeFromKind(kind)`, `a.Get(ctx)`,
//! `a.Set(ctx, value)`, `a.PrefixedName()`, `v.Convert(ctx)`.

use crate::types::{Value, ValueKind};
use snafu::Snafu;
use std::convert::TryFrom;
use std::fmt;

mod attribute;
mod context;
mod version;

pub use attribute::Attribute;
pub use context::EventContext;
pub use version::Version;

/// The CloudEvents specification versions this registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    V03,
    V10,
}

/// Error returned when a string does not name a known [`SpecVersion`].
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(display("unknown CloudEvents spec version '{value}'"))]
pub struct UnknownSpecVersion {
    pub value: String,
}

impl SpecVersion {
    pub const ALL: [SpecVersion; 2] = [SpecVersion::V03, SpecVersion::V10];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V03 => "0.3",
            SpecVersion::V10 => "1.0",
        }
    }

    /// Returns the [`Version`] handle vending this version's attribute
    /// table.
    pub fn version(&self) -> Version {
        Version::new(*self)
    }
}

impl TryFrom<&str> for SpecVersion {
    type Error = UnknownSpecVersion;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "0.3" => Ok(SpecVersion::V03),
            "1.0" => Ok(SpecVersion::V10),
            other => Err(UnknownSpecVersion {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SpecVersion {
    fn default() -> Self {
        SpecVersion::V10
    }
}

/// The closed set of CloudEvents context attribute roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Id,
    Source,
    Type,
    SpecVersion,
    DataContentType,
    DataSchema,
    Subject,
    Time,
}

impl Kind {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Kind::Id => ValueKind::String,
            Kind::Source => ValueKind::Uri,
            Kind::Type => ValueKind::String,
            Kind::SpecVersion => ValueKind::String,
            Kind::DataContentType => ValueKind::String,
            Kind::DataSchema => ValueKind::Uri,
            Kind::Subject => ValueKind::String,
            Kind::Time => ValueKind::Time,
        }
    }

    /// Whether an event is ill-formed without this attribute set.
    pub fn required(&self) -> bool {
        matches!(
            self,
            Kind::Id | Kind::Source | Kind::Type | Kind::SpecVersion
        )
    }
}

/// Errors surfaced by [`Attribute::set`] / [`Attribute::delete`].
#[derive(Debug, Snafu)]
pub enum AttributeError {
    #[snafu(display("invalid value for attribute {kind:?}: {source}"))]
    InvalidAttributeValue {
        kind: Kind,
        source: crate::types::TypeError,
    },
    #[snafu(display("attribute {kind:?} is required by spec version {version} and cannot be deleted"))]
    CannotDeleteRequired { kind: Kind, version: SpecVersion },
    #[snafu(display("invalid specversion value: {source}"))]
    UnknownSpecVersion { source: UnknownSpecVersion },
}

pub type Result<T> = std::result::Result<T, AttributeError>;

/// Which header-naming convention a transport uses for attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStyle {
    /// `ce-id`, `Content-Type` (HTTP).
    Http,
    /// `ce_id`, `content-type` (Kafka and similar brokers).
    Broker,
}
