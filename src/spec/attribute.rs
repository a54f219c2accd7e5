use super::{
    AttributeError, CannotDeleteRequiredSnafu, EventContext, InvalidAttributeValueSnafu,
    UnknownSpecVersionSnafu,
};
use super::{Kind, SpecVersion, TransportStyle};
use crate::types::Value;
use snafu::ResultExt;

/// A single attribute slot in a [`super::Version`]'s table: a [`Kind`], its
/// canonical and transport-prefixed names, its declared [`crate::types::ValueKind`]
/// and whether it is required.
///
/// Grounded on the Go `spec.Attribute` interface (`Kind()`, `Name()`,
/// `PrefixedName()`, `Type()`, `Get(ctx)`, `Set(ctx, v)`, `Delete(ctx)`)
/// inferred from its call sites in `original_source/pkg/binding/event_message.go`
/// and `original_source/pkg/binding/transformer/*.go`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) kind: Kind,
    pub(crate) version: SpecVersion,
    pub(crate) name: &'static str,
}

impl Attribute {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// The canonical, unprefixed attribute name (e.g. `id`, `schemaurl`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The transport-prefixed name for `style` (e.g. `ce-id`/`ce_id`, or
    /// `Content-Type`/`content-type` for [`Kind::DataContentType`]).
    pub fn prefixed_name(&self, style: TransportStyle) -> String {
        if self.kind == Kind::DataContentType {
            return match style {
                TransportStyle::Http => "Content-Type".to_owned(),
                TransportStyle::Broker => "content-type".to_owned(),
            };
        }
        match style {
            TransportStyle::Http => format!("ce-{}", self.name),
            TransportStyle::Broker => format!("ce_{}", self.name),
        }
    }

    pub fn required(&self) -> bool {
        self.kind.required()
    }

    /// Reads this attribute from `ctx`. Returns `None` if unset (only
    /// possible for non-required kinds).
    pub fn get(&self, ctx: &EventContext) -> Option<Value> {
        match self.kind {
            Kind::Id => Some(Value::String(ctx.id.clone())),
            Kind::Source => Some(Value::Uri(ctx.source.clone())),
            Kind::Type => Some(Value::String(ctx.ty.clone())),
            Kind::SpecVersion => Some(Value::String(ctx.version.as_str().to_owned())),
            Kind::DataContentType => ctx.datacontenttype.clone().map(Value::String),
            Kind::DataSchema => ctx.dataschema.clone().map(Value::Uri),
            Kind::Subject => ctx.subject.clone().map(Value::String),
            Kind::Time => ctx.time.map(Value::Time),
        }
    }

    /// Coerces `value` to this attribute's declared type via the Type
    /// System and stores it, or fails with `InvalidAttributeValue`.
    pub fn set(&self, ctx: &mut EventContext, value: Value) -> super::Result<()> {
        let value = value
            .coerce(self.kind.value_kind())
            .context(InvalidAttributeValueSnafu { kind: self.kind })?;
        match (self.kind, value) {
            (Kind::Id, Value::String(s)) => ctx.id = s,
            (Kind::Source, Value::Uri(u)) => ctx.source = u,
            (Kind::Type, Value::String(s)) => ctx.ty = s,
            (Kind::SpecVersion, Value::String(s)) => {
                ctx.version = SpecVersion::try_from(s.as_str()).context(UnknownSpecVersionSnafu)?;
            }
            (Kind::DataContentType, Value::String(s)) => ctx.datacontenttype = Some(s),
            (Kind::DataSchema, Value::Uri(u)) => ctx.dataschema = Some(u),
            (Kind::Subject, Value::String(s)) => ctx.subject = Some(s),
            (Kind::Time, Value::Time(t)) => ctx.time = Some(t),
            _ => unreachable!("coerce() guarantees the declared ValueKind"),
        }
        Ok(())
    }

    /// Clears an optional attribute; fails for required kinds.
    pub fn delete(&self, ctx: &mut EventContext) -> super::Result<()> {
        if self.required() {
            return CannotDeleteRequiredSnafu {
                kind: self.kind,
                version: ctx.version,
            }
            .fail();
        }
        match self.kind {
            Kind::DataContentType => ctx.datacontenttype = None,
            Kind::DataSchema => ctx.dataschema = None,
            Kind::Subject => ctx.subject = None,
            Kind::Time => ctx.time = None,
            _ => unreachable!("required() already handled Id/Source/Type/SpecVersion"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Version;

    #[test]
    fn set_rejects_required_delete() {
        let v = Version::new(SpecVersion::V10);
        let mut ctx = EventContext::default();
        let err = v.attribute_from_kind(Kind::Id).delete(&mut ctx).unwrap_err();
        assert!(matches!(err, AttributeError::CannotDeleteRequired { .. }));
    }

    #[test]
    fn set_rejects_unknown_specversion() {
        let v = Version::new(SpecVersion::V10);
        let mut ctx = EventContext::default();
        let err = v
            .attribute_from_kind(Kind::SpecVersion)
            .set(&mut ctx, Value::String("2.0".into()))
            .unwrap_err();
        assert!(matches!(err, AttributeError::UnknownSpecVersion { .. }));
        assert_eq!(ctx.version, SpecVersion::V10);
    }

    #[test]
    fn set_coerces_string_to_uri() {
        let v = Version::new(SpecVersion::V10);
        let mut ctx = EventContext::default();
        v.attribute_from_kind(Kind::Source)
            .set(&mut ctx, Value::String("http://example.com/x".into()))
            .unwrap();
        assert_eq!(ctx.source.as_str(), "http://example.com/x");
    }
}
