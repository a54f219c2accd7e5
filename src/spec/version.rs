use super::{Attribute, EventContext, Kind, SpecVersion};

const KINDS: [Kind; 8] = [
    Kind::SpecVersion,
    Kind::Id,
    Kind::Source,
    Kind::Type,
    Kind::DataContentType,
    Kind::DataSchema,
    Kind::Subject,
    Kind::Time,
];

fn name_for(version: SpecVersion, kind: Kind) -> &'static str {
    match (version, kind) {
        (_, Kind::Id) => "id",
        (_, Kind::Source) => "source",
        (_, Kind::Type) => "type",
        (_, Kind::SpecVersion) => "specversion",
        (_, Kind::DataContentType) => "datacontenttype",
        (SpecVersion::V03, Kind::DataSchema) => "schemaurl",
        (SpecVersion::V10, Kind::DataSchema) => "dataschema",
        (_, Kind::Subject) => "subject",
        (_, Kind::Time) => "time",
    }
}

/// A handle onto one CloudEvents spec version's attribute table.
///
/// Cuts the Spec-Registry/Attribute back-reference cycle spec.md section 9
/// calls out: an [`Attribute`] holds only its owning [`SpecVersion`] tag,
/// never a [`Version`] value, so there is no cyclic ownership to build —
/// [`Version::new`] is a cheap, allocation-free lookup, not a singleton
/// that attributes must borrow from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    spec_version: SpecVersion,
}

impl Version {
    pub fn new(spec_version: SpecVersion) -> Self {
        Version { spec_version }
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
    }

    /// All attributes for this version, in the stable order
    /// [`crate::message`]'s binary replay uses: specversion first, then the
    /// remaining kinds in this declared order.
    pub fn attributes(&self) -> Vec<Attribute> {
        KINDS
            .iter()
            .map(|&kind| self.attribute_from_kind(kind))
            .collect()
    }

    pub fn attribute_from_kind(&self, kind: Kind) -> Attribute {
        Attribute {
            kind,
            version: self.spec_version,
            name: name_for(self.spec_version, kind),
        }
    }

    /// Looks up an attribute by its canonical or transport-prefixed name
    /// (case-insensitive), stripping the known `ce-`/`ce_` prefixes first.
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        let stripped = name
            .strip_prefix("ce-")
            .or_else(|| name.strip_prefix("ce_"))
            .unwrap_or(name);
        let lower = stripped.to_ascii_lowercase();
        if lower == "content-type" || lower == "content_type" {
            return Some(self.attribute_from_kind(Kind::DataContentType));
        }
        KINDS
            .iter()
            .map(|&kind| self.attribute_from_kind(kind))
            .find(|a| a.name().eq_ignore_ascii_case(&lower))
    }

    /// Re-tags `ctx` to this version, preserving cross-kind equivalences
    /// (`schemaurl` ↔ `dataschema`) and extensions verbatim.
    ///
    /// Because [`EventContext`] stores attributes by [`Kind`] rather than by
    /// per-version field name, every kind present in the source is already
    /// present in the target under its own name — conversion is simply
    /// re-tagging the version; the name remap (`schemaurl`/`dataschema`)
    /// falls out of [`Attribute::name`] at read/format time.
    pub fn convert(&self, mut ctx: EventContext) -> EventContext {
        ctx.version = self.spec_version;
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v03_dataschema_attribute_is_named_schemaurl() {
        let v = Version::new(SpecVersion::V03);
        assert_eq!(v.attribute_from_kind(Kind::DataSchema).name(), "schemaurl");
        let v10 = Version::new(SpecVersion::V10);
        assert_eq!(v10.attribute_from_kind(Kind::DataSchema).name(), "dataschema");
    }

    #[test]
    fn attribute_lookup_is_case_insensitive_and_prefix_tolerant() {
        let v = Version::new(SpecVersion::V10);
        assert_eq!(v.attribute("ce-ID").unwrap().kind(), Kind::Id);
        assert_eq!(v.attribute("CE_id").unwrap().kind(), Kind::Id);
        assert_eq!(
            v.attribute("Content-Type").unwrap().kind(),
            Kind::DataContentType
        );
    }

    #[test]
    fn each_version_has_exactly_one_attribute_per_kind() {
        for version in SpecVersion::ALL {
            let v = Version::new(version);
            let attrs = v.attributes();
            assert_eq!(attrs.len(), KINDS.len());
            for kind in KINDS {
                assert_eq!(attrs.iter().filter(|a| a.kind() == kind).count(), 1);
            }
        }
    }
}
