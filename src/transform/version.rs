use super::TransformerFactory;
use crate::message::{BinaryWriter, Result};
use crate::spec::{Attribute, Kind, SpecVersion};
use crate::types::Value;

/// Re-tags the event's spec version, remapping binary attribute
/// descriptors as they pass through. Not structurally expressible — a
/// structured payload's `specversion` field lives inside the opaque bytes
/// — so [`TransformerFactory::supports_structured`] stays `false` and the
/// orchestrator must fall back to the event path for it.
///
/// Grounded on `original_source/pkg/binding/transformer/version.go`'s
/// `versionTranscoderFactory`/`binaryVersionTransformer`.
pub fn version(target: SpecVersion) -> Box<dyn TransformerFactory> {
    Box::new(VersionFactory { target })
}

struct VersionFactory {
    target: SpecVersion,
}

impl TransformerFactory for VersionFactory {
    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        Box::new(VersionWriter {
            inner: writer,
            target: self.target,
        })
    }

    fn event_transformer(&self) -> Option<super::EventTransformer> {
        let target = self.target;
        Some(Box::new(move |event| {
            *event = std::mem::take(event).convert(target);
            Ok(())
        }))
    }
}

struct VersionWriter {
    inner: Box<dyn BinaryWriter>,
    target: SpecVersion,
}

impl BinaryWriter for VersionWriter {
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        if attribute.kind() == Kind::SpecVersion {
            let target_attribute = self.target.version().attribute_from_kind(Kind::SpecVersion);
            return self
                .inner
                .set_attribute(target_attribute, Value::String(self.target.as_str().to_owned()));
        }
        let target_attribute = self.target.version().attribute_from_kind(attribute.kind());
        self.inner.set_attribute(target_attribute, value)
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.inner.set_extension(name, value)
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.inner.set_data(data)
    }

    fn end(&mut self) -> Result<()> {
        self.inner.end()
    }
}
