use super::TransformerFactory;
use crate::message::{BinaryWriter, Result};
use crate::spec::{Attribute, Kind};
use crate::types::Value;

/// Drops `kind` from the event entirely.
///
/// Grounded on the Go `deleteAttributeTranscoderFactory`/
/// `deleteAttributeTransformer` pair in
/// `original_source/pkg/binding/transformer/delete_metadata.go`'s
/// `DeleteAttribute`.
pub fn delete_attribute(kind: Kind) -> Box<dyn TransformerFactory> {
    Box::new(DeleteAttributeFactory { kind })
}

struct DeleteAttributeFactory {
    kind: Kind,
}

impl TransformerFactory for DeleteAttributeFactory {
    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        Box::new(DeleteAttributeWriter {
            inner: writer,
            kind: self.kind,
        })
    }

    fn event_transformer(&self) -> Option<super::EventTransformer> {
        let kind = self.kind;
        Some(Box::new(move |event| {
            let version = event.specversion().version();
            let attribute = version.attribute_from_kind(kind);
            if attribute.get(event.context()).is_some() {
                attribute.delete(event.context_mut())?;
            }
            Ok(())
        }))
    }
}

struct DeleteAttributeWriter {
    inner: Box<dyn BinaryWriter>,
    kind: Kind,
}

impl BinaryWriter for DeleteAttributeWriter {
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        if attribute.kind() == self.kind {
            return Ok(());
        }
        self.inner.set_attribute(attribute, value)
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

/// Drops extension `name` from the event entirely.
///
/// Grounded on the Go `deleteExtensionTranscoderFactory`/
/// `deleteExtensionTransformer` pair, same source file.
pub fn delete_extension(name: impl Into<String>) -> Box<dyn TransformerFactory> {
    Box::new(DeleteExtensionFactory { name: name.into() })
}

struct DeleteExtensionFactory {
    name: String,
}

impl TransformerFactory for DeleteExtensionFactory {
    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        Box::new(DeleteExtensionWriter {
            inner: writer,
            name: self.name.clone(),
        })
    }

    fn event_transformer(&self) -> Option<super::EventTransformer> {
        let name = self.name.clone();
        Some(Box::new(move |event| {
            event.remove_extension(&name);
            Ok(())
        }))
    }
}

struct DeleteExtensionWriter {
    inner: Box<dyn BinaryWriter>,
    name: String,
}

impl BinaryWriter for DeleteExtensionWriter {
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        self.inner.set_attribute(attribute, value)
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        if name == self.name {
            return Ok(());
        }
        self.inner.set_extension(name, value)
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.inner.set_data(data)
    }

    fn end(&mut self) -> Result<()> {
        self.inner.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::spec::SpecVersion;

    #[test]
    fn delete_attribute_event_form_clears_optional() {
        let factory = delete_attribute(Kind::Subject);
        let transformer = factory.event_transformer().unwrap();

        let mut event = Event::new(SpecVersion::V10);
        event.set_subject(Some("doc".into()));
        transformer(&mut event).unwrap();
        assert!(event.subject().is_none());
    }

    #[test]
    fn delete_extension_event_form_clears_extension() {
        let factory = delete_extension("comexampletest");
        let transformer = factory.event_transformer().unwrap();

        let mut event = Event::new(SpecVersion::V10);
        event.set_extension("comexampletest", "a");
        transformer(&mut event).unwrap();
        assert!(event.extension("comexampletest").is_none());
    }
}
