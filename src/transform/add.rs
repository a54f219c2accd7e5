use super::TransformerFactory;
use crate::message::{BinaryWriter, Result};
use crate::spec::{Attribute, Kind};
use crate::types::Value;

/// Sets `kind` to `value` if the event doesn't already carry it.
///
/// Grounded on the Go `setAttributeTranscoderFactory`/
/// `setAttributeTransformer` pair in
/// `original_source/pkg/binding/transformer/add_metadata.go`'s
/// `AddAttribute`.
pub fn add_attribute(kind: Kind, value: Value) -> Box<dyn TransformerFactory> {
    Box::new(AddAttributeFactory { kind, value })
}

struct AddAttributeFactory {
    kind: Kind,
    value: Value,
}

impl TransformerFactory for AddAttributeFactory {
    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        Box::new(AddAttributeWriter {
            inner: writer,
            kind: self.kind,
            value: self.value.clone(),
            found: false,
            last_attribute: None,
        })
    }

    fn event_transformer(&self) -> Option<super::EventTransformer> {
        let kind = self.kind;
        let value = self.value.clone();
        Some(Box::new(move |event| {
            let version = event.specversion().version();
            let attribute = version.attribute_from_kind(kind);
            let mut ctx = event.context().clone();
            if attribute.get(&ctx).is_none() {
                attribute.set(&mut ctx, value.clone())?;
                *event.context_mut() = ctx;
            }
            Ok(())
        }))
    }
}

struct AddAttributeWriter {
    inner: Box<dyn BinaryWriter>,
    kind: Kind,
    value: Value,
    found: bool,
    last_attribute: Option<Attribute>,
}

impl BinaryWriter for AddAttributeWriter {
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        if attribute.kind() == self.kind {
            self.found = true;
        }
        self.last_attribute = Some(attribute);
        self.inner.set_attribute(attribute, value)
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.inner.set_extension(name, value)
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.inner.set_data(data)
    }

    fn end(&mut self) -> Result<()> {
        if !self.found {
            let version = self
                .last_attribute
                .map(|a| a.version())
                .unwrap_or_default();
            let attribute = version.version().attribute_from_kind(self.kind);
            self.inner.set_attribute(attribute, self.value.clone())?;
        }
        self.inner.end()
    }
}

/// Sets extension `name` to `value` if the event doesn't already carry it.
///
/// Grounded on the Go `setExtensionTranscoderFactory`/
/// `setExtensionTransformer` pair, same source file.
pub fn add_extension(name: impl Into<String>, value: Value) -> Box<dyn TransformerFactory> {
    Box::new(AddExtensionFactory {
        name: name.into(),
        value,
    })
}

struct AddExtensionFactory {
    name: String,
    value: Value,
}

impl TransformerFactory for AddExtensionFactory {
    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        Box::new(AddExtensionWriter {
            inner: writer,
            name: self.name.clone(),
            value: self.value.clone(),
            found: false,
        })
    }

    fn event_transformer(&self) -> Option<super::EventTransformer> {
        let name = self.name.clone();
        let value = self.value.clone();
        Some(Box::new(move |event| {
            if event.extension(&name).is_none() {
                event.set_extension(name.clone(), value.clone());
            }
            Ok(())
        }))
    }
}

struct AddExtensionWriter {
    inner: Box<dyn BinaryWriter>,
    name: String,
    value: Value,
    found: bool,
}

impl BinaryWriter for AddExtensionWriter {
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn set_attribute(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        self.inner.set_attribute(attribute, value)
    }

    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        if name == self.name {
            self.found = true;
        }
        self.inner.set_extension(name, value)
    }

    fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.inner.set_data(data)
    }

    fn end(&mut self) -> Result<()> {
        if !self.found {
            self.inner.set_extension(&self.name, self.value.clone())?;
        }
        self.inner.end()
    }
}
