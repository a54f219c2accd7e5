//! The Transformer Pipeline: factories that each contribute an optional
//! structured overlay, an optional binary overlay, and an optional
//! event-level closure, composed by [`crate::message::write`].
//!
//! Grounded on the Go `binding.TransformerFactory` interface
//! (`StructuredTransformer`, `BinaryTransformer`, `EventTransformer`) used
//! throughout `original_source/pkg/binding/transformer/*.go`.

mod add;
mod delete;
mod set;
mod version;

pub use add::{add_attribute, add_extension};
pub use delete::{delete_attribute, delete_extension};
pub use set::{set_attribute, set_extension};
pub use version::version;

use crate::event::Event;
use crate::message::{BinaryWriter, Result, StructuredWriter};

/// A closure rewriting an already-materialized [`Event`] in place, the
/// fallback path any factory can offer regardless of whether it supports
/// structured or binary overlays.
pub type EventTransformer = Box<dyn Fn(&mut Event) -> Result<()> + Send + Sync>;

/// One contribution to the transformer pipeline.
///
/// Capability is queried separately from wrapping
/// (`supports_structured`/`supports_binary` vs. `wrap_structured`/
/// `wrap_binary`) rather than by probing a dummy writer, since whether a
/// factory can act structurally never depends on the writer instance —
/// only on what the factory needs to inspect.
pub trait TransformerFactory: Send + Sync {
    /// Whether [`Self::wrap_structured`] does anything beyond pass bytes
    /// through untouched. None of the concrete factories in this module
    /// do: all of them need to inspect individual attributes/extensions,
    /// which a structured payload's opaque bytes do not expose (spec.md
    /// section 4.5).
    fn supports_structured(&self) -> bool {
        false
    }

    /// Whether [`Self::wrap_binary`] does anything beyond pass calls
    /// through untouched. True by default because every concrete factory
    /// here can intercept the binary call sequence.
    fn supports_binary(&self) -> bool {
        true
    }

    fn wrap_structured(&self, writer: Box<dyn StructuredWriter>) -> Box<dyn StructuredWriter> {
        writer
    }

    fn wrap_binary(&self, writer: Box<dyn BinaryWriter>) -> Box<dyn BinaryWriter> {
        writer
    }

    /// The always-available fallback: rewrite the materialized event.
    fn event_transformer(&self) -> Option<EventTransformer> {
        None
    }
}

pub type TransformerFactories = Vec<Box<dyn TransformerFactory>>;

/// A chain is structured-capable only if every factory supports it
/// (spec.md section 4.4 step 3).
pub fn is_structured_capable(factories: &[Box<dyn TransformerFactory>]) -> bool {
    factories.iter().all(|f| f.supports_structured())
}

/// A chain is binary-capable only if every factory supports it.
pub fn is_binary_capable(factories: &[Box<dyn TransformerFactory>]) -> bool {
    factories.iter().all(|f| f.supports_binary())
}

/// Wraps `writer` in the chain, innermost factory first: `factories[0]`
/// wraps the raw destination, and each subsequent factory wraps the
/// result of the previous one, so `factories.last()` ends up outermost
/// (spec.md section 4.4 step 5).
pub fn wrap_structured_chain(
    factories: &[Box<dyn TransformerFactory>],
    mut writer: Box<dyn StructuredWriter>,
) -> Box<dyn StructuredWriter> {
    for factory in factories {
        writer = factory.wrap_structured(writer);
    }
    writer
}

pub fn wrap_binary_chain(
    factories: &[Box<dyn TransformerFactory>],
    mut writer: Box<dyn BinaryWriter>,
) -> Box<dyn BinaryWriter> {
    for factory in factories {
        writer = factory.wrap_binary(writer);
    }
    writer
}

/// Runs every factory's event transformer, in order, against `event`.
pub fn run_event_transformers(
    factories: &[Box<dyn TransformerFactory>],
    event: &mut Event,
) -> Result<()> {
    for factory in factories {
        if let Some(transformer) = factory.event_transformer() {
            transformer(event)?;
        }
    }
    Ok(())
}
