//! This crate implements the core binding layer of the [CloudEvents](https://cloudevents.io/)
//! specification for Rust: the Spec Registry, the Type System, the [`Event`]
//! value, the [`message`] abstraction protocol bindings are built against, the
//! [`transform`] pipeline, and [`buffer`]ing.
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use cloudevents::event::builder::builder_v10;
//! use cloudevents::SpecVersion;
//!
//! let event = builder_v10()
//!     .id("my_event.my_application")
//!     .source("http://localhost:8080")
//!     .ty("example.demo")
//!     .build()?;
//!
//! assert_eq!(event.specversion(), SpecVersion::V10);
//! println!("CloudEvent Id: {}", event.id());
//! # Ok(())
//! # }
//! ```
//!
//! This crate includes:
//!
//! * The [`Event`] data structure, representing a CloudEvent (spec version 0.3
//!   and 1.0) around a single, version-tagged [`spec::EventContext`] rather
//!   than a per-version typed struct.
//! * [`event::builder`], [`event::format`] (JSON and YAML) and the [`spec`]
//!   and [`types`] modules backing attribute validation and storage.
//! * [`message`], the protocol-binding-facing `Message`/`StructuredWriter`/
//!   `BinaryWriter` contracts and the `write` orchestrator that drives one
//!   event representation into another through a transformer chain.
//! * [`transform`], a pipeline of composable factories (add/set/delete
//!   attribute or extension, spec version conversion) that overlay a write.
//! * [`buffer`], for capturing a [`message::Message`] into a reusable,
//!   repeatedly readable form with optional multi-consumer acknowledgement.
//!
//! This crate intentionally stops at the binding layer: concrete transport
//! I/O (HTTP, Kafka, ...), the higher-level client convenience API, and
//! telemetry are left to protocol-binding and application crates built on
//! top of it.

pub mod buffer;
pub mod event;
pub mod message;
pub mod spec;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transform;
pub mod types;

pub use event::{Data, Event, EventBuilder};
pub use spec::{Attribute, SpecVersion};
pub use types::{Value, ValueKind};
