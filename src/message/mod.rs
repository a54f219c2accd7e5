//! The Message Abstraction: a `Message` trait every transport-agnostic
//! event representation implements, the `StructuredWriter`/`BinaryWriter`
//! overlay protocol, and the `write` orchestrator that drives one into
//! the other through a transformer chain.
//!
//! Grounded on the Go `binding` package (`Message`, `StructuredWriter`,
//! `BinaryWriter`, `Write`) as seen in
//! `original_source/pkg/binding/event_message.go`.

mod cancellation;
mod encoding;
mod error;
mod write;
mod writer;

pub use cancellation::CancellationToken;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use write::{materialize, write, WriteOptions};
pub use writer::{BinaryWriter, Message, StructuredWriter};

/// Exposed only to [`crate::buffer`], which needs to drive a message
/// without triggering `write`'s own `finish` call.
pub(crate) use write::drive;
