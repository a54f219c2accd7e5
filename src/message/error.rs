use crate::event::builder;
use crate::event::format::FormatError;
use crate::spec::AttributeError;
use crate::types::TypeError;
use snafu::Snafu;

/// Errors surfaced by the Message Abstraction / Write orchestrator.
///
/// Grounded on the sentinel errors the Go binding package exports
/// (`binding.ErrNotStructured`, `binding.ErrNotBinary`) plus the plain
/// `error` returns from `Message.ReadBinary`/`ReadStructured`/`Finish` and
/// `BinaryWriter.SetAttribute`/`SetExtension` seen throughout
/// `original_source/pkg/binding/event_message.go` and
/// `original_source/pkg/binding/transformer/*.go`.
#[derive(Debug, Snafu)]
pub enum Error {
    /// Returned by `read_binary` when the message holds structured-mode
    /// data it cannot decompose into attributes/payload.
    #[snafu(display("message is not representable in binary mode"))]
    NotBinary,

    /// Returned by `read_structured` when the message holds binary-mode
    /// data it cannot re-encode as one structured payload without first
    /// materializing an [`crate::event::Event`].
    #[snafu(display("message is not representable in structured mode"))]
    NotStructured,

    #[snafu(display("invalid argument: {message}"))]
    InvalidArgument { message: String },

    /// No writer selection satisfies a forced encoding preference (spec.md
    /// section 4.4 step 4's "fail with `TransformationNotSupported`").
    #[snafu(display("no writer path satisfies the requested encoding: {reason}"))]
    TransformationNotSupported { reason: String },

    #[snafu(display("operation cancelled"))]
    Cancelled,

    #[snafu(display("attribute error: {source}"))]
    #[snafu(context(false))]
    Attribute { source: AttributeError },

    #[snafu(display("type error: {source}"))]
    #[snafu(context(false))]
    Type { source: TypeError },

    #[snafu(display("format error: {source}"))]
    #[snafu(context(false))]
    Format { source: FormatError },

    #[snafu(display("event builder error: {source}"))]
    #[snafu(context(false))]
    EventBuilder { source: builder::Error },

    #[snafu(display("{message}"))]
    Other { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }
}
