use std::fmt;

/// How a [`super::Message`] currently holds its event: the dimension every
/// writer-selection decision in [`super::write`] pivots on.
///
/// Grounded on the Go `binding.Encoding` constants
/// (`EncodingBinary`/`EncodingStructured`/`EncodingEvent`/`EncodingUnknown`)
/// referenced throughout `original_source/pkg/binding/event_message.go`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Attributes and data are already split into transport metadata and
    /// a raw payload.
    Binary,
    /// Attributes and data are encoded together as one structured-mode
    /// payload (e.g. a JSON CloudEvent).
    Structured,
    /// The message is an in-memory [`crate::event::Event`] with no fixed
    /// encoding yet — either binary or structured writers can consume it.
    Event,
    /// The message cannot say; callers must probe via `read_structured`/
    /// `read_binary` and handle `NotStructured`/`NotBinary` fallbacks.
    Unknown,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Encoding::Binary => "binary",
            Encoding::Structured => "structured",
            Encoding::Event => "event",
            Encoding::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
