//! Re-usable assertion and fixture helpers for tests written against this
//! crate, gated behind the `testing` feature so integration tests under
//! `tests/` can pull them in without duplicating boilerplate.
//!
//! Grounded on `original_source/pkg/binding/test/test.go`'s
//! `AssertEventContextEquals`/`AssertEventEquals`/`MustToEvent`/`NameOf`
//! helpers; `EachEvent`/`EachMessage` are not ported, since Go's
//! `t.Run(name, ...)` dynamic subtests have no equivalent in the standard
//! Rust test harness.

use crate::event::Event;
use crate::message::{materialize, Message};
use crate::spec::EventContext;

/// Asserts `want` and `have` carry the same spec version, the same value
/// for every attribute that version defines, and identical extensions.
/// Panics (via `assert_eq!`) with the offending attribute's name on the
/// first mismatch.
pub fn assert_event_context_eq(want: &EventContext, have: &EventContext) {
    assert_eq!(
        want.version(),
        have.version(),
        "spec version does not match"
    );
    for attribute in want.version().version().attributes() {
        assert_eq!(
            attribute.get(want),
            attribute.get(have),
            "attribute '{}' does not match",
            attribute.name()
        );
    }
    let mut want_extensions: Vec<_> = want.extensions().collect();
    let mut have_extensions: Vec<_> = have.extensions().collect();
    want_extensions.sort_by(|a, b| a.0.cmp(b.0));
    have_extensions.sort_by(|a, b| a.0.cmp(b.0));
    assert_eq!(want_extensions, have_extensions, "extensions do not match");
}

/// Asserts `want` and `have` have equal contexts (see
/// [`assert_event_context_eq`]) and equal encoded data payloads.
pub fn assert_event_eq(want: &Event, have: &Event) {
    assert_event_context_eq(want.context(), have.context());
    let want_bytes = want
        .data_bytes()
        .expect("want's data payload must encode to bytes");
    let have_bytes = have
        .data_bytes()
        .expect("have's data payload must encode to bytes");
    assert_eq!(want_bytes, have_bytes, "data payloads do not match");
}

/// Drives `message` to completion and returns the materialized [`Event`],
/// panicking on failure. Mirrors `MustToEvent`'s "this conversion cannot
/// fail in a well-formed test" assumption.
pub fn must_to_event(message: &dyn Message) -> Event {
    materialize(message).expect("message did not materialize into a valid event")
}

/// A short, human-readable label for `event`, for use in panic messages
/// and manual test output. Mirrors `NameOf`'s event branch; there is no
/// equivalent for an arbitrary `Message` since this crate does not rely on
/// runtime type reflection.
pub fn name_of(event: &Event) -> String {
    format!("Event({event})")
}
