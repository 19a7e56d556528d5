//! Candidate event abstractions
//!
//! A filter only needs two things from an event: its name and a way to look
//! up a property value by name. Typed payload events and plain property maps
//! are both adapted to [`CandidateEvent`] so matching logic exists once.

mod payload;
mod record;


pub use payload::*;
pub use record::*;

use std::borrow::Cow;

/// Anything a filter expression can be matched against
pub trait CandidateEvent {
    /// Full event name, e.g. "GC/Start"
    fn event_name(&self) -> &str;

    /// Property value rendered as text, or `None` when the event has no such property
    fn property(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: CandidateEvent + ?Sized> CandidateEvent for &T {
    #[inline]
    fn event_name(&self) -> &str {
        (**self).event_name()
    }

    #[inline]
    fn property(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).property(name)
    }
}
