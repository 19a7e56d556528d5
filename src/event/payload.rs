//! Typed payload events

use std::borrow::Cow;
use std::fmt;

use crate::event::CandidateEvent;

/// A decoded payload field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadValue<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl<'a> PayloadValue<'a> {
    /// Text form used for comparisons. Numbers are rendered without grouping
    /// separators so typed events agree with plain property maps.
    pub fn to_text(self) -> Cow<'a, str> {
        match self {
            PayloadValue::Str(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for PayloadValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Str(s) => f.write_str(s),
            PayloadValue::Int(v) => write!(f, "{}", v),
            PayloadValue::UInt(v) => write!(f, "{}", v),
            PayloadValue::Float(v) => write!(f, "{}", v),
            PayloadValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Event exposing its payload as parallel name/value lists, the way decoded
/// trace events usually do
pub trait PayloadEvent {
    fn event_name(&self) -> &str;

    /// Payload field names in declaration order
    fn payload_names(&self) -> &[String];

    /// Value of the field at `index` in `payload_names`
    fn payload_value(&self, index: usize) -> Option<PayloadValue<'_>>;
}

/// Adapts a [`PayloadEvent`] to [`CandidateEvent`]
#[derive(Debug)]
pub struct Payload<'a, P: ?Sized>(pub &'a P);

impl<P: PayloadEvent + ?Sized> CandidateEvent for Payload<'_, P> {
    #[inline]
    fn event_name(&self) -> &str {
        self.0.event_name()
    }

    fn property(&self, name: &str) -> Option<Cow<'_, str>> {
        let index = self.0.payload_names().iter().position(|n| n == name)?;
        self.0.payload_value(index).map(PayloadValue::to_text)
    }
}
