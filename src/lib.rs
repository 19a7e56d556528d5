//! Trace Filter Core - filter query expressions for structured trace events
//!
//! Filters like `GC/Start::Depth >= 2 && (Reason == AllocSmall || Reason == Induced)`
//! are parsed once into an immutable [`ExpressionTree`] and then matched
//! against every event of a trace. Events are anything implementing
//! [`CandidateEvent`]: typed payload events, plain property maps, or
//! [`EventRecord`]s. Optional Python bindings are available with the
//! `python` feature.

pub mod config;
pub mod error;
pub mod event;
pub mod query;

#[cfg(feature = "python")]
mod python;

pub use config::{FilterConfig, FilterMode, FilterSet, FilterSetConfig, NamedFilter};
pub use error::{FilterError, Result};
pub use event::{CandidateEvent, EventRecord, Payload, PayloadEvent, PayloadValue, PropertyMap};
pub use query::{
    is_valid_expression, Clause, ExpressionNode, ExpressionTree, Filtered, Literal, Number,
    Operator, TreeCache,
};
