//! Compiled filter expressions

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use crate::error::{FilterError, Result};
use crate::event::{CandidateEvent, Payload, PayloadEvent, PropertyMap};
use crate::query::ast::ExpressionNode;
use crate::query::{evaluator, parser};

/// A filter expression parsed once and matched against many events.
///
/// The tree is immutable after construction, so one instance can be shared
/// across threads and matched concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    expression: String,
    root: ExpressionNode,
}

impl ExpressionTree {
    /// Parse `expression`, rejecting anything `is_valid_expression` rejects
    pub fn new(expression: &str) -> Result<Self> {
        let root = parser::parse(expression)?;
        tracing::debug!(
            expression,
            clauses = root.clause_count(),
            depth = root.depth(),
            "built filter tree"
        );

        Ok(Self {
            expression: expression.to_string(),
            root,
        })
    }

    /// The expression text exactly as given
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn root(&self) -> &ExpressionNode {
        &self.root
    }

    pub fn clause_count(&self) -> usize {
        self.root.clause_count()
    }

    /// Match any candidate event
    #[inline]
    pub fn matches<E: CandidateEvent + ?Sized>(&self, event: &E) -> bool {
        evaluator::check(&self.root, event)
    }

    /// Match a typed payload event
    #[inline]
    pub fn matches_event<P: PayloadEvent + ?Sized>(&self, event: &P) -> bool {
        self.matches(&Payload(event))
    }

    /// Match a plain property map with a separately supplied event name
    #[inline]
    pub fn matches_map<S: BuildHasher>(
        &self,
        properties: &HashMap<String, String, S>,
        event_name: &str,
    ) -> bool {
        self.matches(&PropertyMap::new(properties, event_name))
    }

    /// Keep only the events this tree matches
    pub fn filter<I>(&self, events: I) -> Filtered<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: CandidateEvent,
    {
        Filtered {
            tree: self,
            events: events.into_iter(),
        }
    }
}

impl FromStr for ExpressionTree {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Canonical, fully parenthesized form
impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Iterator returned by [`ExpressionTree::filter`]
#[derive(Debug)]
pub struct Filtered<'t, I> {
    tree: &'t ExpressionTree,
    events: I,
}

impl<I> Iterator for Filtered<'_, I>
where
    I: Iterator,
    I::Item: CandidateEvent,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.events.find(|event| tree.matches(event))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.events.size_hint().1)
    }
}
