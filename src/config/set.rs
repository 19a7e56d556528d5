//! Compiled filter sets

use ahash::AHashSet;

use crate::config::{FilterConfig, FilterMode, FilterSetConfig};
use crate::error::{FilterError, Result};
use crate::event::CandidateEvent;
use crate::query::ExpressionTree;

/// A compiled, enabled filter
#[derive(Debug, Clone)]
pub struct NamedFilter {
    pub name: String,
    pub mode: FilterMode,
    pub tree: ExpressionTree,
}

/// Include and exclude filters applied together.
///
/// An event is accepted when there are no include filters or at least one of
/// them matches, and no exclude filter matches.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<NamedFilter>,
}

impl FilterSet {
    /// Compile every enabled filter, failing on the first invalid one
    pub fn from_config(config: &FilterSetConfig) -> Result<Self> {
        let mut seen = AHashSet::with_capacity(config.filters.len());
        let mut filters = Vec::with_capacity(config.filters.len());

        for entry in &config.filters {
            if !seen.insert(entry.name.as_str()) {
                return Err(FilterError::DuplicateFilter(entry.name.clone()));
            }
            if !entry.enabled {
                tracing::debug!(name = %entry.name, "skipping disabled filter");
                continue;
            }
            filters.push(compile(entry)?);
        }

        tracing::debug!(filters = filters.len(), "built filter set");
        Ok(Self { filters })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_config(&FilterSetConfig::from_json(json)?)
    }

    pub fn filters(&self) -> &[NamedFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply include and exclude filters to an event
    pub fn accepts<E: CandidateEvent + ?Sized>(&self, event: &E) -> bool {
        let mut has_include = false;
        let mut included = false;

        for filter in &self.filters {
            match filter.mode {
                FilterMode::Exclude => {
                    if filter.tree.matches(event) {
                        return false;
                    }
                }
                FilterMode::Include => {
                    has_include = true;
                    if !included {
                        included = filter.tree.matches(event);
                    }
                }
            }
        }

        !has_include || included
    }

    /// Names of the filters that match an event, in configuration order
    pub fn matching<'a, E>(&'a self, event: &'a E) -> impl Iterator<Item = &'a str> + 'a
    where
        E: CandidateEvent + ?Sized,
    {
        self.filters
            .iter()
            .filter(move |f| f.tree.matches(event))
            .map(|f| f.name.as_str())
    }
}

fn compile(entry: &FilterConfig) -> Result<NamedFilter> {
    let tree = ExpressionTree::new(&entry.expression).map_err(|e| FilterError::InvalidFilter {
        name: entry.name.clone(),
        source: Box::new(e),
    })?;

    Ok(NamedFilter {
        name: entry.name.clone(),
        mode: entry.mode,
        tree,
    })
}
