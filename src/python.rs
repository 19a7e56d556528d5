//! Python bindings via PyO3

use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::FilterSet;
use crate::event::PropertyMap;
use crate::query::{self, ExpressionTree};

/// Events as Python passes them: (event_name, {property: value})
type EventBatch = Vec<(String, HashMap<String, String>)>;

fn match_batch(tree: &ExpressionTree, events: &EventBatch) -> Vec<bool> {
    events
        .iter()
        .map(|(name, properties)| tree.matches_map(properties, name))
        .collect()
}

// ============================================================================
// Python Classes
// ============================================================================

/// A compiled filter expression
///
/// # Raises
/// ValueError if the expression is malformed
#[pyclass(name = "FilterTree", frozen)]
pub struct PyFilterTree {
    inner: Arc<ExpressionTree>,
}

#[pymethods]
impl PyFilterTree {
    #[new]
    fn new(expression: &str) -> PyResult<Self> {
        Ok(Self {
            inner: Arc::new(ExpressionTree::new(expression)?),
        })
    }

    /// The expression text as given
    #[getter]
    fn expression(&self) -> &str {
        self.inner.expression()
    }

    /// Match one event given as a property dict plus its name
    fn matches(&self, properties: HashMap<String, String>, event_name: &str) -> bool {
        self.inner.matches_map(&properties, event_name)
    }

    /// Match a list of (event_name, properties) pairs
    fn matches_batch(&self, events: EventBatch) -> Vec<bool> {
        match_batch(&self.inner, &events)
    }

    /// Match a batch on a blocking worker thread
    ///
    /// # Example (Python)
    /// ```python
    /// results = await tree.matches_batch_async([("GC/Start", {"Depth": "2"})])
    /// ```
    fn matches_batch_async<'py>(
        &self,
        py: Python<'py>,
        events: EventBatch,
    ) -> PyResult<Bound<'py, PyAny>> {
        let tree = self.inner.clone();

        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            tokio::task::spawn_blocking(move || match_batch(&tree, &events))
                .await
                .map_err(|e| {
                    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                        "Filter task panicked: {}",
                        e
                    ))
                })
        })
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("FilterTree({:?})", self.inner.expression())
    }
}

/// Named include/exclude filters loaded from JSON
#[pyclass(name = "FilterSet", frozen)]
pub struct PyFilterSet {
    inner: Arc<FilterSet>,
}

#[pymethods]
impl PyFilterSet {
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        Ok(Self {
            inner: Arc::new(FilterSet::from_json(json)?),
        })
    }

    fn accepts(&self, properties: HashMap<String, String>, event_name: &str) -> bool {
        self.inner
            .accepts(&PropertyMap::new(&properties, event_name))
    }

    /// Names of the filters matching the event
    fn matching(&self, properties: HashMap<String, String>, event_name: &str) -> Vec<String> {
        let event = PropertyMap::new(&properties, event_name);
        self.inner
            .matching(&event)
            .map(str::to_string)
            .collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Check whether a filter expression is well formed
#[pyfunction]
fn is_valid_expression(expression: &str) -> bool {
    query::is_valid_expression(expression)
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn trace_filter_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(is_valid_expression, m)?)?;
    m.add_class::<PyFilterTree>()?;
    m.add_class::<PyFilterSet>()?;
    Ok(())
}
