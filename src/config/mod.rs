//! Configuration module for named filter sets
//!
//! This module handles deserialization of filter definitions from JSON and
//! compiling them into a [`FilterSet`].

mod filter;
mod set;

pub use filter::*;
pub use set::*;

use serde::Deserialize;

use crate::error::Result;

/// Top-level filter configuration
/// Expected format: {"filters": [FilterConfig, ...]}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSetConfig {
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl FilterSetConfig {
    /// Deserialize a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Deserialize a configuration from any JSON reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
