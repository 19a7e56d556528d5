//! Filter definition structures

use serde::Deserialize;

/// How a matching filter affects an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Keep events the filter matches
    #[default]
    Include,
    /// Drop events the filter matches
    Exclude,
}

/// One named filter expression
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub mode: FilterMode,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FilterConfig {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            mode: FilterMode::Include,
            enabled: true,
        }
    }

    pub fn exclude(mut self) -> Self {
        self.mode = FilterMode::Exclude;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
