//! Map-backed events

use ahash::AHashMap;
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::event::CandidateEvent;

/// Borrowed view over a property map plus a separately supplied event name
#[derive(Debug)]
pub struct PropertyMap<'a, S> {
    properties: &'a HashMap<String, String, S>,
    event_name: &'a str,
}

impl<'a, S: BuildHasher> PropertyMap<'a, S> {
    pub fn new(properties: &'a HashMap<String, String, S>, event_name: &'a str) -> Self {
        Self {
            properties,
            event_name,
        }
    }
}

impl<S: BuildHasher> CandidateEvent for PropertyMap<'_, S> {
    #[inline]
    fn event_name(&self) -> &str {
        self.event_name
    }

    #[inline]
    fn property(&self, name: &str) -> Option<Cow<'_, str>> {
        self.properties.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// Owned event with string properties
#[derive(Debug, Clone, Default)]
pub struct EventRecord {
    pub name: String,
    pub properties: AHashMap<String, String>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: AHashMap::new(),
        }
    }

    /// Builder-style property insertion
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }
}

impl<K, V, S> From<(&str, &HashMap<K, V, S>)> for EventRecord
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from((name, properties): (&str, &HashMap<K, V, S>)) -> Self {
        Self {
            name: name.to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        }
    }
}

impl CandidateEvent for EventRecord {
    #[inline]
    fn event_name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn property(&self, name: &str) -> Option<Cow<'_, str>> {
        self.properties.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}
