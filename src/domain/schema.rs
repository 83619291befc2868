use crate::error::ConfigError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Name of a table the schema probe expects to find.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    /// # Errors
    /// Returns `ConfigError::EmptyName` for an empty or whitespace-only name.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered set of expected table names, fixed for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceNames(Vec<ResourceName>);

impl ResourceNames {
    /// Builds the list, keeping input order and rejecting repeats.
    ///
    /// # Errors
    /// Returns `ConfigError::EmptyName` or `ConfigError::DuplicateName`.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            let name = ResourceName::new(name)?;
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateName(name.0));
            }
            out.push(name);
        }
        Ok(Self(out))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceName> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-table outcome of a probe, in the order the tables were checked.
///
/// Serializes as a JSON object keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    entries: Vec<(ResourceName, bool)>,
}

impl ProbeResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for `name`. A repeated name overwrites the earlier value in place.
    pub fn record(&mut self, name: ResourceName, present: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = present;
        } else {
            self.entries.push((name, present));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries.iter().find(|(n, _)| n.as_str() == name).map(|(_, present)| *present)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceName, bool)> {
        self.entries.iter().map(|(n, present)| (n, *present))
    }

    pub fn missing(&self) -> impl Iterator<Item = &ResourceName> {
        self.entries.iter().filter(|(_, present)| !present).map(|(n, _)| n)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ProbeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, present) in &self.entries {
            map.serialize_entry(name.as_str(), present)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregateStatus {
    AllPresent,
    Partial,
    Error,
}

impl AggregateStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllPresent => "all-present",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a completed probe. An empty result counts as all present.
#[must_use]
pub fn summarize(result: &ProbeResult) -> AggregateStatus {
    if result.iter().all(|(_, present)| present) { AggregateStatus::AllPresent } else { AggregateStatus::Partial }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_of(pairs: &[(&str, bool)]) -> ProbeResult {
        let mut result = ProbeResult::new();
        for (name, present) in pairs {
            result.record(ResourceName::new(*name).unwrap(), *present);
        }
        result
    }

    #[test]
    fn test_summarize_all_present() {
        let result = result_of(&[("facts", true), ("profiles", true)]);
        assert_eq!(summarize(&result), AggregateStatus::AllPresent);
    }

    #[test]
    fn test_summarize_partial_when_any_missing() {
        let result = result_of(&[("facts", true), ("comments", false), ("profiles", true)]);
        assert_eq!(summarize(&result), AggregateStatus::Partial);
    }

    #[test]
    fn test_summarize_empty_is_all_present() {
        assert_eq!(summarize(&ProbeResult::new()), AggregateStatus::AllPresent);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let result = result_of(&[("facts", false)]);
        assert_eq!(summarize(&result), summarize(&result));
        assert_eq!(result, result_of(&[("facts", false)]));
    }

    #[test]
    fn test_resource_names_reject_duplicates() {
        let err = ResourceNames::new(["facts", "profiles", "facts"]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateName("facts".to_string()));
    }

    #[test]
    fn test_resource_names_reject_blank() {
        assert_eq!(ResourceNames::new(["facts", "  "]).unwrap_err(), ConfigError::EmptyName);
    }

    #[test]
    fn test_resource_names_keep_order() {
        let names = ResourceNames::new(["comments", "facts", "profiles"]).unwrap();
        let order: Vec<&str> = names.iter().map(ResourceName::as_str).collect();
        assert_eq!(order, vec!["comments", "facts", "profiles"]);
    }

    #[test]
    fn test_record_overwrites_in_place() {
        let mut result = result_of(&[("facts", true), ("profiles", true)]);
        result.record(ResourceName::new("facts").unwrap(), false);

        assert_eq!(result.len(), 2);
        assert_eq!(result.get("facts"), Some(false));
        assert_eq!(result.iter().next().map(|(n, _)| n.as_str()), Some("facts"));
    }

    #[test]
    fn test_probe_result_serializes_in_check_order() {
        let result = result_of(&[("numerical_facts", false), ("facts", true)]);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"numerical_facts":false,"facts":true}"#);
    }

    #[test]
    fn test_aggregate_status_wire_names() {
        assert_eq!(serde_json::to_string(&AggregateStatus::AllPresent).unwrap(), r#""all-present""#);
        assert_eq!(AggregateStatus::Partial.to_string(), "partial");
    }
}
