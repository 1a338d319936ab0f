use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Marks a parameter as a reference to a variable, e.g. `var_count`.
pub const VARIABLE_PREFIX: &str = "var_";

/// Named string values shared by every command of one macro run.
///
/// Names are stored without [`VARIABLE_PREFIX`]; `var_x` and `x` address the
/// same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableList {
    values: BTreeMap<String, String>,
}

/// Strip the variable prefix (if any) and surrounding whitespace.
pub fn canonical_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix(VARIABLE_PREFIX).unwrap_or(name)
}

impl VariableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = canonical_name(name);
        if name.is_empty() {
            log::warn!(target: "variables", "ignoring assignment to an empty variable name");
            return;
        }
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(canonical_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(canonical_name(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(canonical_name(name))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
