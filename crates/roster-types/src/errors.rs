use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-field validation messages, in the order the validator produced them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "BTreeMap<String, Messages>", into = "BTreeMap<String, Vec<String>>")]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

/// Servers sometimes send a bare string instead of a list for a field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    Many(Vec<String>),
    One(String),
}

impl From<BTreeMap<String, Messages>> for FieldErrors {
    fn from(raw: BTreeMap<String, Messages>) -> Self {
        let fields = raw
            .into_iter()
            .map(|(field, messages)| match messages {
                Messages::Many(list) => (field, list),
                Messages::One(single) => (field, vec![single]),
            })
            .filter(|(_, list)| !list.is_empty())
            .collect();
        Self(fields)
    }
}

impl From<FieldErrors> for BTreeMap<String, Vec<String>> {
    fn from(errors: FieldErrors) -> Self {
        errors.0
    }
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Replaces every message of `field` with `message`.
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), vec![message.into()]);
    }

    pub fn remove(&mut self, field: &str) -> Option<Vec<String>> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, which is what forms render inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// First message of the alphabetically first field.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().find_map(|m| m.first()).map(String::as_str)
    }
}

/// Error body returned by the API for every non-2xx response.
///
/// `errors` is only present on validation failures.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}
