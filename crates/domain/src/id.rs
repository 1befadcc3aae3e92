use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an action type.
///
/// Call logs, canned responses, job fingerprints and error reports are all
/// keyed by it.  By default it is the Rust type name of the action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity derived from a type name.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Summarize;

    #[test]
    fn of_uses_type_name() {
        let id = ActionId::of::<Summarize>();
        assert!(id.as_str().ends_with("Summarize"));
        assert_eq!(id, ActionId::of::<Summarize>());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ActionId::new("a::B")).unwrap();
        assert_eq!(json, "\"a::B\"");
    }
}
