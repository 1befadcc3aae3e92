//! Invocation-time input handed to every action.
//!
//! An [`ActionContext`] is never mutated.  The `with_*` methods return a new
//! context that shares every untouched field with the original: records are
//! held behind `Arc`, so the primary record and the record list keep their
//! identity across derived copies, while the metadata map is copied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::InvalidContextError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A caller-owned domain record referenced by a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record type, e.g. `"Ticket"`.
    pub kind: String,
    /// Primary key.
    pub key: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ActionContext
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    record: Option<Arc<Record>>,
    records: Arc<Vec<Arc<Record>>>,
    meta: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    panel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
}

impl ActionContext {
    /// A context with no records and no metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context for a single primary record.
    pub fn from_record(record: impl Into<Arc<Record>>, meta: BTreeMap<String, Value>) -> Self {
        Self {
            record: Some(record.into()),
            meta,
            ..Self::default()
        }
    }

    /// A context for a batch of records (no primary record).
    pub fn from_records<R>(
        records: impl IntoIterator<Item = R>,
        meta: BTreeMap<String, Value>,
    ) -> Self
    where
        R: Into<Arc<Record>>,
    {
        Self {
            records: Arc::new(records.into_iter().map(Into::into).collect()),
            meta,
            ..Self::default()
        }
    }

    // ── Derived copies ─────────────────────────────────────────────

    /// A new context whose metadata has `key` set to `value`.
    /// `self` is left untouched.
    pub fn with_meta(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut meta = self.meta.clone();
        meta.insert(key.into(), value.into());
        Self {
            meta,
            ..self.clone()
        }
    }

    pub fn with_user_instruction(&self, instruction: impl Into<String>) -> Self {
        Self {
            user_instruction: Some(instruction.into()),
            ..self.clone()
        }
    }

    pub fn with_panel(&self, panel_id: impl Into<String>) -> Self {
        Self {
            panel_id: Some(panel_id.into()),
            ..self.clone()
        }
    }

    pub fn with_resource(&self, resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self.clone()
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn record(&self) -> Option<&Arc<Record>> {
        self.record.as_ref()
    }

    pub fn records(&self) -> &Arc<Vec<Arc<Record>>> {
        &self.records
    }

    pub fn meta_map(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// The metadata value for `key`, or `default` when absent or null.
    pub fn meta_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.meta.get(key) {
            Some(v) if !v.is_null() => v.clone(),
            _ => default.into(),
        }
    }

    pub fn user_instruction(&self) -> Option<&str> {
        self.user_instruction.as_deref()
    }

    pub fn panel_id(&self) -> Option<&str> {
        self.panel_id.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    // ── Validation helpers ─────────────────────────────────────────

    /// The primary record, or an [`InvalidContextError`] when there is none.
    pub fn require_record(&self) -> Result<&Arc<Record>, InvalidContextError> {
        self.record
            .as_ref()
            .ok_or_else(|| InvalidContextError::missing_record(self))
    }

    /// The metadata value for `key`, or an [`InvalidContextError`] when the
    /// key is absent.  A present-but-null value satisfies the requirement.
    pub fn require_meta(&self, key: &str) -> Result<&Value, InvalidContextError> {
        self.meta
            .get(key)
            .ok_or_else(|| InvalidContextError::missing_meta(self, key))
    }

    /// Whether the primary record is of the given kind.
    pub fn has_record_of(&self, kind: &str) -> bool {
        self.record.as_ref().is_some_and(|r| r.kind == kind)
    }
}
