//! Flat definition records backing generated ID tables.

use crate::error::{ParseErrorKind, Result, UpdaterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a definition table (an item, a sprite, a quest...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: i64, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Decode a table file (a JSON array of records), sorted by id.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut records: Vec<Record> = serde_json::from_str(text).map_err(|e| {
        UpdaterError::parse("record table", ParseErrorKind::InvalidJson(e.to_string()))
    })?;
    records.sort_by_key(|r| r.id);
    Ok(records)
}
