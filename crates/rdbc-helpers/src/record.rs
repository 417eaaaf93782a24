//! Records and grouped results
//!
//! A [`Record`] is one result row keyed by projected column name, in
//! projection order. [`GroupedResult`] maps the text of a key column to the
//! records sharing that value.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::types::{ColumnMetadata, Value};

/// One row's values keyed by column name, in projection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from one row, normalizing temporal values to text.
    ///
    /// When a projection repeats a column name the later column wins. A row
    /// whose width differs from `columns` is a schema error.
    pub fn from_row(columns: &[ColumnMetadata], values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::row_width(columns.len(), values.len()));
        }
        let fields = columns
            .iter()
            .zip(values)
            .map(|(column, value)| (column.name.clone(), value.normalize()))
            .collect();
        Ok(Self { fields })
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(column.into(), value.into())
    }

    /// Get a field by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in projection order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Values in projection order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// `(column, value)` pairs in projection order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON object with keys in projection order
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, &value.to_json())?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Field access by column name.
///
/// # Panics
///
/// Panics if the record has no such column; use [`Record::get`] when the
/// column may be absent.
impl std::ops::Index<&str> for Record {
    type Output = Value;

    fn index(&self, column: &str) -> &Value {
        &self.fields[column]
    }
}

/// How rows sharing a key are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// Keep only the last record seen for each key
    Single,
    /// Keep every record for each key, in row order
    #[default]
    Multi,
}

/// Records stored under one grouping key
#[derive(Debug, Clone, PartialEq)]
pub enum Group {
    /// Last record seen for the key
    Single(Record),
    /// All records for the key, in row order
    Multi(Vec<Record>),
}

impl Group {
    /// Records in this group
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Single(record) => std::slice::from_ref(record),
            Self::Multi(records) => records,
        }
    }

    /// Number of records in this group
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Check if the group holds no records
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Take the records out of the group
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Single(record) => vec![record],
            Self::Multi(records) => records,
        }
    }
}

/// Key column text (`None` for NULL) to grouped records, in first-seen
/// key order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedResult {
    mode: GroupMode,
    groups: IndexMap<Option<String>, Group>,
}

impl GroupedResult {
    /// Create an empty grouped result
    pub fn new(mode: GroupMode) -> Self {
        Self {
            mode,
            groups: IndexMap::new(),
        }
    }

    /// Add a record under `key`.
    ///
    /// Multi mode appends to the key's records; Single mode replaces the
    /// previous record. A key keeps the position where it was first seen.
    pub fn push(&mut self, key: Option<String>, record: Record) {
        match self.mode {
            GroupMode::Multi => {
                let group = self
                    .groups
                    .entry(key)
                    .or_insert_with(|| Group::Multi(Vec::new()));
                if let Group::Multi(records) = group {
                    records.push(record);
                }
            }
            GroupMode::Single => {
                // IndexMap::insert keeps an existing key in place
                self.groups.insert(key, Group::Single(record));
            }
        }
    }

    /// Grouping mode
    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// Group for a key value
    pub fn get(&self, key: &str) -> Option<&Group> {
        self.groups.get(&Some(key.to_owned()))
    }

    /// Group for rows whose key column was NULL
    pub fn get_null(&self) -> Option<&Group> {
        self.groups.get(&None)
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = Option<&str>> {
        self.groups.keys().map(Option::as_deref)
    }

    /// `(key, group)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Group)> {
        self.groups.iter().map(|(k, g)| (k.as_deref(), g))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Take the underlying map
    pub fn into_inner(self) -> IndexMap<Option<String>, Group> {
        self.groups
    }
}
