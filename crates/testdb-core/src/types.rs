//! Record model shared by the stores and the match engine.

use std::borrow::Cow;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Field holding a record's identifier.
pub const ID_FIELD: &str = "id";
/// Optional field listing which scalar fields take part in matching.
pub const SEARCHABLE_FIELD: &str = "searchable";
/// Field a hit carries its edit distance under.
pub const DISTANCE_FIELD: &str = "lev";

/// Stringified record identifier.
///
/// JSON strings are used verbatim and numbers use their decimal rendering, so
/// `101` and `"101"` name the same record once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier carried by a field value. `null`, booleans and composite
    /// values never identify a record.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// String form a scalar field is compared under. Booleans read as `"1"` and
/// `""`. Composite values and `null` are not scalar and yield `None`.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// An indexed record: an ordered mapping from field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a loosely-typed value into a record. Only JSON objects are
    /// records.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::invalid(format!(
                "expected a record object, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Build a record from any serializable model.
    pub fn from_serialize<T: Serialize>(model: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(model)?)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// Field names listed under `searchable`.
    ///
    /// `None` when the list is absent, not an array, or empty: every scalar
    /// field is then eligible. Non-string entries are ignored, so a list made
    /// only of them selects nothing.
    pub fn searchable(&self) -> Option<Vec<&str>> {
        match self.0.get(SEARCHABLE_FIELD) {
            Some(Value::Array(names)) if !names.is_empty() => {
                Some(names.iter().filter_map(Value::as_str).collect())
            }
            _ => None,
        }
    }

    /// Scalar fields in record order, paired with their comparison text.
    pub fn scalar_fields(&self) -> impl Iterator<Item = (&str, Cow<'_, str>)> {
        self.0
            .iter()
            .filter_map(|(name, value)| scalar_text(value).map(|text| (name.as_str(), text)))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A matched record and its minimum edit distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub record: Record,
    pub lev: usize,
}

impl Hit {
    pub fn id(&self) -> Option<RecordId> {
        self.record.id()
    }

    /// The record with its distance attached under `lev`, replacing any
    /// stored field of that name.
    pub fn to_record(&self) -> Record {
        let mut record = self.record.clone();
        record.insert(DISTANCE_FIELD, self.lev);
        record
    }
}

impl Serialize for Hit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (field, value) in self.record.fields() {
            if field != DISTANCE_FIELD {
                map.serialize_entry(field, value)?;
            }
        }
        map.serialize_entry(DISTANCE_FIELD, &self.lev)?;
        map.end()
    }
}

/// Ordered hit list, serialized as `{"hits": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Identifiers of the hits, in hit order. Hits without one are skipped.
    pub fn ids(&self) -> Vec<RecordId> {
        self.hits.iter().filter_map(Hit::id).collect()
    }
}

/// The Index Store state: records keyed by identifier, in insertion order.
///
/// Lookups are linear scans, so upserting n records costs O(n²) comparisons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    entries: Vec<(RecordId, Record)>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> {
        self.entries.iter().map(|(id, record)| (id, record))
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.entries.iter().find(|(key, _)| key == id).map(|(_, record)| record)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Insert or replace `record` under its own identifier. Returns the
    /// identifier used, or `None` when the record has none and was skipped.
    pub fn upsert(&mut self, record: Record) -> Option<RecordId> {
        let id = record.id()?;
        self.upsert_keyed(id.clone(), record);
        Some(id)
    }

    /// Insert or replace under an explicit key. A replaced entry keeps its
    /// position; new keys are appended.
    pub fn upsert_keyed(&mut self, id: RecordId, record: Record) {
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => entry.1 = record,
            None => self.entries.push((id, record)),
        }
    }

    /// Merge `incoming` into this table; incoming records win on collision.
    pub fn merge(&mut self, incoming: RecordTable) {
        for (id, record) in incoming.entries {
            self.upsert_keyed(id, record);
        }
    }

    /// Remove the first entry whose identifier equals `id`.
    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let position = self.entries.iter().position(|(key, _)| key == id)?;
        Some(self.entries.remove(position).1)
    }

    /// Decode the persisted form: a JSON object keyed by identifier whose
    /// values are record objects.
    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        match value {
            Value::Object(map) => Self::from_keyed(map, false),
            other => Err(Error::invalid(format!(
                "expected an object keyed by record id, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Decode caller-supplied input in any of the accepted shapes: an array
    /// of records, a single record (an object with an `id` field), or the
    /// persisted keyed form. Records without an identifier are skipped; a
    /// keyed record whose `id` disagrees with its key is `InvalidData`.
    pub fn from_document(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let mut table = Self::new();
                for item in items {
                    table.upsert(Record::from_value(item)?);
                }
                Ok(table)
            }
            Value::Object(map) if map.contains_key(ID_FIELD) => {
                let mut table = Self::new();
                table.upsert(Record::from(map));
                Ok(table)
            }
            Value::Object(map) => Self::from_keyed(map, true),
            other => Err(Error::invalid(format!(
                "expected records, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Entries are stored under their key. A record carrying a different `id`
    /// is rejected; one carrying none is kept or skipped per `require_id`.
    fn from_keyed(map: Map<String, Value>, require_id: bool) -> Result<Self> {
        let mut table = Self::new();
        for (key, value) in map {
            let record = match value {
                Value::Object(fields) => Record(fields),
                other => {
                    return Err(Error::invalid(format!(
                        "entry '{key}' is {}, expected a record object",
                        kind_of(&other)
                    )))
                }
            };
            match record.id() {
                Some(id) if id.as_str() != key => {
                    return Err(Error::invalid(format!(
                        "entry '{key}' carries id '{id}', expected the same id as its key"
                    )))
                }
                None if require_id => continue,
                _ => table.upsert_keyed(RecordId(key), record),
            }
        }
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for RecordTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

impl FromIterator<Record> for RecordTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.upsert(record);
        }
        table
    }
}

impl IntoIterator for RecordTable {
    type Item = (RecordId, Record);
    type IntoIter = std::vec::IntoIter<(RecordId, Record)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
