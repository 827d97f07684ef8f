use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";
pub const INDUSTRY_CLASS_FIELD: &str = "clase_actividad";

/// One establishment from the registry: lower-cased field names mapped to
/// their textual values, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from one object of the API response.
    /// Keys are lower-cased, `null` becomes the empty string and any other
    /// non-string value keeps its JSON text.
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()
    }

    /// Inserts a field, lower-casing its name. Returns the previous value.
    pub fn insert(&mut self, field: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.fields
            .insert(field.as_ref().to_lowercase(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    pub fn industry_class(&self) -> Option<&str> {
        self.get(INDUSTRY_CLASS_FIELD)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// A collection of records together with the union of their columns, in
/// first-seen order. Every encoder writes every column for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        let columns: IndexSet<&str> = records.iter().flat_map(|r| r.field_names()).collect();
        let columns = columns.into_iter().map(str::to_string).collect();
        Dataset { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows aligned to [`Dataset::columns`]; missing fields read as "".
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records.iter().map(|record| {
            self.columns
                .iter()
                .map(|column| record.get(column).unwrap_or(""))
                .collect()
        })
    }
}
