//! Generic identifier-indexed record collection.
//!
//! [`RecordStore`] keeps records in insertion order (authoritative for
//! iteration) alongside an identifier index (authoritative for lookup). Every
//! mutation keeps both views consistent.
//!
//! `store` is first-write-wins: inserting an identifier that is already
//! present is rejected and logged. `update` is an upsert that keeps the
//! ordinal position of an existing record.

use log::error;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::resources::resourcerecord::Record;

/// Insertion-ordered store of records keyed by [`Record::id`].
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    data: Vec<R>,
    index: FxHashMap<String, usize>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        RecordStore {
            data: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    pub fn get_all(&self) -> &[R] {
        &self.data
    }

    /// Look up a record by identifier.
    pub fn get_by_id(&self, id: &str) -> Option<&R> {
        self.index.get(id).map(|&pos| &self.data[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Insert a record unless its identifier is already present.
    ///
    /// Returns `false` (and logs an error) when the record was rejected; the
    /// existing record is retained.
    pub fn store(&mut self, record: R) -> bool {
        let id = record.id();
        if self.index.contains_key(id) {
            error!("ID={} is duplicated!", id);
            return false;
        }
        self.index.insert(id.to_string(), self.data.len());
        self.data.push(record);
        true
    }

    /// [`store`](Self::store) each record in order.
    pub fn store_all(&mut self, records: impl IntoIterator<Item = R>) {
        for record in records {
            self.store(record);
        }
    }

    /// Replace the record with the same identifier in place, or append it.
    pub fn update(&mut self, record: R) {
        match self.index.get(record.id()) {
            Some(&pos) => self.data[pos] = record,
            None => {
                self.index.insert(record.id().to_string(), self.data.len());
                self.data.push(record);
            }
        }
    }

    /// [`update`](Self::update) each record in order.
    pub fn update_all(&mut self, records: impl IntoIterator<Item = R>) {
        for record in records {
            self.update(record);
        }
    }

    /// Remove the record with `id` wherever it sits in the sequence.
    ///
    /// Returns the removed record; an absent identifier is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<R> {
        let pos = self.index.remove(id)?;
        let removed = self.data.remove(pos);
        for record in &self.data[pos..] {
            if let Some(slot) = self.index.get_mut(record.id()) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Remove every identifier in `ids`.
    pub fn remove_many<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.remove(id.as_ref());
        }
    }

    /// Remove the stored record sharing `record`'s identifier.
    pub fn remove_record(&mut self, record: &R) -> Option<R> {
        self.remove(record.id())
    }

    /// Remove the stored records sharing the identifiers of `records`.
    pub fn remove_records<'a>(&mut self, records: impl IntoIterator<Item = &'a R>)
    where
        R: 'a,
    {
        for record in records {
            self.remove(record.id());
        }
    }

    /// Clear both the sequence and the index.
    pub fn remove_all(&mut self) {
        self.data.clear();
        self.index.clear();
    }
}

impl<R: Record + Serialize> RecordStore<R> {
    /// Export the store as comma-separated rows.
    ///
    /// The header is the field list of the first record's serialized form;
    /// absent and `null` fields render as empty cells. Returns `None` for an
    /// empty store.
    pub fn to_csv(&self) -> Option<String> {
        let first = self.data.first()?;
        let header: Vec<String> = match serde_json::to_value(first) {
            Ok(Value::Object(map)) => map.keys().cloned().collect(),
            Ok(_) => return None,
            Err(e) => {
                error!("Failed to serialize record {}: {}", first.id(), e);
                return None;
            }
        };

        let mut lines = Vec::with_capacity(self.data.len() + 1);
        lines.push(header.join(","));
        for record in &self.data {
            let value = serde_json::to_value(record).unwrap_or(Value::Null);
            let row: Vec<String> = header
                .iter()
                .map(|name| csv_cell(value.get(name)))
                .collect();
            lines.push(row.join(","));
        }
        Some(lines.join("\n"))
    }
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
