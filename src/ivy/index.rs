//! # Tag Index
//!
//! An in-memory map from tag to the ids of the records carrying it, built from
//! the `tags` string array of every record in a table.
//!
//! The index is derived data. It is never written to disk and is rebuilt from
//! the record files in full: at open time, after every create/update/delete on
//! the table, and on an explicit reindex. There is no incremental path, which
//! keeps the index trivially consistent with the files at the cost of an
//! O(table size) scan per write.
//!
//! ## Queries
//!
//! [`TagIndex::ids_for_tags`] has AND semantics: a record matches only if it
//! carries every requested tag. An empty request matches nothing.

use crate::error::{IvyError, Result};
use crate::store::records;
use crate::store::table::{cmp_ids, TableDir};
use log::{debug, trace};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const TAGS_FIELD: &str = "tags";

#[derive(Debug, Default, Clone)]
pub struct TagIndex {
    tags: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every record file in the table and build a fresh index.
    pub fn build(table: &TableDir) -> Result<Self> {
        let mut index = Self::new();
        let ids = records::list_ids(table)?;
        for id in &ids {
            let doc = records::load_value(table, id)?;
            let tags = record_tags(&doc).ok_or_else(|| IvyError::MissingTags {
                path: table.record_path(id),
            })?;
            trace!("{}: record {} tags {:?}", table.name(), id, tags);
            for tag in tags {
                index.insert(tag, id);
            }
        }
        debug!(
            "{}: tag index rebuilt over {} records, {} tags",
            table.name(),
            ids.len(),
            index.tags.len()
        );
        Ok(index)
    }

    /// Replace this index with a fresh scan of the table. On error the
    /// previous contents are kept.
    pub fn rebuild(&mut self, table: &TableDir) -> Result<()> {
        *self = Self::build(table)?;
        Ok(())
    }

    fn insert(&mut self, tag: &str, id: &str) {
        self.tags
            .entry(tag.to_string())
            .or_default()
            .insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Ids carrying every one of `tags`, ascending. Repeated request tags
    /// count once.
    pub fn ids_for_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let wanted: HashSet<&str> = tags.iter().map(|t| t.as_ref()).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for tag in &wanted {
            if let Some(ids) = self.tags.get(*tag) {
                for id in ids {
                    *hits.entry(id.as_str()).or_default() += 1;
                }
            }
        }

        let mut ids: Vec<String> = hits
            .into_iter()
            .filter(|(_, count)| *count == wanted.len())
            .map(|(id, _)| id.to_string())
            .collect();
        ids.sort_by(|a, b| cmp_ids(a, b));
        ids
    }
}

/// The record's `tags` as strings, or `None` if the field is absent or not
/// an array of strings.
fn record_tags(doc: &Value) -> Option<Vec<&str>> {
    doc.get(TAGS_FIELD)?
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect()
}
