//! File-level record operations for one table.
//!
//! None of these lock anything: [`crate::db::Database`] calls them while
//! holding the table's read lock (queries) or write lock (mutations).

use super::table::{check_stem, parse_id, TableDir};
use crate::error::{IvyError, Result};
use crate::value::FieldValue;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn read_file(table: &TableDir, id: &str, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IvyError::NotFound {
            table: table.name().to_string(),
            id: id.to_string(),
        },
        _ => IvyError::Io(e),
    })
}

/// Read and decode one record file.
pub fn load<R: DeserializeOwned>(table: &TableDir, id: &str) -> Result<R> {
    check_stem(id)?;
    let path = table.record_path(id);
    let data = read_file(table, id, &path)?;
    serde_json::from_slice(&data).map_err(|source| IvyError::Decode { path, source })
}

/// Read one record file as a generic JSON document.
pub fn load_value(table: &TableDir, id: &str) -> Result<Value> {
    load(table, id)
}

pub fn list_ids(table: &TableDir) -> Result<Vec<String>> {
    table.list_ids()
}

/// `max + 1` over the ids present, or `1` for an empty table.
pub fn next_id(table: &TableDir) -> Result<u64> {
    let mut max: u64 = 0;
    let mut max_id = String::new();
    for id in table.list_ids()? {
        let n: u64 = id.parse().map_err(|_| IvyError::InvalidId(id.clone()))?;
        if n > max {
            max = n;
            max_id = id;
        }
    }
    max.checked_add(1).ok_or(IvyError::InvalidId(max_id))
}

pub fn create<T: Serialize + ?Sized>(table: &TableDir, doc: &T) -> Result<String> {
    let id = next_id(table)?.to_string();
    let content = serde_json::to_vec(doc).map_err(IvyError::Serialization)?;
    table.write_record(&id, &content)?;
    debug!("{}: created record {}", table.name(), id);
    Ok(id)
}

/// Overwrite a record. The id only has to be well formed; a missing record is
/// created.
pub fn update<T: Serialize + ?Sized>(table: &TableDir, doc: &T, id: &str) -> Result<()> {
    parse_id(id)?;
    let content = serde_json::to_vec(doc).map_err(IvyError::Serialization)?;
    table.write_record(id, &content)?;
    debug!("{}: updated record {}", table.name(), id);
    Ok(())
}

pub fn delete(table: &TableDir, id: &str) -> Result<()> {
    parse_id(id)?;
    fs::remove_file(table.record_path(id)).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IvyError::NotFound {
            table: table.name().to_string(),
            id: id.to_string(),
        },
        _ => IvyError::Io(e),
    })?;
    debug!("{}: deleted record {}", table.name(), id);
    Ok(())
}

/// Scan every record in id order, yielding ids whose `field` equals `value`.
/// Stops after the first match when `first_only` is set.
fn scan_field(
    table: &TableDir,
    field: &str,
    value: &FieldValue,
    first_only: bool,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    if *value == FieldValue::Unsupported {
        return Ok(ids);
    }

    for id in table.list_ids()? {
        let doc = load_value(table, &id)?;
        let hit = doc.get(field).is_some_and(|v| value.matches(v));
        trace!("{}: scan {} {}={}", table.name(), id, field, hit);
        if hit {
            ids.push(id);
            if first_only {
                break;
            }
        }
    }
    Ok(ids)
}

pub fn first_id_for_field(
    table: &TableDir,
    field: &str,
    value: &FieldValue,
) -> Result<Option<String>> {
    Ok(scan_field(table, field, value, true)?.into_iter().next())
}

pub fn all_ids_for_field(table: &TableDir, field: &str, value: &FieldValue) -> Result<Vec<String>> {
    scan_field(table, field, value, false)
}
