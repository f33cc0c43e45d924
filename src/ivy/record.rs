use crate::db::Database;
use serde::de::DeserializeOwned;

/// A document type that can be loaded with [`Database::find`].
///
/// Record ids live in the filename, not in the document, so `after_find` is
/// where a record learns its own id. It runs after decoding, once the table
/// lock has been released, so it may call back into `db` (for example to load
/// related records).
pub trait Record: DeserializeOwned {
    fn after_find(&mut self, db: &Database, id: &str) {
        let _ = (db, id);
    }
}

impl Record for serde_json::Value {}
