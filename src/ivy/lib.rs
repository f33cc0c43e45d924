//! # Ivy
//!
//! Ivy is a small embedded document store. A database is a directory, each
//! table is a subdirectory, and each record is one JSON file named after its
//! id:
//!
//! ```text
//! data/
//! ├── planes/
//! │   ├── 1.json
//! │   └── 2.json
//! └── airports/
//!     └── 1.json
//! ```
//!
//! Records are plain serde types. The id is not stored in the document; a
//! record picks it up in [`Record::after_find`]. Tables listed with a `"tags"`
//! field in the [`IvyConfig`] also get an in-memory tag index answering
//! "which records carry all of these tags".
//!
//! ```no_run
//! use ivy::{Database, IvyConfig, Record};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Plane {
//!     name: String,
//!     tags: Vec<String>,
//!     #[serde(skip)]
//!     id: String,
//! }
//!
//! impl Record for Plane {
//!     fn after_find(&mut self, _db: &Database, id: &str) {
//!         self.id = id.to_string();
//!     }
//! }
//!
//! # fn main() -> ivy::Result<()> {
//! let db = Database::open("data", IvyConfig::new().with_index("planes", ["tags"]))?;
//! let plane = Plane { name: "P-51".into(), tags: vec!["ww2".into()], id: String::new() };
//! let id = db.create("planes", &plane)?;
//! let found: Plane = db.find("planes", &id)?;
//! assert_eq!(found.id, id);
//! let ww2 = db.find_all_ids_for_tags("planes", &["ww2"])?;
//! assert!(ww2.contains(&id));
//! db.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency
//!
//! Every table has one reader-writer lock covering its files and its tag
//! index. Reads share it; writes hold it exclusively until the tag index has
//! been rebuilt, so a query never sees the index lag behind the files. Tables
//! are locked independently.
//!
//! The record files are the only source of truth. The tag index is rebuilt
//! in full after every write and at open time, and is never persisted.
//!
//! ## Module Overview
//!
//! - [`db`]: The database handle, entry point for all operations
//! - [`store`]: Table directories and record file operations
//! - [`index`]: The tag index
//! - [`registry`]: Per-table locks
//! - [`value`]: Field values for equality scans
//! - [`config`]: Index configuration
//! - [`record`]: The post-load hook trait
//! - [`error`]: Error types

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod record;
pub mod registry;
pub mod store;
pub mod value;

pub use config::IvyConfig;
pub use db::Database;
pub use error::{IvyError, Result};
pub use record::Record;
pub use value::FieldValue;
