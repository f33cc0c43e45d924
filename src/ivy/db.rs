//! # Database Handle
//!
//! [`Database`] is the public surface of ivy. It owns the table registry and
//! runs every operation under the right table lock:
//!
//! - queries (`find`, `find_all_ids`, field scans, tag lookups) take the read
//!   lock, so any number of them run at once on a table;
//! - mutations (`create`, `update`, `delete`) take the write lock and hold it
//!   through the tag index rebuild, so a reader never sees files and index
//!   out of step.
//!
//! The set of tables is whatever directories exist under the root at open
//! time. Naming any other table fails with [`IvyError::UnknownTable`].
//!
//! ## Partial failure
//!
//! A mutation writes its file first and rebuilds the index second. If the
//! rebuild fails (some other record has malformed tags, say) the write is
//! already on disk and the rebuild error is returned. The previous index is
//! kept until a later rebuild succeeds.

use crate::config::{IndexField, IvyConfig};
use crate::error::{IvyError, Result};
use crate::index::TagIndex;
use crate::record::Record;
use crate::registry::{TableRegistry, TableState};
use crate::store::{records, TableDir};
use crate::value::FieldValue;
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    root: PathBuf,
    config: IvyConfig,
    registry: TableRegistry,
}

impl Database {
    /// Open the database rooted at `root`. Every subdirectory becomes a
    /// table; tables configured with a `"tags"` field get their tag index
    /// built before this returns.
    pub fn open<P: AsRef<Path>>(root: P, config: IvyConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let mut states = Vec::new();
        for entry in fs::read_dir(&root).map_err(IvyError::Io)? {
            let entry = entry.map_err(IvyError::Io)?;
            if !entry.file_type().map_err(IvyError::Io)?.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => states.push(TableState {
                    dir: TableDir::new(&root, name),
                    tags: None,
                }),
                None => warn!("skipping non UTF-8 table directory {:?}", entry.path()),
            }
        }

        let mut configured: Vec<&String> = config.fields_to_index.keys().collect();
        configured.sort();
        for table in configured {
            let state = states
                .iter_mut()
                .find(|s| s.dir.name() == table.as_str())
                .ok_or_else(|| IvyError::UnknownTable(table.clone()))?;
            for field in config.index_fields(table) {
                match field {
                    IndexField::Tags => {
                        if state.tags.is_none() {
                            state.tags = Some(TagIndex::build(&state.dir)?);
                        }
                    }
                    IndexField::Unsupported(name) => {
                        warn!("{}: indexing field {:?} is not supported, ignoring", table, name);
                    }
                }
            }
        }

        let registry = TableRegistry::new(states);
        debug!("opened {} with tables {:?}", root.display(), registry.names());

        Ok(Self {
            root,
            config,
            registry,
        })
    }

    /// Open with the configuration stored in `<root>/ivy.json`, if any.
    pub fn open_with_file_config<P: AsRef<Path>>(root: P) -> Result<Self> {
        let config = IvyConfig::load(root.as_ref())?;
        Self::open(root, config)
    }

    /// Wait for every in-flight operation to finish, then drop the handle.
    /// Writes are synchronous, so there is nothing to flush.
    pub fn close(self) {
        self.registry.barrier();
        debug!("closed {}", self.root.display());
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &IvyConfig {
        &self.config
    }

    /// Table names known since open, sorted.
    pub fn tables(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.registry.contains(table)
    }

    pub fn is_tag_indexed(&self, table: &str) -> Result<bool> {
        Ok(self.registry.read(table)?.tags.is_some())
    }

    /// Load record `id` from `table` and hand it its id through
    /// [`Record::after_find`].
    pub fn find<R: Record>(&self, table: &str, id: &str) -> Result<R> {
        let mut rec: R = {
            let state = self.registry.read(table)?;
            records::load(&state.dir, id)?
        };
        rec.after_find(self, id);
        Ok(rec)
    }

    pub fn find_all_ids(&self, table: &str) -> Result<Vec<String>> {
        let state = self.registry.read(table)?;
        records::list_ids(&state.dir)
    }

    /// The lowest id whose `field` equals `value`, scanning every record.
    pub fn find_first_id_for_field<V: Into<FieldValue>>(
        &self,
        table: &str,
        field: &str,
        value: V,
    ) -> Result<Option<String>> {
        let state = self.registry.read(table)?;
        records::first_id_for_field(&state.dir, field, &value.into())
    }

    pub fn find_all_ids_for_field<V: Into<FieldValue>>(
        &self,
        table: &str,
        field: &str,
        value: V,
    ) -> Result<Vec<String>> {
        let state = self.registry.read(table)?;
        records::all_ids_for_field(&state.dir, field, &value.into())
    }

    /// Ids of the records carrying every tag in `tags`. An empty `tags`
    /// matches nothing, and so does any query on a table without a tag index.
    pub fn find_all_ids_for_tags<S: AsRef<str>>(
        &self,
        table: &str,
        tags: &[S],
    ) -> Result<Vec<String>> {
        let state = self.registry.read(table)?;
        Ok(state
            .tags
            .as_ref()
            .map(|index| index.ids_for_tags(tags))
            .unwrap_or_default())
    }

    /// Store `doc` under the next free id and return that id.
    pub fn create<T: Serialize + ?Sized>(&self, table: &str, doc: &T) -> Result<String> {
        let mut state = self.registry.write(table)?;
        let id = records::create(&state.dir, doc)?;
        state.refresh_tags()?;
        Ok(id)
    }

    /// Overwrite record `id` with `doc`, creating it if it does not exist.
    pub fn update<T: Serialize + ?Sized>(&self, table: &str, doc: &T, id: &str) -> Result<()> {
        let mut state = self.registry.write(table)?;
        records::update(&state.dir, doc, id)?;
        state.refresh_tags()
    }

    pub fn delete(&self, table: &str, id: &str) -> Result<()> {
        let mut state = self.registry.write(table)?;
        records::delete(&state.dir, id)?;
        state.refresh_tags()
    }

    /// Rebuild a table's tag index from its files, e.g. after records were
    /// edited outside this process.
    pub fn reindex(&self, table: &str) -> Result<()> {
        let mut state = self.registry.write(table)?;
        state.tag_index()?;
        state.refresh_tags()
    }
}
