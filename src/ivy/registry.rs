//! Per-table locks.
//!
//! The registry is filled once at open time and never changes afterwards.
//! Each table gets one reader-writer lock guarding both its record files and
//! its tag index, so the two are always observed together. Tables share
//! nothing, so work on one never waits on another.

use crate::error::{IvyError, Result};
use crate::index::TagIndex;
use crate::store::TableDir;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;

/// Everything the table lock protects.
#[derive(Debug)]
pub struct TableState {
    pub dir: TableDir,
    pub tags: Option<TagIndex>,
}

impl TableState {
    /// The tag index, or `NotIndexed` for tables opened without one.
    pub fn tag_index(&self) -> Result<&TagIndex> {
        self.tags
            .as_ref()
            .ok_or_else(|| IvyError::NotIndexed(self.dir.name().to_string()))
    }

    /// Rebuild the tag index if the table has one.
    pub fn refresh_tags(&mut self) -> Result<()> {
        if let Some(index) = self.tags.as_mut() {
            index.rebuild(&self.dir)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, RwLock<TableState>>,
}

impl TableRegistry {
    pub fn new(states: impl IntoIterator<Item = TableState>) -> Self {
        let tables = states
            .into_iter()
            .map(|state| (state.dir.name().to_string(), RwLock::new(state)))
            .collect();
        Self { tables }
    }

    fn slot(&self, table: &str) -> Result<&RwLock<TableState>> {
        self.tables
            .get(table)
            .ok_or_else(|| IvyError::UnknownTable(table.to_string()))
    }

    pub fn read(&self, table: &str) -> Result<RwLockReadGuard<'_, TableState>> {
        Ok(self.slot(table)?.read())
    }

    pub fn write(&self, table: &str) -> Result<RwLockWriteGuard<'_, TableState>> {
        Ok(self.slot(table)?.write())
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Known table names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Take and release every table's write lock in turn. Returns once no
    /// operation that started before the call is still running.
    pub fn barrier(&self) {
        for name in self.names() {
            if let Some(lock) = self.tables.get(&name) {
                drop(lock.write());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn registry(names: &[&str]) -> TableRegistry {
        TableRegistry::new(names.iter().map(|name| TableState {
            dir: TableDir::new(Path::new("/nonexistent"), name),
            tags: None,
        }))
    }

    #[test]
    fn test_unknown_table() {
        let reg = registry(&["planes"]);
        assert!(reg.read("planes").is_ok());
        assert!(matches!(reg.read("cars"), Err(IvyError::UnknownTable(_))));
        assert!(matches!(reg.write("cars"), Err(IvyError::UnknownTable(_))));
        assert!(!reg.contains("cars"));
    }

    #[test]
    fn test_names_sorted() {
        let reg = registry(&["b", "a", "c"]);
        assert_eq!(reg.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_not_indexed() {
        let reg = registry(&["planes"]);
        let state = reg.read("planes").unwrap();
        assert!(matches!(state.tag_index(), Err(IvyError::NotIndexed(_))));
    }

    #[test]
    fn test_readers_share_the_lock() {
        let reg = registry(&["planes"]);
        let first = reg.read("planes").unwrap();
        let second = reg.read("planes").unwrap();
        assert_eq!(first.dir.name(), second.dir.name());
    }

    #[test]
    fn test_tables_are_independent() {
        let reg = registry(&["planes", "airports"]);
        let _planes = reg.write("planes").unwrap();
        assert!(reg.write("airports").is_ok());
    }

    #[test]
    fn test_writer_waits_for_readers() {
        let owned = registry(&["planes"]);
        let reg = &owned;
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let first = reg.read("planes").unwrap();
            let second = reg.read("planes").unwrap();
            s.spawn(move || {
                let _guard = reg.write("planes").unwrap();
                tx.send(()).unwrap();
            });
            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
            drop(first);
            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
            drop(second);
            assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        });
    }

    #[test]
    fn test_barrier_waits_for_writer() {
        let owned = registry(&["planes"]);
        let reg = &owned;
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let guard = reg.write("planes").unwrap();
            s.spawn(move || {
                reg.barrier();
                tx.send(()).unwrap();
            });
            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
            drop(guard);
            assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        });
    }
}
