use crate::error::{IvyError, Result};
use log::trace;
use std::cmp::Ordering;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const RECORD_EXT: &str = ".json";

/// A table's directory under the database root.
#[derive(Debug, Clone)]
pub struct TableDir {
    name: String,
    path: PathBuf,
}

impl TableDir {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: root.join(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.path.join(format!("{}{}", id, RECORD_EXT))
    }

    /// Every record file's id (filename minus `.json`), in ascending id order.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.path).map_err(IvyError::Io)?;

        for entry in entries {
            let entry = entry.map_err(IvyError::Io)?;
            if !entry.file_type().map_err(IvyError::Io)?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Some(id) = name.strip_suffix(RECORD_EXT) {
                    ids.push(id.to_string());
                }
            }
        }

        ids.sort_by(|a, b| cmp_ids(a, b));
        trace!("{}: {} record files", self.name, ids.len());
        Ok(ids)
    }

    /// Write a record file via a temp file and rename, so readers never see a
    /// half-written document.
    pub fn write_record(&self, id: &str, content: &[u8]) -> Result<()> {
        let target = self.record_path(id);
        let tmp = self.path.join(format!(".{}-{}.tmp", id, Uuid::new_v4()));
        write_private(&tmp, content).map_err(IvyError::Io)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(IvyError::Io(e));
        }
        Ok(())
    }
}

/// Create `path` readable and writable by the owner only (0600 on unix).
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// Canonical decimal ids order by length, then lexically; that equals numeric
/// order without parsing. Non-numeric stems fall in wherever their length puts them.
pub fn cmp_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Parse an id used for a write: a positive decimal integer without sign or
/// leading zeros, so it maps to exactly one filename.
pub fn parse_id(id: &str) -> Result<u64> {
    let canonical = !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_digit())
        && !id.starts_with('0');
    if !canonical {
        return Err(IvyError::InvalidId(id.to_string()));
    }
    id.parse::<u64>()
        .map_err(|_| IvyError::InvalidId(id.to_string()))
}

/// Check an id used for a read names a file inside the table directory.
pub fn check_stem(id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(IvyError::InvalidId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TableDir) {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("foos")).unwrap();
        let table = TableDir::new(root.path(), "foos");
        (root, table)
    }

    #[test]
    fn test_record_path() {
        let table = TableDir::new(Path::new("/data"), "planes");
        assert_eq!(table.record_path("12"), PathBuf::from("/data/planes/12.json"));
    }

    #[test]
    fn test_list_ids_only_json_files() {
        let (_root, table) = setup();
        fs::write(table.record_path("2"), "{}").unwrap();
        fs::write(table.record_path("10"), "{}").unwrap();
        fs::write(table.record_path("1"), "{}").unwrap();
        fs::write(table.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(table.path().join("3.json")).unwrap();

        assert_eq!(table.list_ids().unwrap(), vec!["1", "2", "10"]);
    }

    #[test]
    fn test_write_record_leaves_no_tmp_files() {
        let (_root, table) = setup();
        table.write_record("1", b"{\"a\":1}").unwrap();
        table.write_record("1", b"{\"a\":2}").unwrap();

        assert_eq!(fs::read_to_string(table.record_path("1")).unwrap(), "{\"a\":2}");
        for entry in fs::read_dir(table.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_str().unwrap();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_record_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_root, table) = setup();
        table.write_record("1", b"{}").unwrap();
        table.write_record("1", b"{\"a\":1}").unwrap();

        let mode = fs::metadata(table.record_path("1")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("42").unwrap(), 42);
        for bad in ["", "0", "007", "-1", "+1", "abc", "1.5", " 1"] {
            assert!(
                matches!(parse_id(bad), Err(IvyError::InvalidId(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_check_stem() {
        assert!(check_stem("5").is_ok());
        assert!(check_stem("legacy").is_ok());
        for bad in ["", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(check_stem(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_cmp_ids_is_numeric_for_canonical() {
        let mut ids = vec!["100", "9", "20", "1"];
        ids.sort_by(|a, b| cmp_ids(a, b));
        assert_eq!(ids, vec!["1", "9", "20", "100"]);
    }
}
