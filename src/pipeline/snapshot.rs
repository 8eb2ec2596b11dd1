//! Read access to one cache revision's decoded artifacts.

use crate::error::{ErrorContext, Result, SnapshotErrorKind, UpdaterError};
use crate::model::{parse_group, parse_records, Record, WidgetNode};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One cache revision.
///
/// `Ok(None)` means the revision does not carry the object; errors are
/// reserved for objects that exist but cannot be read.
pub trait SnapshotSource: Send + Sync {
    /// Disassembled source of a script.
    fn script(&self, id: i64) -> Result<Option<String>>;

    /// Nodes of a widget group, indexed by child id.
    fn widget_group(&self, group: i64) -> Result<Option<Vec<WidgetNode>>>;

    /// Rows of a definition table, sorted by id.
    fn records(&self, table: &str) -> Result<Option<Vec<Record>>>;
}

/// A snapshot dumped to disk:
///
/// ```text
/// <root>/scripts/<id>.rs2asm
/// <root>/widgets/<group>.json
/// <root>/tables/<table>.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    root: PathBuf,
}

impl DirectorySnapshot {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(UpdaterError::snapshot(
                "opening snapshot",
                SnapshotErrorKind::MissingRoot(root),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, relative: PathBuf) -> Result<Option<String>> {
        let path = self.root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UpdaterError::io(path, e)),
        }
    }
}

impl SnapshotSource for DirectorySnapshot {
    fn script(&self, id: i64) -> Result<Option<String>> {
        self.read(Path::new("scripts").join(format!("{id}.rs2asm")))
    }

    fn widget_group(&self, group: i64) -> Result<Option<Vec<WidgetNode>>> {
        let Some(text) = self.read(Path::new("widgets").join(format!("{group}.json")))? else {
            return Ok(None);
        };
        parse_group(&text)
            .with_context(|| format!("widget group {group}"))
            .map(Some)
    }

    fn records(&self, table: &str) -> Result<Option<Vec<Record>>> {
        let Some(text) = self.read(Path::new("tables").join(format!("{table}.json")))? else {
            return Ok(None);
        };
        parse_records(&text)
            .with_context(|| format!("table {table}"))
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn snapshot() -> (TempDir, DirectorySnapshot) {
        let tmp = TempDir::new().unwrap();
        for dir in ["scripts", "widgets", "tables"] {
            std::fs::create_dir(tmp.path().join(dir)).unwrap();
        }
        std::fs::write(tmp.path().join("scripts/12.rs2asm"), ".id                 12\n").unwrap();
        std::fs::write(tmp.path().join("widgets/149.json"), r#"[{"type": 4}]"#).unwrap();
        std::fs::write(tmp.path().join("tables/items.json"), "not json").unwrap();
        let snapshot = DirectorySnapshot::open(tmp.path()).unwrap();
        (tmp, snapshot)
    }

    #[test]
    fn test_present_and_missing_objects() {
        let (_tmp, snapshot) = snapshot();
        assert!(snapshot.script(12).unwrap().is_some());
        assert!(snapshot.script(13).unwrap().is_none());
        assert_eq!(snapshot.widget_group(149).unwrap().map(|g| g.len()), Some(1));
        assert!(snapshot.widget_group(150).unwrap().is_none());
        assert!(snapshot.records("npcs").unwrap().is_none());
    }

    #[test]
    fn test_unreadable_table_is_an_error() {
        let (_tmp, snapshot) = snapshot();
        let err = snapshot.records("items").unwrap_err();
        assert!(err.to_string().contains("table items"), "{err}");
    }

    #[test]
    fn test_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(DirectorySnapshot::open(tmp.path().join("absent")).is_err());
    }
}
