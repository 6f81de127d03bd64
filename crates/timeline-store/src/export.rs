//! Single-document export of entries and registry.

use std::fs;
use std::path::Path;

use timeline_core::{Error, ExportData, Result};
use tracing::info;

use crate::store::Store;

impl Store {
    /// Snapshot of both collections.
    pub fn export_data(&self) -> ExportData {
        ExportData {
            entries: self.entries.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Write `{entries, tags}` as pretty JSON to `path`.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.export_data())?;
        fs::write(path, data)?;
        info!(
            subsystem = "store",
            op = "export",
            path = %path.display(),
            entry_count = self.entries.len(),
            tag_count = self.tags.len(),
            "Exported"
        );
        Ok(())
    }
}

/// Read an export document back.
pub fn import_export(path: &Path) -> Result<ExportData> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use timeline_core::{Entry, EventBus, Tag};

    #[test]
    fn test_export_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mytimeline_export.json");

        let mut store = Store::in_memory(Arc::new(EventBus::new(8)));
        store.add_entry(Entry::new("导出测试", vec![Tag::named("文档")]));
        store.export_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"entries\""));
        assert!(text.contains("\"colorHex\""));

        let data = import_export(&path).unwrap();
        assert_eq!(data, store.export_data());
    }

    #[test]
    fn test_import_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = import_export(&dir.path().join("none.json"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_memory(Arc::new(EventBus::new(8)));
        let result = store.export_to(&dir.path().join("missing/out.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
