//! JSON record output

use crate::output::traits::{RecordSink, SinkResult};
use crate::state::Record;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes records as a pretty-printed JSON array
///
/// Keys of every object follow the fixed field order.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonSink {
    fn write(&mut self, records: &[Record]) -> SinkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Field;
    use tempfile::TempDir;

    #[test]
    fn test_writes_array_in_field_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("records.json");
        let mut sink = JsonSink::new(&path);

        let records = vec![
            Record::new("Toyota")
                .unwrap()
                .with(Field::Model, "Corolla")
                .with(Field::Price, "450,000"),
            Record::new("Kia")
                .unwrap()
                .with(Field::Model, "Rio")
                .with(Field::Type, "New Car"),
        ];
        sink.write(&records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["brand"], "Toyota");
        assert_eq!(array[0]["price"], "450,000");
        assert_eq!(array[0]["color"], "");
        assert!(array[0].get("type").is_none());
        assert_eq!(array[1]["type"], "New Car");

        let brand = content.find("\"brand\"").unwrap();
        let url = content.find("\"url\"").unwrap();
        let description = content.find("\"description\"").unwrap();
        assert!(brand < url && url < description);
    }

    #[test]
    fn test_empty_run_writes_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let mut sink = JsonSink::new(&path);

        sink.write(&[]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }
}
