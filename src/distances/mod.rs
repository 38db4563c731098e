//! Distance table: the sorted `[from, to, pixels]` triples other tools read as a
//! symmetric sparse matrix. Only `from < to` is stored; lookups canonicalise the pair.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DistanceError, Result};

pub mod assemble;

pub use assemble::{assemble, UnreachablePolicy};

/// One table row. Serialized as a bare `[from, to, distance]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DistanceRecord(pub u16, pub u16, pub u32);

impl DistanceRecord {
    /// Build a record in canonical order.
    pub fn new(a: u16, b: u16, distance: u32) -> Self {
        Self(a.min(b), a.max(b), distance)
    }

    pub fn from_port(&self) -> u16 {
        self.0
    }

    pub fn to_port(&self) -> u16 {
        self.1
    }

    pub fn distance(&self) -> u32 {
        self.2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Json,
    Csv,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Json => "json",
            TableFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceTable {
    records: Vec<DistanceRecord>,
}

impl DistanceTable {
    /// Sort by `from`, then `to`. Records must already be canonical.
    pub fn new(mut records: Vec<DistanceRecord>) -> Self {
        records.sort_unstable();
        Self { records }
    }

    pub fn records(&self) -> &[DistanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistanceRecord> {
        self.records.iter()
    }

    /// Distance between two ports in either order. `Some(0)` for a port and itself.
    pub fn get(&self, a: u16, b: u16) -> Option<u32> {
        if a == b {
            return Some(0);
        }
        let key = (a.min(b), a.max(b));
        self.records
            .binary_search_by(|r| (r.0, r.1).cmp(&key))
            .ok()
            .map(|i| self.records[i].2)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["from", "to", "distance"])?;
        for record in &self.records {
            wtr.write_record([
                record.0.to_string(),
                record.1.to_string(),
                record.2.to_string(),
            ])?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Replace `path` with the table, creating parent directories.
    pub fn save(&self, path: &Path, format: TableFormat) -> Result<()> {
        let write_err = |source| DistanceError::TableWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        match format {
            TableFormat::Json => fs::write(path, self.to_json()?).map_err(write_err),
            TableFormat::Csv => {
                let file = fs::File::create(path).map_err(write_err)?;
                self.write_csv(BufWriter::new(file))
            }
        }
    }

    /// Load a JSON table written by [`DistanceTable::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| DistanceError::TableRead {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<DistanceRecord> =
            serde_json::from_str(&raw).map_err(|source| DistanceError::TableParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(
            records
                .into_iter()
                .map(|r| DistanceRecord::new(r.0, r.1, r.2))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DistanceTable {
        DistanceTable::new(vec![
            DistanceRecord(2, 9, 40),
            DistanceRecord(1, 3, 12),
            DistanceRecord(1, 2, 5),
            DistanceRecord(2, 3, 8),
        ])
    }

    #[test]
    fn records_sort_by_from_then_to() {
        let ids: Vec<(u16, u16)> = table().iter().map(|r| (r.0, r.1)).collect();
        assert_eq!(ids, vec![(1, 2), (1, 3), (2, 3), (2, 9)]);
    }

    #[test]
    fn lookup_is_symmetric() {
        let table = table();
        assert_eq!(table.get(3, 1), Some(12));
        assert_eq!(table.get(1, 3), Some(12));
        assert_eq!(table.get(9, 2), Some(40));
        assert_eq!(table.get(4, 4), Some(0));
        assert_eq!(table.get(1, 9), None);
    }

    #[test]
    fn json_is_a_flat_array_of_triples() {
        assert_eq!(table().to_json().unwrap(), "[[1,2,5],[1,3,12],[2,3,8],[2,9,40]]");
    }

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let mut out = Vec::new();
        table().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "from,to,distance");
        assert_eq!(lines[1], "1,2,5");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn save_then_load_canonicalises_reversed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib").join("distances.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[[3,1,12],[1,2,5]]").unwrap();

        let loaded = DistanceTable::load(&path).unwrap();
        assert_eq!(loaded.records(), &[DistanceRecord(1, 2, 5), DistanceRecord(1, 3, 12)]);

        let out = dir.path().join("nested").join("out.json");
        loaded.save(&out, TableFormat::Json).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "[[1,2,5],[1,3,12]]");
    }

    #[test]
    fn missing_table_is_a_read_error() {
        let err = DistanceTable::load(Path::new("/nonexistent/distances.json")).unwrap_err();
        assert!(matches!(err, DistanceError::TableRead { .. }));
    }
}
