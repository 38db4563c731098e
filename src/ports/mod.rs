//! Port registry: reads the dated per-server port snapshot written by the API fetcher.
//! Only the fields the distance engine needs are kept; everything else in the
//! snapshot is ignored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DistanceError, Result};

/// World-space position. The snapshot also carries `y` (height), which is unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub id: u16,
    pub name: String,
    pub entrance_position: Position,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPortId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawPort {
    #[serde(rename = "Id")]
    id: RawPortId,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "EntrancePosition")]
    entrance_position: Position,
}

fn parse_port_id(raw: &RawPortId) -> Result<u16> {
    let value = match raw {
        RawPortId::Number(n) => u16::try_from(*n).ok(),
        RawPortId::Text(s) => s.trim().parse::<u16>().ok(),
    };
    match value {
        Some(id) if id > 0 => Ok(id),
        _ => Err(DistanceError::InvalidPortId(match raw {
            RawPortId::Number(n) => n.to_string(),
            RawPortId::Text(s) => s.clone(),
        })),
    }
}

/// Snapshot file for a server and date, e.g. `build/API/eu2-Ports-2024-05-01.json`.
pub fn snapshot_path(api_dir: &Path, server_id: &str, date: &str) -> PathBuf {
    api_dir.join(format!("{server_id}-Ports-{date}.json"))
}

/// Parse a snapshot document. Ports come back in document order.
pub fn parse_ports(raw: &str, path: &Path) -> Result<Vec<Port>> {
    let records: Vec<RawPort> =
        serde_json::from_str(raw).map_err(|source| DistanceError::PortsParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut ports = Vec::with_capacity(records.len());
    for record in records {
        let id = parse_port_id(&record.id)?;
        if !seen.insert(id) {
            return Err(DistanceError::DuplicatePortId(id));
        }
        ports.push(Port {
            id,
            name: record.name,
            entrance_position: record.entrance_position,
        });
    }
    Ok(ports)
}

/// Load the ports of `server_id` from the snapshot taken on `date`.
pub fn load_ports(api_dir: &Path, server_id: &str, date: &str) -> Result<Vec<Port>> {
    let path = snapshot_path(api_dir, server_id, date);
    let raw = fs::read_to_string(&path).map_err(|source| DistanceError::PortsRead {
        path: path.clone(),
        source,
    })?;
    parse_ports(&raw, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {"Id": "12", "Name": "Les Cayes", "Capital": false,
         "EntrancePosition": {"x": 1.5, "y": 0.0, "z": -3.0}},
        {"Id": 3, "Name": "Cartagena", "EntrancePosition": {"x": -10.0, "y": 0.0, "z": 4.25}}
    ]"#;

    #[test]
    fn accepts_string_and_numeric_ids_in_file_order() {
        let ports = parse_ports(SNAPSHOT, Path::new("fixture.json")).unwrap();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].id, 12);
        assert_eq!(ports[0].name, "Les Cayes");
        assert_eq!(ports[0].entrance_position, Position { x: 1.5, z: -3.0 });
        assert_eq!(ports[1].id, 3);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"[
            {"Id": "1", "EntrancePosition": {"x": 0, "z": 0}},
            {"Id": 1, "EntrancePosition": {"x": 5, "z": 5}}
        ]"#;
        let err = parse_ports(raw, Path::new("dup.json")).unwrap_err();
        assert!(matches!(err, DistanceError::DuplicatePortId(1)));
    }

    #[test]
    fn zero_and_non_numeric_ids_are_rejected() {
        let zero = r#"[{"Id": "0", "EntrancePosition": {"x": 0, "z": 0}}]"#;
        assert!(matches!(
            parse_ports(zero, Path::new("zero.json")),
            Err(DistanceError::InvalidPortId(_))
        ));

        let text = r#"[{"Id": "abc", "EntrancePosition": {"x": 0, "z": 0}}]"#;
        assert!(matches!(
            parse_ports(text, Path::new("text.json")),
            Err(DistanceError::InvalidPortId(_))
        ));
    }

    #[test]
    fn missing_snapshot_is_a_read_error() {
        let err = load_ports(Path::new("/nonexistent/api"), "eu2", "2024-01-01").unwrap_err();
        match err {
            DistanceError::PortsRead { path, .. } => {
                assert!(path.ends_with("eu2-Ports-2024-01-01.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_snapshot_is_a_parse_error() {
        let err = parse_ports("{not json", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, DistanceError::PortsParse { .. }));
    }
}
