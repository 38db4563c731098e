//! Turns per-source search results into the final table, applying the policy for
//! port pairs that have no water connection.

use serde::{Deserialize, Serialize};

use crate::distances::{DistanceRecord, DistanceTable};
use crate::error::{DistanceError, Result};
use crate::search::SourceRun;

/// What to write for a pair of ports the flood fill could not connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreachablePolicy {
    /// Leave the pair out; consumers treat a missing entry as "no route".
    #[default]
    Omit,
    /// Write `[from, to, 0]` so every pair has an entry.
    Zero,
    /// Abort the run.
    Fail,
}

pub fn assemble(runs: &[SourceRun], policy: UnreachablePolicy) -> Result<DistanceTable> {
    let mut records = Vec::with_capacity(runs.iter().map(|r| r.records.len()).sum());
    for run in runs {
        records.extend_from_slice(&run.records);
        if run.is_complete() {
            continue;
        }
        match policy {
            UnreachablePolicy::Omit => {}
            UnreachablePolicy::Zero => records.extend(
                run.missing
                    .iter()
                    .map(|&missing| DistanceRecord(run.source, missing, 0)),
            ),
            UnreachablePolicy::Fail => {
                return Err(DistanceError::UnreachablePorts {
                    source_id: run.source,
                    missing: run.missing.clone(),
                })
            }
        }
    }
    Ok(DistanceTable::new(records))
}
