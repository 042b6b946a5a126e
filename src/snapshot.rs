//! Periodic JSON snapshots of a running session.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::outbreak::Outbreak;

pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_turns: u64,
}

impl SnapshotWriter {
    /// An interval of zero disables snapshotting entirely.
    pub fn new(output_dir: impl AsRef<Path>, interval_turns: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_turns,
        }
    }

    /// Writes `turn_NNNNNN.json` under `<output_dir>/<game_id>/` when the
    /// session's turn lands on the interval.
    pub fn maybe_write(&self, outbreak: &Outbreak) -> Result<Option<PathBuf>> {
        if self.interval_turns == 0 {
            return Ok(None);
        }
        let turn = outbreak.turn();
        if turn == 0 || turn % self.interval_turns != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(outbreak.game_id());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("turn_{turn:06}.json"));
        let snapshot = outbreak.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
