//! Encounter snapshot read from a JSON file.
//!
//! Stand-in for a live host-game bridge: the file is re-read on every call, so
//! an external process can rewrite it between turns.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tactician_domain::Encounter;

use crate::infrastructure::ports::{GameStateError, GameStatePort};

pub struct JsonEncounterFile {
    path: PathBuf,
}

impl JsonEncounterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GameStatePort for JsonEncounterFile {
    async fn current_encounter(&self) -> Result<Encounter, GameStateError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GameStateError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let encounter: Encounter = serde_json::from_str(&raw).map_err(|e| {
            GameStateError::Malformed(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            round = encounter.round,
            combatants = encounter.combatants.len(),
            "Loaded encounter snapshot"
        );
        Ok(encounter)
    }
}
