// Collaborator seams: where bout history and fighter profiles come from.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use super::identity::{BoutRecord, FighterId};
use crate::fighter::FighterProfile;

/// Failure inside a collaborator (database, remote store).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the full bout history.
#[async_trait]
pub trait BoutSource: Send + Sync {
    async fn list_bouts(&self) -> Result<Vec<BoutRecord>, SourceError>;
}

/// Looks up full profiles. `Ok(None)` means the identity is unknown.
#[async_trait]
pub trait FighterResolver: Send + Sync {
    async fn resolve(&self, id: &FighterId) -> Result<Option<FighterProfile>, SourceError>;
}

/// Both collaborators behind one handle, as the HTTP layer holds them.
pub trait FightStore: BoutSource + FighterResolver {}

impl<T: BoutSource + FighterResolver> FightStore for T {}

/// In-memory bout history and roster, for fixtures and snapshots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bouts: Vec<BoutRecord>,
    profiles: HashMap<FighterId, FighterProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store built from name pairs, with a minimal profile for every fighter.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (a, b) in pairs {
            let a = FighterId::from_full_name(a);
            let b = FighterId::from_full_name(b);
            store.add_profile(FighterProfile::named(&a));
            store.add_profile(FighterProfile::named(&b));
            store.add_bout(BoutRecord::new(a, b));
        }
        store
    }

    pub fn add_bout(&mut self, bout: BoutRecord) {
        self.bouts.push(bout);
    }

    pub fn add_profile(&mut self, profile: FighterProfile) {
        self.profiles.insert(profile.id(), profile);
    }

    pub fn remove_profile(&mut self, id: &FighterId) -> Option<FighterProfile> {
        self.profiles.remove(id)
    }

    pub fn bouts(&self) -> &[BoutRecord] {
        &self.bouts
    }
}

#[async_trait]
impl BoutSource for MemoryStore {
    async fn list_bouts(&self) -> Result<Vec<BoutRecord>, SourceError> {
        Ok(self.bouts.clone())
    }
}

#[async_trait]
impl FighterResolver for MemoryStore {
    async fn resolve(&self, id: &FighterId) -> Result<Option<FighterProfile>, SourceError> {
        Ok(self.profiles.get(id).cloned())
    }
}
