//! Storage collaborator: a keyed record store for tournament aggregates.
//!
//! The engine never holds a connection of its own; an `Orchestrator` is handed
//! a store and reads / writes whole aggregates through it.

use crate::models::{Tournament, TournamentError, TournamentId, TournamentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trait for tournament persistence.
pub trait TournamentStore {
    /// Store a new tournament and return its id.
    fn insert(&mut self, tournament: Tournament) -> TournamentResult<TournamentId>;

    /// Load a tournament by id.
    fn get(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Replace a stored tournament. It must already exist.
    fn update(&mut self, tournament: Tournament) -> TournamentResult<()>;

    /// Delete a tournament, returning it if it existed.
    fn remove(&mut self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// Ids of all stored tournaments, oldest first.
    fn list(&self) -> TournamentResult<Vec<TournamentId>>;
}

/// In-memory store. Serializable, so a whole store can be snapshotted as JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    tournaments: HashMap<TournamentId, Tournament>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tournaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tournaments.is_empty()
    }
}

impl TournamentStore for MemoryStore {
    fn insert(&mut self, tournament: Tournament) -> TournamentResult<TournamentId> {
        let id = tournament.id;
        if self.tournaments.contains_key(&id) {
            return Err(TournamentError::InvalidInput(format!(
                "tournament {id} already exists"
            )));
        }
        self.tournaments.insert(id, tournament);
        Ok(id)
    }

    fn get(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.tournaments.get(&id).cloned())
    }

    fn update(&mut self, tournament: Tournament) -> TournamentResult<()> {
        match self.tournaments.get_mut(&tournament.id) {
            Some(slot) => {
                *slot = tournament;
                Ok(())
            }
            None => Err(TournamentError::TournamentNotFound(tournament.id)),
        }
    }

    fn remove(&mut self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.tournaments.remove(&id))
    }

    fn list(&self) -> TournamentResult<Vec<TournamentId>> {
        let mut all: Vec<&Tournament> = self.tournaments.values().collect();
        all.sort_by_key(|t| (t.created_at, t.id));
        Ok(all.into_iter().map(|t| t.id).collect())
    }
}
