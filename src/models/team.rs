//! Team data structures: one player (table tennis singles) or a pair (padel, doubles).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Whether teams in a tournament have one or two players.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamKind {
    #[default]
    Single,
    Double,
}

/// A team in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub player_1: String,
    pub player_2: Option<String>,
}

impl Team {
    /// Create a single-player team.
    pub fn single(player: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_1: player.into(),
            player_2: None,
        }
    }

    /// Create a two-player team.
    pub fn pair(player_1: impl Into<String>, player_2: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_1: player_1.into(),
            player_2: Some(player_2.into()),
        }
    }

    pub fn kind(&self) -> TeamKind {
        match self.player_2 {
            Some(_) => TeamKind::Double,
            None => TeamKind::Single,
        }
    }

    pub fn is_double(&self) -> bool {
        self.kind() == TeamKind::Double
    }

    /// "Name" for singles, "Name 1 / Name 2" for pairs.
    pub fn display_name(&self) -> String {
        match &self.player_2 {
            Some(p2) => format!("{} / {}", self.player_1, p2),
            None => self.player_1.clone(),
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.player_1.as_str()).chain(self.player_2.as_deref())
    }
}
