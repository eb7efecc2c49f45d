//! Tournament aggregate, its variant and derived state.

use crate::models::game::{GameMatch, MatchId, Phase};
use crate::models::team::{Team, TeamId, TeamKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not enough teams: need at least {needed}, have {actual}")]
    InsufficientTeams { needed: usize, actual: usize },

    #[error("Matches have already been generated")]
    AlreadyGenerated,

    #[error("Prerequisites not met: {0}")]
    PrerequisitesNotMet(String),

    #[error("Match references unknown team {0}")]
    MissingTeamData(TeamId),

    #[error("This tournament variant has no knockout stage")]
    KnockoutNotSupported,

    #[error("Tournament not in correct state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: TournamentState,
        actual: TournamentState,
    },

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Player names are unique per tournament (case-insensitive).
    #[error("A player named '{0}' already exists")]
    DuplicatePlayerName(String),

    #[error("Team does not match the tournament's team type")]
    TeamKindMismatch,

    #[error("Result of match {0} can no longer be changed")]
    ResultLocked(MatchId),

    #[error("Knockout match {0} ended in a tie; a winner is required")]
    UndecidedMatch(MatchId),

    #[error("The {0} phase already has a champion")]
    PhaseComplete(Phase),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament. Always derived from the match list, never stored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Registering teams; no matches yet.
    #[default]
    Created,
    /// Poule (or round-robin) matches generated, some unplayed.
    PouleStage,
    /// All poule matches played, no knockout yet.
    PouleComplete,
    /// Knockout matches generated, no champion yet.
    KnockoutStage,
    /// The knockout final has been decided.
    KnockoutComplete,
}

/// Sport played; decides how results are entered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    /// Scored per set; results are set sequences.
    #[default]
    TableTennis,
    /// Scored as an aggregate pair.
    Padel,
}

impl Sport {
    pub fn uses_sets(&self) -> bool {
        matches!(self, Sport::TableTennis)
    }
}

/// Tournament format, chosen at creation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TournamentVariant {
    /// Club championship: poules, then a knockout bracket, optionally a consolation bracket.
    Poules {
        teams_per_poule: usize,
        qualifiers_per_poule: usize,
        consolation: bool,
    },
    /// Friendly tournament: everyone plays everyone, no knockout.
    RoundRobin,
}

impl Default for TournamentVariant {
    fn default() -> Self {
        Self::poules(4, 2, false)
    }
}

impl TournamentVariant {
    pub fn poules(teams_per_poule: usize, qualifiers_per_poule: usize, consolation: bool) -> Self {
        TournamentVariant::Poules {
            teams_per_poule,
            qualifiers_per_poule,
            consolation,
        }
    }

    /// Minimum number of teams needed to generate the initial matches.
    pub fn min_teams(&self) -> usize {
        match self {
            TournamentVariant::Poules { .. } => 3,
            TournamentVariant::RoundRobin => 2,
        }
    }
}

/// A round-robin group of teams within the poule phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Poule {
    pub label: String,
    pub teams: Vec<TeamId>,
}

/// A team's place relative to a bracket round: either a bye over `round`
/// or an entrant of `round` that could not be paired.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSlot {
    pub team_id: TeamId,
    pub phase: Phase,
    pub round: u32,
}

/// Full tournament state: roster, poules and every match with its result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub sport: Sport,
    pub team_kind: TeamKind,
    pub variant: TournamentVariant,
    /// Registered teams, in registration (or draw) order.
    pub teams: Vec<Team>,
    /// Empty until poule matches are generated.
    pub poules: Vec<Poule>,
    pub matches: Vec<GameMatch>,
    /// Teams advancing past a bracket round without playing it.
    pub byes: Vec<RoundSlot>,
    /// Entrants left over by an odd-sized pairing; they do not advance.
    pub unpaired: Vec<RoundSlot>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a new tournament with no teams.
    pub fn new(
        name: impl Into<String>,
        sport: Sport,
        team_kind: TeamKind,
        variant: TournamentVariant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport,
            team_kind,
            variant,
            teams: Vec::new(),
            poules: Vec::new(),
            matches: Vec::new(),
            byes: Vec::new(),
            unpaired: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Add a team (only before matches exist). Player names must be unique (case-insensitive).
    pub fn add_team(&mut self, team: Team) -> TournamentResult<TeamId> {
        self.expect_state(TournamentState::Created)?;
        if team.kind() != self.team_kind {
            return Err(TournamentError::TeamKindMismatch);
        }
        if team.players().any(|p| p.trim().is_empty()) {
            return Err(TournamentError::InvalidInput("player name is empty".into()));
        }
        if let (Some(p2), p1) = (team.player_2.as_deref(), team.player_1.as_str()) {
            if p1.trim().eq_ignore_ascii_case(p2.trim()) {
                return Err(TournamentError::DuplicatePlayerName(p2.trim().to_string()));
            }
        }
        for name in team.players() {
            let name = name.trim();
            let is_duplicate = self
                .teams
                .iter()
                .flat_map(Team::players)
                .any(|p| p.trim().eq_ignore_ascii_case(name));
            if is_duplicate {
                return Err(TournamentError::DuplicatePlayerName(name.to_string()));
            }
        }
        let team = Team {
            player_1: team.player_1.trim().to_string(),
            player_2: team.player_2.map(|p| p.trim().to_string()),
            ..team
        };
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Remove a team by id (only before matches exist).
    pub fn remove_team(&mut self, team_id: TeamId) -> TournamentResult<Team> {
        self.expect_state(TournamentState::Created)?;
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        Ok(self.teams.remove(idx))
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn matches_in(&self, phase: Phase) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(move |m| m.phase == phase)
    }

    pub fn has_phase(&self, phase: Phase) -> bool {
        self.matches_in(phase).next().is_some()
    }

    /// Unplayed matches of a phase, in schedule order.
    pub fn pending_matches(&self, phase: Phase) -> Vec<&GameMatch> {
        self.matches_in(phase).filter(|m| !m.is_played()).collect()
    }

    /// True once poule matches exist and every one of them has a result.
    pub fn all_poule_matches_played(&self) -> bool {
        self.has_phase(Phase::Poule) && self.matches_in(Phase::Poule).all(GameMatch::is_played)
    }

    /// Highest bracket round generated for a phase.
    pub fn latest_round(&self, phase: Phase) -> Option<u32> {
        self.matches_in(phase).map(|m| m.round).max()
    }

    /// Winner of the phase's final, once decided.
    pub fn champion(&self, phase: Phase) -> Option<TeamId> {
        let round = self.latest_round(phase)?;
        let mut last: Vec<_> = self
            .matches_in(phase)
            .filter(|m| m.round == round)
            .collect();
        let byes = self
            .byes
            .iter()
            .filter(|b| b.phase == phase && b.round == round)
            .count();
        match (last.pop(), last.is_empty(), byes) {
            (Some(final_match), true, 0) => final_match.winner(),
            _ => None,
        }
    }

    pub fn state(&self) -> TournamentState {
        if !self.has_matches() {
            TournamentState::Created
        } else if !self.all_poule_matches_played() {
            TournamentState::PouleStage
        } else if !self.has_phase(Phase::Knockout) {
            TournamentState::PouleComplete
        } else if self.champion(Phase::Knockout).is_some() {
            TournamentState::KnockoutComplete
        } else {
            TournamentState::KnockoutStage
        }
    }

    pub(crate) fn expect_state(&self, expected: TournamentState) -> TournamentResult<()> {
        let actual = self.state();
        if actual != expected {
            return Err(TournamentError::InvalidState { expected, actual });
        }
        Ok(())
    }
}
