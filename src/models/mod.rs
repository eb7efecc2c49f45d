//! Data structures for a club tournament: teams, matches, derived stats, tournament state.

mod game;
mod stats;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchResult, Phase, SetScore, Side, MAX_SCORE, MAX_SETS};
pub use stats::{Qualifier, Standing, TeamStats};
pub use team::{Team, TeamId, TeamKind};
pub use tournament::{
    Poule, RoundSlot, Sport, Tournament, TournamentError, TournamentId, TournamentResult,
    TournamentState, TournamentVariant,
};
