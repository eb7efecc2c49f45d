//! Club tournament organizer: library with models and business logic.

pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    advance_round, build_poules, clear_result, distribute, generate_initial_matches,
    generate_knockout_matches, generate_knockout_round, phase_standings, poule_finishers,
    poule_labels, poule_standings, record_result, round_robin, schedule_poules, seed,
    select_qualifiers, shuffle_teams, standings, BracketRound, Orchestrator, Scope,
};
pub use models::{
    GameMatch, MatchId, MatchResult, Phase, Poule, Qualifier, RoundSlot, SetScore, Side, Sport,
    Standing, Team, TeamId, TeamKind, TeamStats, Tournament, TournamentError, TournamentId,
    TournamentResult, TournamentState, TournamentVariant, MAX_SCORE, MAX_SETS,
};
pub use store::{MemoryStore, TournamentStore};
