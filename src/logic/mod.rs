//! Tournament business logic: poules, scheduling, standings, brackets and the flow tying them together.

mod bracket;
mod orchestrator;
mod poules;
mod schedule;
mod standings;

pub use bracket::{generate_knockout_round, poule_finishers, seed, select_qualifiers, BracketRound};
pub use orchestrator::{
    advance_round, clear_result, generate_initial_matches, generate_knockout_matches,
    phase_standings, record_result, Orchestrator,
};
pub use poules::{distribute, poule_labels, shuffle_teams, MIN_POULE_SIZE};
pub use schedule::{build_poules, round_robin, schedule_poules};
pub use standings::{poule_standings, standings, Scope};
