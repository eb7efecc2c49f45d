//! Tournament flow: initial match generation, knockout generation, result entry
//! and round advancement. Every function validates fully before it mutates.

use crate::logic::bracket::{generate_knockout_round, poule_finishers, seed, BracketRound};
use crate::logic::poules::shuffle_teams;
use crate::logic::schedule::{build_poules, round_robin, schedule_poules};
use crate::logic::standings::{poule_standings, standings, Scope};
use crate::models::{
    GameMatch, MatchId, MatchResult, Phase, RoundSlot, Standing, Team, TeamId, Tournament,
    TournamentError, TournamentId, TournamentResult, TournamentState, TournamentVariant,
};
use crate::store::TournamentStore;
use chrono::Utc;

/// Generate the opening matches: poules with round-robin inside each poule, or a
/// single round robin over all teams for the friendly variant.
pub fn generate_initial_matches(tournament: &mut Tournament) -> TournamentResult<()> {
    if tournament.has_matches() {
        return Err(TournamentError::AlreadyGenerated);
    }
    let needed = tournament.variant.min_teams();
    if tournament.teams.len() < needed {
        return Err(TournamentError::InsufficientTeams {
            needed,
            actual: tournament.teams.len(),
        });
    }

    let (poules, matches) = match tournament.variant {
        TournamentVariant::Poules { teams_per_poule, .. } => {
            let poules = build_poules(&tournament.teams, teams_per_poule)?;
            let matches = schedule_poules(&poules);
            (poules, matches)
        }
        TournamentVariant::RoundRobin => {
            let ids: Vec<TeamId> = tournament.teams.iter().map(|t| t.id).collect();
            (Vec::new(), round_robin(&ids, Phase::Poule, None))
        }
    };

    log::info!(
        "Tournament {}: generated {} match(es) in {} poule(s) for {} team(s)",
        tournament.id,
        matches.len(),
        poules.len(),
        tournament.teams.len()
    );
    tournament.poules = poules;
    tournament.matches = matches;
    Ok(())
}

/// Seed the knockout bracket (and the consolation bracket, when enabled) from the
/// poule results. Requires every poule match to be played.
pub fn generate_knockout_matches(tournament: &mut Tournament) -> TournamentResult<()> {
    let TournamentVariant::Poules {
        qualifiers_per_poule,
        consolation,
        ..
    } = tournament.variant
    else {
        return Err(TournamentError::KnockoutNotSupported);
    };
    if tournament.has_phase(Phase::Knockout) {
        return Err(TournamentError::AlreadyGenerated);
    }
    let state = tournament.state();
    if state != TournamentState::PouleComplete {
        return Err(TournamentError::PrerequisitesNotMet(format!(
            "all poule matches must be played first (tournament is {state:?})"
        )));
    }

    let finishers = poule_finishers(&tournament.teams, &tournament.poules, &tournament.matches)?;
    let (qualifiers, others): (Vec<_>, Vec<_>) = finishers
        .into_iter()
        .partition(|q| q.poule_rank <= qualifiers_per_poule);
    if qualifiers.len() < 2 {
        return Err(TournamentError::InsufficientTeams {
            needed: 2,
            actual: qualifiers.len(),
        });
    }

    let mut brackets = vec![(Phase::Knockout, seed(&qualifiers))];
    if consolation && others.len() >= 2 {
        let ranked: Vec<TeamId> = others.iter().map(|q| q.team_id).collect();
        brackets.push((Phase::Consolation, generate_knockout_round(&ranked)));
    }

    for (phase, round) in brackets {
        log::info!(
            "Tournament {}: {} round 1 with {} match(es), {} bye(s)",
            tournament.id,
            phase,
            round.pairings.len(),
            round.byes.len()
        );
        apply_round(tournament, phase, 1, round);
    }
    Ok(())
}

/// Generate the next round of a bracket once its latest round is fully decided.
/// Returns the number of the round generated.
///
/// An odd number of entrants leaves the middle one unpaired (see
/// `Tournament::unpaired`). That team is out of the bracket, so the phase can
/// crown a champion who never met it.
pub fn advance_round(tournament: &mut Tournament, phase: Phase) -> TournamentResult<u32> {
    if phase == Phase::Poule {
        return Err(TournamentError::InvalidInput(
            "the poule phase has no bracket rounds".into(),
        ));
    }
    let latest = tournament.latest_round(phase).ok_or_else(|| {
        TournamentError::PrerequisitesNotMet(format!("no {phase} matches have been generated"))
    })?;
    if tournament.champion(phase).is_some() {
        return Err(TournamentError::PhaseComplete(phase));
    }

    let mut winners = Vec::new();
    for m in tournament.matches_in(phase).filter(|m| m.round == latest) {
        if !m.is_played() {
            return Err(TournamentError::PrerequisitesNotMet(format!(
                "{phase} round {latest} still has unplayed matches"
            )));
        }
        winners.push(m.winner().ok_or(TournamentError::UndecidedMatch(m.id))?);
    }

    // Byes are the best seeds, so they head the field.
    let entrants: Vec<TeamId> = tournament
        .byes
        .iter()
        .filter(|b| b.phase == phase && b.round == latest)
        .map(|b| b.team_id)
        .chain(winners)
        .collect();
    let next = generate_knockout_round(&entrants);
    if next.pairings.is_empty() {
        return Err(TournamentError::PhaseComplete(phase));
    }

    let round = latest + 1;
    log::info!(
        "Tournament {}: {} round {} with {} match(es)",
        tournament.id,
        phase,
        round,
        next.pairings.len()
    );
    apply_round(tournament, phase, round, next);
    Ok(round)
}

fn apply_round(tournament: &mut Tournament, phase: Phase, round: u32, bracket: BracketRound) {
    tournament.matches.extend(bracket.to_matches(phase, round));
    tournament.byes.extend(bracket.byes.iter().map(|&team_id| RoundSlot {
        team_id,
        phase,
        round,
    }));
    if let Some(team_id) = bracket.unpaired {
        log::warn!(
            "Tournament {}: team {} could not be paired in {} round {} and does not advance",
            tournament.id,
            team_id,
            phase,
            round
        );
        tournament.unpaired.push(RoundSlot {
            team_id,
            phase,
            round,
        });
    }
}

/// Record (or overwrite) the result of a match.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    result: MatchResult,
) -> TournamentResult<()> {
    match (&result, tournament.sport.uses_sets()) {
        (MatchResult::Sets { sets }, true) if sets.is_empty() => {
            return Err(TournamentError::InvalidInput("at least one set is required".into()));
        }
        (MatchResult::Sets { .. }, true) | (MatchResult::Aggregate { .. }, false) => {}
        (_, uses_sets) => {
            return Err(TournamentError::InvalidInput(format!(
                "{:?} results are entered as {}",
                tournament.sport,
                if uses_sets { "sets" } else { "an aggregate score" }
            )));
        }
    }
    result.check_bounds().map_err(TournamentError::InvalidInput)?;
    ensure_editable(tournament, match_id)?;

    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    log::debug!("Match {}: result {:?}", match_id, result);
    m.result = Some(result);
    m.played_at = Some(Utc::now());
    Ok(())
}

/// Remove a recorded result, making the match unplayed again.
pub fn clear_result(tournament: &mut Tournament, match_id: MatchId) -> TournamentResult<()> {
    ensure_editable(tournament, match_id)?;
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    m.result = None;
    m.played_at = None;
    Ok(())
}

/// A result is locked once a later stage was generated from it.
fn ensure_editable(tournament: &Tournament, match_id: MatchId) -> TournamentResult<()> {
    let m = tournament
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    let locked = match m.phase {
        Phase::Poule => {
            tournament.has_phase(Phase::Knockout) || tournament.has_phase(Phase::Consolation)
        }
        phase => tournament.latest_round(phase).is_some_and(|r| r > m.round),
    };
    if locked {
        return Err(TournamentError::ResultLocked(match_id));
    }
    Ok(())
}

/// Standings of one phase. Poule standings of a poule tournament are per poule;
/// bracket phases cover the teams taking part in them.
pub fn phase_standings(tournament: &Tournament, phase: Phase) -> TournamentResult<Vec<Standing>> {
    match (phase, tournament.variant) {
        (Phase::Poule, TournamentVariant::Poules { .. }) => {
            poule_standings(&tournament.teams, &tournament.poules, &tournament.matches)
        }
        (Phase::Poule, TournamentVariant::RoundRobin) => standings(
            &tournament.teams,
            &tournament.matches,
            Scope::Phase(Phase::Poule),
        ),
        (phase, _) => {
            let referenced: Vec<TeamId> = tournament
                .matches_in(phase)
                .flat_map(|m| [m.team_1, m.team_2])
                .chain(
                    tournament
                        .byes
                        .iter()
                        .filter(|b| b.phase == phase)
                        .map(|b| b.team_id),
                )
                .collect();
            if let Some(&missing) = referenced.iter().find(|id| tournament.team(**id).is_none()) {
                return Err(TournamentError::MissingTeamData(missing));
            }
            let participants: Vec<Team> = tournament
                .teams
                .iter()
                .filter(|t| referenced.contains(&t.id))
                .cloned()
                .collect();
            standings(&participants, &tournament.matches, Scope::Phase(phase))
        }
    }
}

/// Runs tournament operations against a storage collaborator: load, apply, write back.
/// A failed operation writes nothing.
pub struct Orchestrator<S> {
    store: S,
}

impl<S: TournamentStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create(&mut self, tournament: Tournament) -> TournamentResult<TournamentId> {
        let id = self.store.insert(tournament)?;
        log::info!("Created tournament {}", id);
        Ok(id)
    }

    pub fn get(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .get(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn list(&self) -> TournamentResult<Vec<Tournament>> {
        self.store
            .list()?
            .into_iter()
            .map(|id| self.get(id))
            .collect()
    }

    pub fn delete(&mut self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .remove(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn apply<T>(
        &mut self,
        id: TournamentId,
        op: impl FnOnce(&mut Tournament) -> TournamentResult<T>,
    ) -> TournamentResult<T> {
        let mut tournament = self.get(id)?;
        let out = op(&mut tournament)?;
        self.store.update(tournament)?;
        Ok(out)
    }

    pub fn add_team(&mut self, id: TournamentId, team: Team) -> TournamentResult<TeamId> {
        self.apply(id, |t| t.add_team(team))
    }

    /// Add several teams; all or none are added.
    pub fn add_teams(&mut self, id: TournamentId, teams: Vec<Team>) -> TournamentResult<Vec<TeamId>> {
        self.apply(id, |t| teams.into_iter().map(|team| t.add_team(team)).collect())
    }

    pub fn remove_team(&mut self, id: TournamentId, team_id: TeamId) -> TournamentResult<Team> {
        self.apply(id, |t| t.remove_team(team_id))
    }

    /// Randomly reorder the roster before poules are drawn.
    pub fn draw_teams(&mut self, id: TournamentId) -> TournamentResult<Tournament> {
        self.apply(id, |t| {
            t.expect_state(TournamentState::Created)?;
            shuffle_teams(&mut t.teams);
            Ok(t.clone())
        })
    }

    pub fn generate_initial_matches(&mut self, id: TournamentId) -> TournamentResult<Tournament> {
        self.apply(id, |t| generate_initial_matches(t).map(|()| t.clone()))
    }

    pub fn generate_knockout_matches(&mut self, id: TournamentId) -> TournamentResult<Tournament> {
        self.apply(id, |t| generate_knockout_matches(t).map(|()| t.clone()))
    }

    pub fn advance_round(&mut self, id: TournamentId, phase: Phase) -> TournamentResult<u32> {
        self.apply(id, |t| advance_round(t, phase))
    }

    pub fn record_result(
        &mut self,
        id: TournamentId,
        match_id: MatchId,
        result: MatchResult,
    ) -> TournamentResult<GameMatch> {
        self.apply(id, |t| {
            record_result(t, match_id, result)?;
            t.get_match(match_id)
                .cloned()
                .ok_or(TournamentError::MatchNotFound(match_id))
        })
    }

    pub fn clear_result(&mut self, id: TournamentId, match_id: MatchId) -> TournamentResult<()> {
        self.apply(id, |t| clear_result(t, match_id))
    }

    pub fn standings(&self, id: TournamentId, phase: Phase) -> TournamentResult<Vec<Standing>> {
        phase_standings(&self.get(id)?, phase)
    }
}
