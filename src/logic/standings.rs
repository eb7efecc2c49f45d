//! Standings: aggregate played matches into ranked per-team statistics.
//!
//! Ranking is wins, then sets balance, then points balance (best first). Teams
//! equal on all three keep their roster order.

use crate::models::{
    GameMatch, Phase, Poule, Side, Standing, Team, TeamId, TeamStats, TournamentError,
    TournamentResult,
};
use std::collections::HashMap;

/// Which matches a standings table covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope<'a> {
    /// Poule-phase matches carrying this label.
    Poule(&'a str),
    /// Every match of one phase.
    Phase(Phase),
    /// Every match of the tournament.
    Tournament,
}

impl Scope<'_> {
    fn contains(&self, m: &GameMatch) -> bool {
        match self {
            Scope::Poule(label) => m.phase == Phase::Poule && m.poule.as_deref() == Some(*label),
            Scope::Phase(phase) => m.phase == *phase,
            Scope::Tournament => true,
        }
    }

    fn poule_label(&self) -> Option<String> {
        match self {
            Scope::Poule(label) => Some(label.to_string()),
            _ => None,
        }
    }
}

/// Ranked standings of `teams` over the matches in `scope`.
///
/// Every in-scope match must reference teams from `teams`; otherwise
/// `MissingTeamData` is returned. Unplayed matches are ignored.
pub fn standings(
    teams: &[Team],
    matches: &[GameMatch],
    scope: Scope<'_>,
) -> TournamentResult<Vec<Standing>> {
    let index: HashMap<TeamId, usize> = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
    let mut stats = vec![TeamStats::default(); teams.len()];

    for m in matches.iter().filter(|m| scope.contains(m)) {
        let i1 = *index.get(&m.team_1).ok_or(TournamentError::MissingTeamData(m.team_1))?;
        let i2 = *index.get(&m.team_2).ok_or(TournamentError::MissingTeamData(m.team_2))?;
        let Some(result) = m.result.as_ref().filter(|_| m.is_played()) else {
            continue;
        };
        let (sets_1, sets_2) = result.set_wins();
        let (points_1, points_2) = result.points();
        add_match(&mut stats[i1], (sets_1, sets_2), (points_1, points_2));
        add_match(&mut stats[i2], (sets_2, sets_1), (points_2, points_1));
        match result.winner() {
            Some(Side::One) => {
                stats[i1].wins += 1;
                stats[i2].losses += 1;
            }
            Some(Side::Two) => {
                stats[i2].wins += 1;
                stats[i1].losses += 1;
            }
            None => {
                stats[i1].draws += 1;
                stats[i2].draws += 1;
            }
        }
    }

    let poule = scope.poule_label();
    let mut table: Vec<Standing> = teams
        .iter()
        .zip(stats)
        .map(|(team, stats)| Standing {
            team_id: team.id,
            team_name: team.display_name(),
            poule: poule.clone(),
            stats,
        })
        .collect();
    // Stable: fully tied teams keep roster order.
    table.sort_by(|a, b| a.stats.rank_cmp(&b.stats));
    Ok(table)
}

fn add_match(stats: &mut TeamStats, sets: (u32, u32), points: (u32, u32)) {
    stats.sets_won = stats.sets_won.saturating_add(sets.0);
    stats.sets_lost = stats.sets_lost.saturating_add(sets.1);
    stats.points_for = stats.points_for.saturating_add(points.0);
    stats.points_against = stats.points_against.saturating_add(points.1);
}

/// Each poule's standings, ranked independently and concatenated in label order.
pub fn poule_standings(
    teams: &[Team],
    poules: &[Poule],
    matches: &[GameMatch],
) -> TournamentResult<Vec<Standing>> {
    let mut sorted: Vec<&Poule> = poules.iter().collect();
    sorted.sort_by(|a, b| (a.label.len(), &a.label).cmp(&(b.label.len(), &b.label)));

    let mut all = Vec::with_capacity(teams.len());
    for poule in sorted {
        let members = poule_members(teams, poule)?;
        all.extend(standings(&members, matches, Scope::Poule(&poule.label))?);
    }
    Ok(all)
}

/// Team records of a poule, in poule order.
pub(crate) fn poule_members(teams: &[Team], poule: &Poule) -> TournamentResult<Vec<Team>> {
    poule
        .teams
        .iter()
        .map(|id| {
            teams
                .iter()
                .find(|t| t.id == *id)
                .cloned()
                .ok_or(TournamentError::MissingTeamData(*id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchResult, SetScore};

    #[test]
    fn knockout_scope_ignores_poule_matches() {
        let a = Team::single("A");
        let b = Team::single("B");
        let mut poule = GameMatch::new(a.id, b.id, Phase::Poule).in_poule("A");
        poule.result = Some(MatchResult::aggregate(2, 0));
        let mut ko = GameMatch::new(a.id, b.id, Phase::Knockout);
        ko.result = Some(MatchResult::sets(vec![SetScore(5, 11), SetScore(6, 11), SetScore(4, 11)]));

        let table = standings(&[a.clone(), b.clone()], &[poule, ko], Scope::Phase(Phase::Knockout)).unwrap();
        assert_eq!(table[0].team_id, b.id);
        assert_eq!(table[0].stats.wins, 1);
        assert_eq!(table[0].stats.points_for, 33);
        assert_eq!(table[1].stats.sets_lost, 3);
    }
}
