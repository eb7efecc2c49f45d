//! Knockout bracket: qualifier selection from poules, first-round seeding and
//! pairing of later rounds.

use crate::logic::standings::{poule_members, standings, Scope};
use crate::models::{
    GameMatch, Phase, Poule, Qualifier, Team, TeamId, TournamentError, TournamentResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One bracket round: who plays whom, who skips the round, who was left over.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub pairings: Vec<(TeamId, TeamId)>,
    /// Teams that go straight to the next round, best seed first.
    pub byes: Vec<TeamId>,
    /// Middle entrant of an odd-sized field. No rule places it, so it does not advance.
    pub unpaired: Option<TeamId>,
}

impl BracketRound {
    /// Unplayed matches for this round.
    pub fn to_matches(&self, phase: Phase, round: u32) -> Vec<GameMatch> {
        self.pairings
            .iter()
            .map(|&(t1, t2)| GameMatch::new(t1, t2, phase).in_round(round))
            .collect()
    }
}

/// Every team's poule finish, best first across all poules.
///
/// Fails with `PrerequisitesNotMet` while any poule match is unplayed. Teams
/// that compare equal keep poule order, then finishing order.
pub fn poule_finishers(
    teams: &[Team],
    poules: &[Poule],
    matches: &[GameMatch],
) -> TournamentResult<Vec<Qualifier>> {
    let pending = matches
        .iter()
        .filter(|m| m.phase == Phase::Poule && !m.is_played())
        .count();
    if pending > 0 {
        return Err(TournamentError::PrerequisitesNotMet(format!(
            "{pending} poule match(es) still to be played"
        )));
    }

    let mut finishers = Vec::with_capacity(teams.len());
    for poule in poules {
        let members = poule_members(teams, poule)?;
        let table = standings(&members, matches, Scope::Poule(&poule.label))?;
        finishers.extend(table.into_iter().enumerate().map(|(i, row)| Qualifier {
            team_id: row.team_id,
            poule: poule.label.clone(),
            poule_rank: i + 1,
            stats: row.stats,
        }));
    }
    finishers.sort_by(|a, b| a.stats.rank_cmp(&b.stats));
    Ok(finishers)
}

/// Top `top_n` of every poule, globally ranked best first.
pub fn select_qualifiers(
    teams: &[Team],
    poules: &[Poule],
    matches: &[GameMatch],
    top_n: usize,
) -> TournamentResult<Vec<Qualifier>> {
    let mut finishers = poule_finishers(teams, poules, matches)?;
    finishers.retain(|q| q.poule_rank <= top_n);
    Ok(finishers)
}

/// First knockout round for globally ranked qualifiers.
///
/// - 4 from 2 poules: A1-B2, B1-A2 (else 1-4, 2-3)
/// - 6: overall 1 and 2 get a bye; 3-6, 4-5
/// - 8 from 4 poules: A1-D2, D1-A2, B1-C2, C1-B2 (else 1-8, 2-7, 3-6, 4-5)
/// - anything else: best against worst, working inwards
pub fn seed(qualifiers: &[Qualifier]) -> BracketRound {
    let ranked: Vec<TeamId> = qualifiers.iter().map(|q| q.team_id).collect();
    match ranked.len() {
        4 => match firsts_and_seconds(qualifiers, 2) {
            Some(p) => BracketRound {
                pairings: vec![(p[0][0], p[1][1]), (p[1][0], p[0][1])],
                ..BracketRound::default()
            },
            None => generate_knockout_round(&ranked),
        },
        6 => BracketRound {
            pairings: vec![(ranked[2], ranked[5]), (ranked[3], ranked[4])],
            byes: vec![ranked[0], ranked[1]],
            unpaired: None,
        },
        8 => match firsts_and_seconds(qualifiers, 4) {
            Some(p) => BracketRound {
                pairings: vec![
                    (p[0][0], p[3][1]),
                    (p[3][0], p[0][1]),
                    (p[1][0], p[2][1]),
                    (p[2][0], p[1][1]),
                ],
                ..BracketRound::default()
            },
            None => generate_knockout_round(&ranked),
        },
        _ => generate_knockout_round(&ranked),
    }
}

/// Pair an ordered field: first against last, second against second-last, …
pub fn generate_knockout_round(entrants: &[TeamId]) -> BracketRound {
    let n = entrants.len();
    if n < 2 {
        return BracketRound::default();
    }
    BracketRound {
        pairings: (0..n / 2).map(|i| (entrants[i], entrants[n - 1 - i])).collect(),
        byes: Vec::new(),
        unpaired: (n % 2 == 1).then(|| entrants[n / 2]),
    }
}

/// `[first, second]` per poule in label order, when the qualifiers come from exactly
/// `num_poules` poules with one first and one second place each.
fn firsts_and_seconds(qualifiers: &[Qualifier], num_poules: usize) -> Option<Vec<[TeamId; 2]>> {
    let mut by_poule: BTreeMap<(usize, &str), [Option<TeamId>; 2]> = BTreeMap::new();
    for q in qualifiers {
        let slot = by_poule.entry((q.poule.len(), q.poule.as_str())).or_default();
        match q.poule_rank {
            1 if slot[0].is_none() => slot[0] = Some(q.team_id),
            2 if slot[1].is_none() => slot[1] = Some(q.team_id),
            _ => return None,
        }
    }
    if by_poule.len() != num_poules {
        return None;
    }
    by_poule
        .into_values()
        .map(|[first, second]| Some([first?, second?]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamStats;
    use uuid::Uuid;

    fn q(poule: &str, rank: usize) -> Qualifier {
        Qualifier {
            team_id: Uuid::new_v4(),
            poule: poule.to_string(),
            poule_rank: rank,
            stats: TeamStats::default(),
        }
    }

    #[test]
    fn four_from_one_poule_falls_back_to_rank_pairing() {
        let qs = vec![q("A", 1), q("A", 2), q("A", 3), q("A", 4)];
        let round = seed(&qs);
        assert_eq!(
            round.pairings,
            vec![(qs[0].team_id, qs[3].team_id), (qs[1].team_id, qs[2].team_id)]
        );
    }

    #[test]
    fn odd_field_reports_middle_entrant() {
        let ids: Vec<TeamId> = (0..5).map(|_| Uuid::new_v4()).collect();
        let round = generate_knockout_round(&ids);
        assert_eq!(round.pairings, vec![(ids[0], ids[4]), (ids[1], ids[3])]);
        assert_eq!(round.unpaired, Some(ids[2]));
    }

    #[test]
    fn fewer_than_two_entrants_make_no_round() {
        assert_eq!(generate_knockout_round(&[Uuid::new_v4()]), BracketRound::default());
    }
}
