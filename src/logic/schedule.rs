//! Round-robin match generation, within a poule or across a whole roster.

use crate::logic::poules::{distribute, poule_labels};
use crate::models::{GameMatch, Phase, Poule, Team, TeamId, TournamentResult};

/// Every unordered pair of `teams` exactly once, unplayed, in (i, j) order for i < j.
pub fn round_robin(teams: &[TeamId], phase: Phase, poule: Option<&str>) -> Vec<GameMatch> {
    let mut matches = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for (i, &team_1) in teams.iter().enumerate() {
        for &team_2 in &teams[i + 1..] {
            let m = GameMatch::new(team_1, team_2, phase);
            matches.push(match poule {
                Some(label) => m.in_poule(label),
                None => m,
            });
        }
    }
    matches
}

/// Split `teams` (in the given order) into labelled poules.
pub fn build_poules(teams: &[Team], preferred_size: usize) -> TournamentResult<Vec<Poule>> {
    let distribution = distribute(teams.len(), preferred_size)?;
    let labels = poule_labels(distribution.len());
    Ok(distribution
        .into_iter()
        .zip(labels)
        .map(|(indices, label)| Poule {
            label,
            teams: indices.into_iter().map(|i| teams[i].id).collect(),
        })
        .collect())
}

/// All poule-phase matches for the given poules, poule by poule.
pub fn schedule_poules(poules: &[Poule]) -> Vec<GameMatch> {
    poules
        .iter()
        .flat_map(|p| round_robin(&p.teams, Phase::Poule, Some(&p.label)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poules_follow_team_order() {
        let teams: Vec<Team> = (0..7).map(|i| Team::single(format!("P{i}"))).collect();
        let poules = build_poules(&teams, 4).unwrap();
        assert_eq!(poules.len(), 2);
        assert_eq!(poules[0].label, "A");
        assert_eq!(poules[1].label, "B");
        assert_eq!(poules[1].teams, vec![teams[4].id, teams[5].id, teams[6].id]);
        assert_eq!(schedule_poules(&poules).len(), 6 + 3);
    }

    #[test]
    fn single_team_has_no_matches() {
        let only = Team::single("Solo");
        assert!(round_robin(&[only.id], Phase::Poule, None).is_empty());
    }
}
