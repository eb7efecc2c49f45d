//! Integration tests for poule distribution and round-robin scheduling.

use club_tournament::{distribute, round_robin, Phase, Team, TeamId, TournamentError};
use proptest::prelude::*;
use std::collections::HashSet;

fn team_ids(n: usize) -> Vec<TeamId> {
    (0..n).map(|i| Team::single(format!("P{i}")).id).collect()
}

#[test]
fn distribute_requires_at_least_3_teams() {
    for n in 0..3 {
        assert!(matches!(distribute(n, 4), Err(TournamentError::InvalidInput(_))));
    }
}

#[test]
fn distribute_known_sizes() {
    assert_eq!(distribute(3, 4).unwrap(), vec![vec![0, 1, 2]]);
    assert_eq!(distribute(4, 4).unwrap(), vec![vec![0, 1, 2, 3]]);
    assert_eq!(distribute(5, 4).unwrap(), vec![vec![0, 1, 2, 3, 4]]);
    assert_eq!(distribute(6, 4).unwrap(), vec![vec![0, 1, 2], vec![3, 4, 5]]);
    assert_eq!(distribute(7, 4).unwrap(), vec![vec![0, 1, 2, 3], vec![4, 5, 6]]);
    assert_eq!(distribute(8, 4).unwrap(), vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    assert_eq!(
        distribute(9, 4).unwrap(),
        vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]
    );
    assert_eq!(
        distribute(10, 4).unwrap(),
        vec![vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]
    );
}

#[test]
fn distribute_13_keeps_poules_of_three_and_four() {
    let sizes: Vec<usize> = distribute(13, 4).unwrap().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 4]);
}

#[test]
fn distribute_is_deterministic() {
    for n in 3..40 {
        assert_eq!(distribute(n, 4).unwrap(), distribute(n, 4).unwrap());
    }
}

#[test]
fn round_robin_pairs_every_team_once() {
    let ids = team_ids(4);
    let matches = round_robin(&ids, Phase::Poule, Some("A"));
    assert_eq!(matches.len(), 6);
    assert!(matches.iter().all(|m| !m.is_played()));
    assert!(matches.iter().all(|m| m.poule.as_deref() == Some("A")));
    assert_eq!((matches[0].team_1, matches[0].team_2), (ids[0], ids[1]));
    assert_eq!((matches[5].team_1, matches[5].team_2), (ids[2], ids[3]));
}

proptest! {
    #[test]
    fn distribution_sizes_and_coverage(n in 3usize..40) {
        let poules = distribute(n, 4).unwrap();
        let sizes: Vec<usize> = poules.iter().map(Vec::len).collect();
        if n == 5 {
            prop_assert_eq!(&sizes, &vec![5]);
        } else {
            prop_assert!(sizes.iter().all(|s| *s == 3 || *s == 4), "sizes {:?} for {}", sizes, n);
        }
        prop_assert_eq!(sizes.iter().sum::<usize>(), n);

        // Contiguous, every index exactly once.
        let flat: Vec<usize> = poules.into_iter().flatten().collect();
        prop_assert_eq!(flat, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn round_robin_has_every_unordered_pair_once(n in 0usize..12) {
        let ids = team_ids(n);
        let matches = round_robin(&ids, Phase::Poule, None);
        prop_assert_eq!(matches.len(), n * n.saturating_sub(1) / 2);

        let mut seen = HashSet::new();
        for m in &matches {
            prop_assert_ne!(m.team_1, m.team_2);
            let key = if m.team_1 < m.team_2 { (m.team_1, m.team_2) } else { (m.team_2, m.team_1) };
            prop_assert!(seen.insert(key));
        }
    }
}
