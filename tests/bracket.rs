//! Integration tests for qualifier selection and knockout seeding.

use club_tournament::{
    build_poules, generate_knockout_round, schedule_poules, seed, select_qualifiers, MatchResult,
    Qualifier, Team, TeamId, TeamStats, TournamentError,
};

fn qualifier(poule: &str, rank: usize, wins: u32) -> Qualifier {
    Qualifier {
        team_id: Team::single(format!("{poule}{rank}")).id,
        poule: poule.to_string(),
        poule_rank: rank,
        stats: TeamStats {
            wins,
            ..TeamStats::default()
        },
    }
}

fn ids(qs: &[Qualifier]) -> Vec<TeamId> {
    qs.iter().map(|q| q.team_id).collect()
}

#[test]
fn four_qualifiers_cross_two_poules() {
    // Globally ranked: A1, B1, A2, B2.
    let qs = vec![
        qualifier("A", 1, 3),
        qualifier("B", 1, 2),
        qualifier("A", 2, 2),
        qualifier("B", 2, 1),
    ];
    let (a1, b1, a2, b2) = (qs[0].team_id, qs[1].team_id, qs[2].team_id, qs[3].team_id);
    let round = seed(&qs);
    assert_eq!(round.pairings, vec![(a1, b2), (b1, a2)]);
    assert!(round.byes.is_empty());
    assert_eq!(round.unpaired, None);
}

#[test]
fn six_qualifiers_give_top_two_a_bye() {
    let qs: Vec<Qualifier> = ["A", "B", "C", "A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, p)| qualifier(p, if i < 3 { 1 } else { 2 }, 6 - i as u32))
        .collect();
    let r = ids(&qs);
    let round = seed(&qs);
    assert_eq!(round.byes, vec![r[0], r[1]]);
    assert_eq!(round.pairings, vec![(r[2], r[5]), (r[3], r[4])]);
}

#[test]
fn eight_qualifiers_cross_four_poules() {
    let qs = vec![
        qualifier("C", 1, 3),
        qualifier("A", 1, 3),
        qualifier("D", 1, 3),
        qualifier("B", 1, 2),
        qualifier("B", 2, 2),
        qualifier("D", 2, 1),
        qualifier("A", 2, 1),
        qualifier("C", 2, 0),
    ];
    let find = |p: &str, rank: usize| {
        qs.iter()
            .find(|q| q.poule == p && q.poule_rank == rank)
            .map(|q| q.team_id)
            .unwrap()
    };
    let round = seed(&qs);
    assert_eq!(
        round.pairings,
        vec![
            (find("A", 1), find("D", 2)),
            (find("D", 1), find("A", 2)),
            (find("B", 1), find("C", 2)),
            (find("C", 1), find("B", 2)),
        ]
    );
    // Nobody meets a team from their own poule.
    for (t1, t2) in &round.pairings {
        let p1 = &qs.iter().find(|q| q.team_id == *t1).unwrap().poule;
        let p2 = &qs.iter().find(|q| q.team_id == *t2).unwrap().poule;
        assert_ne!(p1, p2);
    }
}

#[test]
fn eight_qualifiers_without_clean_poules_pair_by_rank() {
    let qs: Vec<Qualifier> = (0..8).map(|i| qualifier("A", i + 1, 8 - i as u32)).collect();
    let r = ids(&qs);
    let round = seed(&qs);
    assert_eq!(
        round.pairings,
        vec![(r[0], r[7]), (r[1], r[6]), (r[2], r[5]), (r[3], r[4])]
    );
}

#[test]
fn generic_fallback_for_other_counts() {
    let qs: Vec<Qualifier> = ["A", "B", "C", "D", "E", "A", "B", "C", "D", "E"]
        .iter()
        .enumerate()
        .map(|(i, p)| qualifier(p, if i < 5 { 1 } else { 2 }, 10 - i as u32))
        .collect();
    let r = ids(&qs);
    let round = seed(&qs);
    assert_eq!(round.pairings.len(), 5);
    assert_eq!(round.pairings[0], (r[0], r[9]));
    assert_eq!(round.pairings[4], (r[4], r[5]));
    assert_eq!(round.unpaired, None);
}

#[test]
fn later_rounds_pair_top_and_bottom_halves() {
    let winners: Vec<TeamId> = (0..4).map(|i| Team::single(format!("W{i}")).id).collect();
    let round = generate_knockout_round(&winners);
    assert_eq!(
        round.pairings,
        vec![(winners[0], winners[3]), (winners[1], winners[2])]
    );
}

#[test]
fn qualifiers_need_all_poule_matches_played() {
    let teams: Vec<Team> = (0..8).map(|i| Team::single(format!("P{i}"))).collect();
    let poules = build_poules(&teams, 4).unwrap();
    let mut matches = schedule_poules(&poules);
    assert!(matches!(
        select_qualifiers(&teams, &poules, &matches, 2),
        Err(TournamentError::PrerequisitesNotMet(_))
    ));

    // Lower team index always wins: 3-0 in poule A, 2-0 in poule B.
    for m in &mut matches {
        let margin = if m.poule.as_deref() == Some("A") { 3 } else { 2 };
        m.result = Some(MatchResult::aggregate(margin, 0));
    }
    let qs = select_qualifiers(&teams, &poules, &matches, 2).unwrap();
    assert_eq!(qs.len(), 4);
    // Both poule winners have 3 wins; A1 has the better balance.
    assert_eq!(qs[0].team_id, teams[0].id);
    assert_eq!(qs[1].team_id, teams[4].id);
    assert_eq!((qs[2].poule.as_str(), qs[2].poule_rank), ("A", 2));
    assert_eq!((qs[3].poule.as_str(), qs[3].poule_rank), ("B", 2));

    let round = seed(&qs);
    assert_eq!(
        round.pairings,
        vec![(teams[0].id, teams[5].id), (teams[4].id, teams[1].id)]
    );
}
