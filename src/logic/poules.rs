//! Poule distribution: split N teams into labelled poules of 3 or 4.

use crate::models::{Team, TournamentError, TournamentResult};
use rand::seq::SliceRandom;

/// Fewest teams that can form a poule.
pub const MIN_POULE_SIZE: usize = 3;

/// Distribute `num_teams` into poules of contiguous 0-based team indices.
///
/// With `preferred_size == 4`:
/// 1. 5 teams form a single poule of 5 (the only poule of 5 ever produced).
/// 2. Otherwise take as many poules of 4 as possible.
/// 3. Remainder 1: drop the 4s and split everything into 3s.
/// 4. Remainder 2: give one poule of 4 back so 4 + 2 teams form two poules of 3.
///
/// With `preferred_size == 3` everything is split into 3s. Whenever a block of
/// teams does not divide into 3s, the left-over teams go one each to the trailing
/// poules of that block, which become poules of 4.
pub fn distribute(num_teams: usize, preferred_size: usize) -> TournamentResult<Vec<Vec<usize>>> {
    if num_teams < MIN_POULE_SIZE {
        return Err(TournamentError::InvalidInput(format!(
            "minimum {MIN_POULE_SIZE} teams required, got {num_teams}"
        )));
    }
    if !(3..=4).contains(&preferred_size) {
        return Err(TournamentError::InvalidInput(format!(
            "poule size must be 3 or 4, got {preferred_size}"
        )));
    }
    if num_teams == 5 {
        return Ok(vec![(0..5).collect()]);
    }

    let mut full_poules = if preferred_size == 4 { num_teams / 4 } else { 0 };
    match num_teams % 4 {
        1 if preferred_size == 4 && full_poules > 0 => full_poules = 0,
        2 if preferred_size == 4 && full_poules > 0 => full_poules -= 1,
        _ => {}
    }

    let mut poules: Vec<Vec<usize>> = (0..full_poules)
        .map(|p| (p * 4..p * 4 + 4).collect())
        .collect();
    poules.extend(split_into_threes(full_poules * 4, num_teams));
    Ok(poules)
}

/// Split `start..end` into poules of 3, handing any left-over teams to the last poules.
fn split_into_threes(start: usize, end: usize) -> Vec<Vec<usize>> {
    let count = end - start;
    let num_poules = count / 3;
    if num_poules == 0 {
        return Vec::new();
    }
    let extra = count % 3;
    let mut poules = Vec::with_capacity(num_poules);
    let mut idx = start;
    for p in 0..num_poules {
        let size = if p >= num_poules - extra { 4 } else { 3 };
        poules.push((idx..idx + size).collect());
        idx += size;
    }
    poules
}

/// Poule labels in generation order: A, B, …, Z, AA, AB, …
pub fn poule_labels(num_poules: usize) -> Vec<String> {
    (0..num_poules).map(poule_label).collect()
}

fn poule_label(mut idx: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Random draw of the team order, for clubs that do not seed poules by registration.
pub fn shuffle_teams(teams: &mut [Team]) {
    teams.shuffle(&mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_continue_past_z() {
        let labels = poule_labels(28);
        assert_eq!(labels[0], "A");
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
        assert_eq!(labels[27], "AB");
    }

    #[test]
    fn leftovers_go_to_trailing_poules() {
        let sizes: Vec<_> = distribute(17, 4).unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 3, 4, 4]);
    }

    #[test]
    fn preferred_size_three() {
        assert_eq!(distribute(4, 3).unwrap(), vec![vec![0, 1, 2, 3]]);
        let sizes: Vec<_> = distribute(11, 3).unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 4, 4]);
    }

    #[test]
    fn rejects_unsupported_poule_size() {
        assert!(matches!(distribute(12, 6), Err(TournamentError::InvalidInput(_))));
    }
}
