//! Derived statistics: TeamStats, Standing and Qualifier. Never stored.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Statistics for one team within one scope (poule, phase or tournament).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl TeamStats {
    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn sets_balance(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn points_balance(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }

    /// Ranking order, best first: wins, then sets balance, then points balance.
    /// `Ordering::Less` means `self` ranks above `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .wins
            .cmp(&self.wins)
            .then_with(|| other.sets_balance().cmp(&self.sets_balance()))
            .then_with(|| other.points_balance().cmp(&self.points_balance()))
    }
}

/// One row of a standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub team_name: String,
    /// Poule label when the row belongs to a per-poule table.
    pub poule: Option<String>,
    pub stats: TeamStats,
}

/// A team promoted from poule play into the knockout bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Qualifier {
    pub team_id: TeamId,
    pub poule: String,
    /// 1-based finishing position inside its poule.
    pub poule_rank: usize,
    pub stats: TeamStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(wins: u32, sets: (u32, u32), points: (u32, u32)) -> TeamStats {
        TeamStats {
            wins,
            sets_won: sets.0,
            sets_lost: sets.1,
            points_for: points.0,
            points_against: points.1,
            ..TeamStats::default()
        }
    }

    #[test]
    fn wins_dominate_balance() {
        let a = stats(2, (4, 4), (0, 0));
        let b = stats(1, (9, 0), (99, 0));
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
    }

    #[test]
    fn points_balance_breaks_sets_tie() {
        let a = stats(1, (3, 2), (50, 40));
        let b = stats(1, (4, 3), (50, 45));
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
        assert_eq!(a.rank_cmp(&a), Ordering::Equal);
    }
}
