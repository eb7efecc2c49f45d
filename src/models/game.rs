//! Match (game), per-set scores and match phases.

use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Highest score accepted for one set or for an aggregate result.
pub const MAX_SCORE: u32 = 999;

/// Most sets accepted in one result.
pub const MAX_SETS: usize = 15;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// Stage of the tournament a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Poule,
    Knockout,
    Consolation,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Poule => write!(f, "poule"),
            Phase::Knockout => write!(f, "knockout"),
            Phase::Consolation => write!(f, "consolation"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poule" => Ok(Phase::Poule),
            "knockout" => Ok(Phase::Knockout),
            "consolation" => Ok(Phase::Consolation),
            other => Err(format!("unknown phase '{other}'")),
        }
    }
}

/// Points scored by each side in one set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SetScore(pub u32, pub u32);

impl SetScore {
    /// Side that won this set; equal points is won by neither.
    pub fn winner(&self) -> Option<Side> {
        match self.0.cmp(&self.1) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Recorded outcome of a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchResult {
    /// Sets (or games) won by each team, entered directly.
    Aggregate { team_1: u32, team_2: u32 },
    /// Ordered per-set points; set wins are derived from them.
    Sets { sets: Vec<SetScore> },
}

impl MatchResult {
    pub fn sets(sets: impl Into<Vec<SetScore>>) -> Self {
        MatchResult::Sets { sets: sets.into() }
    }

    pub fn aggregate(team_1: u32, team_2: u32) -> Self {
        MatchResult::Aggregate { team_1, team_2 }
    }

    /// A set list counts as a result only when it is non-empty.
    pub fn is_complete(&self) -> bool {
        match self {
            MatchResult::Aggregate { .. } => true,
            MatchResult::Sets { sets } => !sets.is_empty(),
        }
    }

    /// Reject scores outside `MAX_SCORE` / `MAX_SETS`.
    pub fn check_bounds(&self) -> Result<(), String> {
        let too_high = |a: u32, b: u32| a > MAX_SCORE || b > MAX_SCORE;
        match self {
            MatchResult::Aggregate { team_1, team_2 } if too_high(*team_1, *team_2) => {
                Err(format!("scores above {MAX_SCORE} are not accepted"))
            }
            MatchResult::Sets { sets } if sets.len() > MAX_SETS => {
                Err(format!("at most {MAX_SETS} sets are accepted"))
            }
            MatchResult::Sets { sets } if sets.iter().any(|s| too_high(s.0, s.1)) => {
                Err(format!("set scores above {MAX_SCORE} are not accepted"))
            }
            _ => Ok(()),
        }
    }

    /// Sets won by (team 1, team 2). For aggregate results this is the score itself.
    pub fn set_wins(&self) -> (u32, u32) {
        match self {
            MatchResult::Aggregate { team_1, team_2 } => (*team_1, *team_2),
            MatchResult::Sets { sets } => sets.iter().fold((0, 0), |(w1, w2), s| match s.winner() {
                Some(Side::One) => (w1 + 1, w2),
                Some(Side::Two) => (w1, w2 + 1),
                None => (w1, w2),
            }),
        }
    }

    /// Rally points for (team 1, team 2). Aggregate results have no separate point
    /// axis, so the score doubles as points.
    pub fn points(&self) -> (u32, u32) {
        match self {
            MatchResult::Aggregate { team_1, team_2 } => (*team_1, *team_2),
            MatchResult::Sets { sets } => sets
                .iter()
                .fold((0u32, 0u32), |(p1, p2), s| (p1.saturating_add(s.0), p2.saturating_add(s.1))),
        }
    }

    /// Side with strictly more set wins; `None` on a tie.
    pub fn winner(&self) -> Option<Side> {
        let (w1, w2) = self.set_wins();
        SetScore(w1, w2).winner()
    }
}

/// A single match between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub phase: Phase,
    /// Poule label for poule matches of a poule-based tournament.
    pub poule: Option<String>,
    /// Bracket round (1-based). Poule matches are all round 1.
    pub round: u32,
    pub team_1: TeamId,
    pub team_2: TeamId,
    /// None if not yet played.
    pub result: Option<MatchResult>,
    pub played_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(team_1: TeamId, team_2: TeamId, phase: Phase) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase,
            poule: None,
            round: 1,
            team_1,
            team_2,
            result: None,
            played_at: None,
        }
    }

    pub fn in_poule(mut self, label: impl Into<String>) -> Self {
        self.poule = Some(label.into());
        self
    }

    pub fn in_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn is_played(&self) -> bool {
        self.result.as_ref().is_some_and(MatchResult::is_complete)
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::One => self.team_1,
            Side::Two => self.team_2,
        }
    }

    /// Winning team, if played and not tied.
    pub fn winner(&self) -> Option<TeamId> {
        if !self.is_played() {
            return None;
        }
        self.result.as_ref()?.winner().map(|s| self.team(s))
    }

    /// Losing team, if played and not tied.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner()?;
        Some(if winner == self.team_1 { self.team_2 } else { self.team_1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_wins_ignore_drawn_sets() {
        let r = MatchResult::sets(vec![SetScore(11, 7), SetScore(9, 11), SetScore(10, 10), SetScore(11, 4)]);
        assert_eq!(r.set_wins(), (2, 1));
        assert_eq!(r.points(), (41, 32));
        assert_eq!(r.winner(), Some(Side::One));
    }

    #[test]
    fn empty_set_list_is_not_played() {
        let mut m = GameMatch::new(Uuid::new_v4(), Uuid::new_v4(), Phase::Poule);
        m.result = Some(MatchResult::sets(Vec::new()));
        assert!(!m.is_played());
        assert_eq!(m.winner(), None);
    }

    #[test]
    fn tied_aggregate_has_no_winner_or_loser() {
        let mut m = GameMatch::new(Uuid::new_v4(), Uuid::new_v4(), Phase::Poule);
        m.result = Some(MatchResult::aggregate(3, 3));
        assert!(m.is_played());
        assert_eq!(m.winner(), None);
        assert_eq!(m.loser(), None);
    }

    #[test]
    fn bounds_reject_oversized_scores() {
        assert!(MatchResult::sets(vec![SetScore(11, 9)]).check_bounds().is_ok());
        assert!(MatchResult::sets(vec![SetScore(u32::MAX, 0)]).check_bounds().is_err());
        assert!(MatchResult::sets(vec![SetScore(11, 0); MAX_SETS + 1]).check_bounds().is_err());
        assert!(MatchResult::aggregate(0, MAX_SCORE + 1).check_bounds().is_err());
    }

    #[test]
    fn points_saturate_instead_of_overflowing() {
        let r = MatchResult::sets(vec![SetScore(u32::MAX, 0), SetScore(11, 0)]);
        assert_eq!(r.points(), (u32::MAX, 0));
    }

    #[test]
    fn phase_parses_case_insensitively() {
        assert_eq!("Knockout".parse::<Phase>(), Ok(Phase::Knockout));
        assert!("final".parse::<Phase>().is_err());
    }
}
