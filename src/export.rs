//! CSV roster import and standings export.

use crate::models::{Standing, Team};
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid roster row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Read teams from `player_1[,player_2]` rows. A leading `player_1,...` header
/// row and blank rows are skipped. Rows are numbered from 1 in errors.
pub fn import_teams_csv<R: Read>(reader: R) -> Result<Vec<Team>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut teams = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let fields: Vec<&str> = record.iter().collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if row == 1 && fields[0].eq_ignore_ascii_case("player_1") {
            continue;
        }
        if fields.iter().skip(2).any(|f| !f.is_empty()) {
            return Err(ExportError::InvalidRow {
                row,
                reason: "a team has at most two players".to_string(),
            });
        }
        let team = match (fields[0], fields.get(1).copied().unwrap_or("")) {
            ("", _) => {
                return Err(ExportError::InvalidRow {
                    row,
                    reason: "first player is missing".to_string(),
                })
            }
            (p1, "") => Team::single(p1),
            (p1, p2) => Team::pair(p1, p2),
        };
        teams.push(team);
    }
    Ok(teams)
}

#[derive(Serialize)]
struct StandingRow<'a> {
    rank: usize,
    poule: &'a str,
    team: &'a str,
    wins: u32,
    losses: u32,
    draws: u32,
    sets_for: u32,
    sets_against: u32,
    points_for: u32,
    points_against: u32,
    balance: i64,
}

/// Write a standings table. Ranks restart at 1 for every poule.
pub fn write_standings_csv<W: Write>(writer: W, standings: &[Standing]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rank = 0;
    let mut current_poule: Option<&str> = None;
    for s in standings {
        let poule = s.poule.as_deref();
        if rank == 0 || poule != current_poule {
            rank = 0;
            current_poule = poule;
        }
        rank += 1;
        wtr.serialize(StandingRow {
            rank,
            poule: poule.unwrap_or(""),
            team: &s.team_name,
            wins: s.stats.wins,
            losses: s.stats.losses,
            draws: s.stats.draws,
            sets_for: s.stats.sets_won,
            sets_against: s.stats.sets_lost,
            points_for: s.stats.points_for,
            points_against: s.stats.points_against,
            balance: s.stats.sets_balance(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
