//! Single binary web server: JSON REST API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT (see `ServerConfig`).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use club_tournament::config::ServerConfig;
use club_tournament::export::{import_teams_csv, write_standings_csv};
use club_tournament::{
    MatchId, MatchResult, MemoryStore, Orchestrator, Phase, Sport, Team, TeamId, TeamKind,
    Tournament, TournamentError, TournamentId, TournamentState, TournamentVariant,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Engine plus last activity per tournament (for auto-cleanup).
struct AppInner {
    orchestrator: Orchestrator<MemoryStore>,
    last_activity: HashMap<TournamentId, Instant>,
}

/// In-memory state shared by all workers; the write lock serializes every mutation.
type AppState = Data<RwLock<AppInner>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Tournament with its derived state, as returned by the API.
#[derive(Serialize)]
struct TournamentView {
    #[serde(flatten)]
    tournament: Tournament,
    state: TournamentState,
}

impl From<Tournament> for TournamentView {
    fn from(tournament: Tournament) -> Self {
        let state = tournament.state();
        Self { tournament, state }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Format {
    #[default]
    Poules,
    RoundRobin,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    sport: Sport,
    #[serde(default)]
    team_kind: TeamKind,
    #[serde(default)]
    format: Format,
    teams_per_poule: Option<usize>,
    qualifiers_per_poule: Option<usize>,
    #[serde(default)]
    consolation: bool,
}

fn default_name() -> String {
    "Club tournament".to_string()
}

#[derive(Deserialize)]
struct AddTeamBody {
    player_1: String,
    player_2: Option<String>,
}

#[derive(Deserialize)]
struct StandingsQuery {
    #[serde(default = "default_phase")]
    phase: String,
}

fn default_phase() -> String {
    "poule".to_string()
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct TournamentPhasePath {
    id: TournamentId,
    phase: String,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_) => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn parse_phase(raw: &str) -> Result<Phase, TournamentError> {
    raw.parse().map_err(TournamentError::InvalidInput)
}

/// Run `op` under the write lock; a successful call refreshes the tournament's activity time.
fn with_engine<F>(state: &AppState, id: TournamentId, op: F) -> HttpResponse
where
    F: FnOnce(&mut Orchestrator<MemoryStore>) -> Result<HttpResponse, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match op(&mut g.orchestrator) {
        Ok(resp) => {
            g.last_activity.insert(id, Instant::now());
            resp
        }
        Err(e) => error_response(&e),
    }
}

fn tournament_json(t: Tournament) -> HttpResponse {
    HttpResponse::Ok().json(TournamentView::from(t))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "club-tournament",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    config: Data<ServerConfig>,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let variant = match body.format {
        Format::Poules => TournamentVariant::poules(
            body.teams_per_poule.unwrap_or(config.teams_per_poule),
            body.qualifiers_per_poule.unwrap_or(config.qualifiers_per_poule),
            body.consolation,
        ),
        Format::RoundRobin => TournamentVariant::RoundRobin,
    };
    let tournament = Tournament::new(body.name.trim(), body.sport, body.team_kind, variant);
    let id = tournament.id;
    with_engine(&state, id, |engine| {
        engine.create(tournament)?;
        engine.get(id).map(tournament_json)
    })
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.orchestrator.list() {
        Ok(all) => HttpResponse::Ok().json(all.into_iter().map(TournamentView::from).collect::<Vec<_>>()),
        Err(e) => error_response(&e),
    }
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| engine.get(path.id).map(tournament_json))
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let resp = with_engine(&state, path.id, |engine| {
        engine.delete(path.id)?;
        Ok(HttpResponse::NoContent().finish())
    });
    if let Ok(mut g) = state.write() {
        g.last_activity.remove(&path.id);
    }
    resp
}

/// Add a team (tournament must have no matches yet).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let body = body.into_inner();
    let team = match body.player_2 {
        Some(p2) if !p2.trim().is_empty() => Team::pair(body.player_1, p2),
        _ => Team::single(body.player_1),
    };
    with_engine(&state, path.id, |engine| {
        engine.add_team(path.id, team)?;
        engine.get(path.id).map(tournament_json)
    })
}

/// Add teams from a CSV body of `player_1[,player_2]` rows; all or nothing.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    let teams = match import_teams_csv(body.as_bytes()) {
        Ok(teams) => teams,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    with_engine(&state, path.id, |engine| {
        engine.add_teams(path.id, teams)?;
        engine.get(path.id).map(tournament_json)
    })
}

/// Random draw of the team order before poules are made.
#[post("/api/tournaments/{id}/teams/draw")]
async fn api_draw_teams(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| engine.draw_teams(path.id).map(tournament_json))
}

#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        engine.remove_team(path.id, path.team_id)?;
        engine.get(path.id).map(tournament_json)
    })
}

/// Generate poule (or round-robin) matches.
#[post("/api/tournaments/{id}/matches/generate")]
async fn api_generate_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        engine.generate_initial_matches(path.id).map(tournament_json)
    })
}

#[put("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<MatchResult>,
) -> HttpResponse {
    let result = body.into_inner();
    with_engine(&state, path.id, |engine| {
        let m = engine.record_result(path.id, path.match_id, result)?;
        Ok(HttpResponse::Ok().json(m))
    })
}

#[delete("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_clear_result(state: AppState, path: Path<TournamentMatchPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        engine.clear_result(path.id, path.match_id)?;
        engine.get(path.id).map(tournament_json)
    })
}

/// Generate the knockout bracket (all poule matches must be played).
#[post("/api/tournaments/{id}/knockout/generate")]
async fn api_generate_knockout(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        engine.generate_knockout_matches(path.id).map(tournament_json)
    })
}

/// Generate the next round of the knockout or consolation bracket.
#[post("/api/tournaments/{id}/rounds/{phase}/advance")]
async fn api_advance_round(state: AppState, path: Path<TournamentPhasePath>) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        let phase = parse_phase(&path.phase)?;
        engine.advance_round(path.id, phase)?;
        engine.get(path.id).map(tournament_json)
    })
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        let phase = parse_phase(&query.phase)?;
        let table = engine.standings(path.id, phase)?;
        Ok(HttpResponse::Ok().json(table))
    })
}

#[get("/api/tournaments/{id}/standings.csv")]
async fn api_standings_csv(
    state: AppState,
    path: Path<TournamentPath>,
    query: Query<StandingsQuery>,
) -> HttpResponse {
    with_engine(&state, path.id, |engine| {
        let phase = parse_phase(&query.phase)?;
        let table = engine.standings(path.id, phase)?;
        let mut buf = Vec::new();
        if let Err(e) = write_standings_csv(&mut buf, &table) {
            log::error!("Standings export failed: {}", e);
            return Ok(HttpResponse::InternalServerError().body("export error"));
        }
        Ok(HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(buf))
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(AppInner {
        orchestrator: Orchestrator::new(MemoryStore::new()),
        last_activity: HashMap::new(),
    }));

    // Background task: every 30 minutes, remove tournaments idle past the configured timeout
    let state_cleanup = state.clone();
    let timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let idle: Vec<TournamentId> = g
                .last_activity
                .iter()
                .filter(|(_, seen)| seen.elapsed() >= timeout)
                .map(|(id, _)| *id)
                .collect();
            for id in &idle {
                g.last_activity.remove(id);
                if let Err(e) = g.orchestrator.delete(*id) {
                    log::warn!("Cleanup of tournament {} failed: {}", id, e);
                }
            }
            if !idle.is_empty() {
                log::info!("Cleaned up {} inactive tournament(s)", idle.len());
            }
        }
    });

    let config = Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_add_team)
            .service(api_import_teams)
            .service(api_draw_teams)
            .service(api_remove_team)
            .service(api_generate_matches)
            .service(api_record_result)
            .service(api_clear_result)
            .service(api_generate_knockout)
            .service(api_advance_round)
    })
    .bind(bind)?
    .run()
    .await
}
