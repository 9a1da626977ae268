use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::config::Config;
use crate::ingest::IngestService;
use tally_core::{LeaderboardEngine, compute_leaderboard};
use tally_persistence::{AliasRepository, ResultRepository};
use tally_types::{
    AliasUpdate, DisplayNameUpdate, PlayerStats, SummarySubmission, TallyError,
};

pub mod config;
pub mod ingest;

/// Upper bound for `GET /leaderboard?limit=`
pub const MAX_LEADERBOARD_LIMIT: u64 = 100;

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<u64>,
}

fn error_reply(error: TallyError, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": error })),
        status,
    )
}

fn internal_error(message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    error_reply(
        TallyError::InternalError {
            message: message.to_string(),
        },
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

pub fn create_routes(
    config: Arc<Config>,
    ingest_service: Arc<IngestService>,
    result_repository: Arc<ResultRepository>,
    alias_repository: Arc<AliasRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let config_filter = warp::any().map({
        let config = config.clone();
        move || config.clone()
    });

    let ingest_filter = warp::any().map({
        let ingest_service = ingest_service.clone();
        move || ingest_service.clone()
    });

    let result_repository_filter = warp::any().map({
        let result_repository = result_repository.clone();
        move || result_repository.clone()
    });

    let alias_repository_filter = warp::any().map({
        let alias_repository = alias_repository.clone();
        move || alias_repository.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Summary ingestion endpoint
    let summaries = warp::path("summaries")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<SummarySubmission>())
        .and(ingest_filter.clone())
        .and_then(handle_summary_submission);

    // Leaderboard endpoint
    let leaderboard = warp::path("leaderboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<LeaderboardQuery>())
        .and(config_filter.clone())
        .and(result_repository_filter.clone())
        .and_then(handle_leaderboard_request);

    // Player stats endpoint
    let player_stats = warp::path!("players" / String / "stats")
        .and(warp::get())
        .and(result_repository_filter.clone())
        .and_then(handle_player_stats_request);

    let display_name = warp::path!("players" / String / "name")
        .and(warp::put())
        .and(warp::body::json::<DisplayNameUpdate>())
        .and(result_repository_filter.clone())
        .and(ingest_filter.clone())
        .and_then(handle_display_name_update);

    let list_aliases = warp::path("aliases")
        .and(warp::path::end())
        .and(warp::get())
        .and(alias_repository_filter.clone())
        .and_then(handle_list_aliases);

    let set_alias = warp::path("aliases")
        .and(warp::path::end())
        .and(warp::put())
        .and(warp::body::json::<AliasUpdate>())
        .and(alias_repository_filter.clone())
        .and(ingest_filter.clone())
        .and_then(handle_set_alias);

    let refresh_aliases = warp::path!("aliases" / "refresh")
        .and(warp::post())
        .and(ingest_filter.clone())
        .and_then(handle_refresh_aliases);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "PUT"]);

    health
        .or(summaries)
        .or(leaderboard)
        .or(player_stats)
        .or(display_name)
        .or(list_aliases)
        .or(set_alias)
        .or(refresh_aliases)
        .with(cors)
        .with(warp::log("wordle_tally"))
}

async fn handle_summary_submission(
    submission: SummarySubmission,
    ingest_service: Arc<IngestService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let today = chrono::Local::now().date_naive();

    match ingest_service.ingest(&submission, today).await {
        Ok(report) => Ok(warp::reply::with_status(
            warp::reply::json(&report),
            StatusCode::OK,
        )),
        Err(err) => {
            if let ingest::IngestError::Storage(source) = &err {
                tracing::error!("Failed to ingest summary: {}", source);
            }
            Ok(error_reply(err.to_tally_error(), err.status()))
        }
    }
}

async fn handle_leaderboard_request(
    query: LeaderboardQuery,
    config: Arc<Config>,
    result_repository: Arc<ResultRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let limit = query
        .limit
        .unwrap_or(config.leaderboard_limit)
        .min(MAX_LEADERBOARD_LIMIT) as usize;

    match result_repository.all_results().await {
        Ok(rows) => {
            let mut ranked = LeaderboardEngine::ranked(compute_leaderboard(&rows));
            ranked.truncate(limit);
            Ok(warp::reply::with_status(
                warp::reply::json(&ranked),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            tracing::error!("Failed to fetch leaderboard: {}", err);
            Ok(internal_error("Failed to fetch leaderboard"))
        }
    }
}

async fn handle_player_stats_request(
    user_id: String,
    result_repository: Arc<ResultRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let rows = match result_repository.all_results().await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!("Failed to fetch player stats: {}", err);
            return Ok(internal_error("Failed to fetch player stats"));
        }
    };

    let mut board = compute_leaderboard(&rows);
    let Some(index) = board.iter().position(|row| row.user_id == user_id) else {
        return Ok(error_reply(
            TallyError::PlayerNotFound { user_id },
            StatusCode::NOT_FOUND,
        ));
    };
    let rank = Some(index as u32 + 1);
    let row = board.swap_remove(index);

    Ok(warp::reply::with_status(
        warp::reply::json(&PlayerStats { row, rank }),
        StatusCode::OK,
    ))
}

async fn handle_display_name_update(
    user_id: String,
    update: DisplayNameUpdate,
    result_repository: Arc<ResultRepository>,
    ingest_service: Arc<IngestService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if update.display_name.trim().is_empty() {
        return Ok(error_reply(
            TallyError::InvalidHandle {
                handle: update.display_name,
            },
            StatusCode::BAD_REQUEST,
        ));
    }

    if let Err(err) = result_repository
        .set_display_name(&user_id, &update.display_name)
        .await
    {
        tracing::error!("Failed to store display name: {}", err);
        return Ok(internal_error("Failed to store display name"));
    }

    match ingest_service.refresh_aliases().await {
        Ok(report) => Ok(warp::reply::with_status(
            warp::reply::json(&report),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to refresh aliases: {}", err);
            Ok(internal_error("Failed to refresh aliases"))
        }
    }
}

async fn handle_list_aliases(
    alias_repository: Arc<AliasRepository>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match alias_repository.list_aliases().await {
        Ok(aliases) => Ok(warp::reply::with_status(
            warp::reply::json(&aliases),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to list aliases: {}", err);
            Ok(internal_error("Failed to list aliases"))
        }
    }
}

async fn handle_set_alias(
    update: AliasUpdate,
    alias_repository: Arc<AliasRepository>,
    ingest_service: Arc<IngestService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if tally_core::normalize_handle(&update.handle).is_none() {
        return Ok(error_reply(
            TallyError::InvalidHandle {
                handle: update.handle,
            },
            StatusCode::BAD_REQUEST,
        ));
    }

    let alias = match alias_repository
        .set_alias(&update.handle, &update.user_id)
        .await
    {
        Ok(alias) => alias,
        Err(err) => {
            tracing::error!("Failed to store alias: {}", err);
            return Ok(internal_error("Failed to store alias"));
        }
    };

    if let Err(err) = ingest_service.refresh_aliases().await {
        tracing::error!("Failed to refresh aliases: {}", err);
        return Ok(internal_error("Failed to refresh aliases"));
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&alias),
        StatusCode::OK,
    ))
}

async fn handle_refresh_aliases(
    ingest_service: Arc<IngestService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match ingest_service.refresh_aliases().await {
        Ok(report) => Ok(warp::reply::with_status(
            warp::reply::json(&report),
            StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to refresh aliases: {}", err);
            Ok(internal_error("Failed to refresh aliases"))
        }
    }
}
