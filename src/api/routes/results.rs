use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{rank_players, RankingQuery, SortKey};
use crate::models::{GuildKey, MetricTag, PlayerKey, Recommendation, WindowKey, WorkerResult};

async fn current_result(state: &AppState) -> Result<Arc<WorkerResult>, ApiError> {
    state
        .loader
        .snapshot()
        .await
        .result
        .ok_or_else(|| ApiError::NotFound("No dataset loaded".to_string()))
}

/// Full computed result of the current load.
pub async fn result(State(state): State<AppState>) -> Result<Response, ApiError> {
    let result = current_result(&state).await?;
    Ok(Json(result.as_ref()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub guild: Option<String>,
    pub recommendation: Option<String>,
    pub sort: Option<String>,
    pub window: Option<String>,
}

impl RankingParams {
    fn into_query(self) -> Result<RankingQuery, ApiError> {
        let mut query = RankingQuery {
            guild: self
                .guild
                .filter(|g| !g.trim().is_empty())
                .map(GuildKey::from),
            ..RankingQuery::default()
        };
        if let Some(recommendation) = self.recommendation.filter(|r| !r.trim().is_empty()) {
            query.recommendation = Some(
                recommendation
                    .parse::<Recommendation>()
                    .map_err(ApiError::BadRequest)?,
            );
        }
        if let Some(sort) = self.sort {
            query.sort = sort.parse::<SortKey>().map_err(ApiError::BadRequest)?;
        }
        if let Some(window) = self.window {
            query.window = window.parse::<WindowKey>().map_err(ApiError::BadRequest)?;
        }
        Ok(query)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub rank: usize,
    pub player_key: PlayerKey,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_key: Option<GuildKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_name: Option<String>,
    pub recommendation: Recommendation,
    pub score: f64,
    pub sort_value: f64,
    pub strengths: Vec<MetricTag>,
    pub weaknesses: Vec<MetricTag>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsResponse {
    pub sort: SortKey,
    pub window: WindowKey,
    pub total: usize,
    pub players: Vec<RankingRow>,
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingsResponse>, ApiError> {
    let query = params.into_query()?;
    let result = current_result(&state).await?;

    let players: Vec<RankingRow> = rank_players(&result, &query)
        .into_iter()
        .map(|p| RankingRow {
            rank: p.rank,
            player_key: p.player_key.clone(),
            name: p.name.clone(),
            guild_key: p.latest_guild_key.clone(),
            guild_name: p.latest_guild_name.clone(),
            recommendation: p.recommendation,
            score: p.score,
            sort_value: query.sort_value(p),
            strengths: p.tags.strengths.clone(),
            weaknesses: p.tags.weaknesses.clone(),
        })
        .collect();

    Ok(Json(RankingsResponse {
        sort: query.sort,
        window: query.window,
        total: players.len(),
        players,
    }))
}

pub async fn player(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let result = current_result(&state).await?;
    let player = result
        .player(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Player {}", key)))?;
    Ok(Json(player).into_response())
}

pub async fn guild(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let result = current_result(&state).await?;
    let guild = result
        .guild(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Guild {}", key)))?;
    Ok(Json(guild).into_response())
}
