//! HTTP surface: axum router, the response envelope, and the mapping from
//! domain errors to status codes.
//!
//! Every payload travels in `{ "success": bool, "message": ..., "data": ... }`
//! so clients can branch on one shape. Handlers stay thin: parse the request,
//! take the database lock, call a service, wrap the result.

use std::sync::{Arc, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::engine::filter::{self, AccountField, ConstraintSet, DemandField};
use crate::engine::pivot::PivotMode;
use crate::error::AppError;
use crate::queries::search;
use crate::services::{accounts, dashboard, demands};
use crate::state::AppState;
use crate::types::{AccountInput, DemandInput};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    fn message_only(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AccountInUse { .. } => StatusCode::CONFLICT,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if !self.is_client_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ApiResponse::<()> {
            success: false,
            message: Some(self.to_string()),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/accounts", get(list_accounts).post(create_account))
        .route(
            "/api/accounts/:id",
            get(get_account).put(replace_account).delete(delete_account),
        )
        .route("/api/accounts/:id/demands", get(list_account_demands))
        .route("/api/demands", get(list_demands).post(create_demand))
        .route(
            "/api/demands/:id",
            get(get_demand).put(replace_demand).delete(delete_demand),
        )
        .route("/api/demands/:id/clone", post(clone_demand))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/dashboard/pivot", get(dashboard_pivot))
        .route("/api/search", get(run_search))
        .with_state(state)
}

/// Take the database lock for one request.
fn db_guard(state: &AppState) -> Result<MutexGuard<'_, Db>, AppError> {
    state
        .db
        .lock()
        .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
}

/// Principal for audit fields: `X-User` header, else the configured default.
fn request_user(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.default_user.clone())
}

/// Fold repeated query pairs into a constraint set. Unknown keys (and keys
/// named in `skip`) are ignored rather than rejected.
fn parse_constraints<F, P>(
    pairs: &[(String, String)],
    skip: &[&str],
    parse_field: P,
) -> ConstraintSet<F>
where
    F: Copy + Eq + std::hash::Hash,
    P: Fn(&str) -> Option<F>,
{
    let mut constraints: ConstraintSet<F> = ConstraintSet::new();
    for (key, value) in pairs {
        if skip.contains(&key.as_str()) {
            continue;
        }
        if let Some(field) = parse_field(key) {
            constraints.entry(field).or_default().push(value.clone());
        }
    }
    constraints
}

async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(serde_json::json!({ "status": "ok" }))
}

async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let all = accounts::list_accounts(&db)?;
    let constraints = parse_constraints(&pairs, &[], AccountField::from_param);
    let matching = filter::apply(&all, &constraints);
    Ok(ApiResponse::ok(matching).into_response())
}

async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let account = accounts::get_account(&db, &id)?;
    Ok(ApiResponse::ok(account).into_response())
}

async fn create_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<AccountInput>,
) -> Result<Response, AppError> {
    let user = request_user(&headers, &state);
    let db = db_guard(&state)?;
    let account = accounts::create_account(&db, input, &user)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(account, "Account created"),
    )
        .into_response())
}

async fn replace_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<AccountInput>,
) -> Result<Response, AppError> {
    let user = request_user(&headers, &state);
    let db = db_guard(&state)?;
    let account = accounts::replace_account(&db, &id, input, &user)?;
    Ok(ApiResponse::ok_with_message(account, "Account updated").into_response())
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    accounts::delete_account(&db, &id)?;
    Ok(ApiResponse::message_only("Account deleted").into_response())
}

async fn list_account_demands(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let list = demands::list_demands_for_account(&db, &id)?;
    Ok(ApiResponse::ok(list).into_response())
}

async fn list_demands(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let all = demands::list_demands(&db)?;
    let constraints = parse_constraints(&pairs, &[], DemandField::from_param);
    let matching = filter::apply(&all, &constraints);
    Ok(ApiResponse::ok(matching).into_response())
}

async fn get_demand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let demand = demands::get_demand(&db, &id)?;
    Ok(ApiResponse::ok(demand).into_response())
}

async fn create_demand(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<DemandInput>,
) -> Result<Response, AppError> {
    let user = request_user(&headers, &state);
    let db = db_guard(&state)?;
    let demand = demands::create_demand(&db, input, &user)?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(demand, "Demand created"),
    )
        .into_response())
}

async fn replace_demand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<DemandInput>,
) -> Result<Response, AppError> {
    let user = request_user(&headers, &state);
    let db = db_guard(&state)?;
    let demand = demands::replace_demand(&db, &id, input, &user)?;
    Ok(ApiResponse::ok_with_message(demand, "Demand updated").into_response())
}

async fn delete_demand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    demands::delete_demand(&db, &id)?;
    Ok(ApiResponse::message_only("Demand deleted").into_response())
}

#[derive(Debug, Deserialize)]
struct CloneParams {
    count: Option<u32>,
}

async fn clone_demand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<CloneParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = request_user(&headers, &state);
    let count = params.count.unwrap_or(1);
    let db = db_guard(&state)?;
    let clones = demands::clone_demand(&db, &id, count, &user)?;
    let message = format!("Created {} clone(s)", clones.len());
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(clones, message),
    )
        .into_response())
}

async fn dashboard_stats(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    let stats = dashboard::stats(&db)?;
    Ok(ApiResponse::ok(stats).into_response())
}

async fn dashboard_pivot(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let mode_name = pairs
        .iter()
        .find(|(key, _)| key == "mode")
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| AppError::validation("mode query parameter is required"))?;
    let mode = PivotMode::from_param(mode_name)
        .ok_or_else(|| AppError::validation(format!("unknown pivot mode: {mode_name}")))?;
    let constraints = parse_constraints(&pairs, &["mode"], DemandField::from_param);

    let db = db_guard(&state)?;
    let output = dashboard::pivot(&db, mode, &constraints)?;
    Ok(ApiResponse::ok(output).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    entity: Option<String>,
}

async fn run_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let db = db_guard(&state)?;
    match params.entity.as_deref().unwrap_or("accounts") {
        "accounts" => {
            let hits = search::search_accounts(&db, &params.query).map_err(AppError::Db)?;
            Ok(ApiResponse::ok(hits).into_response())
        }
        "demands" => {
            let hits = search::search_demands(&db, &params.query).map_err(AppError::Db)?;
            Ok(ApiResponse::ok(hits).into_response())
        }
        other => Err(AppError::validation(format!(
            "entity must be accounts or demands, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_params_collect_into_one_field() {
        let constraints = parse_constraints(
            &pairs(&[("roleCode", "SE"), ("roleCode", "TL"), ("status", "Open")]),
            &[],
            DemandField::from_param,
        );
        assert_eq!(
            constraints.get(&DemandField::RoleCode),
            Some(&vec!["SE".to_string(), "TL".to_string()])
        );
        assert_eq!(constraints.len(), 2);
    }

    #[test]
    fn unknown_and_skipped_params_are_ignored() {
        let constraints = parse_constraints(
            &pairs(&[("mode", "byRoleCode"), ("bogus", "x"), ("geo", "NA")]),
            &["mode"],
            AccountField::from_param,
        );
        assert_eq!(constraints.len(), 1);
        assert!(constraints.contains_key(&AccountField::Geo));
    }

    #[test]
    fn error_variants_map_to_the_documented_status_codes() {
        let cases = [
            (AppError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                AppError::not_found("Account", "acc-1"),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::AccountInUse {
                    id: "acc-1".to_string(),
                    count: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                AppError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn envelope_omits_absent_message_and_data() {
        let body = serde_json::to_value(ApiResponse::ok(42)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 42 }));

        let body = serde_json::to_value(ApiResponse::message_only("Account deleted")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "message": "Account deleted" })
        );
    }
}
