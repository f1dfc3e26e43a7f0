use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::guard::{CredentialOutcome, RuleReport};
use crate::state::AppState;

#[derive(Deserialize, Serialize)]
pub struct Healthz {
    pub reconciled_at: i64,
    pub credential: CredentialOutcome,
    pub rules: Vec<RuleReport>,
}

pub async fn healthz_route(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let locked = state.last_report.read();
    let report = match locked.as_ref() {
        None => return (StatusCode::SERVICE_UNAVAILABLE, Json(())).into_response(),
        Some(report) => report,
    };
    Json(Healthz {
        reconciled_at: report.finished_at.timestamp_millis(),
        credential: report.credential,
        rules: report.rules.clone(),
    })
    .into_response()
}
