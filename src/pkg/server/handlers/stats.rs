use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    pkg::{
        internal::{adaptors::jobs::selectors::JobSelector, auth::User, deadline},
        server::state::{AppState, GetTxn},
    },
    prelude::Result,
};

// Landing-page widgets. Best effort: a broken store degrades these to
// fixed values instead of failing the page.

fn recent_job_fallback() -> Value {
    json!({
        "company": "acme_corp",
        "title": "React Developer",
        "applicants": 45,
        "closes_in": "3 days",
    })
}

async fn fetch_recent_job(state: &AppState) -> Result<Option<Value>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let Some(recent) = JobSelector::new(&mut tx).latest().await? else {
        return Ok(None);
    };
    Ok(Some(json!({
        "company": recent.company,
        "title": recent.title,
        "applicants": recent.applicants,
        "closes_in": deadline::closes_in(recent.deadline, deadline::today_ist()),
    })))
}

pub async fn recent_job(State(state): State<AppState>) -> Json<Value> {
    match fetch_recent_job(&state).await {
        Ok(Some(payload)) => Json(payload),
        Ok(None) => Json(recent_job_fallback()),
        Err(err) => {
            tracing::warn!("recent-job widget degraded: {}", err);
            Json(recent_job_fallback())
        }
    }
}

pub async fn employer_count(State(state): State<AppState>) -> Json<Value> {
    let count = match User::admin_count(&state).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!("employer count degraded: {}", err);
            0
        }
    };
    Json(json!({"count": count}))
}
