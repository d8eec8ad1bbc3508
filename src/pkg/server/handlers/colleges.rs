use axum::{Json, extract::State};

use crate::{
    pkg::{
        internal::adaptors::colleges::{selectors::CollegeSelector, spec::CollegeEntry},
        server::state::{AppState, GetTxn},
    },
    prelude::Result,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CollegeEntry>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let colleges = CollegeSelector::new(&mut tx).get_all().await?;
    Ok(Json(colleges))
}
