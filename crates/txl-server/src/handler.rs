use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use txl_ledger::{Ledger, LedgerError, LedgerReader, LedgerWriter};
use txl_types::TransactionRecord;

use crate::error::{ServerError, ServerResult};

/// Shared handler state: the process-wide ledger and the storage deadline.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Ledger>,
    storage_timeout: Duration,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>, storage_timeout: Duration) -> Self {
        Self {
            ledger,
            storage_timeout,
        }
    }

    /// Run a blocking ledger call off the async runtime, bounded by the
    /// storage timeout.
    ///
    /// On timeout the call keeps running in the background; an append may
    /// still land after the caller has been told it failed.
    async fn run<T, F>(&self, op: F) -> ServerResult<T>
    where
        F: FnOnce(&Ledger) -> Result<T, LedgerError> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        let task = tokio::task::spawn_blocking(move || op(&ledger));
        match tokio::time::timeout(self.storage_timeout, task).await {
            Err(_) => Err(ServerError::StorageTimeout(self.storage_timeout)),
            Ok(Err(join)) => Err(ServerError::Internal(join.to_string())),
            Ok(Ok(result)) => Ok(result?),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> ServerResult<Json<serde_json::Value>> {
    let records = state.run(|ledger| ledger.count()).await?;
    Ok(Json(json!({
        "name": "txl-server",
        "version": env!("CARGO_PKG_VERSION"),
        "records": records,
    })))
}

/// `POST /v1/transactions`
pub async fn append_handler(
    State(state): State<AppState>,
    Json(record): Json<TransactionRecord>,
) -> ServerResult<StatusCode> {
    state.run(move |ledger| ledger.append(record)).await?;
    Ok(StatusCode::CREATED)
}

/// `GET /v1/transactions`
pub async fn list_all_handler(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<TransactionRecord>>> {
    let records = state.run(|ledger| ledger.list_all()).await?;
    Ok(Json(records))
}

/// `GET /v1/users/:user/transactions`
pub async fn list_by_user_handler(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> ServerResult<Json<Vec<TransactionRecord>>> {
    let records = state.run(move |ledger| ledger.list_by_user(&user)).await?;
    Ok(Json(records))
}

/// `GET /v1/transactions/reference/:reference`
pub async fn find_by_reference_handler(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> ServerResult<Json<TransactionRecord>> {
    find_by_reference(&state, reference).await
}

/// Query form of the reference lookup. It also reaches the empty reference,
/// which has no path form.
#[derive(Debug, Deserialize)]
pub struct ReferenceQuery {
    pub reference: String,
}

/// `GET /v1/transactions/reference?reference=...`
pub async fn find_by_reference_query_handler(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> ServerResult<Json<TransactionRecord>> {
    find_by_reference(&state, query.reference).await
}

async fn find_by_reference(
    state: &AppState,
    reference: String,
) -> ServerResult<Json<TransactionRecord>> {
    let lookup = reference.clone();
    state
        .run(move |ledger| ledger.find_by_reference(&lookup))
        .await?
        .map(Json)
        .ok_or(ServerError::NotFound(reference))
}
