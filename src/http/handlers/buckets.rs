use axum::extract::State;

use crate::buckets::{self, Bucket};
use crate::http::envelope::{ApiError, Envelope};
use crate::http::server::AppState;

/// `GET /buckets`: the bucket list, each entry completed with its detail.
pub async fn list_buckets(State(state): State<AppState>) -> Result<Envelope<Vec<Bucket>>, ApiError> {
    let buckets = buckets::list_buckets(state.api.as_ref(), &state.enricher, &state.list_retry).await?;
    Ok(Envelope::ok(buckets))
}
