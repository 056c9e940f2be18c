//! Bucket listing with per-bucket detail enrichment.

pub mod model;

pub use model::{Bucket, BucketInfo, BucketSummary, LocalAlias, BUCKET_INFO_PATH, LIST_BUCKETS_PATH};

use crate::aggregator::Enricher;
use crate::resilience::RetryPolicy;
use crate::upstream::{decode_json, AdminApi, FetchOptions, UpstreamError};

/// Fetch the bucket list. Any failure here fails the whole request.
pub async fn list_summaries(
    api: &dyn AdminApi,
    retry: &RetryPolicy,
) -> Result<Vec<BucketSummary>, UpstreamError> {
    retry
        .run("ListBuckets", move || async move {
            let body = api.fetch(LIST_BUCKETS_PATH, FetchOptions::get()).await?;
            decode_json(LIST_BUCKETS_PATH, &body)
        })
        .await
}

/// List buckets and complete each with its detail record.
///
/// Only the list call can fail; detail failures degrade single entries.
pub async fn list_buckets(
    api: &dyn AdminApi,
    enricher: &Enricher,
    retry: &RetryPolicy,
) -> Result<Vec<Bucket>, UpstreamError> {
    let summaries = list_summaries(api, retry).await?;
    tracing::debug!(count = summaries.len(), "Listed buckets");
    Ok(enricher.enrich(summaries).await)
}
