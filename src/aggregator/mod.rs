//! List enrichment: one concurrent detail lookup per listed record.
//!
//! # Data Flow
//! ```text
//! Vec<T> (shallow, from a list call)
//!     → dispatch: at most `max_concurrency` detail fetches in flight
//!     → each task: fetch → decode → merge, or degrade on any failure
//!     → collect into the slot of the record's input position
//!     → Vec<T::Merged> (same length, same order)
//! ```
//!
//! # Guarantees
//! - Output length always equals input length
//! - A failed detail fetch degrades only its own record and is never surfaced
//! - Cancellation (or the configured deadline) aborts in-flight fetches; the
//!   records they were working on come back degraded
//! - Dropping the future aborts every in-flight fetch

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::task::{JoinError, JoinSet};

use crate::config::AggregatorConfig;
use crate::observability::metrics;
use crate::upstream::{decode_json, AdminApi, FetchOptions};

/// A shallow record that can be completed by one detail call.
pub trait EnrichTarget: Clone + Send + 'static {
    /// Shape of the detail response.
    type Detail: DeserializeOwned + Send;
    /// Shape of the completed record.
    type Merged: Send + 'static;

    fn id(&self) -> &str;

    /// Path and options of the detail call for this record.
    fn detail_request(&self) -> (String, FetchOptions);

    /// Combine with a successfully decoded detail.
    fn merge(self, detail: Self::Detail) -> Self::Merged;

    /// The record to return when the detail is unavailable.
    fn degrade(self) -> Self::Merged;
}

/// Counts for one enrichment call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub total: usize,
    pub enriched: usize,
    pub degraded: usize,
    /// The call was cut short by cancellation or deadline.
    pub cancelled: bool,
}

/// Fans detail fetches out over the admin API with a concurrency bound.
pub struct Enricher {
    api: Arc<dyn AdminApi>,
    max_concurrency: usize,
    deadline: Option<Duration>,
}

impl Enricher {
    pub fn new(api: Arc<dyn AdminApi>, config: &AggregatorConfig) -> Self {
        Self {
            api,
            max_concurrency: config.max_concurrency.max(1),
            deadline: config.deadline_secs.map(Duration::from_secs),
        }
    }

    /// Enrich every record, bounded by the configured deadline if any.
    pub async fn enrich<T: EnrichTarget>(&self, items: Vec<T>) -> Vec<T::Merged> {
        let (merged, report) = match self.deadline {
            Some(deadline) => self.enrich_until(items, tokio::time::sleep(deadline)).await,
            None => self.enrich_until(items, std::future::pending()).await,
        };

        if report.cancelled {
            tracing::warn!(
                total = report.total,
                degraded = report.degraded,
                "Enrichment deadline reached"
            );
        } else if report.degraded > 0 {
            tracing::info!(total = report.total, degraded = report.degraded, "Enrichment finished with degraded records");
        }
        merged
    }

    /// Enrich every record, stopping early when `cancel` resolves.
    ///
    /// Records whose fetch had not completed by then are degraded, so the
    /// output still has one entry per input, in input order.
    pub async fn enrich_until<T, C>(&self, items: Vec<T>, cancel: C) -> (Vec<T::Merged>, EnrichReport)
    where
        T: EnrichTarget,
        C: Future<Output = ()>,
    {
        let total = items.len();
        let originals = items.clone();
        let mut slots: Vec<Option<Outcome<T::Merged>>> = (0..total).map(|_| None).collect();
        let mut tasks: JoinSet<(usize, Outcome<T::Merged>)> = JoinSet::new();

        let cancelled = {
            let run = async {
                for (index, item) in items.into_iter().enumerate() {
                    while tasks.len() >= self.max_concurrency {
                        if let Some(joined) = tasks.join_next().await {
                            store(&mut slots, joined);
                        }
                    }
                    let api = Arc::clone(&self.api);
                    tasks.spawn(async move { (index, fetch_and_merge(api.as_ref(), item).await) });
                }
                while let Some(joined) = tasks.join_next().await {
                    store(&mut slots, joined);
                }
            };

            tokio::select! {
                _ = run => false,
                _ = cancel => true,
            }
        };

        if cancelled {
            tasks.abort_all();
        }

        let mut report = EnrichReport {
            total,
            cancelled,
            ..EnrichReport::default()
        };

        let merged = slots
            .into_iter()
            .zip(originals)
            .map(|(slot, original)| match slot {
                Some(Outcome::Enriched(merged)) => {
                    report.enriched += 1;
                    merged
                }
                Some(Outcome::Degraded(merged)) => {
                    report.degraded += 1;
                    merged
                }
                None => {
                    report.degraded += 1;
                    original.degrade()
                }
            })
            .collect();

        metrics::record_enrichment(report.total, report.degraded);
        (merged, report)
    }
}

enum Outcome<M> {
    Enriched(M),
    Degraded(M),
}

fn store<M>(slots: &mut [Option<Outcome<M>>], joined: Result<(usize, Outcome<M>), JoinError>) {
    match joined {
        Ok((index, outcome)) => slots[index] = Some(outcome),
        // The slot stays empty and is degraded from the original record.
        Err(e) => tracing::error!(error = %e, "Enrichment task failed"),
    }
}

async fn fetch_and_merge<T: EnrichTarget>(api: &dyn AdminApi, item: T) -> Outcome<T::Merged> {
    let (path, options) = item.detail_request();

    let detail = match api.fetch(&path, options).await {
        Ok(body) => decode_json::<T::Detail>(&path, &body),
        Err(e) => Err(e),
    };

    match detail {
        Ok(detail) => Outcome::Enriched(item.merge(detail)),
        Err(e) => {
            tracing::warn!(record_id = %item.id(), error = %e, "Detail unavailable, returning minimal record");
            Outcome::Degraded(item.degrade())
        }
    }
}
