//! RFM Segmentation Engine — runs the full batch pipeline
//!
//! Loader → Transformer → WeightDeriver → Scorer → Clusterer → SummaryBuilder.
//! Every run recomputes weights and clusters from the current ledger; nothing
//! is carried between runs.

use chrono::NaiveDate;
use persistence::SqlitePool;
use serde::Serialize;
use tracing::info;

use crate::clustering::{kmeans, Point};
use crate::error::SegmentationResult;
use crate::features::load_feature_rows;
use crate::scoring::{apply_weights, transform};
use crate::summary::summarize_clusters;
use crate::types::{
    ClientFeatureRow, ClientScore, ClientSegment, ClusterSummary, RfmWeights, SegmentationConfig,
};
use crate::weights::derive_weights;

/// Outcome of one segmentation run
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    pub as_of: NaiveDate,
    pub clients_loaded: usize,
    /// Clients left after dropping rows with undefined scores
    pub clients_scored: usize,
    pub weights: RfmWeights,
    pub clusters: Vec<ClusterSummary>,
    pub inertia: f64,
    pub iterations: usize,
    pub segments: Vec<ClientSegment>,
}

/// Load the ledger and segment every client as of `as_of`.
/// Scoring and clustering run on the blocking pool, off the async workers.
pub async fn run_segmentation(
    pool: &SqlitePool,
    as_of: NaiveDate,
    config: &SegmentationConfig,
) -> SegmentationResult<SegmentationReport> {
    let rows = load_feature_rows(pool).await?;
    let config = config.clone();
    tokio::task::spawn_blocking(move || segment_clients(&rows, as_of, &config)).await?
}

/// Score, weight, cluster and summarize already-loaded feature rows
pub fn segment_clients(
    rows: &[ClientFeatureRow],
    as_of: NaiveDate,
    config: &SegmentationConfig,
) -> SegmentationResult<SegmentationReport> {
    let mut scores = transform(rows, as_of, config);
    let weights = derive_weights(&scores);
    apply_weights(&mut scores, &weights);

    let points: Vec<Point> = scores.iter().map(ClientScore::features).collect();
    let clustering = kmeans(&points, config)?;
    let clusters = summarize_clusters(&scores, &clustering.labels, config.n_clusters);

    let segments: Vec<ClientSegment> = scores
        .iter()
        .zip(&clustering.labels)
        .map(|(s, cluster)| ClientSegment {
            client_id: s.client_id.clone(),
            recency_score: s.recency_score,
            frequency_score: s.frequency_score,
            monetary_score: s.monetary_score,
            rfm_score: s.rfm_score,
            cluster: *cluster,
        })
        .collect();

    info!(
        %as_of,
        loaded = rows.len(),
        scored = scores.len(),
        clusters = clusters.len(),
        inertia = clustering.inertia,
        "Segmentation complete"
    );

    Ok(SegmentationReport {
        as_of,
        clients_loaded: rows.len(),
        clients_scored: scores.len(),
        weights,
        clusters,
        inertia: clustering.inertia,
        iterations: clustering.iterations,
        segments,
    })
}
