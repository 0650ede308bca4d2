//! Types for the segmentation pipeline and channel reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-client input to RFM scoring, one row per distinct client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFeatureRow {
    pub client_id: String,
    /// Latest trade, conversion or transfer date; `None` if the client never acted
    pub last_activity_date: Option<NaiveDate>,
    pub total_frequency: i64,
    pub balance: Option<f64>,
    pub sum_ins: Option<f64>,
    /// Commission summed over every login the client owns
    pub total_commission: Option<f64>,
    pub total_trades: Option<i64>,
}

/// A client after scoring. `rfm_score` stays 0 until weights are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientScore {
    pub client_id: String,
    pub recency_days: f64,
    pub monetary_value: f64,
    pub total_commission: f64,
    pub recency_score: f64,
    pub frequency_score: f64,
    pub monetary_score: f64,
    pub rfm_score: f64,
}

impl ClientScore {
    /// Coordinates used for clustering
    pub fn features(&self) -> [f64; 3] {
        [self.recency_score, self.frequency_score, self.monetary_score]
    }
}

/// Weights of the three sub-scores in the composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RfmWeights {
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
    /// True when correlations were all zero and equal weights were used
    pub fallback: bool,
}

impl RfmWeights {
    pub fn equal() -> Self {
        Self {
            recency: 1.0 / 3.0,
            frequency: 1.0 / 3.0,
            monetary: 1.0 / 3.0,
            fallback: true,
        }
    }

    pub fn sum(&self) -> f64 {
        self.recency + self.frequency + self.monetary
    }
}

/// Population and commission of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_number: usize,
    pub cluster_count: usize,
    pub total_commission: f64,
}

/// A client with its composite score and cluster label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSegment {
    pub client_id: String,
    pub recency_score: f64,
    pub frequency_score: f64,
    pub monetary_score: f64,
    pub rfm_score: f64,
    pub cluster: usize,
}

/// One row of a channel report; the shape depends on the report kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelRecord {
    UserCount {
        channel: Option<String>,
        user_count: i64,
    },
    CommissionSum {
        channel: Option<String>,
        total_commission: f64,
    },
    Lifetime {
        channel: Option<String>,
        avg_lifetime_days: Option<f64>,
    },
}

/// Model constants for a segmentation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Decay period for the recency score, in days (default: 30)
    pub half_life_days: f64,
    /// Inflation of inbound transfers per trade (default: 0.05)
    pub trade_multiplier: f64,
    /// Number of k-means clusters (default: 5)
    pub n_clusters: usize,
    /// Seed for k-means initialization (default: 42)
    pub seed: u64,
    /// k-means restarts, the lowest-inertia run wins (default: 10)
    pub n_init: usize,
    /// Lloyd iterations per restart (default: 300)
    pub max_iterations: usize,
    /// Convergence threshold on total centroid shift (default: 1e-4)
    pub tolerance: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            half_life_days: 30.0,
            trade_multiplier: 0.05,
            n_clusters: 5,
            seed: 42,
            n_init: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}
