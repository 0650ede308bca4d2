//! Broker Segments Engine — RFM segmentation and channel attribution
//!
//! Provides:
//! - Feature loading from the brokerage ledger (one row per client)
//! - RFM scoring with time decay and min-max normalization
//! - Commission-correlated weighting of the sub-scores
//! - Seeded k-means clustering and per-cluster summaries
//! - Cached acquisition-channel reports

pub mod cache;
pub mod channels;
pub mod clustering;
pub mod error;
pub mod features;
pub mod scoring;
pub mod segmentation;
pub mod summary;
pub mod types;
pub mod weights;

// Re-exports for convenience
pub use cache::TtlCache;
pub use channels::{ChannelAggregator, ReportKind};
pub use clustering::{kmeans, Clustering};
pub use error::{SegmentationError, SegmentationResult};
pub use features::load_feature_rows;
pub use segmentation::{run_segmentation, segment_clients, SegmentationReport};
pub use summary::summarize_clusters;
pub use types::*;
pub use weights::derive_weights;
