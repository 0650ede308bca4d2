//! Errors surfaced by the segmentation pipeline

use persistence::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DbError),

    #[error("Insufficient data: {clients} clients for {clusters} clusters")]
    InsufficientData { clients: usize, clusters: usize },

    #[error("Segmentation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type SegmentationResult<T> = Result<T, SegmentationError>;
