use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("No active scene")]
    NoActiveScene,
    #[error("Scene {0} has no canvas dimensions")]
    MissingDimensions(String),
    #[error("Odd coordinate count ({count}) in {source_id}")]
    OddCoordinateCount { source_id: String, count: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
