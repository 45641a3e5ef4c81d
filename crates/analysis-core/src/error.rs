use thiserror::Error;

use crate::PriceColumn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Missing column: {0}")]
    MissingColumn(PriceColumn),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("API error: {0}")]
    ApiError(String),
}
