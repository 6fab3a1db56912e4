use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("cascading filter must have at least one level")]
    EmptyCascadingFilter,
    #[error("logical filter must combine at least one filter")]
    EmptyLogicalFilter,
    #[error("invalid granularity: {0}")]
    InvalidGranularity(String),
    #[error("unsupported attribute type: {0}")]
    UnsupportedAttributeType(String),
}
