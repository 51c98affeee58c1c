use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    #[error(
        "descriptor dimension mismatch: detection {index} has {found} values, expected {expected}"
    )]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}
