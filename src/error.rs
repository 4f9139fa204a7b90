use thiserror::Error;

/// Errors produced by the search, recommendation, and calorie subsystems.
///
/// Every variant is recoverable at the calling layer: a failed query leaves
/// the dataset and any fitted model untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// A feature schema names a nutrient with no values in the reference
    /// records, so no imputation mean or scaling statistics can be fitted.
    #[error("feature '{0}' has no values in the reference dataset")]
    InvalidSchema(&'static str),

    /// A nearest-neighbor query was issued against an index with no points.
    #[error("search index contains no points")]
    EmptyIndex,

    /// A group-centroid query's predicate matched no records.
    #[error("no records match the group predicate")]
    EmptyGroup,

    /// An exact-name lookup found no record with the given name.
    #[error("food '{0}' not found in dataset")]
    NotFound(String),

    /// A biometric token (sex or activity level) was not recognized.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The dataset source could not be read or parsed.
    #[error("dataset error: {0}")]
    Dataset(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidSchema("fiber").to_string(),
            "feature 'fiber' has no values in the reference dataset"
        );
        assert_eq!(
            Error::NotFound("Nasi Goreng".to_string()).to_string(),
            "food 'Nasi Goreng' not found in dataset"
        );
    }
}
