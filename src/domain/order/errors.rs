use crate::persistence::RepositoryError;

// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Order not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("storage error")]
    Persistence(#[source] RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => OrderError::NotFound,
            other => OrderError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let error = OrderError::from(RepositoryError::NotFound);
        assert!(matches!(error, OrderError::NotFound));
    }

    #[test]
    fn test_storage_failure_maps_to_persistence() {
        let error = OrderError::from(RepositoryError::from(sqlx::Error::PoolTimedOut));
        assert!(matches!(error, OrderError::Persistence(_)));
    }
}
