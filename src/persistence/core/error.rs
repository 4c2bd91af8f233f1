use sqlx::Error;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    #[error("storage error")]
    Storage(#[source] Error),
}

impl From<Error> for RepositoryError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_found() {
        assert!(matches!(
            RepositoryError::from(Error::RowNotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn test_other_sqlx_errors_are_storage_failures() {
        assert!(matches!(
            RepositoryError::from(Error::PoolClosed),
            RepositoryError::Storage(_)
        ));
    }
}
