use super::entities::InvoiceId;
use super::value_objects::ValueObjectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invoice not found: {0}")]
  NotFound(InvoiceId),

  #[error("Invoice number '{0}' already exists")]
  InvoiceNumberAlreadyExists(String),

  /// Unique index rejected a write that passed the application-level check
  #[error("Constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("Persistence unavailable: {0}")]
  Unavailable(String),

  #[error("Stored record is corrupt: {0}")]
  CorruptRecord(String),

  #[error("Database error: {0}")]
  Database(sqlx::Error),
}

impl From<sqlx::Error> for InvoiceError {
  fn from(error: sqlx::Error) -> Self {
    match error {
      sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
        InvoiceError::ConstraintViolation(db_err.message().to_string())
      }
      sqlx::Error::PoolTimedOut => InvoiceError::Unavailable("Pool timed out".to_string()),
      sqlx::Error::PoolClosed => InvoiceError::Unavailable("Pool closed".to_string()),
      sqlx::Error::Io(e) => InvoiceError::Unavailable(e.to_string()),
      other => InvoiceError::Database(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pool_failures_are_unavailable() {
    assert!(matches!(
      InvoiceError::from(sqlx::Error::PoolClosed),
      InvoiceError::Unavailable(_)
    ));
    assert!(matches!(
      InvoiceError::from(sqlx::Error::PoolTimedOut),
      InvoiceError::Unavailable(_)
    ));
  }

  #[test]
  fn test_other_failures_stay_database_errors() {
    assert!(matches!(
      InvoiceError::from(sqlx::Error::RowNotFound),
      InvoiceError::Database(_)
    ));
  }
}
