use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl DatabaseError {
    /// Maps Postgres unique violations (the partial slot index) to
    /// `Duplicate` so callers can surface a conflict instead of a 500.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Duplicate;
            }
        }
        DatabaseError::Sqlx(err)
    }
}
