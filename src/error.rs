use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use sqlx::mysql::MySqlDatabaseError;

const ER_DUP_ENTRY: u16 = 1062;

/// Failures reported by an [`AttendanceStore`](crate::store::AttendanceStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write, e.g. a second entry for
    /// the same `(user, day)`.
    #[error("record already exists")]
    Duplicate,

    #[error("record vanished during the update")]
    Missing,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps MySQL's `ER_DUP_ENTRY` onto [`StoreError::Duplicate`]. Other
    /// integrity failures sharing SQLSTATE 23000 (foreign keys, NOT NULL)
    /// stay database errors.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let duplicate = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .is_some_and(|mysql| mysql.number() == ER_DUP_ENTRY);
            if duplicate {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl AttendanceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AttendanceError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AttendanceError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AttendanceError::NotFound(msg.into())
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AttendanceError::Forbidden(_) => StatusCode::FORBIDDEN,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(
            AttendanceError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AttendanceError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AttendanceError::forbidden("no").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AttendanceError::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AttendanceError::from(StoreError::Missing).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn only_duplicate_keys_become_duplicates() {
        let mapped = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, StoreError::Database(sqlx::Error::RowNotFound)));

        let mapped = StoreError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(!matches!(mapped, StoreError::Duplicate));
    }

    #[actix_web::test]
    async fn store_failures_are_not_shown_to_clients() {
        let response = AttendanceError::from(StoreError::Missing).error_response();

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body, r#"{"message":"Internal Server Error"}"#);
    }
}
