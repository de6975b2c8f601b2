use service_core::error::AppError;
use thiserror::Error;

/// Domain errors raised by the auth and permission services. Conversion into
/// [`AppError`] fixes the status code and the client-visible message; anything
/// sensitive stays server-side.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    /// Unknown identifier or wrong password. Deliberately one variant so the
    /// response never reveals which of the two it was.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account not approved")]
    AccountNotApproved,

    #[error("account not verified")]
    AccountNotVerified,

    /// Missing, malformed, expired, or wrong-audience credential.
    #[error("invalid token")]
    InvalidToken,

    /// The permission lookup itself failed. Surfaces as 500, never as a deny.
    #[error("permission check failed: {0}")]
    PermissionCheckFailed(#[source] sqlx::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::AccountNotApproved => {
                AppError::Forbidden(anyhow::anyhow!("Account not approved yet"))
            }
            ServiceError::AccountNotVerified => {
                AppError::Forbidden(anyhow::anyhow!("Account not verified"))
            }
            ServiceError::InvalidToken => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token"))
            }
            // Context is logged where the lookup failed; the client only
            // learns that verification was impossible.
            ServiceError::PermissionCheckFailed(_) => {
                AppError::InternalError(anyhow::anyhow!("Failed to verify permissions"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn credential_failures_are_unauthorized() {
        assert_eq!(
            status_of(ServiceError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ServiceError::InvalidToken),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn gating_failures_are_forbidden() {
        assert_eq!(
            status_of(ServiceError::AccountNotApproved),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::AccountNotVerified),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn permission_check_failure_is_server_error() {
        let err = ServiceError::PermissionCheckFailed(sqlx::Error::PoolTimedOut);
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
