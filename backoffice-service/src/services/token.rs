//! JWT issuing, decoding, and refresh.
//!
//! Two payload shapes share one signing key: staff credentials carry
//! `employee_id` plus role and department ids, customer credentials carry
//! `customer_id` and email. The shapes are disjoint (required fields of one
//! are absent from the other), so decoding a token against the wrong shape
//! fails at deserialization and the caller sees the same opaque error as for
//! a bad signature.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::services::error::ServiceError;

/// How long an issued credential lives. Refresh always produces `Session`
/// regardless of what the original login asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLifetime {
    Session,
    Remember,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeClaims {
    pub employee_id: i32,
    pub username: String,
    pub role_id: i32,
    pub department_id: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerClaims {
    pub customer_id: i32,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated identity behind a token, resolved without the caller
/// saying which kind it is.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Employee(EmployeeClaims),
    Customer(CustomerClaims),
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expiry: Duration,
    remember_expiry: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            session_expiry: Duration::hours(config.session_expiry_hours),
            remember_expiry: Duration::days(config.remember_expiry_days),
        }
    }

    fn expiry(&self, lifetime: TokenLifetime) -> (i64, i64) {
        let now = Utc::now();
        let ttl = match lifetime {
            TokenLifetime::Session => self.session_expiry,
            TokenLifetime::Remember => self.remember_expiry,
        };
        (now.timestamp(), (now + ttl).timestamp())
    }

    pub fn issue_employee(
        &self,
        employee_id: i32,
        username: &str,
        role_id: i32,
        department_id: i32,
        lifetime: TokenLifetime,
    ) -> Result<String, ServiceError> {
        let (iat, exp) = self.expiry(lifetime);
        let claims = EmployeeClaims {
            employee_id,
            username: username.to_string(),
            role_id,
            department_id,
            iat,
            exp,
        };
        self.sign(&claims)
    }

    pub fn issue_customer(
        &self,
        customer_id: i32,
        username: &str,
        email: &str,
        lifetime: TokenLifetime,
    ) -> Result<String, ServiceError> {
        let (iat, exp) = self.expiry(lifetime);
        let claims = CustomerClaims {
            customer_id,
            username: username.to_string(),
            email: email.to_string(),
            iat,
            exp,
        };
        self.sign(&claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ServiceError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation
    }

    /// Decode a token expected to be a staff credential.
    pub fn decode_employee(&self, token: &str) -> Result<EmployeeClaims, ServiceError> {
        decode::<EmployeeClaims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|_| ServiceError::InvalidToken)
    }

    /// Decode a token expected to be a customer credential.
    pub fn decode_customer(&self, token: &str) -> Result<CustomerClaims, ServiceError> {
        decode::<CustomerClaims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|_| ServiceError::InvalidToken)
    }

    /// Decode a token of either kind. Employee is tried first; the shapes are
    /// disjoint so at most one decode can succeed.
    pub fn resolve(&self, token: &str) -> Result<Principal, ServiceError> {
        if let Ok(claims) = self.decode_employee(token) {
            return Ok(Principal::Employee(claims));
        }
        self.decode_customer(token).map(Principal::Customer)
    }

    /// Re-issue a still-valid credential with a fresh session-length expiry.
    /// The principal fields are carried over untouched; a remember-class token
    /// deliberately comes back as session-class.
    pub fn refresh(&self, token: &str) -> Result<String, ServiceError> {
        match self.resolve(token)? {
            Principal::Employee(c) => self.issue_employee(
                c.employee_id,
                &c.username,
                c.role_id,
                c.department_id,
                TokenLifetime::Session,
            ),
            Principal::Customer(c) => self.issue_customer(
                c.customer_id,
                &c.username,
                &c.email,
                TokenLifetime::Session,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "unit-test-secret".to_string(),
            session_expiry_hours: 12,
            remember_expiry_days: 30,
        })
    }

    #[test]
    fn employee_roundtrip_preserves_claims() {
        let svc = service();
        let token = svc
            .issue_employee(7, "jdoe", 2, 3, TokenLifetime::Session)
            .unwrap();
        let claims = svc.decode_employee(&token).unwrap();

        assert_eq!(claims.employee_id, 7);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role_id, 2);
        assert_eq!(claims.department_id, 3);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn customer_roundtrip_preserves_claims() {
        let svc = service();
        let token = svc
            .issue_customer(11, "acme", "ops@acme.test", TokenLifetime::Remember)
            .unwrap();
        let claims = svc.decode_customer(&token).unwrap();

        assert_eq!(claims.customer_id, 11);
        assert_eq!(claims.email, "ops@acme.test");
        assert_eq!(claims.exp - claims.iat, 30 * 86400);
    }

    #[test]
    fn cross_kind_decode_fails() {
        let svc = service();
        let employee_token = svc
            .issue_employee(7, "jdoe", 2, 3, TokenLifetime::Session)
            .unwrap();
        let customer_token = svc
            .issue_customer(11, "acme", "ops@acme.test", TokenLifetime::Session)
            .unwrap();

        assert!(svc.decode_customer(&employee_token).is_err());
        assert!(svc.decode_employee(&customer_token).is_err());
    }

    #[test]
    fn resolve_identifies_kind() {
        let svc = service();
        let employee_token = svc
            .issue_employee(7, "jdoe", 2, 3, TokenLifetime::Session)
            .unwrap();
        let customer_token = svc
            .issue_customer(11, "acme", "ops@acme.test", TokenLifetime::Session)
            .unwrap();

        assert!(matches!(
            svc.resolve(&employee_token).unwrap(),
            Principal::Employee(c) if c.employee_id == 7
        ));
        assert!(matches!(
            svc.resolve(&customer_token).unwrap(),
            Principal::Customer(c) if c.customer_id == 11
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let svc = service();
        let other = TokenService::new(&JwtConfig {
            secret: "some-other-secret".to_string(),
            session_expiry_hours: 12,
            remember_expiry_days: 30,
        });

        let token = svc
            .issue_employee(7, "jdoe", 2, 3, TokenLifetime::Session)
            .unwrap();
        assert!(matches!(
            other.decode_employee(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let svc = service();
        assert!(svc.resolve("not.a.jwt").is_err());
        assert!(svc.resolve("").is_err());
    }

    #[test]
    fn refresh_always_issues_session_class() {
        let svc = service();
        let long = svc
            .issue_customer(11, "acme", "ops@acme.test", TokenLifetime::Remember)
            .unwrap();
        let refreshed = svc.refresh(&long).unwrap();
        let claims = svc.decode_customer(&refreshed).unwrap();

        assert_eq!(claims.customer_id, 11);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }
}
