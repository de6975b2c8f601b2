use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Which principal table to authenticate against. When omitted, the login
/// orchestrator tries employees first and falls back to customers. Both the
/// table-style names and the staff/account wording are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum LoginKind {
    #[serde(rename = "employee", alias = "staff")]
    Employee,
    #[serde(rename = "customer", alias = "account")]
    Customer,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    pub kind: Option<LoginKind>,

    /// Ask for the long-lived credential class. Older clients send this as
    /// `keepSignedIn`.
    #[serde(default, alias = "keepSignedIn")]
    pub remember: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_defaults_to_false() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"jdoe","password":"pw"}"#).unwrap();
        assert!(!req.remember);
        assert_eq!(req.kind, None);
    }

    #[test]
    fn keep_signed_in_alias_is_accepted() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"jdoe","password":"pw","keepSignedIn":true}"#)
                .unwrap();
        assert!(req.remember);
    }

    #[test]
    fn kind_accepts_both_namings() {
        for (raw, expected) in [
            ("employee", LoginKind::Employee),
            ("staff", LoginKind::Employee),
            ("customer", LoginKind::Customer),
            ("account", LoginKind::Customer),
        ] {
            let body = format!(r#"{{"username":"a","password":"b","kind":"{}"}}"#, raw);
            let req: LoginRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(req.kind, Some(expected));
        }
    }

    #[test]
    fn empty_username_fails_validation() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"","password":"pw"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
