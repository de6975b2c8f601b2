pub mod cookie;
pub mod password;
pub mod validation;

pub use cookie::{clear_session_cookie, extract_token, session_cookie, SESSION_COOKIE};
pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
