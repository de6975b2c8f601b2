//! Session cookie construction and token extraction.
//!
//! The session credential travels in an http-only cookie named `token`.
//! Clients that cannot hold cookies may instead send `Authorization: Bearer`;
//! when both are present the cookie wins. Clearing uses the exact same
//! attribute set as setting, otherwise browsers keep the stale cookie around.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::{BackofficeConfig, Environment, SameSitePolicy};

pub const SESSION_COOKIE: &str = "token";

fn base_cookie(config: &BackofficeConfig, value: String) -> Cookie<'static> {
    let is_prod = config.environment == Environment::Prod;

    let secure = config.cookie.secure.unwrap_or(is_prod);
    let same_site = match config.cookie.same_site {
        Some(SameSitePolicy::None) => SameSite::None,
        Some(SameSitePolicy::Lax) => SameSite::Lax,
        Some(SameSitePolicy::Strict) => SameSite::Strict,
        // Prod serves the frontend from another origin, so None; dev runs on
        // localhost where Lax is enough.
        None if is_prod => SameSite::None,
        None => SameSite::Lax,
    };

    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .path("/")
        .secure(secure)
        .same_site(same_site)
        .build()
}

/// Build the session cookie carrying `token`. The max-age mirrors the
/// credential lifetime so cookie and token expire together.
pub fn session_cookie(config: &BackofficeConfig, token: String, remember: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(config, token);
    let max_age = if remember {
        Duration::days(config.jwt.remember_expiry_days)
    } else {
        Duration::hours(config.jwt.session_expiry_hours)
    };
    cookie.set_max_age(max_age);
    cookie
}

/// Build the cookie that removes the session. Attributes must match
/// [`session_cookie`] exactly or the browser will not drop it.
pub fn clear_session_cookie(config: &BackofficeConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Pull the raw credential out of a request: session cookie first, then the
/// `Authorization: Bearer` header.
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let value = cookie.value();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CookieConfig, DatabaseConfig, JwtConfig, RateLimitConfig, SecurityConfig, SwaggerConfig,
        SwaggerMode,
    };
    use axum::http::HeaderValue;
    use service_core::config::Config as CoreConfig;

    fn test_config(environment: Environment) -> BackofficeConfig {
        BackofficeConfig {
            common: CoreConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
                port: 8080,
            },
            environment,
            service_name: "backoffice-service".to_string(),
            service_version: "0.0.0".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                session_expiry_hours: 12,
                remember_expiry_days: 30,
            },
            cookie: CookieConfig {
                secure: None,
                same_site: None,
            },
            security: SecurityConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            swagger: SwaggerConfig {
                enabled: SwaggerMode::Public,
            },
            rate_limit: RateLimitConfig {
                login_attempts: 5,
                login_window_seconds: 900,
                global_ip_limit: 100,
                global_ip_window_seconds: 60,
            },
        }
    }

    #[test]
    fn dev_cookie_is_lax_and_insecure() {
        let config = test_config(Environment::Dev);
        let cookie = session_cookie(&config, "abc".to_string(), false);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::hours(12)));
    }

    #[test]
    fn prod_cookie_is_none_and_secure() {
        let config = test_config(Environment::Prod);
        let cookie = session_cookie(&config, "abc".to_string(), true);

        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn overrides_beat_environment_defaults() {
        let mut config = test_config(Environment::Prod);
        config.cookie.secure = Some(false);
        config.cookie.same_site = Some(SameSitePolicy::Strict);

        let cookie = session_cookie(&config, "abc".to_string(), false);
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn clear_cookie_matches_session_attributes() {
        let config = test_config(Environment::Prod);
        let set = session_cookie(&config, "abc".to_string(), false);
        let clear = clear_session_cookie(&config);

        assert_eq!(clear.name(), set.name());
        assert_eq!(clear.value(), "");
        assert_eq!(clear.path(), set.path());
        assert_eq!(clear.secure(), set.secure());
        assert_eq!(clear.same_site(), set.same_site());
        assert_eq!(clear.http_only(), set.http_only());
        assert_eq!(clear.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn cookie_wins_over_bearer_header() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token(&jar, &headers),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn bearer_used_when_cookie_absent() {
        let jar = CookieJar::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(
            extract_token(&jar, &headers),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn malformed_authorization_yields_none() {
        let jar = CookieJar::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert_eq!(extract_token(&jar, &headers), None);
    }

    #[test]
    fn empty_sources_yield_none() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
        let headers = HeaderMap::new();

        assert_eq!(extract_token(&jar, &headers), None);
    }
}
