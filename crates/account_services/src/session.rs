use actix_web::cookie::{Cookie, SameSite, time};
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{AccountError, Identity};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "campstead_session";

/// Sessions expire server-side this many days after login.
pub const SESSION_TTL_DAYS: i64 = 30;

const SESSION_TOKEN_BYTES: usize = 32;

/// Generates a random session token as a hex string.
pub fn generate_session_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Builds the http-only cookie holding a freshly created session token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .finish()
}

/// Builds an immediately expired session cookie, used at logout.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .finish()
}

/// A service for the server-side session rows behind the session cookie.
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    /// Creates a new instance of `SessionService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a session row for the account and returns its token.
    pub async fn create_session(&self, account_id: &Uuid) -> Result<String, AccountError> {
        let token = generate_session_token();

        sqlx::query(
            r#"
            INSERT INTO sessions (account_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(account_id)
        .bind(&token)
        .bind(Utc::now() + Duration::days(SESSION_TTL_DAYS))
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolves a session token to the identity of its account.
    ///
    /// Expired sessions are treated the same as unknown tokens.
    pub async fn resolve(&self, token: &str) -> Result<Option<Identity>, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.username, a.is_admin, a.is_paid
            FROM sessions s
            JOIN accounts a ON a.id = s.account_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Identity {
            id: row.get("id"),
            username: row.get("username"),
            is_admin: row.get("is_admin"),
            is_paid: row.get("is_paid"),
        }))
    }

    /// Deletes the session row for the token, ending the session.
    pub async fn delete_session(&self, token: &str) -> Result<(), AccountError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_is_hex() {
        let token = generate_session_token();

        assert_eq!(token.len(), SESSION_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let cookie = session_cookie(generate_session_token());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_expired_session_cookie_has_zero_max_age() {
        let cookie = expired_session_cookie();

        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
