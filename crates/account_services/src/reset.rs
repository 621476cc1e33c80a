use bcrypt::{DEFAULT_COST, hash};
use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::service::{ACCOUNT_COLUMNS, AccountService, account_from_row};
use crate::types::{Account, AccountError};

/// Reset tokens are accepted strictly before issue time + 1 hour.
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Number of random bytes behind a reset token (hex-encoded to twice that).
const RESET_TOKEN_BYTES: usize = 20;

/// Generates a random password-reset token as a hex string.
pub fn generate_reset_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Computes the expiry instant for a token issued at `now`.
pub fn reset_token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(RESET_TOKEN_TTL_HOURS)
}

impl AccountService {
    /// Issues a fresh reset token for the account with the given email.
    ///
    /// Returns `Ok(None)` when no account has that email; the route reports
    /// a uniform message either way so the response does not reveal whether
    /// the address exists. A token pending from an earlier request is
    /// overwritten, which invalidates it.
    pub async fn issue_reset_token(
        &self,
        email: &str,
    ) -> Result<Option<(Account, String)>, AccountError> {
        let account = match self.get_account_by_email(email).await? {
            Some(account) => account,
            None => return Ok(None),
        };

        let token = generate_reset_token();
        let expires_at = reset_token_expiry(Utc::now());

        sqlx::query(
            r#"
            UPDATE accounts
            SET reset_token = $1, reset_token_expires_at = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&token)
        .bind(expires_at)
        .bind(account.id)
        .execute(self.pool())
        .await?;

        Ok(Some((account, token)))
    }

    /// Looks up the account holding an unexpired reset token.
    pub async fn get_account_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM accounts
            WHERE reset_token = $1 AND reset_token_expires_at > NOW()
            "#,
        ))
        .bind(token)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Consumes a reset token: stores the new password hash and clears the
    /// token and its expiry in the same statement. The token filter is
    /// repeated in the UPDATE so a token consumed by a concurrent request
    /// cannot be consumed twice.
    pub async fn consume_reset_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Account, AccountError> {
        let password_hash = hash(new_password, DEFAULT_COST)?;

        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $1,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE reset_token = $2 AND reset_token_expires_at > NOW()
            RETURNING id
            "#,
        )
        .bind(&password_hash)
        .bind(token)
        .fetch_optional(self.pool())
        .await?;

        let account_id: Uuid = match row {
            Some(row) => row.get("id"),
            None => return Err(AccountError::InvalidResetToken),
        };

        self.get_account_by_id(&account_id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_reset_token_is_hex() {
        let token = generate_reset_token();

        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_reset_token_is_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn test_reset_token_expiry_is_one_hour_out() {
        let issued = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let expiry = reset_token_expiry(issued);

        assert_eq!(expiry - issued, Duration::hours(1));
    }
}
