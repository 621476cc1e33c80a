use bcrypt::{DEFAULT_COST, hash, verify};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{Account, AccountError, RegisterRequest};

pub(crate) const ACCOUNT_COLUMNS: &str = r#"
    id, username, email, first_name, last_name, avatar_url,
    password_hash, is_admin, is_paid, reset_token, reset_token_expires_at,
    checkout_nonce, created_at, updated_at
"#;

/// A service for handling account operations such as registration,
/// credential verification, and payment-status updates.
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    /// Creates a new instance of `AccountService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a new account from the registration request.
    ///
    /// `is_admin` is decided by the caller (admin-code check happens at the
    /// route boundary, not here).
    pub async fn create_account(
        &self,
        request: &RegisterRequest,
        is_admin: bool,
    ) -> Result<Account, AccountError> {
        // Check if username already exists
        let existing = sqlx::query("SELECT id FROM accounts WHERE username = $1")
            .bind(request.username.trim())
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AccountError::UsernameTaken);
        }

        // Check if email already exists
        let existing = sqlx::query("SELECT id FROM accounts WHERE email = $1")
            .bind(request.email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AccountError::EmailTaken);
        }

        // Hash the password
        let password_hash = hash(&request.password, DEFAULT_COST)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (
                username, email, first_name, last_name, avatar_url,
                password_hash, is_admin
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ACCOUNT_COLUMNS}
            "#,
        ))
        .bind(request.username.trim())
        .bind(request.email.to_lowercase().trim())
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(&request.avatar)
        .bind(&password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(account_from_row(&row))
    }

    /// Retrieves an account by its ID, returning `None` if not found.
    pub async fn get_account_by_id(&self, account_id: &Uuid) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Retrieves an account by username, returning `None` if not found.
    pub async fn get_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Retrieves an account by email, returning `None` if not found.
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Verifies the account's password against the stored hash.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let account = self
            .get_account_by_username(username)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let is_valid = verify(password, &account.password_hash)?;

        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Marks the account as paid and clears the pending checkout nonce.
    pub async fn mark_paid(&self, account_id: &Uuid) -> Result<(), AccountError> {
        sqlx::query(
            "UPDATE accounts SET is_paid = TRUE, checkout_nonce = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the idempotency nonce for the account's current checkout
    /// attempt, minting one if none is pending. A duplicate payment
    /// submission reuses the same nonce and therefore the same processor
    /// idempotency key.
    pub async fn checkout_nonce(&self, account_id: &Uuid) -> Result<String, AccountError> {
        let account = self
            .get_account_by_id(account_id)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if let Some(nonce) = account.checkout_nonce {
            return Ok(nonce);
        }

        let nonce = crate::session::generate_session_token();
        sqlx::query("UPDATE accounts SET checkout_nonce = $1, updated_at = NOW() WHERE id = $2")
            .bind(&nonce)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(nonce)
    }
}

pub(crate) fn account_from_row(row: &sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar_url: row.get("avatar_url"),
        password_hash: row.get("password_hash"),
        is_admin: row.get("is_admin"),
        is_paid: row.get("is_paid"),
        reset_token: row.get("reset_token"),
        reset_token_expires_at: row.get("reset_token_expires_at"),
        checkout_nonce: row.get("checkout_nonce"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
