use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for account registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique display name for the account
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,

    /// Email address of the account
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// First name of the account holder
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,

    /// Last name of the account holder
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    /// Optional avatar image URL
    pub avatar: Option<String>,

    /// Password for the account
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional code granting administrator rights
    pub admin_code: Option<String>,
}

/// Request structure for login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the account
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password for the account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request structure for starting a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address the reset link should be sent to
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
}

/// Request structure for completing a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// The new password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Confirmation of the new password
    pub confirm: String,
}

/// Account information returned to the client after auth operations
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Username of the account
    pub username: String,
    /// Email address of the account
    pub email: String,
    /// First name of the account holder
    pub first_name: String,
    /// Last name of the account holder
    pub last_name: String,
    /// Avatar image URL, if set
    pub avatar_url: Option<String>,
    /// Whether the account has administrator rights
    pub is_admin: bool,
    /// Whether the registration fee has been paid
    pub is_paid: bool,
}

/// Public profile shape for the user page
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Username of the account
    pub username: String,
    /// First name of the account holder
    pub first_name: String,
    /// Last name of the account holder
    pub last_name: String,
    /// Avatar image URL, if set
    pub avatar_url: Option<String>,
}

/// Account model representing the database schema
#[derive(Debug, sqlx::FromRow)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Username of the account
    pub username: String,
    /// Email address of the account
    pub email: String,
    /// First name of the account holder
    pub first_name: String,
    /// Last name of the account holder
    pub last_name: String,
    /// Avatar image URL (nullable)
    pub avatar_url: Option<String>,
    /// Hashed password of the account
    pub password_hash: String,
    /// Whether the account has administrator rights
    pub is_admin: bool,
    /// Whether the one-time registration fee has been paid
    pub is_paid: bool,
    /// Pending password-reset token (nullable)
    pub reset_token: Option<String>,
    /// Expiry of the pending password-reset token (nullable)
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// Idempotency nonce for the current checkout attempt (nullable)
    pub checkout_nonce: Option<String>,
    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Account information safe to return to the client.
    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
            is_admin: self.is_admin,
            is_paid: self.is_paid,
        }
    }

    /// Public profile shape for the user page.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Immutable identity attached to a request by the session middleware
#[derive(Debug, Clone)]
pub struct Identity {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Username of the account
    pub username: String,
    /// Whether the account has administrator rights
    pub is_admin: bool,
    /// Whether the registration fee has been paid
    pub is_paid: bool,
}

/// Custom error type for account-related errors
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The username is already in use
    #[error("Username already exists")]
    UsernameTaken,

    /// The email address is already in use
    #[error("Email already exists")]
    EmailTaken,

    /// The provided credentials are invalid
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request has no authenticated identity
    #[error("Login required")]
    Unauthenticated,

    /// The account was not found
    #[error("Account not found")]
    AccountNotFound,

    /// The reset token does not match a pending, unexpired reset
    #[error("Password reset token is invalid or has expired")]
    InvalidResetToken,

    /// The password and confirmation fields differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl actix_web::ResponseError for AccountError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AccountError::UsernameTaken => HttpResponse::Conflict().json(serde_json::json!({
                "error": "username_taken",
                "message": "An account with this username already exists"
            })),
            AccountError::EmailTaken => HttpResponse::Conflict().json(serde_json::json!({
                "error": "email_taken",
                "message": "An account with this email already exists"
            })),
            AccountError::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid_credentials",
                "message": "Invalid username or password"
            })),
            AccountError::Unauthenticated => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "login_required",
                "message": "You need to be logged in to do that"
            })),
            AccountError::AccountNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "account_not_found",
                "message": "Account not found"
            })),
            AccountError::InvalidResetToken => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_reset_token",
                "message": "Password reset token is invalid or has expired."
            })),
            AccountError::PasswordMismatch => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "password_mismatch",
                "message": "Passwords do not match."
            })),
            AccountError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
