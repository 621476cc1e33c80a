use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use validator::Validate;

use account_services::service::AccountService;
use account_services::session::{SessionService, session_cookie};
use account_services::types::*;
use notification_services::NotificationService;

/// Starts a password reset: issues a time-boxed single-use token and mails a
/// reset link to the account's address.
///
/// The response is the same whether or not the email matches an account, so
/// this route cannot be used to probe for registered addresses.
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    mailer: web::Data<NotificationService>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AccountError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| AccountError::Validation(format!("Validation error: {}", e)))?;

    let account_service = AccountService::new(pool.get_ref().clone());

    match account_service.issue_reset_token(&request.email).await? {
        Some((account, token)) => {
            // Mail failures are logged only; the reset can be retried
            if let Err(e) = mailer.send_password_reset(&account.email, &token).await {
                log::warn!("Failed to send password reset email: {}", e);
            }
        }
        None => {
            log::info!("Password reset requested for unknown email");
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "If an account with that email exists, an e-mail has been sent with further instructions."
    })))
}

/// Checks whether a reset token is still valid, so the client knows whether
/// to show the new-password form.
pub async fn show_reset(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AccountError> {
    let token = path.into_inner();
    let account_service = AccountService::new(pool.get_ref().clone());

    account_service
        .get_account_by_reset_token(&token)
        .await?
        .ok_or(AccountError::InvalidResetToken)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Token is valid",
        "token": token
    })))
}

/// Completes a password reset: consumes the token, stores the new password,
/// and logs the account in.
///
/// Mismatched password fields fail before the token is touched, leaving it
/// valid for another attempt.
pub async fn reset_password(
    pool: web::Data<PgPool>,
    mailer: web::Data<NotificationService>,
    path: web::Path<String>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AccountError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| AccountError::Validation(format!("Validation error: {}", e)))?;

    let token = path.into_inner();
    let account_service = AccountService::new(pool.get_ref().clone());
    let session_service = SessionService::new(pool.get_ref().clone());

    // An expired or already-consumed token reports as such even when the
    // password fields also disagree
    account_service
        .get_account_by_reset_token(&token)
        .await?
        .ok_or(AccountError::InvalidResetToken)?;

    if request.password != request.confirm {
        return Err(AccountError::PasswordMismatch);
    }

    let account = account_service
        .consume_reset_token(&token, &request.password)
        .await?;

    // Log the account in with its new credential
    let session_token = session_service.create_session(&account.id).await?;

    if let Err(e) = mailer.send_password_changed(&account.email).await {
        log::warn!("Failed to send password changed email: {}", e);
    }

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(session_token))
        .json(serde_json::json!({
            "message": "Success! Your password has been changed."
        })))
}
