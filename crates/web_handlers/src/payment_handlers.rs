use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use account_services::middleware::CurrentUser;
use account_services::service::AccountService;
use account_services::types::AccountError;
use payments::{PaymentClient, PaymentError, REGISTRATION_FEE_CENTS};

/// Request structure for paying the registration fee
#[derive(Debug, Deserialize)]
pub struct PayRequest {
    /// Payment-method reference obtained by the client from the processor
    pub payment_method_id: String,
    /// Currency for the charge
    pub currency: String,
    /// Item list sent by the client; unused, the fee is fixed server-side
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

/// Shows the checkout state: the fee to pay and the idempotency token for
/// this checkout attempt.
pub async fn checkout(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<HttpResponse, AccountError> {
    if user.0.is_paid {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "paid": true,
            "message": "Your account is already paid"
        })));
    }

    let account_service = AccountService::new(pool.get_ref().clone());
    let checkout_token = account_service.checkout_nonce(&user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "paid": false,
        "amount": REGISTRATION_FEE_CENTS / 100,
        "currency": "usd",
        "checkout_token": checkout_token
    })))
}

/// Confirms the registration-fee payment with the processor and marks the
/// account paid.
///
/// The charge carries the account's checkout nonce as the processor
/// idempotency key, so resubmitting the same attempt cannot double-charge.
pub async fn pay(
    pool: web::Data<PgPool>,
    payment_client: web::Data<PaymentClient>,
    user: CurrentUser,
    request: web::Json<PayRequest>,
) -> Result<HttpResponse, PaymentError> {
    let account_service = AccountService::new(pool.get_ref().clone());

    let checkout_token = account_service
        .checkout_nonce(&user.0.id)
        .await
        .map_err(|e| PaymentError::Internal(e.to_string()))?;

    let confirmation = payment_client
        .confirm_registration_fee(&request.currency, &request.payment_method_id, &checkout_token)
        .await?;

    account_service
        .mark_paid(&user.0.id)
        .await
        .map_err(|e| PaymentError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "client_secret": confirmation.client_secret
    })))
}
