use reqwest::Client;
use serde::Deserialize;

/// The one-time registration fee, in cents. The processor is always asked to
/// confirm exactly this amount regardless of what the client submits.
pub const REGISTRATION_FEE_CENTS: i64 = 2000;

const AUTHENTICATION_REQUIRED_MESSAGE: &str =
    "This card requires authentication in order to proceed. Please use a different card.";

/// Client for the payment processor (Stripe PaymentIntents API)
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

/// Successful confirmation: the opaque secret handed back to the caller
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// Opaque client secret for the confirmed intent
    pub client_secret: String,
}

/// Custom error type for payment operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The card requires additional authentication
    #[error("This card requires authentication in order to proceed. Please use a different card.")]
    AuthenticationRequired,

    /// Any other processor-reported failure, carrying the raw message
    #[error("{0}")]
    Declined(String),

    /// HTTP transport error
    #[error("Payment request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor answered with an unexpected payload
    #[error("Unexpected payment processor response: {0}")]
    Api(String),

    /// A local failure while recording the payment
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessorErrorResponse {
    error: ProcessorErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProcessorErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl PaymentClient {
    /// Creates a new payment client. The secret key comes from the
    /// `STRIPE_SECRET_KEY` environment variable.
    pub fn new() -> Result<Self, PaymentError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").unwrap_or_default();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: "https://api.stripe.com/v1".to_string(),
            secret_key,
        })
    }

    /// Creates and immediately confirms a PaymentIntent for the registration
    /// fee.
    ///
    /// The idempotency key ties retried submissions of the same checkout
    /// attempt to one charge at the processor.
    pub async fn confirm_registration_fee(
        &self,
        currency: &str,
        payment_method: &str,
        idempotency_key: &str,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let amount = REGISTRATION_FEE_CENTS.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method", payment_method),
            ("confirm", "true"),
            ("error_on_requires_action", "true"),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Idempotency-Key", idempotency_key)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let intent: PaymentIntentResponse = serde_json::from_str(&body)
                .map_err(|e| PaymentError::Api(e.to_string()))?;

            let client_secret = intent
                .client_secret
                .ok_or_else(|| PaymentError::Api("missing client_secret".to_string()))?;

            log::info!("Payment received");

            Ok(PaymentConfirmation { client_secret })
        } else {
            let error: ProcessorErrorResponse = serde_json::from_str(&body)
                .map_err(|e| PaymentError::Api(e.to_string()))?;

            Err(classify_decline(error.error))
        }
    }
}

/// Maps a processor error body to the user-facing failure.
fn classify_decline(error: ProcessorErrorBody) -> PaymentError {
    match error.code.as_deref() {
        Some("authentication_required") => PaymentError::AuthenticationRequired,
        _ => PaymentError::Declined(
            error
                .message
                .unwrap_or_else(|| "Payment was declined".to_string()),
        ),
    }
}

impl actix_web::ResponseError for PaymentError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            PaymentError::AuthenticationRequired => {
                HttpResponse::PaymentRequired().json(serde_json::json!({
                    "error": "authentication_required",
                    "message": AUTHENTICATION_REQUIRED_MESSAGE
                }))
            }
            PaymentError::Declined(msg) => HttpResponse::PaymentRequired().json(serde_json::json!({
                "error": "card_declined",
                "message": msg
            })),
            PaymentError::Http(_) | PaymentError::Api(_) => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "payment_processor_error",
                    "message": "The payment processor could not be reached"
                }))
            }
            PaymentError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_required_maps_to_specific_message() {
        let body = ProcessorErrorBody {
            code: Some("authentication_required".to_string()),
            message: Some("Your card was declined.".to_string()),
        };

        let err = classify_decline(body);

        assert!(matches!(err, PaymentError::AuthenticationRequired));
        assert!(err.to_string().contains("requires authentication"));
    }

    #[test]
    fn test_other_codes_surface_raw_processor_message() {
        let body = ProcessorErrorBody {
            code: Some("card_declined".to_string()),
            message: Some("Your card has insufficient funds.".to_string()),
        };

        let err = classify_decline(body);

        assert!(
            matches!(err, PaymentError::Declined(ref msg) if msg == "Your card has insufficient funds.")
        );
    }

    #[test]
    fn test_missing_message_falls_back() {
        let body = ProcessorErrorBody {
            code: None,
            message: None,
        };

        assert!(matches!(classify_decline(body), PaymentError::Declined(_)));
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": {
                "code": "authentication_required",
                "message": "Your card was declined. This transaction requires authentication.",
                "type": "card_error"
            }
        }"#;

        let parsed: ProcessorErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.error.code.as_deref(), Some("authentication_required"));
    }

    #[test]
    fn test_parse_intent_response() {
        let json = r#"{
            "id": "pi_3MtwBwLkdIwHu7ix28a3tqPa",
            "client_secret": "pi_3MtwBwLkdIwHu7ix28a3tqPa_secret_YrKJUKribcBjcG8HVhfZluoGH",
            "status": "succeeded"
        }"#;

        let parsed: PaymentIntentResponse = serde_json::from_str(json).unwrap();

        assert!(parsed.client_secret.unwrap().starts_with("pi_"));
    }
}
