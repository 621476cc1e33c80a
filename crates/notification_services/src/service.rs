use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;

use crate::types::NotificationError;

/// Mail sender for account notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    ses_client: SesClient,
    from_email: String,
    base_url: String,
}

impl NotificationService {
    /// Creates a new instance of the NotificationService with the AWS client initialized.
    pub async fn new() -> Result<Self, NotificationError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let ses_client = SesClient::new(&config);

        let from_email =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "noreply@campstead.com".to_string());
        let base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Self {
            ses_client,
            from_email,
            base_url,
        })
    }

    /// Sends the password-reset link to the account's email.
    pub async fn send_password_reset(
        &self,
        email: &str,
        token: &str,
    ) -> Result<(), NotificationError> {
        let subject = "Campstead Password Reset";
        let body = password_reset_body(&self.base_url, token);

        self.send_email(email, subject, &body).await
    }

    /// Sends the confirmation notice after a password change.
    pub async fn send_password_changed(&self, email: &str) -> Result<(), NotificationError> {
        let subject = "Your password has been changed";
        let body = password_changed_body(email);

        self.send_email(email, subject, &body).await
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(subject)
            .build()
            .map_err(|e| NotificationError::SesError(format!("Failed to build subject: {}", e)))?;

        let text_content = aws_sdk_ses::types::Content::builder()
            .data(body)
            .build()
            .map_err(|e| NotificationError::SesError(format!("Failed to build body: {}", e)))?;

        let message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(aws_sdk_ses::types::Body::builder().text(text_content).build())
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(to)
            .build();

        let result = self
            .ses_client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(message)
            .send()
            .await;

        match result {
            Ok(output) => {
                log::info!("Mail sent to {}, SES message id: {}", to, output.message_id());
                Ok(())
            }
            Err(e) => {
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotificationError::SesError(error_msg))
            }
        }
    }
}

fn password_reset_body(base_url: &str, token: &str) -> String {
    format!(
        "You are receiving this because you (or someone else) have requested the reset of the password for your account.\n\n\
         Please click on the following link, or paste this into your browser to complete the process:\n\n\
         {}/reset/{}\n\n\
         If you did not request this, please ignore this email and your password will remain unchanged.\n",
        base_url, token
    )
}

fn password_changed_body(email: &str) -> String {
    format!(
        "Hello,\n\nThis is a confirmation that the password for your account {} has just been changed.\n",
        email
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_body_contains_link() {
        let body = password_reset_body("https://campstead.example", "deadbeef");

        assert!(body.contains("https://campstead.example/reset/deadbeef"));
        assert!(body.contains("your password will remain unchanged"));
    }

    #[test]
    fn test_password_changed_body_names_the_account() {
        let body = password_changed_body("camper@example.com");

        assert!(body.contains("camper@example.com"));
        assert!(body.contains("has just been changed"));
    }
}
