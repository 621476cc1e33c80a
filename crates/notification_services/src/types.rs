/// Custom error type for mail operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),
}
