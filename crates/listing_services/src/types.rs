use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Campground listing model representing the database schema
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Campground {
    /// Unique identifier for the listing
    pub id: Uuid,
    /// Name of the campground
    pub name: String,
    /// Price per night
    pub price: f64,
    /// Description of the campground
    pub description: String,
    /// Formatted address from the geocoder (nullable)
    pub location: Option<String>,
    /// Latitude from the geocoder (nullable)
    pub latitude: Option<f64>,
    /// Longitude from the geocoder (nullable)
    pub longitude: Option<f64>,
    /// Secure URL of the hosted image (nullable)
    pub image_url: Option<String>,
    /// Image-host public id, used for deletion (nullable)
    pub image_public_id: Option<String>,
    /// ID of the owning account
    pub owner_id: Uuid,
    /// Denormalized username of the owner for display
    pub owner_username: String,
    /// When the listing was created
    pub created_at: DateTime<Utc>,
    /// When the listing was last updated
    pub updated_at: DateTime<Utc>,
}

/// Comment model representing the database schema
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique identifier for the comment
    pub id: Uuid,
    /// ID of the campground the comment belongs to
    pub campground_id: Uuid,
    /// Text body of the comment
    pub body: String,
    /// ID of the owning account
    pub owner_id: Uuid,
    /// Denormalized username of the owner for display
    pub owner_username: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

/// A campground together with its comments, for the show route
#[derive(Debug, Serialize)]
pub struct CampgroundDetail {
    /// The campground listing
    pub campground: Campground,
    /// Comments on the listing, oldest first
    pub comments: Vec<Comment>,
}

/// Response structure for listing campgrounds
#[derive(Debug, Serialize)]
pub struct ListCampgroundsResponse {
    /// The campground listings
    pub campgrounds: Vec<Campground>,
    /// Total count of listings returned
    pub total: i64,
}

/// Location data resolved by the geocoder for a listing
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    /// Formatted address
    pub formatted_address: String,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

/// Reference to an image stored at the image host
#[derive(Debug, Clone)]
pub struct StoredImageRef {
    /// Secure URL serving the image
    pub url: String,
    /// Public id used to delete the image later
    pub public_id: String,
}

/// Validated field values for creating or updating a listing
#[derive(Debug)]
pub struct CampgroundDraft {
    /// Name of the campground
    pub name: String,
    /// Price per night
    pub price: f64,
    /// Description of the campground
    pub description: String,
}

/// Request structure for creating or editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    /// Text body of the comment
    #[validate(length(min = 1, max = 2000, message = "Comment text is required"))]
    pub body: String,
}

/// Custom error type for listing operations
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The geocoder found no match for the submitted address
    #[error("Invalid address")]
    InvalidAddress,

    /// The resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request has no authenticated identity
    #[error("Login required")]
    Unauthenticated,

    /// The registration fee has not been paid
    #[error("Registration fee not paid")]
    PaymentRequired,

    /// The identity is neither the owner nor an administrator
    #[error("Permission denied")]
    Forbidden,

    /// An upstream service failed
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for ListingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            ListingError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            ListingError::InvalidAddress => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_address",
                "message": "Invalid address"
            })),
            ListingError::NotFound(resource) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": format!("{} not found", resource)
            })),
            ListingError::Unauthenticated => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "login_required",
                "message": "You need to be logged in to do that"
            })),
            ListingError::PaymentRequired => HttpResponse::PaymentRequired().json(serde_json::json!({
                "error": "payment_required",
                "message": "Please pay registration fee before continuing"
            })),
            ListingError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "You don't have permission to do that"
            })),
            ListingError::Upstream(msg) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "upstream_error",
                "message": msg
            })),
            ListingError::Database(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
