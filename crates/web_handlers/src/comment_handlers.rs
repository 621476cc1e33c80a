use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use account_services::middleware::{CurrentUser, MaybeUser};
use listing_services::comment_service::CommentService;
use listing_services::guard;
use listing_services::types::*;

/// Creates a comment on a campground for the authenticated account.
pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    request: web::Json<CommentRequest>,
) -> Result<HttpResponse, ListingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

    let campground_id = path.into_inner();
    let service = CommentService::new(pool.get_ref().clone());

    let comment = service.create(&campground_id, &user.0, &request.body).await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Updates a comment after re-checking ownership against current state.
pub async fn update_comment(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<CommentRequest>,
) -> Result<HttpResponse, ListingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| ListingError::Validation(format!("Validation error: {}", e)))?;

    let (campground_id, comment_id) = path.into_inner();
    let service = CommentService::new(pool.get_ref().clone());

    let existing = fetch_nested_comment(&service, &campground_id, &comment_id).await?;
    guard::authorize(user.0.as_ref(), existing.as_ref()).into_result("Comment")?;

    let comment = service.update(&comment_id, &request.body).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Deletes a comment after re-checking ownership against current state.
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ListingError> {
    let (campground_id, comment_id) = path.into_inner();
    let service = CommentService::new(pool.get_ref().clone());

    let existing = fetch_nested_comment(&service, &campground_id, &comment_id).await?;
    guard::authorize(user.0.as_ref(), existing.as_ref()).into_result("Comment")?;

    service.delete(&comment_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Fetches a comment, treating one that belongs to a different campground
/// than the path claims as absent.
async fn fetch_nested_comment(
    service: &CommentService,
    campground_id: &Uuid,
    comment_id: &Uuid,
) -> Result<Option<Comment>, ListingError> {
    let comment = service.get(comment_id).await?;

    Ok(comment.filter(|c| c.campground_id == *campground_id))
}
