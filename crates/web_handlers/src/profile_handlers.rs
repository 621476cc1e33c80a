use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use uuid::Uuid;

use account_services::service::AccountService;
use account_services::types::AccountError;
use listing_services::campground_service::CampgroundService;

/// Shows a public user profile together with the campgrounds they own.
pub async fn show_user_profile(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let account_id = path.into_inner();
    let account_service = AccountService::new(pool.get_ref().clone());
    let campground_service = CampgroundService::new(pool.get_ref().clone());

    let account = account_service
        .get_account_by_id(&account_id)
        .await?
        .ok_or(AccountError::AccountNotFound)?;

    let campgrounds = campground_service.list_by_owner(&account.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": account.public_profile(),
        "campgrounds": campgrounds
    })))
}
