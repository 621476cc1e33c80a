use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use account_services::middleware::{CurrentUser, MaybeUser};
use geocoding::GeocoderClient;
use listing_services::campground_service::CampgroundService;
use listing_services::guard;
use listing_services::types::*;
use media_storage::MediaStore;

use crate::multipart::{ImageUpload, parse_campground_form};

/// Query parameters for the campground index
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Optional search term matched against name, location, and owner
    pub search: Option<String>,
}

/// Lists all campgrounds, or searches them when a term is given.
pub async fn list_campgrounds(
    pool: web::Data<PgPool>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ListingError> {
    let service = CampgroundService::new(pool.get_ref().clone());

    let campgrounds = match query.search.as_deref() {
        Some(term) if !term.trim().is_empty() => service.search(term.trim()).await?,
        _ => service.list_all().await?,
    };

    Ok(HttpResponse::Ok().json(ListCampgroundsResponse {
        total: campgrounds.len() as i64,
        campgrounds,
    }))
}

/// Creates a new campground owned by the authenticated, paid account.
///
/// The multipart form carries the listing fields plus an optional image; the
/// address is resolved by the geocoder before anything is stored.
pub async fn create_campground(
    pool: web::Data<PgPool>,
    geocoder: web::Data<GeocoderClient>,
    media_store: web::Data<MediaStore>,
    user: CurrentUser,
    payload: Multipart,
) -> Result<HttpResponse, ListingError> {
    if !user.0.is_paid {
        return Err(ListingError::PaymentRequired);
    }

    let mut form = parse_campground_form(payload).await?;

    let location = resolve_location(&geocoder, &form.location).await?;
    let image = store_image(&media_store, form.image.take()).await?;

    let service = CampgroundService::new(pool.get_ref().clone());
    let campground = service
        .create(&user.0, &form.draft(), &location, image.as_ref())
        .await?;

    log::info!(
        "Campground {} created by {}",
        campground.id,
        user.0.username
    );

    Ok(HttpResponse::Created().json(campground))
}

/// Shows one campground with its comments.
pub async fn show_campground(
    pool: web::Data<PgPool>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ListingError> {
    let campground_id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let (campground, comments) = service
        .get_with_comments(&campground_id)
        .await?
        .ok_or(ListingError::NotFound("Campground"))?;

    Ok(HttpResponse::Ok().json(CampgroundDetail {
        campground,
        comments,
    }))
}

/// Returns a campground for editing, after the ownership check.
pub async fn edit_campground(
    pool: web::Data<PgPool>,
    user: MaybeUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ListingError> {
    let campground_id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let campground = service.get(&campground_id).await?;
    guard::authorize(user.0.as_ref(), campground.as_ref()).into_result("Campground")?;

    let campground = match campground {
        Some(campground) => campground,
        None => return Err(ListingError::NotFound("Campground")),
    };

    Ok(HttpResponse::Ok().json(campground))
}

/// Updates a campground after re-checking ownership against current state.
///
/// The address is re-geocoded only when it changed, and a newly uploaded
/// image replaces the previous one at the image host.
pub async fn update_campground(
    pool: web::Data<PgPool>,
    geocoder: web::Data<GeocoderClient>,
    media_store: web::Data<MediaStore>,
    user: MaybeUser,
    path: web::Path<uuid::Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, ListingError> {
    let campground_id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let existing = service.get(&campground_id).await?;
    guard::authorize(user.0.as_ref(), existing.as_ref()).into_result("Campground")?;

    let existing = match existing {
        Some(campground) => campground,
        None => return Err(ListingError::NotFound("Campground")),
    };

    let mut form = parse_campground_form(payload).await?;

    let location = if existing.location.as_deref() != Some(form.location.trim()) {
        Some(resolve_location(&geocoder, &form.location).await?)
    } else {
        None
    };

    let image = match form.image.take() {
        Some(upload) => {
            // Replacing the image removes the previous one from the host
            if let Some(public_id) = &existing.image_public_id {
                media_store
                    .delete(public_id)
                    .await
                    .map_err(|e| ListingError::Upstream(e.to_string()))?;
            }
            store_image(&media_store, Some(upload)).await?
        }
        None => None,
    };

    let campground = service
        .update(&campground_id, &form.draft(), location.as_ref(), image.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(campground))
}

/// Deletes a campground and its comments after re-checking ownership.
pub async fn delete_campground(
    pool: web::Data<PgPool>,
    media_store: web::Data<MediaStore>,
    user: MaybeUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, ListingError> {
    let campground_id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let existing = service.get(&campground_id).await?;
    guard::authorize(user.0.as_ref(), existing.as_ref()).into_result("Campground")?;

    let existing = match existing {
        Some(campground) => campground,
        None => return Err(ListingError::NotFound("Campground")),
    };

    // A failed image-host delete must not leave the listing behind
    if let Some(public_id) = &existing.image_public_id {
        if let Err(e) = media_store.delete(public_id).await {
            log::warn!("Failed to delete image {}: {}", public_id, e);
        }
    }

    service.delete(&campground_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn resolve_location(
    geocoder: &GeocoderClient,
    address: &str,
) -> Result<ResolvedLocation, ListingError> {
    let location = geocoder
        .geocode(address)
        .await
        .map_err(|e| ListingError::Upstream(e.to_string()))?
        .ok_or(ListingError::InvalidAddress)?;

    Ok(ResolvedLocation {
        formatted_address: location.formatted_address,
        latitude: location.latitude,
        longitude: location.longitude,
    })
}

async fn store_image(
    media_store: &MediaStore,
    upload: Option<ImageUpload>,
) -> Result<Option<StoredImageRef>, ListingError> {
    let upload = match upload {
        Some(upload) => upload,
        None => return Ok(None),
    };

    let stored = media_store
        .upload(upload.bytes, &upload.content_type)
        .await
        .map_err(|e| ListingError::Upstream(e.to_string()))?;

    Ok(Some(StoredImageRef {
        url: stored.secure_url,
        public_id: stored.public_id,
    }))
}
