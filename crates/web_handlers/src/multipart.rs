use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use lazy_static::lazy_static;
use regex::Regex;

use listing_services::types::{CampgroundDraft, ListingError};

lazy_static! {
    static ref IMAGE_FILENAME: Regex = Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").unwrap();
}

/// Parsed multipart form for creating or editing a campground
#[derive(Debug)]
pub struct CampgroundForm {
    /// Name of the campground
    pub name: String,
    /// Price per night
    pub price: f64,
    /// Description of the campground
    pub description: String,
    /// Free-text address, to be resolved by the geocoder
    pub location: String,
    /// Uploaded image file, if one was submitted
    pub image: Option<ImageUpload>,
}

impl CampgroundForm {
    /// The validated scalar fields of the form.
    pub fn draft(&self) -> CampgroundDraft {
        CampgroundDraft {
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
        }
    }
}

/// An uploaded image file
pub struct ImageUpload {
    /// Original filename as submitted
    pub filename: String,
    /// Declared content type
    pub content_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Accepts image files only, matching on the submitted filename.
pub fn is_image_filename(filename: &str) -> bool {
    IMAGE_FILENAME.is_match(filename)
}

pub(crate) fn parse_price(raw: &str) -> Result<f64, ListingError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ListingError::Validation("Price must be a number".to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(ListingError::Validation(
            "Price must not be negative".to_string(),
        ));
    }

    Ok(price)
}

/// Parses the campground create/edit form from a multipart payload.
///
/// Text fields: `name`, `price`, `description`, `location`; file field:
/// `image` (optional). Unknown fields are ignored.
pub async fn parse_campground_form(mut payload: Multipart) -> Result<CampgroundForm, ListingError> {
    let mut name = None;
    let mut price = None;
    let mut description = None;
    let mut location = None;
    let mut image = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ListingError::Validation(format!("Malformed form data: {}", e)))?
    {
        let field_name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        if field_name == "image" {
            let filename = field
                .content_disposition()
                .get_filename()
                .map(|s| s.to_string())
                .unwrap_or_default();

            // A file input submitted without a selection arrives as an
            // empty filename; treat it as no upload
            if filename.is_empty() {
                drain_field(&mut field).await?;
                continue;
            }

            if !is_image_filename(&filename) {
                return Err(ListingError::Validation(
                    "Only image files are allowed!".to_string(),
                ));
            }

            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = read_field_bytes(&mut field).await?;

            image = Some(ImageUpload {
                filename,
                content_type,
                bytes,
            });
        } else {
            let bytes = read_field_bytes(&mut field).await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| ListingError::Validation("Form fields must be UTF-8".to_string()))?;

            match field_name.as_str() {
                "name" => name = Some(value),
                "price" => price = Some(value),
                "description" => description = Some(value),
                "location" => location = Some(value),
                _ => {}
            }
        }
    }

    let name = require_text(name, "Name")?;
    let description = require_text(description, "Description")?;
    let location = require_text(location, "Location")?;
    let price = parse_price(&require_text(price, "Price")?)?;

    Ok(CampgroundForm {
        name,
        price,
        description,
        location,
        image,
    })
}

fn require_text(value: Option<String>, field: &str) -> Result<String, ListingError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ListingError::Validation(format!("{} is required", field))),
    }
}

async fn read_field_bytes(field: &mut actix_multipart::Field) -> Result<Vec<u8>, ListingError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ListingError::Validation(format!("Malformed form data: {}", e)))?
    {
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

async fn drain_field(field: &mut actix_multipart::Field) -> Result<(), ListingError> {
    while field
        .try_next()
        .await
        .map_err(|e| ListingError::Validation(format!("Malformed form data: {}", e)))?
        .is_some()
    {}

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_filename_accepts_image_extensions() {
        assert!(is_image_filename("site.jpg"));
        assert!(is_image_filename("site.JPEG"));
        assert!(is_image_filename("site.png"));
        assert!(is_image_filename("site.gif"));
    }

    #[test]
    fn test_is_image_filename_rejects_other_files() {
        assert!(!is_image_filename("notes.txt"));
        assert!(!is_image_filename("payload.jpg.exe"));
        assert!(!is_image_filename("jpg"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("12.50").unwrap(), 12.5);
        assert_eq!(parse_price(" 20 ").unwrap(), 20.0);

        assert!(parse_price("twenty").is_err());
        assert!(parse_price("-5").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(Some("ok".to_string()), "Name").unwrap(), "ok");
        assert!(require_text(Some("   ".to_string()), "Name").is_err());
        assert!(require_text(None, "Name").is_err());
    }
}
