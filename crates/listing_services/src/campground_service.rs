use sqlx::{PgPool, Row};
use uuid::Uuid;

use account_services::types::Identity;

use crate::types::{
    Campground, CampgroundDraft, Comment, ListingError, ResolvedLocation, StoredImageRef,
};

const CAMPGROUND_COLUMNS: &str = r#"
    id, name, price, description, location, latitude, longitude,
    image_url, image_public_id, owner_id, owner_username, created_at, updated_at
"#;

/// Service for campground listing operations
pub struct CampgroundService {
    pool: PgPool,
}

impl CampgroundService {
    /// Creates a new instance of `CampgroundService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists all campgrounds, newest first.
    pub async fn list_all(&self) -> Result<Vec<Campground>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Searches campgrounds by name, location, or owner username
    /// (case-insensitive substring match).
    pub async fn search(&self, term: &str) -> Result<Vec<Campground>, ListingError> {
        let pattern = format!("%{}%", escape_like(term));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {CAMPGROUND_COLUMNS} FROM campgrounds
            WHERE name ILIKE $1 OR location ILIKE $1 OR owner_username ILIKE $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Lists campgrounds owned by the given account, newest first.
    pub async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Campground>, ListingError> {
        let rows = sqlx::query(&format!(
            "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Creates a new campground owned by the given identity.
    pub async fn create(
        &self,
        owner: &Identity,
        draft: &CampgroundDraft,
        location: &ResolvedLocation,
        image: Option<&StoredImageRef>,
    ) -> Result<Campground, ListingError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO campgrounds (
                name, price, description, location, latitude, longitude,
                image_url, image_public_id, owner_id, owner_username
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CAMPGROUND_COLUMNS}
            "#,
        ))
        .bind(draft.name.trim())
        .bind(draft.price)
        .bind(draft.description.trim())
        .bind(&location.formatted_address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(image.map(|i| i.url.clone()))
        .bind(image.map(|i| i.public_id.clone()))
        .bind(owner.id)
        .bind(&owner.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(campground_from_row(&row))
    }

    /// Gets a campground by ID, returning `None` if absent.
    pub async fn get(&self, campground_id: &Uuid) -> Result<Option<Campground>, ListingError> {
        let row = sqlx::query(&format!(
            "SELECT {CAMPGROUND_COLUMNS} FROM campgrounds WHERE id = $1"
        ))
        .bind(campground_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campground_from_row))
    }

    /// Gets a campground and its comments, oldest comment first.
    pub async fn get_with_comments(
        &self,
        campground_id: &Uuid,
    ) -> Result<Option<(Campground, Vec<Comment>)>, ListingError> {
        let campground = match self.get(campground_id).await? {
            Some(campground) => campground,
            None => return Ok(None),
        };

        let rows = sqlx::query(
            r#"
            SELECT id, campground_id, body, owner_id, owner_username, created_at, updated_at
            FROM comments
            WHERE campground_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(campground_id)
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.iter().map(crate::comment_service::comment_from_row).collect();

        Ok(Some((campground, comments)))
    }

    /// Updates a campground's fields. `location` and `image` are applied
    /// only when present (the address did not change, or no new file was
    /// uploaded, respectively).
    pub async fn update(
        &self,
        campground_id: &Uuid,
        draft: &CampgroundDraft,
        location: Option<&ResolvedLocation>,
        image: Option<&StoredImageRef>,
    ) -> Result<Campground, ListingError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE campgrounds
            SET name = $1,
                price = $2,
                description = $3,
                location = COALESCE($4, location),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                image_url = COALESCE($7, image_url),
                image_public_id = COALESCE($8, image_public_id),
                updated_at = NOW()
            WHERE id = $9
            RETURNING {CAMPGROUND_COLUMNS}
            "#,
        ))
        .bind(draft.name.trim())
        .bind(draft.price)
        .bind(draft.description.trim())
        .bind(location.map(|l| l.formatted_address.clone()))
        .bind(location.map(|l| l.latitude))
        .bind(location.map(|l| l.longitude))
        .bind(image.map(|i| i.url.clone()))
        .bind(image.map(|i| i.public_id.clone()))
        .bind(campground_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ListingError::NotFound("Campground"))?;

        Ok(campground_from_row(&row))
    }

    /// Deletes a campground and all of its comments in one transaction, so
    /// no orphaned comments remain.
    pub async fn delete(&self, campground_id: &Uuid) -> Result<(), ListingError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE campground_id = $1")
            .bind(campground_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM campgrounds WHERE id = $1")
            .bind(campground_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ListingError::NotFound("Campground"));
        }

        tx.commit().await?;
        Ok(())
    }
}

pub(crate) fn campground_from_row(row: &sqlx::postgres::PgRow) -> Campground {
    Campground {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        description: row.get("description"),
        location: row.get("location"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        image_url: row.get("image_url"),
        image_public_id: row.get("image_public_id"),
        owner_id: row.get("owner_id"),
        owner_username: row.get("owner_username"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Escapes LIKE wildcards in a user-supplied search term so they match
/// literally.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passes_plain_terms_through() {
        assert_eq!(escape_like("granite flats"), "granite flats");
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_fun"), "100\\%\\_fun");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_escape_like_escapes_backslash_before_wildcards() {
        // A term ending in \% must not un-escape the percent
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }
}
