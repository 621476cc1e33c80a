use sqlx::{PgPool, Row};
use uuid::Uuid;

use account_services::types::Identity;

use crate::types::{Comment, ListingError};

/// Service for comment operations
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    /// Creates a new instance of `CommentService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a comment on the given campground.
    pub async fn create(
        &self,
        campground_id: &Uuid,
        owner: &Identity,
        body: &str,
    ) -> Result<Comment, ListingError> {
        // The parent listing must exist
        let exists = sqlx::query("SELECT id FROM campgrounds WHERE id = $1")
            .bind(campground_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(ListingError::NotFound("Campground"));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO comments (campground_id, body, owner_id, owner_username)
            VALUES ($1, $2, $3, $4)
            RETURNING id, campground_id, body, owner_id, owner_username, created_at, updated_at
            "#,
        )
        .bind(campground_id)
        .bind(body.trim())
        .bind(owner.id)
        .bind(&owner.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_from_row(&row))
    }

    /// Gets a comment by ID, returning `None` if absent.
    pub async fn get(&self, comment_id: &Uuid) -> Result<Option<Comment>, ListingError> {
        let row = sqlx::query(
            r#"
            SELECT id, campground_id, body, owner_id, owner_username, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    /// Updates a comment's body.
    pub async fn update(&self, comment_id: &Uuid, body: &str) -> Result<Comment, ListingError> {
        let row = sqlx::query(
            r#"
            UPDATE comments
            SET body = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, campground_id, body, owner_id, owner_username, created_at, updated_at
            "#,
        )
        .bind(body.trim())
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ListingError::NotFound("Comment"))?;

        Ok(comment_from_row(&row))
    }

    /// Deletes a comment.
    pub async fn delete(&self, comment_id: &Uuid) -> Result<(), ListingError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::NotFound("Comment"));
        }

        Ok(())
    }
}

pub(crate) fn comment_from_row(row: &sqlx::postgres::PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        campground_id: row.get("campground_id"),
        body: row.get("body"),
        owner_id: row.get("owner_id"),
        owner_username: row.get("owner_username"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
