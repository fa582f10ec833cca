use crate::models::{NewVideo, Video};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for asset metadata persistence. Handlers only see this trait, so the
/// Postgres implementation can be replaced by in-memory doubles in tests.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Records a processed upload and returns the stored row.
    async fn create_video(&self, video: NewVideo) -> Result<Video, sqlx::Error>;
    /// All videos, newest first.
    async fn list_videos(&self) -> Result<Vec<Video>, sqlx::Error>;
    /// `Ok(None)` when no row has this id.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share persistence access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_video(&self, video: NewVideo) -> Result<Video, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos
                (id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video.title)
        .bind(video.description)
        .bind(video.public_id)
        .bind(video.original_size)
        .bind(video.compressed_size)
        .bind(video.duration)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_videos(&self) -> Result<Vec<Video>, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            SELECT id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at
            FROM videos
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, sqlx::Error> {
        sqlx::query_as::<_, Video>(
            r#"
            SELECT id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
