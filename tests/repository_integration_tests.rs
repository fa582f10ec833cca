use media_studio::{
    models::NewVideo,
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Holds the pool of a real Postgres instance, migrated to the current schema.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }

    async fn cleanup(&self, public_id_prefix: &str) {
        sqlx::query("DELETE FROM videos WHERE public_id LIKE $1")
            .bind(format!("{public_id_prefix}%"))
            .execute(&self.pool)
            .await
            .expect("Failed to clean up test videos");
    }
}

fn new_video(prefix: &str, title: &str) -> NewVideo {
    NewVideo {
        title: title.to_string(),
        description: None,
        public_id: format!("{prefix}{}", Uuid::new_v4()),
        original_size: 8_000_000,
        compressed_size: 3_000_000,
        duration: 12.75,
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn test_create_and_get_video() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let prefix = "repo-test-get/";

    let created = repo
        .create_video(NewVideo {
            description: Some("with description".to_string()),
            ..new_video(prefix, "Round trip")
        })
        .await
        .unwrap();

    assert_eq!(created.title, "Round trip");
    assert_eq!(created.description.as_deref(), Some("with description"));
    assert_eq!(created.original_size, 8_000_000);
    assert_eq!(created.duration, 12.75);

    let fetched = repo.get_video(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.public_id, created.public_id);

    assert!(repo.get_video(Uuid::new_v4()).await.unwrap().is_none());

    ctx.cleanup(prefix).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn test_list_videos_newest_first() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let prefix = "repo-test-list/";

    let first = repo.create_video(new_video(prefix, "First")).await.unwrap();
    let second = repo.create_video(new_video(prefix, "Second")).await.unwrap();

    let ours: Vec<_> = repo
        .list_videos()
        .await
        .unwrap()
        .into_iter()
        .filter(|v| v.public_id.starts_with(prefix))
        .collect();

    assert_eq!(ours.len(), 2);
    assert_eq!(ours[0].id, second.id);
    assert_eq!(ours[1].id, first.id);

    ctx.cleanup(prefix).await;
}
