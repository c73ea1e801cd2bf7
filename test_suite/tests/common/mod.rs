use crudbase::{BlockingConnection, DatabaseConfig};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use shared_models::{Migrator, UserCreate};
use tokio::sync::Mutex;

// Tests against a shared server must not migrate over each other.
static SERVER_SETUP_MUTEX: Mutex<()> = Mutex::const_new(());

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url_override: Some(get_test_database_url()),
        ..DatabaseConfig::default()
    }
}

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn reset_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared("DROP TABLE IF EXISTS users").await?;
    db.execute_unprepared("DROP TABLE IF EXISTS seaql_migrations").await?;
    Ok(())
}

/// Fresh `users` table on the configured store.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let config = test_config();
    let in_memory = config.url().contains(":memory:");
    let _lock = if in_memory {
        None
    } else {
        Some(SERVER_SETUP_MUTEX.lock().await)
    };

    let db = Database::connect(config.connect_options()).await?;
    if !in_memory {
        reset_schema(&db).await?;
    }
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Blocking counterpart of [`setup_test_db`]. Call from a plain `#[test]`.
#[allow(dead_code)]
pub fn setup_blocking_db() -> BlockingConnection {
    init_tracing();
    let config = test_config();
    let in_memory = config.url().contains(":memory:");
    let conn = BlockingConnection::connect(&config).expect("store reachable");
    conn.run(|db| async move {
        if !in_memory {
            let _lock = SERVER_SETUP_MUTEX.lock().await;
            reset_schema(db).await?;
            return Migrator::up(db, None).await;
        }
        Migrator::up(db, None).await
    })
    .expect("migrations applied");
    conn
}

#[allow(dead_code)]
pub fn user(username: &str, email: &str) -> UserCreate {
    UserCreate {
        username: username.to_string(),
        email: email.to_string(),
        full_name: None,
        bio: None,
        is_active: None,
    }
}
