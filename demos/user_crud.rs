//! Walks one user through create, get, update and delete, first with the
//! blocking adapter and then with the async one.
//!
//! ```sh
//! DATABASE_URL=sqlite::memory: RUST_LOG=crudbase=debug cargo run -p shared_models --example user_crud
//! ```

use crudbase::{AsyncCrud, DatabaseConfig, FilterOperator, ListQuery, SortDirection, SyncCrud};
use sea_orm_migration::MigratorTrait;
use shared_models::{Migrator, User, UserCreate, UserUpdate};
use tracing_subscriber::EnvFilter;

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

fn ana() -> UserCreate {
    UserCreate {
        username: "Ana".into(),
        email: "a@x.com".into(),
        full_name: Some("Ana Lima".into()),
        bio: None,
        is_active: None,
    }
}

fn email_patch(email: &str) -> UserUpdate {
    UserUpdate {
        email: Some(Some(email.into())),
        ..UserUpdate::default()
    }
}

fn run_blocking(config: &DatabaseConfig) -> DemoResult<()> {
    let users: SyncCrud<User> = SyncCrud::connect(config)?;
    users.connection().run(|db| Migrator::up(db, None))?;

    let created = users.create(ana())?;
    tracing::info!(id = created.id, username = %created.username, "blocking: created");

    let fetched = users.get(created.id)?;
    tracing::info!(?fetched, "blocking: fetched");

    let updated = users.update(created.id, email_patch("b@x.com"))?;
    tracing::info!(?updated, "blocking: updated");

    let page = users.list(
        &ListQuery::new()
            .filter("username", FilterOperator::Eq, "Ana")
            .sort_by("created_at", SortDirection::Desc)
            .limit(10),
    )?;
    tracing::info!(rows = page.items.len(), total = page.total_count, "blocking: listed");

    let removed = users.delete(created.id)?;
    let gone = users.get(created.id)?.is_none();
    tracing::info!(removed, gone, "blocking: deleted");
    Ok(())
}

async fn run_async(config: &DatabaseConfig) -> DemoResult<()> {
    let users: AsyncCrud<User> = AsyncCrud::connect(config).await?;
    Migrator::up(users.connection(), None).await?;

    let created = users.create(ana()).await?;
    tracing::info!(id = created.id, username = %created.username, "async: created");

    let updated = users.update(created.id, email_patch("b@x.com")).await?;
    tracing::info!(?updated, "async: updated");

    match users.create(ana()).await {
        Err(err) if err.is_conflict() => tracing::info!(%err, "async: duplicate refused"),
        other => tracing::warn!(?other, "async: duplicate was not refused"),
    }

    let removed = users.delete(created.id).await?;
    let removed_again = users.delete(created.id).await?;
    tracing::info!(removed, removed_again, "async: deleted");
    Ok(())
}

fn main() -> DemoResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DatabaseConfig::from_env()?;
    tracing::info!(?config, "loaded configuration");

    run_blocking(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async(&config))?;
    Ok(())
}
