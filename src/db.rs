use crate::config::AppConfig;
use crate::entities;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

/// Establishes a connection pool using pool sizing from the app config.
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    let config = DbConfig {
        url: cfg.database_url.clone(),
        max_connections: cfg.db_max_connections,
        min_connections: cfg.db_min_connections,
        ..Default::default()
    };
    establish_connection_with_config(&config).await
}

/// Establishes a connection pool with explicit settings.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, DbErr> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    Database::connect(opt).await
}

/// Creates any missing tables from the entity definitions.
///
/// The schema is small enough that deriving it from the entities keeps a
/// single source of truth; existing tables are left untouched.
pub async fn run_migrations(db: &DbPool) -> Result<(), DbErr> {
    create_table_if_missing(db, entities::Category).await?;
    create_table_if_missing(db, entities::MenuItem).await?;
    create_table_if_missing(db, entities::Slide).await?;
    create_table_if_missing(db, entities::Coupon).await?;
    create_table_if_missing(db, entities::Cart).await?;
    create_table_if_missing(db, entities::CartItem).await?;
    create_table_if_missing(db, entities::StoreSettings).await?;
    create_table_if_missing(db, entities::Order).await?;
    create_table_if_missing(db, entities::OrderItem).await?;
    info!("Database schema is up to date");
    Ok(())
}

async fn create_table_if_missing<E>(db: &DbPool, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(&stmt).await?;
    Ok(())
}
