//! Database access: the connection pool, the boot sequence and one gateway module per table.

pub mod assinaturas;
pub mod membros;
pub mod planos;

use std::path::Path;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tracing::info;

use crate::config::{AppConfig, DbConfig};

#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    /// Creates the database when it is missing, connects the pool, runs the migrations and,
    /// for a freshly created database, executes the seed script.
    pub async fn init(config: &AppConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let db_config = &config.db_config;

        let created = if db_config.create_if_missing {
            create_database_if_missing(db_config).await?
        } else {
            false
        };

        let max_cons = if cfg!(test) { 1 } else { db_config.max_connections };
        let db_pool = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(db_config.acquire_timeout())
            .connect_with(db_config.connection_options())
            .await
            .map_err(|_| Error::FailToCreatePool)?;

        sqlx::migrate!("./migrations").run(&db_pool).await?;
        info!("{:<20} - Migrations applied", "init_db");

        if created {
            if let Some(seed_script) = &db_config.seed_script {
                seed_database(&db_pool, seed_script).await?;
            }
        }

        Ok(Self { db: db_pool })
    }

    /// A pool that only connects once a query is made.
    /// Used where the database might not be reachable yet, e.g. for routes that never touch it.
    pub fn init_lazy(config: &AppConfig) -> Self {
        let db_config = &config.db_config;
        let db_pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(db_config.acquire_timeout())
            .connect_lazy_with(db_config.connection_options());

        Self { db: db_pool }
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

/// Returns `true` if the database had to be created.
async fn create_database_if_missing(db_config: &DbConfig) -> Result<bool> {
    // Connect to the maintenance database, the target one might not exist yet.
    let mut connection = PgConnection::connect_with(
        &db_config.connection_options_without_db().database("postgres"),
    )
    .await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_config.db_name)
            .fetch_one(&mut connection)
            .await?;

    if exists {
        return Ok(false);
    }

    info!(
        "{:<20} - Creating database '{}'",
        "init_db", db_config.db_name
    );
    let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name.replace('"', "\"\""));
    sqlx::query(&sql).execute(&mut connection).await?;
    connection.close().await?;

    Ok(true)
}

async fn seed_database(db: &PgPool, seed_script: &Path) -> Result<()> {
    info!(
        "{:<20} - Seeding the database from {}",
        "init_db",
        seed_script.display()
    );
    let script = tokio::fs::read_to_string(seed_script).await?;
    sqlx::raw_sql(&script).execute(db).await?;

    Ok(())
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool")]
    FailToCreatePool,

    #[error("unique constraint violated")]
    Duplicate,
    #[error("referenced row does not exist")]
    MissingReference,
    #[error("row is still referenced by another table")]
    StillReferenced,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}

/// The kind of statement that produced an error, foreign key violations mean different things
/// depending on the direction of the write.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Write {
    Insert,
    Update,
    Delete,
}

impl Error {
    /// Classifies constraint violations of write statements, every other error is kept as is.
    pub(crate) fn from_write(error: sqlx::Error, write: Write) -> Self {
        let code = match &error {
            sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
            _ => None,
        };

        match (code.as_deref(), write) {
            (Some(UNIQUE_VIOLATION), _) => Error::Duplicate,
            (Some(FOREIGN_KEY_VIOLATION), Write::Delete) => Error::StillReferenced,
            (Some(FOREIGN_KEY_VIOLATION), Write::Insert | Write::Update) => {
                Error::MissingReference
            }
            _ => Error::Sqlx(error),
        }
    }
}
