//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for SQLite databases.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const MAX_CONNECTIONS: u32 = 5;

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        apply_pragmas(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database URL.
///
/// `:memory:` databases are private to a connection, so they get a
/// single-connection pool.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let max_size = if database_url.contains(":memory:") {
        1
    } else {
        MAX_CONNECTIONS
    };
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

/// Create a pool and bring its schema up to date.
///
/// # Errors
/// Returns an error if the pool cannot be created or migrations fail.
pub fn open(database_url: &str) -> Result<DbPool> {
    let pool = create_pool(database_url)?;
    run_migrations(&pool)?;
    Ok(pool)
}

fn apply_pragmas(conn: &mut SqliteConnection) -> QueryResult<()> {
    diesel::sql_query("PRAGMA busy_timeout=5000").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON").execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct TableCount {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        count: i64,
    }

    #[test]
    fn create_pool_with_memory_db() {
        let pool = create_pool(":memory:");
        assert!(pool.is_ok());
        assert_eq!(pool.unwrap().max_size(), 1);
    }

    #[test]
    fn run_migrations_creates_tables() {
        let pool = open(":memory:").unwrap();
        let mut conn = pool.get().unwrap();

        let result: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        assert_eq!(
            result,
            vec![
                "matchups",
                "pick_allocations",
                "pick_grants",
                "picks",
                "week_overrides"
            ]
        );
    }

    #[test]
    fn run_migrations_is_idempotent() {
        let pool = create_pool(":memory:").unwrap();

        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let result: i64 = diesel::sql_query(
            "SELECT COUNT(*) as count FROM sqlite_master WHERE type='table' AND name='matchups'",
        )
        .load::<TableCount>(&mut conn)
        .unwrap()
        .first()
        .unwrap()
        .count;

        assert_eq!(result, 1);
    }

    #[test]
    fn matchup_identity_is_unique() {
        let pool = open(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        let insert = "INSERT INTO matchups (id, phase, week, week_slot, away_team, home_team, kickoff, last_external_update) \
                      VALUES (?, 'REG', 1, 'reg1', 'Jets', 'Bills', '2026-09-13T17:00:00Z', '2026-09-01T00:00:00Z')";

        diesel::sql_query(insert)
            .bind::<diesel::sql_types::Text, _>("a")
            .execute(&mut conn)
            .unwrap();
        let duplicate = diesel::sql_query(insert)
            .bind::<diesel::sql_types::Text, _>("b")
            .execute(&mut conn);

        assert!(duplicate.is_err());
    }
}
