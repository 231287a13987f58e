//! # Database Migrations
//!
//! Schema lives in `migrations/` as timestamped SQL files
//! (`YYYYMMDDHHMMSS_description.sql`) and is embedded at compile time.
//! SQLx tracks applied versions in `_sqlx_migrations` and takes an advisory
//! lock while migrating, so several server instances can start concurrently.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use super::store::StoreResult;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Manages database schema migrations.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Run all outstanding migrations in order
    pub async fn run_all(pool: &PgPool) -> StoreResult<()> {
        let known = MIGRATOR.iter().count();
        MIGRATOR.run(pool).await?;
        info!(migrations = known, "Database schema is up to date");
        Ok(())
    }

    /// Embedded migrations as `(version, description)` pairs
    pub fn embedded() -> Vec<(i64, String)> {
        MIGRATOR
            .iter()
            .map(|m| (m.version, m.description.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let migrations = DatabaseMigrations::embedded();
        assert!(!migrations.is_empty());
        let versions: Vec<i64> = migrations.iter().map(|(v, _)| *v).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
    }
}
