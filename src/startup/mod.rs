//! Database self-checks.
//!
//! Run once before the server accepts requests and again on every `/health`
//! call. Only critical checks (connectivity and schema) decide whether the
//! service is healthy; the others are reported as warnings.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::{index_exists, CatalogKind, REQUIRED_TABLES};
use crate::DbPool;

/// Outcome of one check
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub critical: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Check {
    fn ok(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            critical: false,
            message: message.into(),
            details: None,
        }
    }

    fn failed(
        name: &'static str,
        critical: bool,
        message: impl Into<String>,
        details: impl ToString,
    ) -> Self {
        Self {
            name,
            passed: false,
            critical,
            message: message.into(),
            details: Some(details.to_string()),
        }
    }
}

/// Every check result, as served by `/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// False when any critical check failed
    pub healthy: bool,
    pub checks: Vec<Check>,
    pub version: &'static str,
}

impl HealthReport {
    fn from_checks(checks: Vec<Check>) -> Self {
        Self {
            healthy: checks.iter().all(|c| c.passed || !c.critical),
            checks,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Names of the failed critical checks
    pub fn critical_failures(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|c| c.critical && !c.passed)
            .map(|c| c.name)
            .collect()
    }
}

/// Run every check against `db`
pub async fn check_database(db: &DbPool) -> HealthReport {
    HealthReport::from_checks(vec![
        check_connectivity(db).await,
        check_schema(db).await,
        check_favorite_uniqueness(db).await,
        check_foreign_keys(db).await,
    ])
}

/// Run every check and log each outcome
pub async fn run_startup_checks(db: &DbPool) -> HealthReport {
    info!("Running startup self-checks...");

    let report = check_database(db).await;

    for check in &report.checks {
        if check.passed {
            info!(check = check.name, message = %check.message, "Startup check passed");
        } else if check.critical {
            error!(
                check = check.name,
                message = %check.message,
                details = ?check.details,
                "Startup check failed"
            );
        } else {
            warn!(
                check = check.name,
                message = %check.message,
                details = ?check.details,
                "Startup check degraded"
            );
        }
    }

    report
}

async fn check_connectivity(db: &DbPool) -> Check {
    match sqlx::query("SELECT 1").fetch_one(db).await {
        Ok(_) => Check::ok("database_connectivity", "Database reachable"),
        Err(e) => Check::failed("database_connectivity", true, "Database unreachable", e),
    }
}

async fn check_schema(db: &DbPool) -> Check {
    let tables = match sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(db)
    .await
    {
        Ok(tables) => tables,
        Err(e) => return Check::failed("database_schema", true, "Schema query failed", e),
    };

    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|required| !tables.iter().any(|t| t == *required))
        .collect();

    if missing.is_empty() {
        Check::ok("database_schema", "All tables present")
    } else {
        Check::failed(
            "database_schema",
            true,
            "Missing tables",
            format!("Missing: {}", missing.join(", ")),
        )
    }
}

/// Without the unique indexes two concurrent adds can both insert
async fn check_favorite_uniqueness(db: &DbPool) -> Check {
    let mut missing = Vec::new();
    for kind in [CatalogKind::Planet, CatalogKind::People] {
        match index_exists(db, kind.unique_index()).await {
            Ok(true) => {}
            Ok(false) => missing.push(kind.unique_index()),
            Err(e) => {
                return Check::failed("favorite_uniqueness", false, "Index query failed", e)
            }
        }
    }

    if missing.is_empty() {
        Check::ok("favorite_uniqueness", "Favorite uniqueness indexes present")
    } else {
        Check::failed(
            "favorite_uniqueness",
            false,
            "Duplicate favorites are not blocked",
            format!("Missing: {}", missing.join(", ")),
        )
    }
}

async fn check_foreign_keys(db: &DbPool) -> Check {
    match sqlx::query_scalar::<_, i64>("PRAGMA foreign_keys")
        .fetch_one(db)
        .await
    {
        Ok(1) => Check::ok("foreign_keys", "Foreign keys enforced"),
        Ok(_) => Check::failed(
            "foreign_keys",
            false,
            "Foreign keys not enforced",
            "Favorites may reference missing users or catalog items",
        ),
        Err(e) => Check::failed("foreign_keys", false, "PRAGMA query failed", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::FAVORITE_PEOPLE_UNIQUE_INDEX;

    async fn memory_db() -> DbPool {
        crate::db::init(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_only_critical_failures_make_unhealthy() {
        let report = HealthReport::from_checks(vec![
            Check::ok("a", "ok"),
            Check::failed("b", false, "degraded", "details"),
        ]);
        assert!(report.healthy);
        assert!(report.critical_failures().is_empty());

        let report = HealthReport::from_checks(vec![
            Check::ok("a", "ok"),
            Check::failed("b", true, "down", "details"),
        ]);
        assert!(!report.healthy);
        assert_eq!(report.critical_failures(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_fresh_database_passes_all_checks() {
        let db = memory_db().await;

        let report = run_startup_checks(&db).await;
        assert!(report.healthy);
        assert_eq!(report.checks.len(), 4);
        assert!(report.checks.iter().all(|c| c.passed), "{:?}", report.checks);
    }

    #[tokio::test]
    async fn test_missing_table_is_critical() {
        let db = memory_db().await;
        sqlx::query("DROP TABLE favorite_people")
            .execute(&db)
            .await
            .unwrap();

        let report = check_database(&db).await;
        assert!(!report.healthy);
        assert_eq!(report.critical_failures(), vec!["database_schema"]);

        let schema = report
            .checks
            .iter()
            .find(|c| c.name == "database_schema")
            .unwrap();
        assert_eq!(schema.details.as_deref(), Some("Missing: favorite_people"));
    }

    #[tokio::test]
    async fn test_missing_unique_index_is_only_a_warning() {
        let db = memory_db().await;
        sqlx::query(&format!("DROP INDEX {}", FAVORITE_PEOPLE_UNIQUE_INDEX))
            .execute(&db)
            .await
            .unwrap();

        let report = check_database(&db).await;
        assert!(report.healthy);

        let uniqueness = report
            .checks
            .iter()
            .find(|c| c.name == "favorite_uniqueness")
            .unwrap();
        assert!(!uniqueness.passed);
        assert_eq!(
            uniqueness.details.as_deref(),
            Some("Missing: idx_favorite_people_user_people")
        );
    }
}
