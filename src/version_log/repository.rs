use sqlx::PgPool;

use crate::version_log::{CreateVersionLog, UpdateVersionLog, VersionLog};

#[derive(Clone)]
pub struct VersionLogRepository {
    pool: PgPool,
}

impl VersionLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_current(&self) -> Result<Option<VersionLog>, sqlx::Error> {
        sqlx::query_as::<_, VersionLog>(
            "SELECT id, interface, api, calculator, package, package_update_timestamp, udi FROM version_logs LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert the version log. The table holds one row; a second insert is a
    /// unique violation.
    pub async fn create(&self, input: &CreateVersionLog) -> Result<VersionLog, sqlx::Error> {
        sqlx::query_as::<_, VersionLog>(
            r#"
            INSERT INTO version_logs (interface, api, calculator, package, udi)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, interface, api, calculator, package, package_update_timestamp, udi
            "#,
        )
        .bind(&input.interface)
        .bind(&input.api)
        .bind(&input.calculator)
        .bind(input.package)
        .bind(&input.udi)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, input: &UpdateVersionLog) -> Result<Option<VersionLog>, sqlx::Error> {
        sqlx::query_as::<_, VersionLog>(
            r#"
            UPDATE version_logs
            SET interface = COALESCE($1, interface),
                api = COALESCE($2, api),
                calculator = COALESCE($3, calculator),
                udi = COALESCE($4, udi)
            RETURNING id, interface, api, calculator, package, package_update_timestamp, udi
            "#,
        )
        .bind(&input.interface)
        .bind(&input.api)
        .bind(&input.calculator)
        .bind(&input.udi)
        .fetch_optional(&self.pool)
        .await
    }

    /// Bump the package number and stamp the release time
    pub async fn increment_package(&self) -> Result<Option<VersionLog>, sqlx::Error> {
        sqlx::query_as::<_, VersionLog>(
            r#"
            UPDATE version_logs
            SET package = package + 1,
                package_update_timestamp = NOW()
            RETURNING id, interface, api, calculator, package, package_update_timestamp, udi
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }
}
