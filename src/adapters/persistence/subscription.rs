use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::ports::subscription_store::SubscriptionStore,
    domain::entities::subscription::Subscription,
};

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        tenant_id: row.get("tenant_id"),
        plan_id: row.get("plan_id"),
        status: row.get("status"),
        period_start: row.get("period_start"),
        period_end: row.get("period_end"),
        grace_end: row.get("grace_end"),
        cancelled_at: row.get("cancelled_at"),
        trial: row.get("trial"),
        override_active: row.get("override_active"),
        last_evaluated_at: row.get("last_evaluated_at"),
        version: row.get("version"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    tenant_id, plan_id, status, period_start, period_end, grace_end,
    cancelled_at, trial, override_active, last_evaluated_at, version,
    created_at
"#;

#[async_trait]
impl SubscriptionStore for PostgresPersistence {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE tenant_id = $1",
            SELECT_COLS
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn insert(&self, record: &Subscription) -> AppResult<Subscription> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                tenant_id, plan_id, status, period_start, period_end, grace_end,
                cancelled_at, trial, override_active, last_evaluated_at, version,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (tenant_id) DO NOTHING
            "#,
        )
        .bind(record.tenant_id)
        .bind(&record.plan_id)
        .bind(record.status)
        .bind(record.period_start)
        .bind(record.period_end)
        .bind(record.grace_end)
        .bind(record.cancelled_at)
        .bind(record.trial)
        .bind(record.override_active)
        .bind(record.last_evaluated_at)
        .bind(record.version)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::AlreadyExists);
        }
        Ok(record.clone())
    }

    async fn compare_and_swap(
        &self,
        expected_version: i64,
        record: &Subscription,
    ) -> AppResult<Subscription> {
        // The version predicate makes the write atomic: either the record is
        // still at the expected version and the whole row flips, or nothing
        // happens and the caller re-reads.
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $3,
                status = $4,
                period_start = $5,
                period_end = $6,
                grace_end = $7,
                cancelled_at = $8,
                trial = $9,
                override_active = $10,
                last_evaluated_at = $11,
                version = $12
            WHERE tenant_id = $1 AND version = $2
            "#,
        )
        .bind(record.tenant_id)
        .bind(expected_version)
        .bind(&record.plan_id)
        .bind(record.status)
        .bind(record.period_start)
        .bind(record.period_end)
        .bind(record.grace_end)
        .bind(record.cancelled_at)
        .bind(record.trial)
        .bind(record.override_active)
        .bind(record.last_evaluated_at)
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::VersionConflict);
        }
        Ok(record.clone())
    }

    async fn list_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
        after_tenant: Option<Uuid>,
        page_size: i64,
    ) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE status IN ('trialing', 'active', 'grace')
              AND COALESCE(grace_end, period_end) < $1
              AND ($2::uuid IS NULL OR tenant_id > $2)
            ORDER BY tenant_id
            LIMIT $3
            "#,
            SELECT_COLS
        ))
        .bind(cutoff)
        .bind(after_tenant)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }
}
