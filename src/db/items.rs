//! Relational persistence for item rows.
//!
//! Every mutation runs in its own transaction and is rolled back explicitly
//! before an error is returned. Column and direction names that end up in
//! SQL text come only from the closed enums in [`crate::models`].

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::{FieldValue, ItemField, ItemId, ItemRecord, ListOrder};

pub const ITEM_TABLE: &str = "inventory";

const ITEM_COLUMNS: &str =
    "item_id, created_at, updated_at, item_count, item_price, item_brand, item_name, item_desc";

/// PostgreSQL error code 23505 = unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[tonic::async_trait]
pub trait ItemStore: Send + Sync {
    /// Inserts a new row. A duplicate id yields [`AppError::AlreadyExists`].
    async fn insert(&self, item: &ItemRecord) -> AppResult<()>;

    /// Point lookup; `None` when no row matches.
    async fn get(&self, id: &ItemId) -> AppResult<Option<ItemRecord>>;

    async fn list(&self, order: ListOrder) -> AppResult<Vec<ItemRecord>>;

    /// Writes one column and advances `updated_at`.
    async fn update_field(
        &self,
        id: &ItemId,
        field: ItemField,
        value: &FieldValue,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Advances `updated_at` only.
    async fn touch(&self, id: &ItemId, now: DateTime<Utc>) -> AppResult<()>;

    async fn delete(&self, id: &ItemId) -> AppResult<()>;
}

pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn select_sql(order: ListOrder) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}, item_id",
            ITEM_COLUMNS,
            ITEM_TABLE,
            order.to_sql()
        )
    }

    fn update_sql(field: ItemField) -> String {
        format!(
            "UPDATE {} SET {} = $1, updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond') \
             WHERE item_id = $3",
            ITEM_TABLE,
            field.column()
        )
    }

    /// Executes a statement affecting at most the row keyed by `id`, then
    /// commits. Zero affected rows is reported as not-found.
    async fn commit_single_row(
        tx: Transaction<'static, Postgres>,
        result: Result<sqlx::postgres::PgQueryResult, sqlx::Error>,
        id: &ItemId,
        operation: &str,
    ) -> AppResult<()> {
        let rows_affected = match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                rollback(tx, operation).await;
                return Err(e.into());
            }
        };

        if rows_affected == 0 {
            rollback(tx, operation).await;
            return Err(AppError::NotFound(format!("item {}", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: operation={}, error={}", operation, e);
    }
}

fn bigint(count: u64) -> AppResult<i64> {
    i64::try_from(count)
        .map_err(|_| AppError::InvalidInput(format!("item_count out of range: {}", count)))
}

#[tonic::async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, item: &ItemRecord) -> AppResult<()> {
        let count = bigint(item.item_count)?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            ITEM_TABLE, ITEM_COLUMNS
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&sql)
            .bind(&item.item_id)
            .bind(item.created_at)
            .bind(item.updated_at)
            .bind(count)
            .bind(item.item_price)
            .bind(&item.item_brand)
            .bind(&item.item_name)
            .bind(&item.item_desc)
            .execute(&mut *tx)
            .await;

        if let Err(e) = result {
            rollback(tx, "insert").await;
            return Err(match e {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
                {
                    AppError::AlreadyExists(format!("item {}", item.item_id))
                }
                other => other.into(),
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: &ItemId) -> AppResult<Option<ItemRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE item_id = $1 LIMIT 1",
            ITEM_COLUMNS, ITEM_TABLE
        );

        let record = sqlx::query_as::<_, ItemRecord>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn list(&self, order: ListOrder) -> AppResult<Vec<ItemRecord>> {
        let records = sqlx::query_as::<_, ItemRecord>(&Self::select_sql(order))
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn update_field(
        &self,
        id: &ItemId,
        field: ItemField,
        value: &FieldValue,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if value.kind() != field.kind() {
            return Err(AppError::InvalidInput(format!(
                "value of type {:?} does not fit {}",
                value.kind(),
                field
            )));
        }

        let sql = Self::update_sql(field);
        let query = sqlx::query(&sql);
        let query = match value {
            FieldValue::Text(text) => query.bind(text.clone()),
            FieldValue::UnsignedInteger(count) => query.bind(bigint(*count)?),
            FieldValue::Float(price) => query.bind(*price),
        };

        let mut tx = self.pool.begin().await?;
        let result = query.bind(now).bind(id.as_str()).execute(&mut *tx).await;

        Self::commit_single_row(tx, result, id, "update_field").await
    }

    async fn touch(&self, id: &ItemId, now: DateTime<Utc>) -> AppResult<()> {
        let sql = format!(
            "UPDATE {} SET updated_at = GREATEST($1, updated_at + INTERVAL '1 microsecond') \
             WHERE item_id = $2",
            ITEM_TABLE
        );

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await;

        Self::commit_single_row(tx, result, id, "touch").await
    }

    async fn delete(&self, id: &ItemId) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE item_id = $1", ITEM_TABLE);

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql).bind(id.as_str()).execute(&mut *tx).await;

        Self::commit_single_row(tx, result, id, "delete").await
    }
}
