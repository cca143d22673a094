//! # Sale Repository
//!
//! Read-side access and administration for persisted transactions.
//!
//! Writes go through [`crate::unit::UnitOfWork`]: a sale's header and lines
//! are only ever inserted inside one atomic unit of work, together with the
//! catalog read that priced them. This repository covers everything after
//! the commit: lookup, deletion, counts and aggregate summaries.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::{Transaction, TransactionLine};

pub(crate) const HEADER_COLUMNS: &str = "id, created_at, subtotal, tax_amount, total, \
                                         clerk_code, store_code, terminal_code, created_by";

pub(crate) const LINE_COLUMNS: &str = "id, transaction_id, line_no, product_code, product_name, \
                                       unit_price, quantity, line_total";

/// Inserts a transaction header on the given connection.
///
/// Callers are responsible for the surrounding transaction boundary.
pub(crate) async fn insert_header(
    conn: &mut SqliteConnection,
    header: &Transaction,
) -> DbResult<()> {
    sqlx::query(&format!(
        "INSERT INTO transactions ({HEADER_COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    ))
    .bind(&header.id)
    .bind(header.created_at)
    .bind(header.subtotal)
    .bind(header.tax_amount)
    .bind(header.total)
    .bind(&header.clerk_code)
    .bind(&header.store_code)
    .bind(&header.terminal_code)
    .bind(&header.created_by)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts one transaction line on the given connection.
pub(crate) async fn insert_line(
    conn: &mut SqliteConnection,
    line: &TransactionLine,
) -> DbResult<()> {
    sqlx::query(&format!(
        "INSERT INTO transaction_lines ({LINE_COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
    ))
    .bind(&line.id)
    .bind(&line.transaction_id)
    .bind(line.line_no)
    .bind(&line.product_code)
    .bind(&line.product_name)
    .bind(line.unit_price)
    .bind(line.quantity)
    .bind(line.line_total)
    .execute(conn)
    .await?;

    Ok(())
}

/// Aggregate figures over all persisted transactions.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub count: i64,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total: i64,
}

/// Repository for sale transaction reads and administration.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Fetches a transaction with its lines, ordered by line_no.
    pub async fn find_by_id(
        &self,
        id: &str,
    ) -> DbResult<Option<(Transaction, Vec<TransactionLine>)>> {
        let header = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {HEADER_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, TransactionLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM transaction_lines \
             WHERE transaction_id = ?1 ORDER BY line_no"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((header, lines)))
    }

    /// Deletes a transaction header; its lines go with it (cascade).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no transaction with that id
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        info!(id = %id, "Transaction deleted");
        Ok(())
    }

    /// Counts persisted transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts persisted transaction lines (diagnostics and tests).
    pub async fn line_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_lines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Aggregate figures over all transactions.
    pub async fn summary(&self) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            "SELECT \
                 COUNT(*) AS count, \
                 COALESCE(SUM(subtotal), 0) AS subtotal, \
                 COALESCE(SUM(tax_amount), 0) AS tax_amount, \
                 COALESCE(SUM(total), 0) AS total \
             FROM transactions",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Generates a new transaction ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new transaction line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
