//! # Unit of Work
//!
//! One atomic database transaction covering a whole purchase: the catalog
//! read that prices the order and the header + line inserts that record it.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Purchase Unit of Work                                  │
//! │                                                                         │
//! │  db.begin_unit()                      BEGIN                             │
//! │    unit.products_by_codes(codes)        SELECT ... WHERE code IN (...)  │
//! │    (pure pricing happens in till-core)                                  │
//! │    unit.insert_sale(header, lines)      INSERT header                   │
//! │                                         INSERT line × N                 │
//! │  unit.commit()                        COMMIT                            │
//! │                                                                         │
//! │  Dropping the unit uncommitted rolls everything back. A concurrent      │
//! │  catalog update is either fully visible to the read or fully            │
//! │  invisible; a header without lines is never observable.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::Sqlite;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::product::query_products_by_codes;
use crate::repository::sale::{insert_header, insert_line};
use till_core::{Product, Transaction, TransactionLine};

/// An open atomic unit of work.
///
/// Obtained from [`crate::Database::begin_unit`]. Consumed by
/// [`UnitOfWork::commit`] or [`UnitOfWork::rollback`]; dropping it
/// uncommitted rolls back.
pub struct UnitOfWork {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: sqlx::Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// Bulk catalog lookup inside this unit's transaction.
    ///
    /// ONE query for the whole code set; the caller diffs the returned map
    /// against the requested codes to find every unknown code at once.
    pub async fn products_by_codes(
        &mut self,
        codes: &[String],
    ) -> DbResult<HashMap<String, Product>> {
        query_products_by_codes(&mut *self.tx, codes).await
    }

    /// Inserts a finalized sale: header plus all lines.
    ///
    /// ## Failure Semantics
    /// Any failure leaves the unit poised for rollback; nothing from it is
    /// ever visible to readers outside the transaction.
    ///
    /// ## Errors
    /// * `DbError::TransactionFailed` - zero lines (an invariant the core
    ///   already enforces; guarded again here)
    /// * any `DbError` from the underlying inserts
    pub async fn insert_sale(
        &mut self,
        header: &Transaction,
        lines: &[TransactionLine],
    ) -> DbResult<()> {
        if lines.is_empty() {
            return Err(DbError::TransactionFailed(
                "refusing to persist a sale with zero lines".to_string(),
            ));
        }

        debug!(id = %header.id, lines = lines.len(), "Persisting sale");

        insert_header(&mut self.tx, header).await?;
        for line in lines {
            insert_line(&mut self.tx, line).await?;
        }

        Ok(())
    }

    /// Commits the unit of work.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Explicitly rolls the unit of work back.
    ///
    /// Dropping the unit has the same effect; this makes the abort visible
    /// at the call site.
    pub async fn rollback(self) -> DbResult<()> {
        info!("Rolling back unit of work");
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
