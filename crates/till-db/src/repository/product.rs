//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Lookup by code (single) and by code set (ONE bulk query, never N+1)
//! - Catalog seeding (startup + administrative reseed)
//!
//! ## Bulk Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Why find_by_codes Is One Query                          │
//! │                                                                         │
//! │  A purchase with 30 unique codes must not become 30 round trips.       │
//! │                                                                         │
//! │  ❌ WRONG: for code in codes { SELECT ... WHERE code = ? }             │
//! │  ✅ RIGHT: SELECT ... WHERE code IN (?, ?, ..., ?)                     │
//! │                                                                         │
//! │  The caller diffs requested codes against the returned map to find     │
//! │  every unknown code at once.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use till_core::Product;

/// The default catalog, seeded when the products table is empty.
///
/// Thirteen stationery products with EAN-13-style codes and integer
/// minor-unit prices.
pub const DEFAULT_CATALOG: &[(&str, &str, i64)] = &[
    ("4901234567890", "Fountain Pen TECH ONE Signature 14K", 28500),
    ("4902345678901", "Ballpoint Pen TECH ONE Classic Black", 12800),
    ("4903456789012", "Mechanical Pencil TECH ONE Precision 0.5mm", 9800),
    ("4904567890123", "Notebook TECH ONE Premium A5 Leather", 6500),
    ("4905678901234", "Letter Set TECH ONE 20 Sheets 10 Envelopes", 3200),
    ("4906789012345", "Pen Case Italian Leather Brown", 8900),
    ("4907890123456", "Desk Mat Genuine Leather 60x40cm Dark Brown", 15800),
    ("4908901234567", "Paperweight Brass Geometric", 7400),
    ("4909012345678", "Letter Opener Stainless Mirror Finish", 4200),
    ("4910123456789", "Ink Bottle TECH ONE Black 50ml", 2800),
    ("4911234567890", "Pen Box Wooden Single Slot", 5600),
    ("4912345678901", "Book Stand Brass Antique Finish", 11200),
    ("4969757165713", "Sketchbook", 200),
];

pub(crate) const PRODUCT_COLUMNS: &str = "code, name, unit_price, created_at, updated_at";

/// Bulk catalog lookup on any executor (pool or open transaction).
///
/// ONE `WHERE code IN (...)` query for the whole code set. Codes absent from
/// the catalog are simply absent from the returned map.
pub(crate) async fn query_products_by_codes<'e, E>(
    executor: E,
    codes: &[String],
) -> DbResult<HashMap<String, Product>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    if codes.is_empty() {
        return Ok(HashMap::new());
    }

    debug!(count = codes.len(), "Bulk catalog lookup");

    let mut builder = sqlx::QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE code IN ("
    ));
    let mut separated = builder.separated(", ");
    for code in codes {
        separated.push_bind(code.as_str());
    }
    separated.push_unseparated(")");

    let products: Vec<Product> = builder.build_query_as::<Product>().fetch_all(executor).await?;

    Ok(products
        .into_iter()
        .map(|product| (product.code.clone(), product))
        .collect())
}

/// Repository for product catalog operations.
///
/// The checkout flow consumes this read-only; writes happen only through
/// seeding.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Finds a product by its barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - product found
    /// * `Ok(None)` - code not in the catalog
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Finds all products matching a set of codes in ONE query.
    ///
    /// ## Returns
    /// A map from code to product. Codes absent from the catalog are simply
    /// absent from the map; the caller computes the set difference.
    pub async fn find_by_codes(&self, codes: &[String]) -> DbResult<HashMap<String, Product>> {
        query_products_by_codes(&self.pool, codes).await
    }

    /// Lists the full catalog, ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            "INSERT INTO products (code, name, unit_price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.unit_price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts or replaces a product (administrative reseeding).
    ///
    /// On conflict the name, price and updated_at are overwritten; the
    /// original created_at is kept.
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO products (code, name, unit_price, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (code) DO UPDATE SET \
                 name = excluded.name, \
                 unit_price = excluded.unit_price, \
                 updated_at = excluded.updated_at",
        )
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.unit_price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts catalog products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Seeds the catalog with the given rows.
    ///
    /// ## Behavior
    /// * `force = false` - only inserts codes not already present
    /// * `force = true`  - overwrites name/price for existing codes too
    ///
    /// ## Returns
    /// The number of rows written.
    pub async fn seed_catalog(
        &self,
        rows: &[(&str, &str, i64)],
        force: bool,
    ) -> DbResult<usize> {
        let now = Utc::now();
        let mut written = 0usize;

        for (code, name, unit_price) in rows {
            if *unit_price < 0 {
                return Err(DbError::QueryFailed(format!(
                    "refusing to seed negative price for {code}"
                )));
            }

            let product = Product {
                code: (*code).to_string(),
                name: (*name).to_string(),
                unit_price: *unit_price,
                created_at: now,
                updated_at: now,
            };

            if force {
                self.upsert(&product).await?;
                written += 1;
            } else {
                let result = sqlx::query(
                    "INSERT INTO products (code, name, unit_price, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT (code) DO NOTHING",
                )
                .bind(&product.code)
                .bind(&product.name)
                .bind(product.unit_price)
                .bind(product.created_at)
                .bind(product.updated_at)
                .execute(&self.pool)
                .await?;
                written += result.rows_affected() as usize;
            }
        }

        info!(written, force, "Catalog seeded");
        Ok(written)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_find_by_code_roundtrip() {
        let db = test_db().await;
        let repo = db.products();

        repo.seed_catalog(DEFAULT_CATALOG, false).await.unwrap();

        let product = repo.find_by_code("4901234567890").await.unwrap().unwrap();
        assert_eq!(product.name, "Fountain Pen TECH ONE Signature 14K");
        assert_eq!(product.unit_price, 28500);

        let missing = repo.find_by_code("0000000000000").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_by_codes_is_a_set_lookup() {
        let db = test_db().await;
        let repo = db.products();
        repo.seed_catalog(DEFAULT_CATALOG, false).await.unwrap();

        let codes = vec![
            "4901234567890".to_string(),
            "4969757165713".to_string(),
            "0000000000000".to_string(), // not in catalog
        ];
        let found = repo.find_by_codes(&codes).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains_key("4901234567890"));
        assert!(found.contains_key("4969757165713"));
        assert!(!found.contains_key("0000000000000"));
    }

    #[tokio::test]
    async fn test_find_by_codes_empty_input() {
        let db = test_db().await;
        let found = db.products().find_by_codes(&[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_insert_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let now = Utc::now();
        let product = Product {
            code: "4900000000001".to_string(),
            name: "Test".to_string(),
            unit_price: 100,
            created_at: now,
            updated_at: now,
        };

        repo.insert(&product).await.unwrap();
        let err = repo.insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_without_force() {
        let db = test_db().await;
        let repo = db.products();

        let first = repo.seed_catalog(DEFAULT_CATALOG, false).await.unwrap();
        assert_eq!(first, DEFAULT_CATALOG.len());

        let second = repo.seed_catalog(DEFAULT_CATALOG, false).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(repo.count().await.unwrap(), DEFAULT_CATALOG.len() as i64);
    }

    #[tokio::test]
    async fn test_force_reseed_overwrites_prices() {
        let db = test_db().await;
        let repo = db.products();

        repo.seed_catalog(&[("4900000000001", "Old Name", 100)], false)
            .await
            .unwrap();
        repo.seed_catalog(&[("4900000000001", "New Name", 250)], true)
            .await
            .unwrap();

        let product = repo.find_by_code("4900000000001").await.unwrap().unwrap();
        assert_eq!(product.name, "New Name");
        assert_eq!(product.unit_price, 250);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
