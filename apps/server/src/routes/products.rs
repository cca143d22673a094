//! Catalog lookup endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use till_core::validation::validate_product_code;
use till_core::Product;

use crate::error::ApiError;
use crate::state::AppState;

/// A catalog product as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub code: String,
    pub name: String,
    pub unit_price: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            code: product.code,
            name: product.name,
            unit_price: product.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
}

/// `GET /api/products`
///
/// The full catalog, ordered by code.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.db.products().list().await?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// `GET /api/products/{code}`
///
/// One product, or 404 when the code is not in the catalog.
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    validate_product_code(&code).map_err(|e| ApiError::validation(e.to_string()))?;

    let product = state
        .db
        .products()
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &code))?;

    Ok(Json(product.into()))
}
