//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{NewProduct, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::Store;

use super::{AppState, Pagination};
use crate::error::ApiError;

// -- Request types --

/// Body of `POST /products` and `PUT /products/{id}`. A `PUT` replaces every
/// field, so an omitted description clears it.
#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

impl From<ProductRequest> for NewProduct {
    fn from(req: ProductRequest) -> Self {
        NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            quantity: req.quantity,
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
        }
    }
}

// -- Handlers --

/// POST /products: create a product.
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state.catalog.create_product(req.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products: list products in id order.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products(page.into()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{id}: load one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(parse_product_id(&id)?).await?;
    Ok(Json(product.into()))
}

/// PUT /products/{id}: replace a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .update_product(parse_product_id(&id)?, req.into())
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /products/{id}: remove a product no order refers to.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .delete_product(parse_product_id(&id)?)
        .await?;
    Ok(Json(product.into()))
}

fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    id.parse::<ProductId>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}
