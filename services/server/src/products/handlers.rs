//! 商品 HTTP 路由处理函数；写操作由鉴权中间件前置保护。

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use pd_shared_protocol::{CreateProductRequest, CredentialClaim, Product, UpdateProductRequest};
use tracing::info;

use crate::{
    api::{
        error::ApiError,
        extract::ApiJson,
        response::{ApiReply, ok_response},
    },
    products::store::not_found,
    state::AppState,
};

/// 商品列表。
pub(crate) async fn list_products_handler(
    State(state): State<AppState>,
) -> ApiReply<Vec<Product>> {
    ok_response(
        StatusCode::OK,
        "商品列表获取成功",
        "",
        Some(state.products.list().await),
    )
}

/// 商品详情。
pub(crate) async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiReply<Product>, ApiError> {
    let product = state.products.get(&id).await.ok_or_else(|| not_found(&id))?;
    Ok(ok_response(StatusCode::OK, "商品获取成功", "", Some(product)))
}

/// 新建商品。
pub(crate) async fn create_product_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<CredentialClaim>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<ApiReply<Product>, ApiError> {
    let product = state.products.create(req, &claim.subject).await?;
    info!(subject = %claim.subject, product_id = %product.id, "product created");
    Ok(ok_response(
        StatusCode::CREATED,
        "商品已创建",
        "",
        Some(product),
    ))
}

/// 部分更新商品。
pub(crate) async fn update_product_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<CredentialClaim>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> Result<ApiReply<Product>, ApiError> {
    let product = state.products.update(&id, req, &claim.subject).await?;
    info!(subject = %claim.subject, product_id = %product.id, "product updated");
    Ok(ok_response(StatusCode::OK, "商品已更新", "", Some(product)))
}

/// 删除商品。
pub(crate) async fn delete_product_handler(
    State(state): State<AppState>,
    Extension(claim): Extension<CredentialClaim>,
    Path(id): Path<String>,
) -> Result<ApiReply<Product>, ApiError> {
    let product = state.products.delete(&id).await?;
    info!(subject = %claim.subject, product_id = %product.id, "product deleted");
    Ok(ok_response(StatusCode::OK, "商品已删除", "", Some(product)))
}
