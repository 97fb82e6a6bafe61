//! 商品内存存储：无持久化，按插入顺序保存。

use std::sync::Arc;

use pd_shared_protocol::{CreateProductRequest, Product, UpdateProductRequest, now_rfc3339_nanos};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::{error::ApiError, types::MAX_PRODUCT_NAME_CHARS};

/// 商品列表句柄；读写各自加锁，锁不跨越其它 await。
#[derive(Clone, Default)]
pub(crate) struct ProductStore {
    items: Arc<RwLock<Vec<Product>>>,
}

impl ProductStore {
    /// 全部商品快照。
    pub(crate) async fn list(&self) -> Vec<Product> {
        self.items.read().await.clone()
    }

    /// 按 ID 查询。
    pub(crate) async fn get(&self, id: &str) -> Option<Product> {
        self.items.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// 新建商品；`name` 与 `price` 必填。
    pub(crate) async fn create(
        &self,
        req: CreateProductRequest,
        actor: &str,
    ) -> Result<Product, ApiError> {
        let name = normalize_name(req.name.as_deref()).ok_or_else(|| {
            ApiError::bad_request("INVALID_REQUEST", "缺少商品名称", "请提供 name")
        })?;
        let Some(price) = req.price else {
            return Err(ApiError::bad_request(
                "INVALID_REQUEST",
                "缺少商品价格",
                "请提供 price",
            ));
        };
        check_price(price)?;

        let now = now_rfc3339_nanos();
        let product = Product {
            id: format!("prd_{}", Uuid::new_v4().simple()),
            name,
            price,
            description: normalize_description(req.description),
            created_at: now.clone(),
            updated_at: now,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        self.items.write().await.push(product.clone());
        Ok(product)
    }

    /// 部分更新：仅覆盖请求中出现的字段。
    pub(crate) async fn update(
        &self,
        id: &str,
        req: UpdateProductRequest,
        actor: &str,
    ) -> Result<Product, ApiError> {
        if req.is_empty() {
            return Err(ApiError::bad_request(
                "INVALID_REQUEST",
                "没有可更新的字段",
                "请至少提供 name、price 或 description 之一",
            ));
        }
        let name = match req.name.as_deref() {
            Some(raw) => Some(normalize_name(Some(raw)).ok_or_else(|| {
                ApiError::bad_request("INVALID_REQUEST", "商品名称不能为空", "请检查 name")
            })?),
            None => None,
        };
        if let Some(price) = req.price {
            check_price(price)?;
        }

        let mut items = self.items.write().await;
        let Some(product) = items.iter_mut().find(|p| p.id == id) else {
            return Err(not_found(id));
        };
        if let Some(name) = name {
            product.name = name;
        }
        if let Some(price) = req.price {
            product.price = price;
        }
        if req.description.is_some() {
            product.description = normalize_description(req.description);
        }
        product.updated_at = now_rfc3339_nanos();
        product.updated_by = actor.to_string();
        Ok(product.clone())
    }

    /// 删除并返回被删除的商品。
    pub(crate) async fn delete(&self, id: &str) -> Result<Product, ApiError> {
        let mut items = self.items.write().await;
        let Some(index) = items.iter().position(|p| p.id == id) else {
            return Err(not_found(id));
        };
        Ok(items.remove(index))
    }
}

/// 商品不存在。
pub(crate) fn not_found(id: &str) -> ApiError {
    ApiError::new(
        axum::http::StatusCode::NOT_FOUND,
        "PRODUCT_NOT_FOUND",
        format!("商品不存在: {id}"),
        "请刷新列表后重试",
    )
}

/// 归一化名称：去除首尾空白并截断；空白返回 None。
fn normalize_name(raw: Option<&str>) -> Option<String> {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_PRODUCT_NAME_CHARS).collect())
}

/// 空描述视为清除。
fn normalize_description(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn check_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request(
            "INVALID_REQUEST",
            "商品价格无效",
            "price 需为非负数",
        ));
    }
    Ok(())
}
