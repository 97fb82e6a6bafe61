//! 请求体提取：JSON 解析失败同样返回统一信封。

use axum::extract::{FromRequest, rejection::JsonRejection};

use super::error::ApiError;

/// `axum::Json` 的包装，拒绝原因转换为 `ApiError`。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            rejection.status(),
            "INVALID_REQUEST",
            rejection.body_text(),
            "请发送 Content-Type 为 application/json 的合法请求体",
        )
    }
}
