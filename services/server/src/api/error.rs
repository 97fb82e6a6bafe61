//! API 错误定义与响应转换。

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::response::ApiEnvelope;

/// 接口错误。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
    pub(crate) suggestion: &'static str,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            suggestion,
        }
    }

    /// 请求参数缺失或无效。
    pub(crate) fn bad_request(
        code: &'static str,
        message: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message, suggestion)
    }

    /// 服务端内部错误。
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            message,
            "请稍后重试",
        )
    }
}

impl IntoResponse for ApiError {
    /// 转换为统一响应体；401 额外携带 `WWW-Authenticate`。
    fn into_response(self) -> Response {
        let challenge = self.status == StatusCode::UNAUTHORIZED;
        let body = Json(ApiEnvelope::<Value> {
            ok: false,
            code: self.code.to_string(),
            message: self.message,
            suggestion: self.suggestion.to_string(),
            data: None,
        });
        let mut response = (self.status, body).into_response();
        if challenge {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(pd_shared_protocol::AUTH_SCHEME),
            );
        }
        response
    }
}
