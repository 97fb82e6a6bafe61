//! 鉴权 HTTP 路由处理函数。

use axum::{extract::State, http::StatusCode};
use pd_shared_protocol::{LoginData, LoginRequest};

use crate::{
    api::{
        error::ApiError,
        extract::ApiJson,
        response::{ApiReply, ok_response},
    },
    state::AppState,
};

/// 登录接口：校验主体凭证并签发 Bearer token。
pub(crate) async fn auth_login_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<ApiReply<LoginData>, ApiError> {
    let data = state.login(&req)?;
    Ok(ok_response(
        StatusCode::OK,
        "登录成功",
        "请在 Authorization 头中携带 Bearer token",
        Some(data),
    ))
}
