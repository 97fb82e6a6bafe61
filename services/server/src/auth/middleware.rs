//! 受保护路由的鉴权中间件。

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    auth::error::{AuthError, auth_error_to_api},
    state::AppState,
};

/// 校验 `Authorization` 后放行，并把已验签声明放入请求扩展。
pub(crate) async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let verdict = match req.headers().get(AUTHORIZATION).map(|value| value.to_str()) {
        // 非可见 ASCII 的头值不可能是合法方案。
        Some(Err(_)) => Err(AuthError::MalformedScheme),
        Some(Ok(raw)) => state.guard.authorize(Some(raw)),
        None => state.guard.authorize(None),
    };

    match verdict {
        Ok(claim) => {
            debug!(subject = %claim.subject, path = %req.uri().path(), "request authorized");
            req.extensions_mut().insert(claim);
            next.run(req).await
        }
        Err(err) => {
            debug!(kind = err.kind(), path = %req.uri().path(), "request rejected");
            auth_error_to_api(err).into_response()
        }
    }
}
