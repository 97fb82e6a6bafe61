//! 登录逻辑：主体查询、凭证比对、token 签发。

use axum::http::StatusCode;
use pd_shared_protocol::{AUTH_SCHEME, LoginData, LoginRequest, unix_to_rfc3339};
use tracing::{info, warn};

use crate::{
    api::error::ApiError,
    auth::{error::issue_error_to_api, principal::proof_matches_absent},
    state::AppState,
};

impl AppState {
    /// 校验登录请求并签发 token；主体不存在与凭证错误返回同一错误。
    pub(crate) fn login(&self, req: &LoginRequest) -> Result<LoginData, ApiError> {
        let subject = req.subject.as_deref().unwrap_or_default().trim();
        let proof = req.proof.as_deref().unwrap_or_default();
        if subject.is_empty() || proof.is_empty() {
            return Err(ApiError::bad_request(
                "MISSING_CREDENTIALS",
                "登录参数不完整",
                "请提供 subject 与 proof",
            ));
        }

        // 主体不存在时同样做一次摘要比较，避免响应耗时暴露主体是否存在。
        let verified = match self.principals.lookup(subject) {
            Some(record) => record.proof_matches(proof).then_some(record),
            None => {
                let _ = proof_matches_absent(proof);
                None
            }
        };
        let Some(record) = verified else {
            warn!(subject, "login rejected");
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "LOGIN_FAILED",
                "用户名或凭证错误",
                "请检查后重试",
            ));
        };

        let issued = self
            .tokens
            .issue(&record.subject, record.attributes, self.token_ttl_sec)
            .map_err(issue_error_to_api)?;
        info!(
            subject = %issued.claims.subject,
            expires_at = issued.claims.expires_at,
            "login succeeded"
        );
        Ok(LoginData {
            token: issued.token,
            token_type: AUTH_SCHEME.to_string(),
            expires_in_sec: issued
                .claims
                .expires_at
                .saturating_sub(issued.claims.issued_at),
            expires_at: unix_to_rfc3339(issued.claims.expires_at),
        })
    }
}
