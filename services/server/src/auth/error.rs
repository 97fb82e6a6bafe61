//! 鉴权错误分类，以及到 API 错误的唯一映射点。

use std::fmt;

use axum::http::StatusCode;
use tracing::error;

use crate::api::error::ApiError;

/// 鉴权失败原因；均为客户端输入错误，不重试、不影响进程。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthError {
    /// 请求头缺失或为空。
    MissingCredential,
    /// 非 `Bearer <token>` 形态。
    MalformedScheme,
    /// token 结构或编码无效。
    MalformedToken,
    /// 签名不匹配。
    SignatureInvalid,
    /// 已过期。
    Expired,
}

impl AuthError {
    /// 日志用的稳定标识。
    pub(crate) fn kind(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedScheme => "malformed_scheme",
            Self::MalformedToken => "malformed_token",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl std::error::Error for AuthError {}

/// 签发失败原因；属于服务端内部错误，与请求内容无关。
#[derive(Debug)]
pub(crate) enum IssueError {
    /// 头部或声明序列化失败。
    Encode(serde_json::Error),
    /// 密钥无法用于 HMAC。
    Key,
}

impl fmt::Display for IssueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "encode token failed: {err}"),
            Self::Key => f.write_str("signing key rejected"),
        }
    }
}

impl std::error::Error for IssueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Key => None,
        }
    }
}

impl From<serde_json::Error> for IssueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err)
    }
}

/// 鉴权错误映射到 API 错误：凭证缺失/方案错误为 401，token 无效/过期为 403。
pub(crate) fn auth_error_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingCredential => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "MISSING_CREDENTIALS",
            "缺少 Authorization 凭证",
            "请先登录并携带 Bearer token",
        ),
        AuthError::MalformedScheme => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "AUTH_SCHEME_INVALID",
            "Authorization 格式无效",
            "请使用 `Bearer <token>` 格式",
        ),
        AuthError::MalformedToken => ApiError::new(
            StatusCode::FORBIDDEN,
            "ACCESS_TOKEN_INVALID",
            "accessToken 格式无效",
            "请重新登录",
        ),
        AuthError::SignatureInvalid => ApiError::new(
            StatusCode::FORBIDDEN,
            "ACCESS_TOKEN_SIGNATURE_INVALID",
            "accessToken 签名校验失败",
            "请重新登录",
        ),
        AuthError::Expired => ApiError::new(
            StatusCode::FORBIDDEN,
            "ACCESS_TOKEN_EXPIRED",
            "accessToken 已过期",
            "请重新登录获取新凭证",
        ),
    }
}

/// 签发错误统一映射为 500，细节只进日志。
pub(crate) fn issue_error_to_api(err: IssueError) -> ApiError {
    error!(error = %err, "token issuance failed");
    ApiError::internal("凭证签发失败")
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{AuthError, IssueError, auth_error_to_api, issue_error_to_api};

    #[test]
    fn credential_shape_errors_map_to_unauthorized() {
        for err in [AuthError::MissingCredential, AuthError::MalformedScheme] {
            assert_eq!(auth_error_to_api(err).status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn token_errors_map_to_forbidden() {
        for err in [
            AuthError::MalformedToken,
            AuthError::SignatureInvalid,
            AuthError::Expired,
        ] {
            assert_eq!(auth_error_to_api(err).status, StatusCode::FORBIDDEN);
        }
        assert_eq!(
            auth_error_to_api(AuthError::Expired).code,
            "ACCESS_TOKEN_EXPIRED"
        );
    }

    #[test]
    fn issue_errors_map_to_internal_error() {
        let encode = serde_json::from_str::<u64>("x").unwrap_err();
        for err in [IssueError::Encode(encode), IssueError::Key] {
            let api = issue_error_to_api(err);
            assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api.code, "INTERNAL_ERROR");
            assert_eq!(api.message, "凭证签发失败");
        }
        assert_eq!(IssueError::Key.to_string(), "signing key rejected");
    }
}
