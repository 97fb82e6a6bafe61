//! 请求守卫：解析 `Authorization` 方案，把 token 交给 [`TokenService`] 校验。
//!
//! 每次调用独立、无状态：`NoCredential -> SchemeChecked -> Verified | Rejected`。

use pd_shared_protocol::{AUTH_SCHEME, CredentialClaim};

use crate::auth::{error::AuthError, token::TokenService};

/// 受保护操作前的准入检查。
#[derive(Clone)]
pub(crate) struct AccessGuard {
    tokens: TokenService,
}

impl AccessGuard {
    pub(crate) fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    /// 校验原始请求头值，成功返回已验签的声明；Token 服务的错误原样透传。
    pub(crate) fn authorize(&self, raw_header: Option<&str>) -> Result<CredentialClaim, AuthError> {
        let token = parse_bearer(raw_header)?;
        self.tokens.verify(token)
    }
}

/// 拆出 `Bearer <token>` 中的 token 段；token 为空交由验签阶段判定。
fn parse_bearer(raw_header: Option<&str>) -> Result<&str, AuthError> {
    let Some(raw) = raw_header else {
        return Err(AuthError::MissingCredential);
    };
    if raw.trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let Some((scheme, token)) = raw.split_once(' ') else {
        return Err(AuthError::MalformedScheme);
    };
    if scheme != AUTH_SCHEME || token.contains(' ') {
        return Err(AuthError::MalformedScheme);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use super::{AccessGuard, parse_bearer};
    use crate::auth::{
        clock::ManualClock, error::AuthError, secret::SharedSecret, token::TokenService,
    };

    const T0: u64 = 1_700_000_000;

    fn guard_at(clock: &ManualClock) -> (AccessGuard, TokenService) {
        let tokens = TokenService::new(
            Arc::new(SharedSecret::new("guard-secret").unwrap()),
            Arc::new(clock.clone()),
        );
        (AccessGuard::new(tokens.clone()), tokens)
    }

    #[test]
    fn absent_or_blank_header_is_missing_credential() {
        let (guard, _) = guard_at(&ManualClock::at(T0));
        assert_eq!(guard.authorize(None), Err(AuthError::MissingCredential));
        assert_eq!(guard.authorize(Some("")), Err(AuthError::MissingCredential));
        assert_eq!(guard.authorize(Some("   ")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn wrong_scheme_shape_is_malformed_scheme() {
        for raw in ["Basic abc", "bearer abc", "BEARER abc", "Bearer", "Bearer a b", "Token"] {
            assert_eq!(parse_bearer(Some(raw)), Err(AuthError::MalformedScheme), "{raw}");
        }
    }

    #[test]
    fn empty_bearer_token_is_malformed_token() {
        let (guard, _) = guard_at(&ManualClock::at(T0));
        assert_eq!(
            guard.authorize(Some("Bearer ")),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn valid_bearer_token_returns_claim() {
        let clock = ManualClock::at(T0);
        let (guard, tokens) = guard_at(&clock);
        let issued = tokens.issue("admin", BTreeMap::new(), 3600).unwrap();
        let claim = guard
            .authorize(Some(&format!("Bearer {}", issued.token)))
            .unwrap();
        assert_eq!(claim, issued.claims);
    }

    #[test]
    fn token_errors_propagate_unchanged() {
        let clock = ManualClock::at(T0);
        let (guard, tokens) = guard_at(&clock);
        let issued = tokens.issue("admin", BTreeMap::new(), 60).unwrap();

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert_eq!(
            guard.authorize(Some(&format!("Bearer {tampered}"))),
            Err(AuthError::SignatureInvalid)
        );

        clock.advance(61);
        assert_eq!(
            guard.authorize(Some(&format!("Bearer {}", issued.token))),
            Err(AuthError::Expired)
        );
    }
}
