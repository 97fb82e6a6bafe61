//! Token 签发与校验（`<header>.<payload>.<signature>`，各段 base64url 无填充）。

use std::{collections::BTreeMap, sync::Arc};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use pd_shared_protocol::{CredentialClaim, TOKEN_ALG, TokenHeader};
use sha2::Sha256;

use crate::auth::{
    clock::Clock,
    error::{AuthError, IssueError},
    secret::SharedSecret,
};

type HmacSha256 = Hmac<Sha256>;

/// 签发结果：token 与其声明。
#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub(crate) token: String,
    pub(crate) claims: CredentialClaim,
}

/// Token 服务：只读共享密钥与时钟，可在并发请求间自由克隆。
#[derive(Clone)]
pub(crate) struct TokenService {
    secret: Arc<SharedSecret>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub(crate) fn new(secret: Arc<SharedSecret>, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// 为主体签发 token；相同主体、密钥与时钟读数得到相同结果。
    pub(crate) fn issue(
        &self,
        subject: &str,
        attributes: BTreeMap<String, String>,
        ttl_sec: u64,
    ) -> Result<IssuedToken, IssueError> {
        let now = self.clock.now_unix();
        let claims = CredentialClaim {
            subject: subject.to_string(),
            issued_at: now,
            expires_at: now.saturating_add(ttl_sec),
            attributes,
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&TokenHeader::default())?);
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let sig_b64 = self.sign_segments(&header_b64, &payload_b64)?;
        Ok(IssuedToken {
            token: format!("{header_b64}.{payload_b64}.{sig_b64}"),
            claims,
        })
    }

    /// 校验 token：先验签，再解析声明，最后判断过期（`now == expiresAt` 仍有效）。
    pub(crate) fn verify(&self, token: &str) -> Result<CredentialClaim, AuthError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().unwrap_or_default();
        let payload_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if header_b64.is_empty()
            || payload_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(AuthError::MalformedToken);
        }

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64.as_bytes())
            .map_err(|_| AuthError::MalformedToken)?;
        let payload_raw = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| AuthError::MalformedToken)?;

        // 无法解码的签名段不可能匹配。
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| AuthError::SignatureInvalid)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| AuthError::SignatureInvalid)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig).map_err(|_| AuthError::SignatureInvalid)?;

        let header: TokenHeader =
            serde_json::from_slice(&header_raw).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != TOKEN_ALG {
            return Err(AuthError::MalformedToken);
        }
        let claims: CredentialClaim =
            serde_json::from_slice(&payload_raw).map_err(|_| AuthError::MalformedToken)?;

        if self.clock.now_unix() > claims.expires_at {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    /// 对 `header.payload` 计算 HMAC-SHA256 并输出 base64url。
    fn sign_segments(&self, header_b64: &str, payload_b64: &str) -> Result<String, IssueError> {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| IssueError::Key)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::TokenService;
    use crate::auth::{clock::ManualClock, error::AuthError, secret::SharedSecret};

    const T0: u64 = 1_700_000_000;
    const HOUR: u64 = 3600;

    fn service(secret: &str, clock: &ManualClock) -> TokenService {
        TokenService::new(
            Arc::new(SharedSecret::new(secret).unwrap()),
            Arc::new(clock.clone()),
        )
    }

    fn role(value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("role".to_string(), value.to_string())])
    }

    #[test]
    fn issued_token_verifies_back_to_same_claim() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let issued = tokens.issue("admin", role("admin"), HOUR).unwrap();

        assert_eq!(issued.claims.issued_at, T0);
        assert_eq!(issued.claims.expires_at, T0 + HOUR);
        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(tokens.verify(&issued.token).unwrap(), issued.claims);
    }

    #[test]
    fn issuance_is_deterministic_for_same_clock_reading() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let first = tokens.issue("admin", role("admin"), HOUR).unwrap();
        let second = tokens.issue("admin", role("admin"), HOUR).unwrap();
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn flipping_any_signature_character_is_signature_invalid() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let issued = tokens.issue("admin", BTreeMap::new(), HOUR).unwrap();
        let (signed, sig) = issued.token.rsplit_once('.').unwrap();

        for idx in 0..sig.len() {
            let mut chars = sig.chars().collect::<Vec<_>>();
            chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
            let tampered = format!("{signed}.{}", chars.into_iter().collect::<String>());
            assert_eq!(
                tokens.verify(&tampered),
                Err(AuthError::SignatureInvalid),
                "flip at {idx}"
            );
        }

        let garbage = format!("{signed}.!!!");
        assert_eq!(tokens.verify(&garbage), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn forged_payload_is_rejected_before_claims_are_used() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let issued = tokens.issue("guest", BTreeMap::new(), HOUR).unwrap();
        let parts = issued.token.split('.').collect::<Vec<_>>();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"subject":"admin","issuedAt":{T0},"expiresAt":{}}}"#,
            T0 + 100 * HOUR
        ));
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(tokens.verify(&forged), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn token_from_other_secret_is_signature_invalid() {
        let clock = ManualClock::at(T0);
        let issued = service("secret-a", &clock)
            .issue("admin", BTreeMap::new(), HOUR)
            .unwrap();
        assert_eq!(
            service("secret-b", &clock).verify(&issued.token),
            Err(AuthError::SignatureInvalid)
        );
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let issued = tokens.issue("admin", BTreeMap::new(), 90).unwrap();

        clock.set(T0 + 90);
        assert!(tokens.verify(&issued.token).is_ok());
        clock.set(T0 + 91);
        assert_eq!(tokens.verify(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn admin_token_valid_for_one_hour() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        let issued = tokens.issue("admin", BTreeMap::new(), HOUR).unwrap();

        clock.advance(30 * 60);
        assert_eq!(tokens.verify(&issued.token).unwrap().subject, "admin");
        clock.advance(31 * 60);
        assert_eq!(tokens.verify(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn structurally_broken_tokens_are_malformed() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);
        for raw in ["", "abc", "a.b", "a..c", "a.b.c.d", "@@@.e30.c2ln", "e30.@@@.c2ln"] {
            assert_eq!(tokens.verify(raw), Err(AuthError::MalformedToken), "{raw}");
        }
    }

    #[test]
    fn signed_but_unexpected_contents_are_malformed() {
        let clock = ManualClock::at(T0);
        let tokens = service("unit-secret", &clock);

        let none_header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"subject":"admin","issuedAt":{T0},"expiresAt":{}}}"#,
            T0 + HOUR
        ));
        let sig = tokens.sign_segments(&none_header, &payload).unwrap();
        assert_eq!(
            tokens.verify(&format!("{none_header}.{payload}.{sig}")),
            Err(AuthError::MalformedToken)
        );

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let not_claims = URL_SAFE_NO_PAD.encode(r#"{"sub":"admin"}"#);
        let sig = tokens.sign_segments(&header, &not_claims).unwrap();
        assert_eq!(
            tokens.verify(&format!("{header}.{not_claims}.{sig}")),
            Err(AuthError::MalformedToken)
        );
    }
}
