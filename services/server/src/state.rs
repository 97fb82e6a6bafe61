//! Server 状态：鉴权组件与商品存储句柄。

use std::sync::Arc;

use crate::{
    auth::{
        clock::Clock, guard::AccessGuard, principal::PrincipalDirectory, token::TokenService,
    },
    config::Config,
    products::store::ProductStore,
};

/// Server 共享状态；鉴权部分只读，商品存储自带互斥。
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) tokens: TokenService,
    pub(crate) guard: AccessGuard,
    pub(crate) principals: Arc<dyn PrincipalDirectory>,
    pub(crate) products: ProductStore,
    /// 登录签发的 token 有效期（秒）。
    pub(crate) token_ttl_sec: u64,
}

impl AppState {
    /// 按配置装配状态；时钟由调用方注入。
    pub(crate) fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let tokens = TokenService::new(config.secret.clone(), clock);
        Self {
            guard: AccessGuard::new(tokens.clone()),
            tokens,
            principals: config.principals.clone(),
            products: ProductStore::default(),
            token_ttl_sec: config.token_ttl_sec,
        }
    }
}
