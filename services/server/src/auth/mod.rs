//! 鉴权模块：token 签发/校验、请求守卫、主体目录与登录接口。

pub(crate) mod clock;
pub(crate) mod error;
pub(crate) mod guard;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod principal;
pub(crate) mod secret;
pub(crate) mod token;
