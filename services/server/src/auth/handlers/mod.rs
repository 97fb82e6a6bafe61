//! 鉴权 HTTP 接口处理模块。

mod http;
mod login;

pub(crate) use http::auth_login_handler;
