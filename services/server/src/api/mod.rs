//! API 层：统一响应包裹、错误与常量。

pub(crate) mod error;
pub(crate) mod extract;
pub(crate) mod response;
pub(crate) mod types;
