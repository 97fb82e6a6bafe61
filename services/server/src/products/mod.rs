//! 商品资源：内存存储与 CRUD 接口。

pub(crate) mod handlers;
pub(crate) mod store;
