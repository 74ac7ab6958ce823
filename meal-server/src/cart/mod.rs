//! 购物车: 内存中的每用户购物车 + redb 快照

pub mod error;
pub mod manager;
pub mod storage;

pub use error::CartError;
pub use manager::{CartManager, CartResult};
pub use storage::{CartStore, StorageError};
