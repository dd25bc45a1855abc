pub mod edge_store;
pub mod fs_store;
pub mod page_cache;
pub mod redis_store;
