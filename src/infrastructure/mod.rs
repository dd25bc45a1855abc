mod clients;
mod storage;

pub use clients::{github::GitHubClient, supabase::SupabaseClient};
pub use storage::{
    edge_store::EdgeStore, fs_store::FileSystemStore, page_cache::PageCache,
    redis_store::RedisStore,
};
