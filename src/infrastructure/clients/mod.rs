pub mod github;
pub mod supabase;
