pub mod supabase;

pub use supabase::SupabaseClient;

use crate::error::Result;
use crate::models::{Command, Reading};
use async_trait::async_trait;

/// Where readings come from.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Most recent `limit` readings, newest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Reading>>;
}

/// Where control commands go.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn insert_command(&self, command: Command) -> Result<()>;
}
