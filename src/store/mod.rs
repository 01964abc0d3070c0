//! Persistent key-value store.
//!
//! The monitor keeps its user settings and the recent debug log in a small
//! string-keyed store. Components only see the [`KeyValueStore`] capability so
//! they can be exercised against [`MemoryStore`] in tests and backed by a
//! [`FileStore`] in the CLI.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known store keys shared by every component.
pub mod keys {
    /// Model-runtime (Ollama) base URL.
    pub const OLLAMA_API_URL: &str = "ollamaApiUrl";
    /// GPU telemetry endpoint.
    pub const GPU_API_URL: &str = "gpuApiUrl";
    /// Refresh interval in seconds, shared by both views.
    pub const REFRESH_INTERVAL: &str = "refreshInterval";
    /// JSON array holding the persisted slice of the debug log.
    pub const DEBUG_MESSAGES: &str = "debugMessages";
}

/// Minimal string key-value capability.
///
/// Writes are synchronous: once `set` returns, a subsequent `get` from any
/// component observes the new value.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
