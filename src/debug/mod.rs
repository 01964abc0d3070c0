//! Debug log.
//!
//! Every monitor component records what it did in a shared [`DebugSink`].
//! The sink keeps a capped newest-first history, persists the most recent
//! slice in the key-value store, mirrors entries to `tracing`, and pushes
//! filtered views to an optional [`DebugSurface`].

mod entry;
mod sink;
mod surface;

pub use entry::{DebugEntry, DebugLevel, LevelFilter};
pub use sink::{export_file_name, DebugSink, DEFAULT_PERSISTED, DEFAULT_RETENTION};
pub use surface::{ChannelSurface, DebugSurface, DebugView};
