// todostore - To-do list state, persistence and export

pub mod app;
pub mod config;
pub mod export;
pub mod kv;
pub mod labels;
pub mod models;
pub mod persist;
pub mod state;

// Re-export main types for convenience
pub use app::{DirSaver, ExportMenu, FileSaver, MemorySaver, TodoApp};
pub use config::{Backend, Config};
pub use export::{ExportError, ExportFormat, ExportScope};
pub use kv::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
pub use labels::{Labels, Locale};
pub use models::{Priority, Stats, Todo, TodoId, now_ms};
pub use persist::Persistence;
pub use state::{Command, ListState, SelectAll};
