//! Infrastructure layer - external adapters (address book, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod consent;
pub mod file_sink;
pub mod share_sink;
pub mod sqlite_contacts;

pub use config::{config_file_path, ensure_config_exists, load_config, load_config_from_file};
pub use consent::{ConsentFileProvider, ConsentPrompt};
pub use file_sink::DirectoryFileSink;
pub use share_sink::CommandShareSink;
pub use sqlite_contacts::SqliteContactStore;
