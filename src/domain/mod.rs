//! Domain layer - core types, errors and collaborator contracts.
//!
//! This layer contains pure domain models and the traits the pipeline
//! calls into, without any I/O of its own.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use models::{
    ContactFields, ContactRecord, ExportFormat, ExportJob, ExportOutcome, JobStatus, LoadOutcome,
    Location, PermissionState,
};
pub use ports::{ContactStore, FileSink, PermissionProvider, ShareSink};
