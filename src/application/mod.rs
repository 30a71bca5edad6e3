//! Application layer - the export pipeline.
//!
//! Permission gating, contact acquisition, encoding and export
//! orchestration, independent of any concrete platform.

pub mod acquisition;
pub mod busy;
pub mod encoder;
pub mod exporter;
#[cfg(test)]
pub mod fakes;
pub mod permission;
pub mod session;

pub use exporter::Exporter;
pub use session::ExportSession;
