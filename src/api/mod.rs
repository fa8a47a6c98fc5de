//! API Module
//!
//! Structure:
//! - commands.rs: `Monitor`, the entry point for front ends
//! - engine_status.rs: serialisable status snapshot

pub mod commands;
pub mod engine_status;

pub use commands::Monitor;
pub use engine_status::{ModelStatus, MonitorStatus};
