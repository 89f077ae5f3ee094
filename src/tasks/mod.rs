//! Background Tasks Module
//!
//! # Tasks
//! - Cache cleanup: drops expired responses at the configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
