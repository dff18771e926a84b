//! Common module
//!
//! This module contains the application error type and logging setup.

pub mod error;
pub mod log;

// Re-export commonly used types and functions
pub use error::{Error, Result};
pub use log::init_logger;
