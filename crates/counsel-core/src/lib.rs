//! Shared domain types, configuration, and errors for the Counsel assistant.

pub mod config;
pub mod error;
pub mod types;

pub use config::CounselConfig;
pub use error::{CounselError, Result};
pub use types::*;
