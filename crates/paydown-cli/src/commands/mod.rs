//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `loans` - Loan commands (list, show, pay, regenerate, delete)
//! - `serve` - Web server command
//! - `status` - Status/summary/paydays/accounts commands

pub mod core;
pub mod loans;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use loans::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to a maximum byte length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // Back off to a char boundary so multi-byte names never split mid-char
    let mut end = max.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
