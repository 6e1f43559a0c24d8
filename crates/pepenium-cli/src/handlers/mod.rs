//! Command handlers
//!
//! Offline commands (`profiles`, `capabilities`, `check-config`) only read the
//! environment and configuration files. `screenshot` and `find` open a live
//! session through the chosen profile.

pub mod capabilities;
pub mod check_config;
pub mod profiles;
pub mod session;

pub use capabilities::{execute_capabilities, request_json};
pub use check_config::{execute_check_config, summarize_config, ConfigSummary};
pub use profiles::{execute_profiles, profile_entries, ProfileEntry};
pub use session::{execute_find, execute_screenshot};
