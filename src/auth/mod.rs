//! Authentication
//!
//! Handles:
//! - Signed bearer tokens
//! - Authentication middleware

mod middleware;
pub mod token;

pub use middleware::{CurrentUser, require_auth};
pub use token::{Claims, TOKEN_TTL_HOURS, issue_token, verify_token};
