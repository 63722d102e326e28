//! Utility functions shared by the fetchers and the HTTP layer.
//!
//! - **URL validation**: SSRF-focused checks for outbound fetch targets
//! - **Client identity**: a seedable pool of browser User-Agent strings
//! - **Bounded reads**: streaming response bodies with a hard size limit
//! - **HTTP client**: shared `reqwest` client with a bounded redirect policy
//!
//! # Examples
//!
//! ```
//! use fullfeed::util::{feed_target_url, UserAgentPool};
//!
//! let url = feed_target_url("example.com/feed.xml").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! let pool = UserAgentPool::seeded(1);
//! assert!(pool.pick().starts_with("Mozilla/5.0"));
//! ```

mod body;
mod http;
mod url_validator;
mod user_agent;

pub use body::{read_limited_bytes, BodyError};
pub use http::build_http_client;
pub use url_validator::{feed_target_url, validate_url, UrlValidationError};
pub use user_agent::{UserAgentPool, USER_AGENTS};
