//! Feed model, parsing, fetching and emission.
//!
//! - [`model`] - The relay's own `Feed`/`Item` types, independent of any wire format
//! - [`parser`] - RSS/Atom/JSON Feed bytes to [`Feed`] using the `feed-rs` crate
//! - [`fetcher`] - The [`FeedSource`] seam and its HTTP implementation
//! - [`emit`] - [`Feed`] back to bytes, in the format it was parsed from
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::{emit, FeedSource, HttpFeedSource};
//!
//! let feed = source.fetch_and_parse(&url).await?;
//! let bytes = emit(&feed)?;
//! ```

pub mod emit;
pub mod fetcher;
pub mod model;
pub mod parser;

pub use emit::{emit, EmitError};
pub use fetcher::{FeedSource, FetchError, HttpFeedSource};
pub use model::{Author, Feed, FeedFormat, Item};
pub use parser::parse_feed;
