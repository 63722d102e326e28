//! fullfeed: a feed relay that fills in full article text.
//!
//! A request for `/example.com/feed.xml` downloads `https://example.com/feed.xml`,
//! picks the recent items that only carry a summary, replaces their content
//! with the readable text of the linked page, and returns the feed in the
//! format it arrived in.
//!
//! - [`feed`] - feed model, parsing, fetching and serialization
//! - [`content`] - article download and readability extraction
//! - [`enrich`] - item selection and concurrent enrichment
//! - [`relay`] - the per-request pipeline tying the above together
//! - [`server`] - axum routes and error mapping
//! - [`config`] - TOML configuration
//! - [`util`] - URL validation, User-Agent pool, bounded body reads

pub mod config;
pub mod content;
pub mod enrich;
pub mod feed;
pub mod relay;
pub mod server;
pub mod util;
