use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use super::error::ApiError;
use super::query::{default_from_time, parse_from_time, parse_items_cap, RelayQuery};
use super::AppState;
use crate::enrich::SelectionWindow;
use crate::util::feed_target_url;

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>fullfeed</title>
</head>
<body>
<h1>fullfeed</h1>
<p>Relays an RSS, Atom or JSON feed with the full article text filled in
for items that only carry a summary.</p>
<p>Prefix a feed address (without <code>https://</code>) with this host:</p>
<pre>/example.com/feed.xml?items_cap=10&amp;from_time=2024-01-01T00:00:00Z</pre>
<ul>
<li><code>items_cap</code>: how many items to fill in, counted from the top of the feed</li>
<li><code>from_time</code>: skip items older than this UTC time</li>
</ul>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// `GET /{feed-url-without-scheme}`
pub async fn relay_feed(
    State(state): State<AppState>,
    uri: Uri,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, ApiError> {
    let feed_url = feed_target_url(uri.path())?;

    let query = RelayQuery::parse(raw_query.as_deref());
    let from = match query.from_time.as_deref() {
        Some(value) => parse_from_time(value)?,
        None => default_from_time(Utc::now(), state.from_days_ago),
    };
    let cap = match query.items_cap.as_deref() {
        Some(value) => parse_items_cap(value, state.max_items_cap)?,
        None => state.default_items_cap,
    };

    tracing::debug!(feed_url = %feed_url, from_time = %from, items_cap = cap, "Relaying feed");
    let output = state
        .relay
        .run(&feed_url, &SelectionWindow::new(from, cap))
        .await?;

    Ok((
        [(header::CONTENT_TYPE, output.format.content_type())],
        output.body,
    )
        .into_response())
}
