use feed_rs::model::{Entry, FeedType, Link, Person};
use feed_rs::parser;
use sha2::{Digest, Sha256};

use super::model::{Author, Feed, FeedFormat, Item};

/// Parses raw feed bytes (RSS 0.9x/1.0/2.0, Atom or JSON Feed) into a [`Feed`].
///
/// The source format is detected by `feed-rs` and recorded on the result so
/// the emitter can write the same format back out.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, parser::ParseFeedError> {
    let raw = parser::parse(bytes)?;

    let format = match raw.feed_type {
        FeedType::Atom => FeedFormat::Atom,
        FeedType::JSON => FeedFormat::Json,
        FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2 => FeedFormat::Rss,
    };

    let items = raw.entries.into_iter().map(convert_entry).collect();

    Ok(Feed {
        format,
        title: raw.title.map(|t| t.content).unwrap_or_default(),
        link: primary_link(&raw.links).unwrap_or_default(),
        description: raw.description.map(|d| d.content).unwrap_or_default(),
        updated: raw.updated,
        published: raw.published,
        authors: raw.authors.into_iter().map(convert_person).collect(),
        items,
    })
}

fn convert_entry(entry: Entry) -> Item {
    let link = primary_link(&entry.links).unwrap_or_default();
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let description = entry.summary.map(|s| s.content).unwrap_or_default();
    let content = entry.content.and_then(|c| c.body).unwrap_or_default();
    let timestamp = entry.updated.or(entry.published).map(|dt| dt.timestamp());

    let existing_id = if entry.id.is_empty() {
        None
    } else {
        Some(entry.id.as_str())
    };
    let id = generate_guid(existing_id, &link, &title, timestamp);

    Item {
        id,
        title,
        link,
        description,
        content,
        updated: entry.updated,
        published: entry.published,
        authors: entry.authors.into_iter().map(convert_person).collect(),
    }
}

fn convert_person(person: Person) -> Author {
    Author {
        name: person.name,
        email: person.email,
        uri: person.uri,
    }
}

/// Picks the link pointing at the human-readable page: the first one that is
/// not a `rel="self"` (or enclosure) reference to the feed document itself.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| !matches!(l.rel.as_deref(), Some("self") | Some("enclosure")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

fn generate_guid(existing: Option<&str>, link: &str, title: &str, timestamp: Option<i64>) -> String {
    if let Some(guid) = existing {
        let trimmed = guid.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let input = format!(
        "{}|{}|{}",
        link,
        title,
        timestamp.map(|p| p.to_string()).unwrap_or_default()
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)
}
