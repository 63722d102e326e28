use chrono::{DateTime, Utc};

/// Syndication format a feed was parsed from.
///
/// Fixed by the parser and carried through the pipeline untouched, so the
/// relayed feed is always serialized in the format the source used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
    Json,
}

impl FeedFormat {
    /// MIME type sent in the `Content-Type` header of relayed responses.
    pub fn content_type(self) -> &'static str {
        match self {
            FeedFormat::Rss | FeedFormat::Atom => "application/xml",
            FeedFormat::Json => "application/json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeedFormat::Rss => "rss",
            FeedFormat::Atom => "atom",
            FeedFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

/// A parsed feed, owned by a single relay request.
#[derive(Debug, Clone)]
pub struct Feed {
    pub format: FeedFormat,
    pub title: String,
    /// Canonical link to the site the feed belongs to
    pub link: String,
    pub description: String,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub authors: Vec<Author>,
    pub items: Vec<Item>,
}

impl Feed {
    pub fn new(format: FeedFormat, title: impl Into<String>) -> Self {
        Self {
            format,
            title: title.into(),
            link: String::new(),
            description: String::new(),
            updated: None,
            published: None,
            authors: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// One entry of a feed.
///
/// `content` is the body the relay replaces; an empty string means the
/// source supplied none and the item is a candidate for enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub title: String,
    /// Article page the full text is extracted from
    pub link: String,
    pub description: String,
    pub content: String,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub authors: Vec<Author>,
}

impl Item {
    /// Any non-empty body counts, including whitespace; only `""` is missing.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_per_format() {
        assert_eq!(FeedFormat::Rss.content_type(), "application/xml");
        assert_eq!(FeedFormat::Atom.content_type(), "application/xml");
        assert_eq!(FeedFormat::Json.content_type(), "application/json");
    }

    #[test]
    fn test_whitespace_content_counts_as_content() {
        let mut item = Item::default();
        assert!(!item.has_content());
        item.content = "  \n\t".to_string();
        assert!(item.has_content());
        item.content = "<p>body</p>".to_string();
        assert!(item.has_content());
    }
}
