//! Serialization of a [`Feed`] back into the format it was parsed from.
//!
//! - RSS 2.0 through the `rss` crate (enriched bodies land in `content:encoded`)
//! - Atom 1.0 written event by event with `quick-xml`
//! - JSON Feed 1.1 through `serde_json`

use std::collections::BTreeMap;
use std::io::Cursor;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::model::{Author, Feed, FeedFormat, Item};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("RSS serialization failed: {0}")]
    Rss(#[from] rss::Error),
    #[error("Atom serialization failed: {0}")]
    Atom(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes `feed` in the format recorded on it.
pub fn emit(feed: &Feed) -> Result<Vec<u8>, EmitError> {
    match feed.format {
        FeedFormat::Rss => emit_rss(feed),
        FeedFormat::Atom => emit_atom(feed),
        FeedFormat::Json => emit_json(feed),
    }
}

// ============================================================================
// RSS
// ============================================================================

pub fn emit_rss(feed: &Feed) -> Result<Vec<u8>, EmitError> {
    let items: Vec<rss::Item> = feed.items.iter().map(rss_item).collect();

    let mut channel = rss::Channel::default();
    channel.set_title(feed.title.as_str());
    channel.set_link(feed.link.as_str());
    channel.set_description(feed.description.as_str());
    channel.set_pub_date(feed.published.map(|t| t.to_rfc2822()));
    channel.set_last_build_date(feed.updated.map(|t| t.to_rfc2822()));
    channel.set_managing_editor(feed.authors.first().map(rss_person));
    if feed.items.iter().any(|i| !i.content.is_empty()) {
        channel.set_namespaces(BTreeMap::from([(
            "content".to_string(),
            CONTENT_NS.to_string(),
        )]));
    }
    channel.set_items(items);

    Ok(channel.write_to(Vec::new())?)
}

fn rss_item(item: &Item) -> rss::Item {
    let mut guid = rss::Guid::default();
    guid.set_value(item.id.as_str());
    guid.set_permalink(false);

    let mut out = rss::Item::default();
    out.set_guid(guid);
    out.set_title(non_empty(&item.title));
    out.set_link(non_empty(&item.link));
    out.set_description(non_empty(&item.description));
    out.set_content(non_empty(&item.content));
    // RSS items carry a single date
    out.set_pub_date(item.published.or(item.updated).map(|t| t.to_rfc2822()));
    out.set_author(item.authors.first().map(rss_person));
    out
}

/// RSS expects `email (Name)`; fall back to the bare name when no address is known.
fn rss_person(author: &Author) -> String {
    match &author.email {
        Some(email) if author.name.is_empty() => email.clone(),
        Some(email) => format!("{} ({})", email, author.name),
        None => author.name.clone(),
    }
}

// ============================================================================
// Atom
// ============================================================================

pub fn emit_atom(feed: &Feed) -> Result<Vec<u8>, EmitError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(atom_error)?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM_NS));
    writer.write_event(Event::Start(root)).map_err(atom_error)?;

    let feed_updated = feed
        .updated
        .or(feed.published)
        .or_else(|| feed.items.iter().filter_map(|i| i.updated.or(i.published)).max())
        .unwrap_or_else(Utc::now);

    write_text(&mut writer, "id", &atom_id(&[feed.link.as_str()], &feed.title))?;
    write_text(&mut writer, "title", &feed.title)?;
    write_link(&mut writer, &feed.link)?;
    if !feed.description.is_empty() {
        write_text(&mut writer, "subtitle", &feed.description)?;
    }
    write_text(&mut writer, "updated", &rfc3339(feed_updated))?;
    for author in &feed.authors {
        write_author(&mut writer, author)?;
    }

    for item in &feed.items {
        writer
            .write_event(Event::Start(BytesStart::new("entry")))
            .map_err(atom_error)?;

        let seed = format!(
            "{}|{}",
            item.title,
            item.published.map(|p| p.timestamp()).unwrap_or_default()
        );
        write_text(&mut writer, "id", &atom_id(&[item.id.as_str(), item.link.as_str()], &seed))?;
        write_text(&mut writer, "title", &item.title)?;
        write_link(&mut writer, &item.link)?;
        let updated = item.updated.or(item.published).unwrap_or(feed_updated);
        write_text(&mut writer, "updated", &rfc3339(updated))?;
        if let Some(published) = item.published {
            write_text(&mut writer, "published", &rfc3339(published))?;
        }
        for author in &item.authors {
            write_author(&mut writer, author)?;
        }
        if !item.description.is_empty() {
            write_html(&mut writer, "summary", &item.description)?;
        }
        if !item.content.is_empty() {
            write_html(&mut writer, "content", &item.content)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("entry")))
            .map_err(atom_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("feed")))
        .map_err(atom_error)?;

    Ok(writer.into_inner().into_inner())
}

/// First non-empty candidate, else a `urn:sha256:` name derived from `seed`.
/// Atom requires a non-empty `<id>` on the feed and on every entry.
fn atom_id(candidates: &[&str], seed: &str) -> String {
    candidates
        .iter()
        .copied()
        .find(|c| !c.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("urn:sha256:{:x}", Sha256::digest(seed.as_bytes())))
}

fn write_text(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<(), EmitError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(atom_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(atom_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(atom_error)
}

fn write_html(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, html: &str) -> Result<(), EmitError> {
    let mut start = BytesStart::new(name);
    start.push_attribute(("type", "html"));
    writer.write_event(Event::Start(start)).map_err(atom_error)?;
    writer
        .write_event(Event::Text(BytesText::new(html)))
        .map_err(atom_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(atom_error)
}

fn write_link(writer: &mut Writer<Cursor<Vec<u8>>>, href: &str) -> Result<(), EmitError> {
    if href.is_empty() {
        return Ok(());
    }
    let mut link = BytesStart::new("link");
    link.push_attribute(("rel", "alternate"));
    link.push_attribute(("href", href));
    writer.write_event(Event::Empty(link)).map_err(atom_error)
}

fn write_author(writer: &mut Writer<Cursor<Vec<u8>>>, author: &Author) -> Result<(), EmitError> {
    writer
        .write_event(Event::Start(BytesStart::new("author")))
        .map_err(atom_error)?;
    write_text(writer, "name", &author.name)?;
    if let Some(email) = &author.email {
        write_text(writer, "email", email)?;
    }
    if let Some(uri) = &author.uri {
        write_text(writer, "uri", uri)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("author")))
        .map_err(atom_error)
}

fn atom_error(e: impl std::fmt::Display) -> EmitError {
    EmitError::Atom(e.to_string())
}

// ============================================================================
// JSON Feed
// ============================================================================

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    home_page_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<JsonAuthor<'a>>,
    items: Vec<JsonItem<'a>>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    content_html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<JsonAuthor<'a>>,
}

pub fn emit_json(feed: &Feed) -> Result<Vec<u8>, EmitError> {
    let doc = JsonFeed {
        version: JSON_FEED_VERSION,
        title: &feed.title,
        home_page_url: non_empty_str(&feed.link),
        description: non_empty_str(&feed.description),
        authors: feed.authors.iter().map(json_author).collect(),
        items: feed
            .items
            .iter()
            .map(|item| JsonItem {
                id: &item.id,
                url: non_empty_str(&item.link),
                title: non_empty_str(&item.title),
                summary: non_empty_str(&item.description),
                content_html: &item.content,
                date_published: item.published.map(rfc3339),
                date_modified: item.updated.map(rfc3339),
                authors: item.authors.iter().map(json_author).collect(),
            })
            .collect(),
    };

    Ok(serde_json::to_vec_pretty(&doc)?)
}

fn json_author(author: &Author) -> JsonAuthor<'_> {
    JsonAuthor {
        name: &author.name,
        url: author.uri.as_deref(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn non_empty(s: &str) -> Option<String> {
    non_empty_str(s).map(str::to_owned)
}

fn non_empty_str(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
