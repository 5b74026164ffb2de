//! Atom rendering of fetched items.
//!
//! The output depends only on the channel, the items and the `now` instant
//! used for the feed-level `updated` element.

use atom_syndication::{Content, Entry, Feed, FixedDateTime, Link, Person, Text};
use chrono::{DateTime, Utc};
use html_escape::encode_double_quoted_attribute;

use crate::error::FeedError;
use crate::types::{AuthorRef, Channel, ContentItem};

pub fn render(
    channel: &Channel,
    items: &[ContentItem],
    now: DateTime<Utc>,
) -> Result<Vec<u8>, FeedError> {
    let base_url = channel.base_url();

    let entries = items
        .iter()
        .map(|item| build_entry(channel, item))
        .collect::<Result<Vec<_>, _>>()?;

    let mut feed = Feed::default();
    feed.set_title(Text::plain(channel.title()));
    feed.set_id(base_url.clone());
    feed.set_links(vec![link(&base_url)]);
    feed.set_authors(vec![person(channel.team(), None)]);
    feed.set_updated(now.fixed_offset());
    feed.set_entries(entries);

    feed.write_to(Vec::new())
        .map_err(|err| FeedError::Render(err.to_string()))
}

pub fn render_now(channel: &Channel, items: &[ContentItem]) -> Result<Vec<u8>, FeedError> {
    render(channel, items, Utc::now())
}

/// Avatar markup embedded as each entry's html content.
pub fn avatar_snippet(author: &AuthorRef) -> String {
    let id = encode_double_quoted_attribute(&author.id);
    let avatar = encode_double_quoted_attribute(&author.profile_image_url);
    format!(
        "<a href=\"/{id}/items\" rel=\"noreferrer\">\n\
         <img alt=\"@{id}\" width=\"32\" height=\"32\" src=\"{avatar}\">\n\
         </a>\n"
    )
}

fn build_entry(channel: &Channel, item: &ContentItem) -> Result<Entry, FeedError> {
    let published = parse_time(&item.id, &item.created_at)?;
    let updated = parse_time(&item.id, &item.updated_at)?;

    let mut content = Content::default();
    content.set_content_type("html".to_string());
    content.set_value(avatar_snippet(&item.user));

    let mut entry = Entry::default();
    entry.set_title(Text::plain(item.title.clone()));
    entry.set_id(item.id.clone());
    entry.set_links(vec![link(&item.url)]);
    entry.set_published(published);
    entry.set_updated(updated);
    entry.set_authors(vec![person(
        &item.user.id,
        Some(channel.author_uri(&item.user.id)),
    )]);
    entry.set_content(content);
    Ok(entry)
}

fn parse_time(item_id: &str, value: &str) -> Result<FixedDateTime, FeedError> {
    DateTime::parse_from_rfc3339(value).map_err(|err| {
        FeedError::Decode(format!("item {item_id}: invalid timestamp {value:?}: {err}"))
    })
}

fn link(href: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link
}

fn person(name: &str, uri: Option<String>) -> Person {
    let mut person = Person::default();
    person.set_name(name);
    person.set_uri(uri);
    person
}
