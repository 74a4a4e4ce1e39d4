// src/ingest/rss.rs
//! RSS 2.0 body → `RawItem`s for one feed.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::error::FetchError;
use crate::ingest::{item_id, normalize_text};
use crate::ingest::types::RawItem;
use crate::sources::FeedSource;

pub const MAX_TITLE_CHARS: usize = 300;
pub const MAX_SUMMARY_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "media:content", default)]
    media_content: Vec<MediaRef>,
    #[serde(rename = "media:thumbnail", default)]
    media_thumbnail: Vec<MediaRef>,
    #[serde(default)]
    enclosure: Vec<Enclosure>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@medium")]
    medium: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

/// Parse a feed body. Items without a title are skipped; a missing or
/// unreadable `pubDate` takes `fetched_at`.
pub fn parse_feed(
    xml: &str,
    source: &FeedSource,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<RawItem>, FetchError> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for it in rss.channel.items {
        let title = normalize_text(it.title.as_deref().unwrap_or_default(), MAX_TITLE_CHARS);
        if title.is_empty() {
            continue;
        }
        let summary = it
            .description
            .as_deref()
            .map(|d| normalize_text(d, MAX_SUMMARY_CHARS))
            .filter(|d| !d.is_empty());
        let link = it.link.as_deref().unwrap_or_default().trim().to_string();
        let image_url = image_of(&it);

        out.push(RawItem {
            id: item_id(&link, &title),
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            title,
            summary,
            link,
            published_at: it
                .pub_date
                .as_deref()
                .and_then(parse_pub_date)
                .unwrap_or(fetched_at),
            image_url,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_parse_ms").record(ms);
    counter!("news_items_fetched_total").increment(out.len() as u64);

    Ok(out)
}

fn image_of(it: &Item) -> Option<String> {
    let media = it
        .media_content
        .iter()
        .filter(|m| m.medium.as_deref().map_or(true, |k| k.eq_ignore_ascii_case("image")))
        .chain(it.media_thumbnail.iter())
        .find_map(|m| m.url.clone());
    let enclosure = it
        .enclosure
        .iter()
        .filter(|e| e.mime.as_deref().map_or(true, |t| t.starts_with("image/")))
        .find_map(|e| e.url.clone());
    media
        .or(enclosure)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
}

/// RFC 2822 first (RSS), then the looser chrono parser (zone names like
/// `GMT`), then RFC 3339 for feeds that emit Atom-style stamps.
pub fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        if let Some(out) = DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond()) {
            return Some(out);
        }
    }
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
