//! Core data model: catalog media, translators, and resolved streams

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Integer key the catalog site uses for a dub/translation track
pub type TranslatorId = u32;

/// Content kind, as detected from the media page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    TvSeries,
}

impl MediaKind {
    pub fn is_series(&self) -> bool {
        matches!(self, MediaKind::TvSeries)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::TvSeries => write!(f, "tv_series"),
        }
    }
}

/// One dub/translation track offered by the catalog site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    pub id: TranslatorId,
    /// Display name as shown on the page; may be empty for the implicit
    /// single-translator case
    pub name: String,
}

impl Translator {
    pub fn new(id: TranslatorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A caller-supplied reference to a translator: either its integer id or
/// its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorRef {
    Id(TranslatorId),
    Name(String),
}

impl TranslatorRef {
    /// Parse a user-supplied string: all-digit strings become an id
    /// reference, anything else a name reference.
    pub fn parse(s: &str) -> Self {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = s.parse::<TranslatorId>() {
                return TranslatorRef::Id(id);
            }
        }
        TranslatorRef::Name(s.to_string())
    }
}

impl fmt::Display for TranslatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslatorRef::Id(id) => write!(f, "{id}"),
            TranslatorRef::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Session material captured while loading the media page, replayed on the
/// CDN request
#[derive(Debug, Clone, Default)]
pub struct UpstreamSession {
    /// Header name/value pairs (user agent, referer, ...)
    pub headers: Vec<(String, String)>,
    /// Cookie header value, if the page set any cookies
    pub cookie: Option<String>,
    /// Optional proxy for the outbound call
    pub proxy: Option<Url>,
}

/// One entry from a catalog search results page
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub rating: Option<f32>,
}

/// A loaded catalog media page. Immutable once built; owned by the request
/// that fetched it.
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    /// Opaque catalog identifier
    pub id: u64,
    pub kind: MediaKind,
    pub name: String,
    /// Scheme + host of the page the media was loaded from
    pub origin: Url,
    /// Translators in the site's own priority order (DOM order of the
    /// translator list)
    pub translators: Vec<Translator>,
    pub session: UpstreamSession,
}

/// Parameters for one stream resolution
#[derive(Debug, Clone, Default)]
pub struct StreamRequest {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub translator: Option<TranslatorRef>,
}

/// Subtitle payload passed through verbatim from the upstream response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtitles {
    pub data: String,
    pub codes: String,
}

/// Insertion-ordered mapping from quality label ("720p") to candidate URLs.
///
/// Duplicate quality labels across chunks accumulate rather than overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSet {
    entries: Vec<(String, Vec<String>)>,
}

impl VideoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a URL under a quality label, creating the label on first use
    pub fn append(&mut self, quality: &str, url: impl Into<String>) {
        match self.entries.iter_mut().find(|(q, _)| q == quality) {
            Some((_, urls)) => urls.push(url.into()),
            None => self.entries.push((quality.to_string(), vec![url.into()])),
        }
    }

    pub fn get(&self, quality: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(q, _)| q == quality)
            .map(|(_, urls)| urls.as_slice())
    }

    pub fn qualities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(q, _)| q.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(q, urls)| (q.as_str(), urls.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one stream resolution. Built once per request, immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct StreamResult {
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub name: String,
    pub translator_id: TranslatorId,
    pub subtitles: Subtitles,
    pub videos: VideoSet,
}
