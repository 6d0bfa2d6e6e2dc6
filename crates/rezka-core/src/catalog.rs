//! Catalog client: title search and media page loading
//!
//! [`RezkaCatalog`] talks to the catalog site itself; the pure `parse_*`
//! functions do the HTML extraction and are unit-tested on fixtures.

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::types::{MediaDescriptor, MediaKind, SearchHit, Translator, UpstreamSession};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) \
     Gecko/20100101 Firefox/131.0";

/// Search and media-page loading against the catalog site
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a title to candidate media entries, best match first
    async fn search(&self, title: &str) -> Result<Vec<SearchHit>>;

    /// Load a media page into an immutable descriptor
    async fn load_media(&self, url: &str) -> Result<MediaDescriptor>;
}

/// HTTP implementation of [`Catalog`]
pub struct RezkaCatalog {
    client: Client,
    base_url: Url,
}

impl RezkaCatalog {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Catalog for RezkaCatalog {
    async fn search(&self, title: &str) -> Result<Vec<SearchHit>> {
        let endpoint = self
            .base_url
            .join("/search/")
            .map_err(|e| Error::Internal(format!("bad search URL: {e}")))?;

        let body = self
            .client
            .get(endpoint)
            .query(&[("do", "search"), ("subaction", "search"), ("q", title)])
            .send()
            .await?
            .text()
            .await?;

        let hits = parse_search_page(&body);
        info!(title, hits = hits.len(), "catalog search");
        Ok(hits)
    }

    async fn load_media(&self, url: &str) -> Result<MediaDescriptor> {
        let response = self.client.get(url).send().await?;

        let origin_str = response.url().origin().ascii_serialization();
        let origin = Url::parse(&origin_str)
            .map_err(|e| Error::Internal(format!("bad page origin: {e}")))?;
        let cookie = session_cookie(&response);
        let page_url = response.url().to_string();

        let body = response.text().await?;
        let page = parse_media_page(&body)?;
        debug!(
            media_id = page.id,
            kind = %page.kind,
            translators = page.translators.len(),
            "loaded media page"
        );

        Ok(MediaDescriptor {
            id: page.id,
            kind: page.kind,
            name: page.name,
            origin,
            translators: page.translators,
            session: UpstreamSession {
                headers: vec![
                    ("User-Agent".to_string(), USER_AGENT.to_string()),
                    ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
                    ("Referer".to_string(), page_url),
                ],
                cookie,
                proxy: None,
            },
        })
    }
}

fn session_cookie(response: &reqwest::Response) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Extract search hits from a results page
pub(crate) fn parse_search_page(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let card = Selector::parse("div.b-content__inline_item").expect("valid selector");
    let link = Selector::parse("div.b-content__inline_item-link > a").expect("valid selector");
    let rating = Selector::parse("span.b-category-bestrating").expect("valid selector");

    let mut hits = Vec::new();
    for item in document.select(&card) {
        let Some(anchor) = item.select(&link).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        hits.push(SearchHit {
            url: href.to_string(),
            title: anchor.text().collect::<String>().trim().to_string(),
            rating: item
                .select(&rating)
                .next()
                .and_then(|r| r.text().collect::<String>().trim().parse().ok()),
        });
    }
    hits
}

/// Fields extracted from one media page
#[derive(Debug, Clone)]
pub(crate) struct MediaPage {
    pub id: u64,
    pub kind: MediaKind,
    pub name: String,
    pub translators: Vec<Translator>,
}

/// Extract id, kind, name, and the priority-ordered translator list.
///
/// The CDN bootstrap call (`initCDNSeriesEvents` / `initCDNMoviesEvents`)
/// carries the media id, reveals the kind, and names a default translator
/// id used when the page has no translator list. The translator list is
/// kept in DOM order, which is the site's own priority order.
pub(crate) fn parse_media_page(html: &str) -> Result<MediaPage> {
    let bootstrap =
        Regex::new(r"initCDN(Series|Movies)Events\((\d+),\s*(\d+)").expect("valid regex");

    let captures = bootstrap
        .captures(html)
        .ok_or_else(|| Error::PageParse("CDN bootstrap call not found".to_string()))?;

    let kind = match &captures[1] {
        "Series" => MediaKind::TvSeries,
        _ => MediaKind::Movie,
    };
    let id: u64 = captures[2]
        .parse()
        .map_err(|_| Error::PageParse("media id is not numeric".to_string()))?;
    let default_translator: u32 = captures[3]
        .parse()
        .map_err(|_| Error::PageParse("translator id is not numeric".to_string()))?;

    let document = Html::parse_document(html);

    let heading = Selector::parse("h1").expect("valid selector");
    let name = document
        .select(&heading)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let item = Selector::parse("#translators-list .b-translator__item").expect("valid selector");
    let mut translators = Vec::new();
    for entry in document.select(&item) {
        let Some(id_attr) = entry.value().attr("data-translator_id") else {
            continue;
        };
        let Ok(translator_id) = id_attr.parse::<u32>() else {
            continue;
        };
        translators.push(Translator::new(
            translator_id,
            entry.text().collect::<String>().trim().to_string(),
        ));
    }

    // pages with a single dub ship no translator list, only the
    // bootstrap call's default id
    if translators.is_empty() {
        translators.push(Translator::new(default_translator, ""));
    }

    Ok(MediaPage {
        id,
        kind,
        name,
        translators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_PAGE: &str = r#"
        <html><head><title>x</title></head><body>
        <h1>Severance</h1>
        <ul id="translators-list" class="b-translators__list">
            <li class="b-translator__item" data-translator_id="56">HDrezka Studio</li>
            <li class="b-translator__item" data-translator_id="238">Оригинал (+субтитры)</li>
        </ul>
        <script>
            sof.tv.initCDNSeriesEvents(646, 56, 1, 1, false, 'rezka');
        </script>
        </body></html>"#;

    const MOVIE_PAGE: &str = r#"
        <html><body>
        <h1>Heat</h1>
        <script>sof.tv.initCDNMoviesEvents(95, 110, false, 'rezka');</script>
        </body></html>"#;

    #[test]
    fn parses_series_page() {
        let page = parse_media_page(SERIES_PAGE).unwrap();
        assert_eq!(page.id, 646);
        assert_eq!(page.kind, MediaKind::TvSeries);
        assert_eq!(page.name, "Severance");
        assert_eq!(
            page.translators,
            vec![
                Translator::new(56, "HDrezka Studio"),
                Translator::new(238, "Оригинал (+субтитры)"),
            ]
        );
    }

    #[test]
    fn parses_movie_page_with_implicit_translator() {
        let page = parse_media_page(MOVIE_PAGE).unwrap();
        assert_eq!(page.id, 95);
        assert_eq!(page.kind, MediaKind::Movie);
        assert_eq!(page.translators, vec![Translator::new(110, "")]);
    }

    #[test]
    fn page_without_bootstrap_call_fails() {
        assert!(matches!(
            parse_media_page("<html><body>nothing here</body></html>"),
            Err(Error::PageParse(_))
        ));
    }

    #[test]
    fn parses_search_results_in_order() {
        let html = r#"
            <div class="b-content__inline_items">
                <div class="b-content__inline_item" data-id="646">
                    <div class="b-content__inline_item-link">
                        <a href="https://example.org/series/severance.html">Severance</a>
                        <div>2022</div>
                    </div>
                </div>
                <div class="b-content__inline_item" data-id="647">
                    <div class="b-content__inline_item-link">
                        <a href="https://example.org/series/severance-2.html">Severance 2</a>
                    </div>
                </div>
            </div>"#;
        let hits = parse_search_page(html);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.org/series/severance.html");
        assert_eq!(hits[0].title, "Severance");
        assert!(hits[0].rating.is_none());
    }

    #[test]
    fn empty_results_page_yields_no_hits() {
        assert!(parse_search_page("<html><body></body></html>").is_empty());
    }
}
