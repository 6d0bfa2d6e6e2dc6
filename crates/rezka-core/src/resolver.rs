//! Stream resolution against the catalog's CDN endpoint
//!
//! Exactly one outbound POST per resolve, dispatched on [`MediaKind`]:
//! `action=get_stream` with season/episode for a TV series,
//! `action=get_movie` for a movie. No retries; a failed attempt is final
//! for that request.

use reqwest::header::COOKIE;
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::chunks::parse_stream_chunks;
use crate::error::{Error, Result};
use crate::translator;
use crate::trash::clear_trash;
use crate::types::{
    MediaDescriptor, MediaKind, StreamRequest, StreamResult, Subtitles, TranslatorId,
};

const CDN_ENDPOINT: &str = "/ajax/get_cdn_series/";

/// Resolves playable streams for a loaded media descriptor
pub struct StreamResolver {
    client: Client,
    timeout: Duration,
}

impl StreamResolver {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// Resolve a stream for `media`.
    ///
    /// The translator id is resolved before the outbound call starts; the
    /// POST is the sole suspension point.
    pub async fn resolve(
        &self,
        media: &MediaDescriptor,
        request: &StreamRequest,
    ) -> Result<StreamResult> {
        let translator_id = translator::select(&media.translators, request.translator.as_ref())?;
        let form = request_form(media, translator_id, request)?;

        info!(
            media_id = media.id,
            kind = %media.kind,
            translator_id,
            season = ?request.season,
            episode = ?request.episode,
            "requesting stream"
        );

        let body = self.post_cdn(media, &form).await?;
        let payload = parse_upstream_response(&body)?;

        Ok(build_result(media, translator_id, request, payload))
    }

    /// The single outbound POST, carrying the media's session material
    async fn post_cdn(&self, media: &MediaDescriptor, form: &[(&str, String)]) -> Result<String> {
        let endpoint = media
            .origin
            .join(CDN_ENDPOINT)
            .map_err(|e| Error::Internal(format!("bad CDN endpoint URL: {e}")))?;

        // reqwest proxies are client-level, so a media that carries one
        // gets a dedicated client for this call
        let client = match &media.session.proxy {
            Some(proxy) => Client::builder()
                .timeout(self.timeout)
                .proxy(Proxy::all(proxy.as_str())?)
                .build()?,
            None => self.client.clone(),
        };

        let mut outbound = client.post(endpoint).form(form);
        for (name, value) in &media.session.headers {
            outbound = outbound.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = &media.session.cookie {
            outbound = outbound.header(COOKIE, cookie.as_str());
        }

        Ok(outbound.send().await?.text().await?)
    }
}

/// Form body for the CDN request; fails with `MissingSeasonEpisode` when a
/// series is requested without both season and episode ≥ 1.
pub(crate) fn request_form(
    media: &MediaDescriptor,
    translator_id: TranslatorId,
    request: &StreamRequest,
) -> Result<Vec<(&'static str, String)>> {
    let mut form = vec![
        ("id", media.id.to_string()),
        ("translator_id", translator_id.to_string()),
    ];

    match media.kind {
        MediaKind::Movie => {
            form.push(("action", "get_movie".to_string()));
        }
        MediaKind::TvSeries => {
            let (season, episode) = match (request.season, request.episode) {
                (Some(s), Some(e)) if s >= 1 && e >= 1 => (s, e),
                _ => return Err(Error::MissingSeasonEpisode),
            };
            form.push(("season", season.to_string()));
            form.push(("episode", episode.to_string()));
            form.push(("action", "get_stream".to_string()));
        }
    }

    Ok(form)
}

/// Fields extracted from a successful upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPayload {
    pub url: String,
    pub subtitle: String,
    pub subtitle_codes: String,
}

/// Classify and extract the upstream response body.
///
/// Empty body, non-JSON body, and missing truthy `success`/`url` each map
/// to their own error so callers can surface them distinctly.
pub fn parse_upstream_response(body: &str) -> Result<UpstreamPayload> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyUpstreamResponse);
    }

    let json: Value = serde_json::from_str(trimmed)
        .map_err(|e| Error::MalformedUpstreamResponse(e.to_string()))?;

    let success = json.get("success").and_then(Value::as_bool).unwrap_or(false);
    let url = json.get("url").and_then(Value::as_str).unwrap_or("");
    if !success || url.is_empty() {
        return Err(Error::StreamNotAvailable);
    }

    Ok(UpstreamPayload {
        url: url.to_string(),
        // upstream sends `false` instead of omitting these
        subtitle: text_field(&json, "subtitle"),
        subtitle_codes: text_field(&json, "subtitle_lns"),
    })
}

fn text_field(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn build_result(
    media: &MediaDescriptor,
    translator_id: TranslatorId,
    request: &StreamRequest,
    payload: UpstreamPayload,
) -> StreamResult {
    let cleaned = clear_trash(&payload.url);
    let videos = parse_stream_chunks(&cleaned);
    debug!(
        media_id = media.id,
        qualities = videos.len(),
        "parsed stream descriptor"
    );

    StreamResult {
        season: request.season,
        episode: request.episode,
        name: media.name.clone(),
        translator_id,
        subtitles: Subtitles {
            data: payload.subtitle,
            codes: payload.subtitle_codes,
        },
        videos,
    }
}
