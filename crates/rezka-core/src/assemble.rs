//! Assembly of the API-facing response payload
//!
//! Maps a [`StreamResult`]'s qualities to final playable URLs by appending
//! the HLS manifest suffix, degrading per quality rather than failing the
//! whole response.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::StreamResult;

/// Literal suffix turning a raw media URL into an HLS manifest request
pub const HLS_MANIFEST_SUFFIX: &str = ":hls:manifest.m3u8";

/// Fixed message used when no quality yielded a playable URL
pub const STREAM_NOT_FOUND: &str = "Stream not found.";

/// API response body.
///
/// Invariant: when every quality came up empty (or there were none),
/// `error` is set and `stream_urls` is absent; a success payload is never
/// partially populated with only nulls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_urls: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Error-only payload
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Build the API response for a resolved stream.
///
/// Per quality: the first URL in insertion order, suffixed with
/// [`HLS_MANIFEST_SUFFIX`] when non-empty, `null` otherwise. The `warning`
/// set by translator fallback passes through unchanged.
pub fn assemble(result: &StreamResult, warning: Option<String>) -> ApiResponse {
    let mut stream_urls = Map::new();

    for (quality, links) in result.videos.iter() {
        let value = match links.iter().find(|link| !link.is_empty()) {
            Some(link) => Value::String(format!("{link}{HLS_MANIFEST_SUFFIX}")),
            None => {
                warn!(quality, "no stream URL for quality");
                Value::Null
            }
        };
        stream_urls.insert(quality.to_string(), value);
    }

    if stream_urls.values().all(Value::is_null) {
        warn!(name = %result.name, "no valid stream URLs found");
        return ApiResponse {
            warning,
            ..ApiResponse::from_error(STREAM_NOT_FOUND)
        };
    }

    ApiResponse {
        stream_urls: Some(stream_urls),
        warning,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Subtitles, VideoSet};

    fn result_with(videos: VideoSet) -> StreamResult {
        StreamResult {
            season: Some(1),
            episode: Some(2),
            name: "Example".to_string(),
            translator_id: 56,
            subtitles: Subtitles::default(),
            videos,
        }
    }

    #[test]
    fn appends_hls_suffix_to_first_url() {
        let mut videos = VideoSet::new();
        videos.append("720p", "http://a.mp4");
        videos.append("720p", "http://b.mp4");

        let response = assemble(&result_with(videos), None);
        let urls = response.stream_urls.unwrap();
        assert_eq!(
            urls.get("720p").unwrap(),
            &Value::String("http://a.mp4:hls:manifest.m3u8".to_string())
        );
        assert!(response.error.is_none());
    }

    #[test]
    fn empty_qualities_produce_error_not_empty_map() {
        let response = assemble(&result_with(VideoSet::new()), None);
        assert!(response.stream_urls.is_none());
        assert_eq!(response.error.as_deref(), Some(STREAM_NOT_FOUND));
    }

    #[test]
    fn all_null_qualities_collapse_to_error() {
        let mut videos = VideoSet::new();
        videos.append("720p", "");
        let response = assemble(&result_with(videos), None);
        assert!(response.stream_urls.is_none());
        assert_eq!(response.error.as_deref(), Some(STREAM_NOT_FOUND));
    }

    #[test]
    fn one_bad_quality_does_not_abort_the_rest() {
        let mut videos = VideoSet::new();
        videos.append("360p", "");
        videos.append("720p", "http://a.mp4");

        let response = assemble(&result_with(videos), None);
        let urls = response.stream_urls.unwrap();
        assert_eq!(urls.get("360p").unwrap(), &Value::Null);
        assert!(urls.get("720p").unwrap().is_string());
        assert!(response.error.is_none());
    }

    #[test]
    fn warning_threads_through_unchanged() {
        let mut videos = VideoSet::new();
        videos.append("720p", "http://a.mp4");

        let warning = Some("preferred translator unavailable".to_string());
        let response = assemble(&result_with(videos), warning.clone());
        assert_eq!(response.warning, warning);

        // warning survives on the error path too
        let response = assemble(&result_with(VideoSet::new()), warning.clone());
        assert_eq!(response.warning, warning);
        assert!(response.error.is_some());
    }

    #[test]
    fn stream_urls_preserve_quality_order() {
        let mut videos = VideoSet::new();
        for quality in ["360p", "480p", "720p", "1080p"] {
            videos.append(quality, format!("http://{quality}.mp4"));
        }

        let response = assemble(&result_with(videos), None);
        let urls = response.stream_urls.unwrap();
        let keys: Vec<_> = urls.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["360p", "480p", "720p", "1080p"]);
    }
}
