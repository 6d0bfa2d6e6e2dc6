//! Parser for the delimited stream-descriptor format
//!
//! A cleaned payload is a comma-separated list of chunks, each shaped
//! `<label>[<quality>]<url> or <url> or ...`. Only `.mp4` URLs are kept.
//! Parsing is best effort: a malformed chunk is skipped and logged, never
//! aborts the batch, and an empty result is valid.

use tracing::error;

use crate::types::VideoSet;

const VIDEO_EXT: &str = ".mp4";
const URL_SEPARATOR: &str = " or ";

/// Parse a cleaned stream descriptor into an ordered quality → URLs map.
pub fn parse_stream_chunks(cleaned: &str) -> VideoSet {
    let mut videos = VideoSet::new();

    for chunk in cleaned.split(',') {
        match parse_chunk(chunk) {
            Some((quality, links)) => {
                for link in links {
                    videos.append(quality, link);
                }
            }
            None => {
                if !chunk.is_empty() {
                    error!(chunk, "skipping malformed stream chunk");
                }
            }
        }
    }

    videos
}

/// One chunk: quality label and URLs come from the segment between the
/// first `[` and any second `[`, split at the `]` pair inside it; the URL
/// part is then split on `" or "` and filtered to the video extension.
fn parse_chunk(chunk: &str) -> Option<(&str, Vec<&str>)> {
    let (_, rest) = chunk.split_once('[')?;
    let segment = match rest.split_once('[') {
        Some((head, _)) => head,
        None => rest,
    };
    let mut parts = segment.splitn(3, ']');
    let quality = parts.next()?;
    let tail = parts.next()?;
    let links = tail
        .split(URL_SEPARATOR)
        .filter(|link| link.ends_with(VIDEO_EXT))
        .collect();
    Some((quality, links))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_chunks() {
        let videos =
            parse_stream_chunks("X[720p]http://a.mp4 or http://b.mp4,Y[480p]http://c.mp4");

        assert_eq!(
            videos.get("720p").unwrap(),
            &["http://a.mp4".to_string(), "http://b.mp4".to_string()]
        );
        assert_eq!(videos.get("480p").unwrap(), &["http://c.mp4".to_string()]);
        assert_eq!(videos.qualities().collect::<Vec<_>>(), vec!["720p", "480p"]);
    }

    #[test]
    fn malformed_chunks_never_raise() {
        let videos = parse_stream_chunks("garbage,,[noclose");
        assert!(videos.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(parse_stream_chunks("").is_empty());
    }

    #[test]
    fn non_mp4_candidates_are_dropped() {
        let videos = parse_stream_chunks("[1080p]http://a.webm or http://b.mp4");
        assert_eq!(videos.get("1080p").unwrap(), &["http://b.mp4".to_string()]);
    }

    #[test]
    fn chunk_with_no_surviving_urls_adds_no_label() {
        let videos = parse_stream_chunks("[1080p]http://a.webm,[720p]http://b.mp4");
        assert!(videos.get("1080p").is_none());
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn duplicate_labels_accumulate_across_chunks() {
        let videos = parse_stream_chunks("[720p]http://a.mp4,[720p]http://b.mp4");
        assert_eq!(
            videos.get("720p").unwrap(),
            &["http://a.mp4".to_string(), "http://b.mp4".to_string()]
        );
    }

    #[test]
    fn stray_second_bracket_does_not_swallow_urls() {
        let videos = parse_stream_chunks("a[720p]http://x.mp4[extra");
        assert_eq!(videos.get("720p").unwrap(), &["http://x.mp4".to_string()]);
    }

    #[test]
    fn url_part_is_bounded_at_the_second_close_bracket() {
        let videos = parse_stream_chunks("[720p]http://a.mp4]junk");
        assert_eq!(videos.get("720p").unwrap(), &["http://a.mp4".to_string()]);
    }

    #[test]
    fn partial_success_keeps_good_chunks() {
        let videos = parse_stream_chunks("broken chunk,[480p]http://c.mp4");
        assert_eq!(videos.get("480p").unwrap(), &["http://c.mp4".to_string()]);
        assert_eq!(videos.len(), 1);
    }
}
