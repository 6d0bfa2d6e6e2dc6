//! Deobfuscation of the upstream stream-descriptor payload
//!
//! The CDN endpoint returns its `url` field obfuscated: a `#h` marker,
//! `//_//` separators, and base64-encoded "trash" tokens (every 2- and
//! 3-character combination of `@ # ! ^ $`) spliced into an otherwise
//! ordinary base64 string. Stripping all of that and decoding yields the
//! comma-separated descriptor handled by [`crate::chunks`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

const TRASH_CHARS: [char; 5] = ['@', '#', '!', '^', '$'];
const MARKER: &str = "#h";
const SEPARATOR: &str = "//_//";

/// Strip obfuscation from a raw payload and decode it.
///
/// Payloads without the `#h` marker are assumed to be plain already and
/// returned unchanged. Decoding is lenient: undecodable bytes are replaced
/// rather than failing the whole payload, and a payload that does not
/// decode at all is returned stripped-but-undecoded so the chunk parser
/// can still make a best-effort pass.
pub fn clear_trash(raw: &str) -> String {
    if !raw.contains(MARKER) {
        return raw.to_string();
    }

    let mut cleaned: String = raw
        .replacen(MARKER, "", 1)
        .split(SEPARATOR)
        .collect::<Vec<_>>()
        .concat();

    for token in trash_tokens() {
        if cleaned.contains(&token) {
            cleaned = cleaned.replace(&token, "");
        }
    }

    let padding = (4 - cleaned.len() % 4) % 4;
    for _ in 0..padding {
        cleaned.push('=');
    }

    match STANDARD.decode(cleaned.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            warn!(%err, "stream payload did not base64-decode after trash removal");
            cleaned
        }
    }
}

/// Base64 encodings of every 2- and 3-character trash combination
fn trash_tokens() -> Vec<String> {
    let mut tokens = Vec::with_capacity(150);
    for &a in &TRASH_CHARS {
        for &b in &TRASH_CHARS {
            tokens.push(STANDARD.encode(format!("{a}{b}")));
            for &c in &TRASH_CHARS {
                tokens.push(STANDARD.encode(format!("{a}{b}{c}")));
            }
        }
    }
    tokens
}
