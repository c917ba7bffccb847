//! Reload snippet and HTML rewriting.
//!
//! The snippet is rendered once from configuration and shared by every
//! request. Rewriting works on raw bytes, so bodies that are not valid UTF-8
//! pass through untouched apart from the insertion.

use axum::body::Bytes;
use axum::http::{header, HeaderMap};

/// Tag the snippet is inserted in front of.
pub const BODY_CLOSE_TAG: &[u8] = b"</body>";

/// Client-side script that reloads the page on the reload signal.
#[derive(Debug, Clone)]
pub struct Snippet(Bytes);

impl Snippet {
    /// Render the snippet for a notification socket URL such as
    /// `ws://localhost:3001/ws`.
    pub fn new(socket_url: &str) -> Self {
        let script = format!(
            r#"
    <script>
        var ws = new WebSocket("{socket_url}");
        ws.onmessage = function(event) {{
            if (event.data === "reload") {{
                window.location.reload();
            }}
        }};
    </script>
    "#
        );
        Self(Bytes::from(script))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether a response's content type marks it as HTML.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

/// Insert `snippet` before the first closing body tag.
///
/// Returns `None` when the body has no closing tag.
pub fn inject(body: &[u8], snippet: &Snippet) -> Option<Vec<u8>> {
    let at = find(body, BODY_CLOSE_TAG)?;

    let mut rewritten = Vec::with_capacity(body.len() + snippet.len());
    rewritten.extend_from_slice(&body[..at]);
    rewritten.extend_from_slice(snippet.as_bytes());
    rewritten.extend_from_slice(&body[at..]);
    Some(rewritten)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
