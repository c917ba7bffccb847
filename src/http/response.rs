//! Response relay.
//!
//! # Responsibilities
//! - Rebuild the client response from the upstream status and headers
//! - Frame the buffered body with an exact Content-Length
//!
//! # Design Decisions
//! - The body is always fully buffered, so upstream framing headers
//!   (Transfer-Encoding and friends) are dropped rather than relayed
//! - Multi-valued headers such as Set-Cookie keep every value

use axum::body::{Body, Bytes};
use axum::http::{header, response::Parts, HeaderName, HeaderValue};
use axum::response::Response;

fn is_hop_by_hop(name: &HeaderName) -> bool {
    *name == header::TRANSFER_ENCODING || *name == header::CONNECTION || name.as_str() == "keep-alive"
}

/// Build the client response from the upstream head and the final body.
pub fn relay_response(upstream: Parts, body: Bytes) -> Response {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = upstream.status;

    let headers = response.headers_mut();
    for (name, value) in upstream.headers.iter() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    response
}
